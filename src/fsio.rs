use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use walkdir::WalkDir;

use crate::error::{Result, SweepError};

/// Handle for one regular file, as produced by a [`DirectoryEnumerator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub modified: DateTime<Utc>,
}

impl FileEntry {
    pub fn new(path: impl Into<PathBuf>, modified: DateTime<Utc>) -> Self {
        Self {
            path: path.into(),
            modified,
        }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// The extension with its leading dot (".log"), or an empty string.
    pub fn extension(&self) -> String {
        match self.path.extension() {
            Some(ext) => format!(".{}", ext.to_string_lossy()),
            None => String::new(),
        }
    }
}

/// Supplies the engine with directories and recency-ordered file listings.
pub trait DirectoryEnumerator {
    /// All directories below `root`, in no particular order.
    fn subdirectories(&self, root: &Path) -> Result<Vec<PathBuf>>;

    /// Top-level files of `dir`, sorted by last write time descending.
    fn files(&self, dir: &Path) -> Result<Vec<FileEntry>>;
}

/// Carries out the engine's delete and move intents.
pub trait FileActionExecutor {
    /// Validate and prepare the backup root before any file is touched.
    fn prepare_backup_root(&mut self, _backup_root: &Path) -> Result<()> {
        Ok(())
    }

    fn delete(&mut self, file: &FileEntry) -> Result<()>;

    /// Move `file` into `dest_dir`, keeping its file name.
    fn move_to(&mut self, file: &FileEntry, dest_dir: &Path) -> Result<()>;
}

/// Real filesystem enumerator built on walkdir.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsEnumerator;

impl DirectoryEnumerator for FsEnumerator {
    fn subdirectories(&self, root: &Path) -> Result<Vec<PathBuf>> {
        // unreadable entries are skipped; their directories surface as
        // per-directory listing failures later if they are reachable at all
        let dirs = WalkDir::new(root)
            .min_depth(1)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir())
            .map(|e| e.into_path())
            .collect();

        Ok(dirs)
    }

    fn files(&self, dir: &Path) -> Result<Vec<FileEntry>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(false) {
            let entry = entry.map_err(|e| SweepError::DirectoryRead {
                path: dir.to_path_buf(),
                source: e.into(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(_) => continue, // Skip files we can't read
            };
            let modified: DateTime<Utc> = metadata
                .modified()
                .unwrap_or_else(|_| SystemTime::now())
                .into();

            files.push(FileEntry::new(entry.into_path(), modified));
        }

        files.sort_by(|a, b| b.modified.cmp(&a.modified));
        Ok(files)
    }
}

/// Performs real deletions and backup moves.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsActionExecutor {
    use_trash: bool,
}

impl FsActionExecutor {
    /// With `use_trash` set, deletions go to the OS recycle bin instead of
    /// being permanent.
    pub fn new(use_trash: bool) -> Self {
        Self { use_trash }
    }
}

impl FileActionExecutor for FsActionExecutor {
    fn prepare_backup_root(&mut self, backup_root: &Path) -> Result<()> {
        fs::create_dir_all(backup_root).map_err(|e| {
            SweepError::Configuration(format!(
                "backup root {} is not usable: {}",
                backup_root.display(),
                e
            ))
        })?;

        let metadata = fs::metadata(backup_root).map_err(|e| {
            SweepError::Configuration(format!(
                "backup root {} is not readable: {}",
                backup_root.display(),
                e
            ))
        })?;
        if metadata.permissions().readonly() {
            return Err(SweepError::Configuration(format!(
                "backup root {} is not writable",
                backup_root.display()
            )));
        }

        Ok(())
    }

    fn delete(&mut self, file: &FileEntry) -> Result<()> {
        if self.use_trash {
            trash::delete(&file.path).map_err(|e| SweepError::FileAction {
                action: "trash",
                path: file.path.clone(),
                source: io::Error::other(e),
            })
        } else {
            fs::remove_file(&file.path).map_err(|source| SweepError::FileAction {
                action: "delete",
                path: file.path.clone(),
                source,
            })
        }
    }

    fn move_to(&mut self, file: &FileEntry, dest_dir: &Path) -> Result<()> {
        fs::create_dir_all(dest_dir).map_err(|source| SweepError::FileAction {
            action: "move",
            path: file.path.clone(),
            source,
        })?;

        let dest = dest_dir.join(file.file_name());
        if fs::rename(&file.path, &dest).is_ok() {
            return Ok(());
        }

        // rename cannot cross filesystems; fall back to copy + remove
        let options = fs_extra::file::CopyOptions::new();
        fs_extra::file::move_file(&file.path, &dest, &options)
            .map(|_| ())
            .map_err(|e| SweepError::FileAction {
                action: "move",
                path: file.path.clone(),
                source: io::Error::other(e),
            })
    }
}

/// What a dry run would have done to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedAction {
    Delete(PathBuf),
    MoveTo { from: PathBuf, dest_dir: PathBuf },
}

/// Records intents without touching the filesystem.
#[derive(Debug, Default)]
pub struct PreviewExecutor {
    pub planned: Vec<PlannedAction>,
}

impl FileActionExecutor for PreviewExecutor {
    fn delete(&mut self, file: &FileEntry) -> Result<()> {
        self.planned.push(PlannedAction::Delete(file.path.clone()));
        Ok(())
    }

    fn move_to(&mut self, file: &FileEntry, dest_dir: &Path) -> Result<()> {
        self.planned.push(PlannedAction::MoveTo {
            from: file.path.clone(),
            dest_dir: dest_dir.to_path_buf(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn write_aged(dir: &Path, name: &str, age_secs: u64) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"payload").unwrap();
        let mtime = SystemTime::now() - Duration::from_secs(age_secs);
        let file = fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(mtime).unwrap();
        path
    }

    #[test]
    fn files_come_back_newest_first() {
        let dir = TempDir::new().unwrap();
        write_aged(dir.path(), "old.log", 300);
        write_aged(dir.path(), "new.log", 10);
        write_aged(dir.path(), "middle.log", 100);

        let files = FsEnumerator.files(dir.path()).unwrap();
        let names: Vec<String> = files.iter().map(|f| f.file_name()).collect();
        assert_eq!(names, ["new.log", "middle.log", "old.log"]);
    }

    #[test]
    fn file_listing_is_top_level_only() {
        let dir = TempDir::new().unwrap();
        write_aged(dir.path(), "root.log", 10);
        fs::create_dir(dir.path().join("nested")).unwrap();
        write_aged(&dir.path().join("nested"), "inner.log", 10);

        let files = FsEnumerator.files(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name(), "root.log");
    }

    #[test]
    fn subdirectories_are_walked_recursively() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::create_dir(dir.path().join("c")).unwrap();

        let mut dirs = FsEnumerator.subdirectories(dir.path()).unwrap();
        dirs.sort();
        assert_eq!(
            dirs,
            [
                dir.path().join("a"),
                dir.path().join("a/b"),
                dir.path().join("c"),
            ]
        );
    }

    #[test]
    fn extension_includes_the_dot() {
        let entry = FileEntry::new("/tmp/app001.log", Utc::now());
        assert_eq!(entry.extension(), ".log");
        assert_eq!(entry.file_name(), "app001.log");

        let bare = FileEntry::new("/tmp/core", Utc::now());
        assert_eq!(bare.extension(), "");
    }

    #[test]
    fn delete_removes_the_file() {
        let dir = TempDir::new().unwrap();
        let path = write_aged(dir.path(), "gone.log", 10);

        let entry = FileEntry::new(path.clone(), Utc::now());
        FsActionExecutor::new(false).delete(&entry).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn move_to_creates_the_destination_tree() {
        let dir = TempDir::new().unwrap();
        let backup = TempDir::new().unwrap();
        let path = write_aged(dir.path(), "keepsake.log", 10);

        let entry = FileEntry::new(path.clone(), Utc::now());
        let dest_dir = backup.path().join("logs/app");
        FsActionExecutor::new(false).move_to(&entry, &dest_dir).unwrap();

        assert!(!path.exists());
        assert!(dest_dir.join("keepsake.log").exists());
    }

    #[test]
    fn preview_executor_touches_nothing() {
        let dir = TempDir::new().unwrap();
        let path = write_aged(dir.path(), "stays.log", 10);

        let entry = FileEntry::new(path.clone(), Utc::now());
        let mut preview = PreviewExecutor::default();
        preview.delete(&entry).unwrap();
        preview.move_to(&entry, Path::new("/backup")).unwrap();

        assert!(path.exists());
        assert_eq!(preview.planned.len(), 2);
        assert_eq!(preview.planned[0], PlannedAction::Delete(path.clone()));
    }
}
