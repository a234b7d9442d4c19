use std::path::{Path, PathBuf};

use crate::decision::should_delete;
use crate::error::{Result, SweepError};
use crate::fsio::{DirectoryEnumerator, FileActionExecutor, FileEntry};
use crate::pattern::{PatternInference, RunLengthInference};
use crate::report::{SilentReporter, SweepReporter};
use crate::rules::{RetentionRule, RuleDefaults, RuleRegistry};

/// Core-facing sweep configuration, fixed before [`SweepEngine::run`].
#[derive(Debug, Clone, Copy)]
pub struct SweepOptions {
    pub clean_root_folder: bool,
    pub clean_subdirectories: bool,
    /// Discard a directory's rule state as soon as it is done, trading
    /// re-inference cost for peak memory.
    pub low_memory_mode: bool,
    pub defaults: RuleDefaults,
}

/// One action or listing that failed; the sweep continued past it.
#[derive(Debug)]
pub struct SweepFailure {
    pub path: PathBuf,
    pub error: SweepError,
}

/// Counters for one completed sweep.
#[derive(Debug, Default)]
pub struct SweepSummary {
    pub directories_processed: usize,
    pub files_examined: usize,
    pub files_swept: usize,
    pub failures: Vec<SweepFailure>,
}

/// Single-pass retention sweep over a directory tree.
///
/// One engine instance is one sweep's execution context: seed explicit
/// rules with [`add_rule`](Self::add_rule), call [`run`](Self::run) once,
/// read the summary, drop the engine. Subdirectories are processed before
/// the root; within a directory, files are handled newest first so the
/// match counters accumulate in recency order.
pub struct SweepEngine<E, X> {
    options: SweepOptions,
    registry: RuleRegistry,
    inference: Box<dyn PatternInference>,
    reporter: Box<dyn SweepReporter>,
    enumerator: E,
    executor: X,
}

impl<E, X> SweepEngine<E, X>
where
    E: DirectoryEnumerator,
    X: FileActionExecutor,
{
    pub fn new(options: SweepOptions, enumerator: E, executor: X) -> Self {
        Self {
            options,
            registry: RuleRegistry::new(),
            inference: Box::new(RunLengthInference),
            reporter: Box::new(SilentReporter),
            enumerator,
            executor,
        }
    }

    /// Swap in a different pattern inference strategy.
    pub fn with_inference(mut self, inference: Box<dyn PatternInference>) -> Self {
        self.inference = inference;
        self
    }

    pub fn with_reporter(mut self, reporter: Box<dyn SweepReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Seed an explicit rule for a directory before the sweep starts.
    /// Explicit rules are checked before anything inferred mid-sweep.
    pub fn add_rule(&mut self, directory: &Path, rule: RetentionRule) {
        self.registry.add_rule(directory, rule);
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn executor(&self) -> &X {
        &self.executor
    }

    /// Run the sweep. With `backup` set, expired files are moved under the
    /// backup root (mirroring their directory layout) instead of deleted.
    pub fn run(&mut self, root: &Path, backup: Option<&Path>) -> Result<SweepSummary> {
        if let Some(backup_root) = backup {
            self.executor.prepare_backup_root(backup_root)?;
        }

        let subdirectories = if self.options.clean_subdirectories {
            self.enumerator.subdirectories(root)?
        } else {
            Vec::new()
        };

        let total = subdirectories.len() + usize::from(self.options.clean_root_folder);
        self.reporter.sweep_started(root, total);

        let mut summary = SweepSummary::default();

        for dir in &subdirectories {
            self.process_directory(dir, root, backup, &mut summary)?;
            if self.options.low_memory_mode {
                self.registry.drop_directory(dir);
            }
        }

        if self.options.clean_root_folder {
            self.process_directory(root, root, backup, &mut summary)?;
        }

        if self.options.low_memory_mode {
            self.registry.clear();
        }

        self.reporter.sweep_finished(&summary);
        Ok(summary)
    }

    fn process_directory(
        &mut self,
        dir: &Path,
        root: &Path,
        backup: Option<&Path>,
        summary: &mut SweepSummary,
    ) -> Result<()> {
        self.reporter.directory_started(dir);

        let files = match self.enumerator.files(dir) {
            Ok(files) => files,
            Err(error) => {
                self.reporter.action_failed(dir, &error);
                summary.failures.push(SweepFailure {
                    path: dir.to_path_buf(),
                    error,
                });
                return Ok(());
            }
        };

        summary.directories_processed += 1;

        for file in files {
            summary.files_examined += 1;

            // counter update and verdict for one file are a single unit
            let delete = self.evaluate(dir, &file)?;
            if !delete {
                continue;
            }

            let (result, dest) = match backup {
                Some(backup_root) => {
                    let dest = backup_destination(backup_root, root, dir);
                    (self.executor.move_to(&file, &dest), Some(dest))
                }
                None => (self.executor.delete(&file), None),
            };

            match result {
                Ok(()) => {
                    summary.files_swept += 1;
                    self.reporter.file_swept(&file, dest.as_deref());
                }
                Err(error) => {
                    // one stuck file must not end the sweep
                    self.reporter.action_failed(&file.path, &error);
                    summary.failures.push(SweepFailure {
                        path: file.path.clone(),
                        error,
                    });
                }
            }
        }

        Ok(())
    }

    /// First matching rule wins. An existing rule is evaluated with the
    /// count of matches seen before this file, then incremented regardless
    /// of the verdict; a rule inferred for this file is seeded to 1 and
    /// evaluated after seeding, without a second increment.
    fn evaluate(&mut self, dir: &Path, file: &FileEntry) -> Result<bool> {
        let file_name = file.file_name();
        let extension = file.extension();
        let (rule, created) = self.registry.find_or_create(
            dir,
            &file_name,
            &extension,
            &self.options.defaults,
            self.inference.as_ref(),
        )?;

        if created {
            Ok(should_delete(rule, file.modified))
        } else {
            let verdict = should_delete(rule, file.modified);
            rule.record_match();
            Ok(verdict)
        }
    }
}

/// Backup layout mirrors the swept tree: the cleanup root prefix is
/// stripped from the file's directory and re-rooted under the backup root.
fn backup_destination(backup_root: &Path, root: &Path, dir: &Path) -> PathBuf {
    match dir.strip_prefix(root) {
        Ok(relative) => backup_root.join(relative),
        Err(_) => backup_root.to_path_buf(),
    }
}
