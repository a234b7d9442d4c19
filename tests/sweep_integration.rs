use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration as StdDuration, SystemTime};

use chrono::{DateTime, Duration, Utc};
use tempfile::TempDir;

use dirsweep::config::{Config, RuleSpec};
use dirsweep::fsio::{FsActionExecutor, FsEnumerator, PreviewExecutor};
use dirsweep::rules::RuleDefaults;
use dirsweep::sweep::{SweepEngine, SweepOptions};

fn write_aged(dir: &Path, name: &str, age_days: u64) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"payload").unwrap();
    let mtime = SystemTime::now() - StdDuration::from_secs(age_days * 24 * 60 * 60);
    let file = fs::File::options().write(true).open(&path).unwrap();
    file.set_modified(mtime).unwrap();
    path
}

fn options(min: u64, max: u64, oldest: DateTime<Utc>) -> SweepOptions {
    SweepOptions {
        clean_root_folder: true,
        clean_subdirectories: true,
        low_memory_mode: false,
        defaults: RuleDefaults {
            min_files: min,
            max_files: max,
            oldest_file: oldest,
        },
    }
}

/// Everything is older than the cutoff; with min 2, the two newest
/// generations of the shape survive.
#[test]
fn sweep_keeps_the_newest_generations_by_age() {
    let root = TempDir::new().unwrap();
    for (i, age) in [(1, 1), (2, 2), (3, 3), (4, 4), (5, 5)] {
        write_aged(root.path(), &format!("report{:02}.txt", i), age);
    }

    let cutoff = Utc::now() - Duration::hours(1);
    let mut engine = SweepEngine::new(
        options(2, u64::MAX, cutoff),
        FsEnumerator,
        FsActionExecutor::new(false),
    );
    let summary = engine.run(root.path(), None).unwrap();

    assert_eq!(summary.files_examined, 5);
    assert_eq!(summary.files_swept, 3);
    assert!(summary.failures.is_empty());
    assert!(root.path().join("report01.txt").exists());
    assert!(root.path().join("report02.txt").exists());
    assert!(!root.path().join("report03.txt").exists());
    assert!(!root.path().join("report04.txt").exists());
    assert!(!root.path().join("report05.txt").exists());
}

/// A cutoff older than every file means age never fires; the max count cap
/// still trims the shape down to its newest members.
#[test]
fn max_count_cap_trims_old_generations_without_an_age_cutoff() {
    let root = TempDir::new().unwrap();
    for (i, age) in [(1, 1), (2, 2), (3, 3), (4, 4)] {
        write_aged(root.path(), &format!("snap{}.bak", i), age);
    }

    let cutoff = Utc::now() - Duration::days(365);
    let mut engine = SweepEngine::new(
        options(0, 2, cutoff),
        FsEnumerator,
        FsActionExecutor::new(false),
    );
    let summary = engine.run(root.path(), None).unwrap();

    assert_eq!(summary.files_swept, 2);
    assert!(root.path().join("snap1.bak").exists());
    assert!(root.path().join("snap2.bak").exists());
    assert!(!root.path().join("snap3.bak").exists());
    assert!(!root.path().join("snap4.bak").exists());
}

/// Files of unrelated shapes never share a counter.
#[test]
fn distinct_shapes_do_not_interfere() {
    let root = TempDir::new().unwrap();
    write_aged(root.path(), "app001.log", 1);
    write_aged(root.path(), "app002.log", 2);
    write_aged(root.path(), "app003.log", 3);
    write_aged(root.path(), "README.txt", 30);

    let cutoff = Utc::now() - Duration::hours(1);
    let mut engine = SweepEngine::new(
        options(2, u64::MAX, cutoff),
        FsEnumerator,
        FsActionExecutor::new(false),
    );
    engine.run(root.path(), None).unwrap();

    assert!(root.path().join("app001.log").exists());
    assert!(root.path().join("app002.log").exists());
    assert!(!root.path().join("app003.log").exists());
    // single occurrence of its own shape, evaluated below min
    assert!(root.path().join("README.txt").exists());
}

#[test]
fn backup_mode_mirrors_the_swept_tree() {
    let root = TempDir::new().unwrap();
    let backup = TempDir::new().unwrap();
    let logs = root.path().join("logs/app");
    fs::create_dir_all(&logs).unwrap();
    write_aged(&logs, "app001.log", 3);
    write_aged(&logs, "app002.log", 4);
    write_aged(root.path(), "root001.tmp", 5);

    let cutoff = Utc::now() - Duration::hours(1);
    let mut engine = SweepEngine::new(
        options(0, u64::MAX, cutoff),
        FsEnumerator,
        FsActionExecutor::new(false),
    );
    let summary = engine.run(root.path(), Some(backup.path())).unwrap();

    assert_eq!(summary.files_swept, 3);
    assert!(!logs.join("app001.log").exists());
    assert!(backup.path().join("logs/app/app001.log").exists());
    assert!(backup.path().join("logs/app/app002.log").exists());
    assert!(backup.path().join("root001.tmp").exists());
}

#[test]
fn dry_run_plans_everything_and_touches_nothing() {
    let root = TempDir::new().unwrap();
    write_aged(root.path(), "old1.log", 10);
    write_aged(root.path(), "old2.log", 11);

    let cutoff = Utc::now() - Duration::hours(1);
    let mut engine = SweepEngine::new(
        options(0, u64::MAX, cutoff),
        FsEnumerator,
        PreviewExecutor::default(),
    );
    let summary = engine.run(root.path(), None).unwrap();

    assert_eq!(summary.files_swept, 2);
    assert_eq!(engine.executor().planned.len(), 2);
    assert!(root.path().join("old1.log").exists());
    assert!(root.path().join("old2.log").exists());
}

#[test]
fn config_rules_seed_the_sweep() {
    let root = TempDir::new().unwrap();
    write_aged(root.path(), "temp-01.dat", 0);
    write_aged(root.path(), "temp-02.dat", 0);
    write_aged(root.path(), "notes.txt", 0);

    let config = Config {
        rules: vec![RuleSpec {
            directory: root.path().to_path_buf(),
            pattern: r"^temp-\d{2}\.dat$".to_string(),
            min_files: 0,
            max_files: 0,
            max_age_days: None,
            seed_count: 0,
        }],
        ..Config::default()
    };

    let now = Utc::now();
    let mut engine = SweepEngine::new(
        SweepOptions {
            clean_root_folder: true,
            clean_subdirectories: true,
            low_memory_mode: false,
            defaults: config.defaults(now),
        },
        FsEnumerator,
        FsActionExecutor::new(false),
    );
    for (dir, rule) in config.compiled_rules(now).unwrap() {
        engine.add_rule(&dir, rule);
    }
    let summary = engine.run(root.path(), None).unwrap();

    assert_eq!(summary.files_swept, 2);
    assert!(!root.path().join("temp-01.dat").exists());
    assert!(!root.path().join("temp-02.dat").exists());
    assert!(root.path().join("notes.txt").exists());
}

#[test]
fn low_memory_mode_leaves_the_registry_empty() {
    let root = TempDir::new().unwrap();
    let sub = root.path().join("cache");
    fs::create_dir(&sub).unwrap();
    write_aged(&sub, "blob001.bin", 2);
    write_aged(root.path(), "root.log", 2);

    let cutoff = Utc::now() - Duration::days(365);
    let mut opts = options(0, u64::MAX, cutoff);
    opts.low_memory_mode = true;
    let mut engine = SweepEngine::new(opts, FsEnumerator, FsActionExecutor::new(false));
    engine.run(root.path(), None).unwrap();

    assert!(engine.registry().is_empty());
    assert!(sub.join("blob001.bin").exists());
    assert!(root.path().join("root.log").exists());
}
