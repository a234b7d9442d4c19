use std::path::Path;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::colors;
use crate::error::SweepError;
use crate::fsio::FileEntry;
use crate::sweep::SweepSummary;

/// Receives sweep progress events. Console output is a collaborator of the
/// engine, so embedders can swap it out or silence it entirely.
pub trait SweepReporter {
    fn sweep_started(&mut self, _root: &Path, _directory_count: usize) {}
    fn directory_started(&mut self, _dir: &Path) {}
    fn file_swept(&mut self, _file: &FileEntry, _dest_dir: Option<&Path>) {}
    fn action_failed(&mut self, _path: &Path, _error: &SweepError) {}
    fn sweep_finished(&mut self, _summary: &SweepSummary) {}
}

/// Ignores every event. The default for library embedding and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl SweepReporter for SilentReporter {}

/// Renders sweep progress to the terminal.
pub struct ConsoleReporter {
    verbose: bool,
    dry_run: bool,
    progress: Option<ProgressBar>,
}

impl ConsoleReporter {
    pub fn new(verbose: bool, dry_run: bool) -> Self {
        Self {
            verbose,
            dry_run,
            progress: None,
        }
    }

    fn verb(&self, moved: bool) -> &'static str {
        match (self.dry_run, moved) {
            (true, true) => "would move",
            (true, false) => "would remove",
            (false, true) => "moved",
            (false, false) => "removed",
        }
    }

    fn println(&self, line: String) {
        match &self.progress {
            Some(pb) => pb.println(line),
            None => println!("{}", line),
        }
    }
}

impl SweepReporter for ConsoleReporter {
    fn sweep_started(&mut self, root: &Path, directory_count: usize) {
        println!("{} {}", "🧹 Sweeping:".color(colors::HEADER), root.display());
        if self.dry_run {
            println!("{} DRY RUN: no files will be modified", "🌵".yellow());
        }

        if !self.verbose && directory_count > 1 {
            let pb = ProgressBar::new(directory_count as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} directories {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            self.progress = Some(pb);
        }
    }

    fn directory_started(&mut self, dir: &Path) {
        match &self.progress {
            Some(pb) => {
                pb.inc(1);
                pb.set_message(dir.display().to_string());
            }
            None => println!("{}", dir.display().to_string().color(colors::PATH)),
        }
    }

    fn file_swept(&mut self, file: &FileEntry, dest_dir: Option<&Path>) {
        if !(self.verbose || self.dry_run) {
            return;
        }

        let line = match dest_dir {
            Some(dest) => format!(
                "  {} {} -> {}",
                self.verb(true).color(colors::WARNING),
                file.path.display(),
                dest.display()
            ),
            None => format!(
                "  {} {}",
                self.verb(false).color(colors::WARNING),
                file.path.display()
            ),
        };
        self.println(line);
    }

    fn action_failed(&mut self, path: &Path, error: &SweepError) {
        self.println(format!("{} {}: {}", "⚠️".yellow(), path.display(), error));
    }

    fn sweep_finished(&mut self, summary: &SweepSummary) {
        if let Some(pb) = self.progress.take() {
            pb.finish_and_clear();
        }

        println!();
        println!("{}", "📊 SWEEP RESULTS".bold().color(colors::HEADER));
        println!("{}", "─".repeat(50).color(colors::PATH));
        println!(
            "📁 Directories processed: {}",
            summary.directories_processed.to_string().color(colors::SUCCESS)
        );
        println!(
            "🔍 Files examined: {}",
            summary.files_examined.to_string().color(colors::SUCCESS)
        );
        let swept = if self.dry_run {
            format!("{} (dry run)", summary.files_swept)
        } else {
            summary.files_swept.to_string()
        };
        println!("🧹 Files swept: {}", swept.color(colors::WARNING));

        if !summary.failures.is_empty() {
            println!(
                "⚠️  Failures: {}",
                summary.failures.len().to_string().color(colors::DANGER)
            );
            for failure in &summary.failures {
                println!("   - {}: {}", failure.path.display(), failure.error);
            }
        }
    }
}
