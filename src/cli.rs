use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "dirsweep",
    about = "Rule-based file retention sweeper with filename pattern inference",
    version,
    author,
    long_about = "Dirsweep walks a directory tree newest-first and applies\n\
                  per-directory retention rules: filenames sharing a shape\n\
                  (same letter and digit runs) are grouped under one inferred\n\
                  pattern, and files are removed once they are old enough or\n\
                  once too many of the same shape have accumulated.\n\n\
                  Features:\n\
                  • Pattern inference: log001.txt and log002.txt share a rule\n\
                  • Keep-N semantics: min/max counts per pattern\n\
                  • Age cutoffs: only files past a threshold are touched\n\
                  • Backup mode: move files out instead of deleting\n\
                  • Safe: dry-run previews and OS trash support"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path (default: ~/.dirsweep.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sweep a directory tree, deleting or backing up expired files
    Sweep(SweepArgs),

    /// Show what a sweep would do without touching anything
    Preview(PreviewArgs),

    /// Show the retention rules a sweep would infer for a directory
    Rules(RulesArgs),

    /// Show configuration
    Config,
}

#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Root directory to sweep
    pub path: PathBuf,

    /// Move expired files under this directory instead of deleting
    #[arg(long)]
    pub backup: Option<PathBuf>,

    /// Send deleted files to the OS trash instead of removing them
    #[arg(long, conflicts_with = "backup")]
    pub trash: bool,

    /// Matching files that must be seen before age-based deletion applies
    #[arg(long)]
    pub min_files: Option<u64>,

    /// Delete unconditionally once this many matching files were seen
    #[arg(long)]
    pub max_files: Option<u64>,

    /// Files older than N days are eligible for deletion
    #[arg(short = 'D', long)]
    pub older_than_days: Option<i64>,

    /// Absolute age cutoff (RFC 3339), e.g. 2024-06-01T00:00:00Z
    #[arg(long, conflicts_with = "older_than_days")]
    pub oldest: Option<String>,

    /// Leave files directly under the root untouched
    #[arg(long)]
    pub no_root: bool,

    /// Leave subdirectories untouched
    #[arg(long)]
    pub no_subdirs: bool,

    /// Discard per-directory rule state as soon as a directory is done
    #[arg(long)]
    pub low_memory: bool,

    /// Dry run (show what would be done)
    #[arg(long)]
    pub dry_run: bool,

    /// Skip confirmation prompts
    #[arg(short = 'y', long)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Root directory to preview
    pub path: PathBuf,

    /// Show move destinations under this backup directory
    #[arg(long)]
    pub backup: Option<PathBuf>,

    /// Matching files that must be seen before age-based deletion applies
    #[arg(long)]
    pub min_files: Option<u64>,

    /// Delete unconditionally once this many matching files were seen
    #[arg(long)]
    pub max_files: Option<u64>,

    /// Files older than N days are eligible for deletion
    #[arg(short = 'D', long)]
    pub older_than_days: Option<i64>,

    /// Absolute age cutoff (RFC 3339)
    #[arg(long, conflicts_with = "older_than_days")]
    pub oldest: Option<String>,

    /// Leave files directly under the root untouched
    #[arg(long)]
    pub no_root: bool,

    /// Leave subdirectories untouched
    #[arg(long)]
    pub no_subdirs: bool,
}

impl PreviewArgs {
    /// A preview is a sweep forced into dry-run mode.
    pub fn into_sweep(self) -> SweepArgs {
        SweepArgs {
            path: self.path,
            backup: self.backup,
            trash: false,
            min_files: self.min_files,
            max_files: self.max_files,
            older_than_days: self.older_than_days,
            oldest: self.oldest,
            no_root: self.no_root,
            no_subdirs: self.no_subdirs,
            low_memory: false,
            dry_run: true,
            yes: true,
        }
    }
}

#[derive(Args, Debug)]
pub struct RulesArgs {
    /// Directory to analyze
    pub path: PathBuf,

    /// Also list the files behind each pattern
    #[arg(short, long)]
    pub detailed: bool,
}
