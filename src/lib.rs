//! Dirsweep - rule-based file retention sweeps with pattern inference

pub mod cli;
pub mod config;
pub mod decision;
pub mod error;
pub mod fsio;
pub mod pattern;
pub mod report;
pub mod rules;
pub mod sweep;

// Re-exports for easy access
pub use cli::{Cli, Commands};
pub use config::{Config, RuleSpec};
pub use decision::should_delete;
pub use error::{Result, SweepError};
pub use fsio::{
    DirectoryEnumerator, FileActionExecutor, FileEntry, FsActionExecutor, FsEnumerator,
    PlannedAction, PreviewExecutor,
};
pub use pattern::{PatternInference, RunLengthInference};
pub use report::{ConsoleReporter, SilentReporter, SweepReporter};
pub use rules::{RetentionRule, RuleDefaults, RuleRegistry};
pub use sweep::{SweepEngine, SweepFailure, SweepOptions, SweepSummary};

// Export all constants
pub mod colors {
    use colored::Color;

    pub const HEADER: Color = Color::TrueColor { r: 157, g: 77, b: 255 };
    pub const PATH: Color = Color::TrueColor { r: 77, g: 195, b: 255 };
    pub const SUCCESS: Color = Color::TrueColor { r: 77, g: 255, b: 157 };
    pub const WARNING: Color = Color::TrueColor { r: 255, g: 217, b: 61 };
    pub const DANGER: Color = Color::TrueColor { r: 255, g: 107, b: 107 };
}

/// Current version of Dirsweep
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default thresholds for inferred rules
pub const DEFAULT_MIN_FILES: u64 = 0;
pub const DEFAULT_MAX_FILES: u64 = u64::MAX;
