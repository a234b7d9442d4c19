use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SweepError>;

#[derive(Debug, Error)]
pub enum SweepError {
    /// An inferred pattern failed to compile. Should not happen with a
    /// well-behaved inference strategy, so it is surfaced rather than
    /// swallowed.
    #[error("inferred pattern {pattern:?} does not compile: {source}")]
    PatternCompile {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A delete or move failed for one file. Non-fatal: the sweep records
    /// it and moves on.
    #[error("could not {action} {}: {source}", .path.display())]
    FileAction {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not read directory {}: {source}", .path.display())]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Invalid configuration. Fatal before any file is touched.
    #[error("configuration error: {0}")]
    Configuration(String),
}
