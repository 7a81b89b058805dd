//! Error taxonomy for mutation trials.
//!
//! Per-mutant failures (`TargetNotFound`) are caught at the trial boundary
//! and turned into a trial status. Structural failures (`Parse`,
//! `RestoreFailure`) propagate and end the run.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MutationError {
    /// Source could not be parsed into a syntax tree.
    #[error("failed to parse {}: {reason}", file.display())]
    Parse { file: PathBuf, reason: String },

    /// Apply-mode traversal found no node at the requested location.
    /// Discovery and apply disagree; fails the single trial only.
    #[error("mutation target not found at {}:{line}:{column}", file.display())]
    TargetNotFound {
        file: PathBuf,
        line: usize,
        column: usize,
    },

    /// Original source could not be written back after a trial. The user's
    /// tree is corrupt until the backup is restored; halt the run.
    #[error("failed to restore original source {}: {source}", file.display())]
    RestoreFailure {
        file: PathBuf,
        source: std::io::Error,
    },

    #[error("{context} {}: {source}", file.display())]
    Io {
        file: PathBuf,
        context: &'static str,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, MutationError>;
