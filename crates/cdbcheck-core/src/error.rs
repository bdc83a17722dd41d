//! Error types for fatal conditions.
//!
//! Per-file problems are reported as [`Violation`](crate::report::Violation)s,
//! never as errors. Only configuration and root-level failures end up here.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a scan before it produces a report.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The scan root does not exist.
    #[error("CDB root not found: {}", .0.display())]
    RootNotFound(PathBuf),

    /// The scan root exists but is not a directory.
    #[error("CDB root is not a directory: {}", .0.display())]
    RootNotADirectory(PathBuf),

    /// The scan root cannot be listed (permission denied and similar).
    #[error("CDB root is unreadable: {}: {source}", .path.display())]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Errors raised while loading a reference policy.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Failed to read the policy file.
    #[error("failed to read policy file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The policy document is not valid JSON for the expected shape.
    #[error("failed to parse policy: {0}")]
    Parse(#[from] serde_json::Error),

    /// The same dataset code is declared twice.
    #[error("dataset code {0:03} is declared more than once")]
    DuplicateDataset(u16),

    /// A dataset code or component selector does not fit in three digits.
    #[error("value {value} for {field} exceeds three digits")]
    OutOfRange { field: &'static str, value: u32 },
}

/// Errors raised while opening or parsing an archive container.
///
/// The archive validator converts these into violations; callers reading
/// archives directly see them as-is.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The end-of-central-directory record could not be found or is inconsistent.
    #[error("malformed ZIP container: {0}")]
    Malformed(String),
}
