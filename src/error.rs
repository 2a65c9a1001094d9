//! Error taxonomy for the snapshot pipeline.
//!
//! Only the two directory-level conditions propagate past the pipeline
//! boundary; everything below them degrades to a [`LoadWarning`] so one bad
//! snapshot never costs the rest of the batch.

use std::path::PathBuf;
use thiserror::Error;

/// Conditions a caller must be able to tell apart when loading a snapshot
/// directory.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The input root itself is missing.
    #[error("snapshot directory not found: {0:?}")]
    DirectoryNotFound(PathBuf),

    /// The root exists but nothing matched the filename filter.
    #[error("no files matching `{pattern}` under {dir:?}")]
    NoDataFound { dir: PathBuf, pattern: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScanError {
    /// True for the "no history to analyze" states a presentation layer
    /// renders as an empty view instead of a failure.
    pub fn is_no_data(&self) -> bool {
        matches!(
            self,
            ScanError::DirectoryNotFound(_) | ScanError::NoDataFound { .. }
        )
    }
}

/// Per-file conditions recorded while loading a batch. Each one is skipped,
/// logged at warn level, and carried in the batch result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// The filename's date token matched neither `YYYYMMDD` nor `YYYYMM`,
    /// or a release filename did not carry `<month>_<year>`.
    #[error("unparseable filename: {file}")]
    UnparseableFilename { file: String },

    /// The file exists but its content failed to parse.
    #[error("malformed snapshot {file}: {reason}")]
    MalformedSnapshot { file: String, reason: String },
}
