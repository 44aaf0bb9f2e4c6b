use ace_analysis::CopyLabel;
use ace_library::StoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Session failures. None of these are fatal; each degrades to a notice or placeholder.
#[derive(Error, Debug)]
pub enum CompareError {
    #[error("Cannot compare {path}: {reason}")]
    InvalidSource { path: PathBuf, reason: String },
    #[error("Failed to create scratch copies: {0}")]
    CopyFailure(#[from] StoreError),
    #[error("Copy {label} unavailable: {reason}")]
    DecodeFailure { label: CopyLabel, reason: String },
    #[error("Discarded stale decode result for copy {label}")]
    StaleCallback { label: CopyLabel },
}
