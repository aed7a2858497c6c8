use std::path::PathBuf;
use thiserror::Error;

use crate::model::Axis;
use crate::validation::ValidationReport;

/// Boxed error raised by a user-supplied predicate or merge function.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The main error type for stalgebra operations.
#[derive(Debug, Error)]
pub enum StalgebraError {
    #[error("Unknown axis '{0}' (expected one of: t, x, y)")]
    UnknownAxis(String),

    #[error("Invalid bounds on axis {axis}: lo ({lo}) is greater than hi ({hi})")]
    InvariantViolation { axis: Axis, lo: f64, hi: f64 },

    #[error("Predicate failed: {0}")]
    PredicateFailure(#[source] BoxError),

    #[error("Merge operation failed: {0}")]
    MergeFailure(#[source] BoxError),

    #[error("Key mismatch: {0}")]
    KeyMismatch(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse detection JSON from {path}: {source}")]
    JsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write JSON to {path}: {source}")]
    JsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse detection CSV from {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to write CSV to {path}: {source}")]
    CsvWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Validation failed with {error_count} error(s) and {warning_count} warning(s)")]
    ValidationFailed {
        error_count: usize,
        warning_count: usize,
        report: ValidationReport,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(String),

    #[error("All {failed} task(s) failed")]
    AllTasksFailed { failed: usize },
}

impl StalgebraError {
    /// Wraps an arbitrary error raised inside a predicate.
    pub fn predicate<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        StalgebraError::PredicateFailure(err.into())
    }

    /// Wraps an arbitrary error raised inside a merge function.
    pub fn merge<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        StalgebraError::MergeFailure(err.into())
    }
}
