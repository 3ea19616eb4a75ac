//! Error types for xetl.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias for xetl operations.
pub type Result<T> = std::result::Result<T, EtlError>;

/// Errors that can abort a pipeline run.
///
/// Every variant is fatal: the stage that raises it stops the run before the
/// watermark is touched, so the next run retries the same partitions.
#[derive(Error, Debug)]
pub enum EtlError {
    /// The persisted watermark does not have the expected schema or content.
    #[error("Corrupt watermark '{key}': {reason}")]
    CorruptWatermark {
        /// Key of the watermark object.
        key: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A listed source object could not be read or decoded.
    #[error("Extraction failed for '{key}': {reason}")]
    ExtractionFailure {
        /// Key of the source object.
        key: String,
        /// Underlying failure.
        reason: String,
    },

    /// Unsupported serialization format or malformed bytes.
    #[error("Format error: {0}")]
    Format(String),

    /// Object store failure outside of the cases above.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A configured source column is not present in the extracted batch.
    #[error("Missing column in source batch: {0}")]
    MissingColumn(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl EtlError {
    /// Returns true if this error is a corrupt watermark.
    #[must_use]
    pub const fn is_corrupt_watermark(&self) -> bool {
        matches!(self, Self::CorruptWatermark { .. })
    }
}

/// Error for invalid date ranges.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateRangeError {
    /// Start date is after end date.
    #[error("Invalid date range: {start} > {end}")]
    InvalidRange {
        /// The start date.
        start: NaiveDate,
        /// The end date.
        end: NaiveDate,
    },
}
