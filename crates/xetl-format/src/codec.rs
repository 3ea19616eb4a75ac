//! Codec abstraction.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use xetl_types::{EtlError, Frame};

/// Serialization format identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// Delimited text.
    #[default]
    Csv,
    /// Apache Parquet.
    Parquet,
}

impl OutputFormat {
    /// Returns the file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Parquet => "parquet",
        }
    }

    /// Returns all available formats.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Csv, Self::Parquet]
    }

    /// Builds a codec for this format. `delimiter` only applies to CSV.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::Unsupported`] if the format was not compiled in.
    pub fn codec(&self, delimiter: u8) -> Result<Box<dyn Codec>, FormatError> {
        match self {
            Self::Csv => Ok(Box::new(crate::CsvCodec::new().with_delimiter(delimiter))),
            #[cfg(feature = "parquet")]
            Self::Parquet => Ok(Box::new(crate::ParquetCodec::new())),
            #[cfg(not(feature = "parquet"))]
            Self::Parquet => Err(FormatError::Unsupported("parquet".to_string())),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "parquet" | "pq" => Ok(Self::Parquet),
            _ => Err(FormatError::UnknownFormat(s.to_string())),
        }
    }
}

/// Errors that can occur while encoding or decoding tables.
#[derive(Error, Debug)]
pub enum FormatError {
    /// Unknown format name.
    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    /// Format known but not compiled in.
    #[error("Format not supported by this build: {0}")]
    Unsupported(String),

    /// Malformed delimited text.
    #[error("CSV error: {0}")]
    Csv(#[from] csv_async::Error),

    /// Bytes decoded but do not form a table.
    #[error("Malformed table: {0}")]
    Malformed(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow/Parquet error.
    #[error("Parquet error: {0}")]
    Parquet(String),
}

impl From<FormatError> for EtlError {
    fn from(e: FormatError) -> Self {
        Self::Format(e.to_string())
    }
}

/// Converts frames to and from a byte representation.
#[async_trait]
pub trait Codec: std::fmt::Debug + Send + Sync {
    /// Serializes a frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be represented in this format.
    async fn encode(&self, frame: &Frame) -> Result<Bytes, FormatError>;

    /// Deserializes a frame.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` is not valid for this format.
    async fn decode(&self, data: &[u8]) -> Result<Frame, FormatError>;

    /// Returns the format this codec implements.
    fn format(&self) -> OutputFormat;
}
