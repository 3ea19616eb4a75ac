//! Object store errors.

use thiserror::Error;
use xetl_types::EtlError;

/// Errors that can occur while talking to an object store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No object exists under the key.
    #[error("Object not found: {key}")]
    NotFound {
        /// The missing key.
        key: String,
    },

    /// The key cannot be mapped onto the backend.
    #[error("Invalid object key '{key}': {reason}")]
    InvalidKey {
        /// The rejected key.
        key: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Failed to read an object.
    #[error("Failed to read object '{key}': {source}")]
    Read {
        /// The key being read.
        key: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to write an object.
    #[error("Failed to write object '{key}': {source}")]
    Write {
        /// The key being written.
        key: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The storage settings cannot be turned into a store.
    #[error("Invalid storage configuration: {0}")]
    Config(String),

    /// A credential environment variable is unset or empty.
    #[error("Credential variable '{var}' is not set")]
    Credentials {
        /// Name of the environment variable.
        var: String,
    },

    /// Failed to list a prefix.
    #[error("Failed to list prefix '{prefix}': {source}")]
    List {
        /// The prefix being listed.
        prefix: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl StoreError {
    /// Returns true if the object simply does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<StoreError> for EtlError {
    fn from(e: StoreError) -> Self {
        Self::Storage(e.to_string())
    }
}
