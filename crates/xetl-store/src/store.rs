//! The object store contract.

use async_trait::async_trait;
use bytes::Bytes;

use crate::StoreError;

/// A key-value blob store with prefix listing.
///
/// Keys are `/`-separated strings. `put` overwrites. There is no conditional
/// write: two writers racing on one key both succeed and the last one wins.
/// A compare-and-swap `put` is where atomic read-modify-write would plug in.
#[async_trait]
pub trait ObjectStore: std::fmt::Debug + Send + Sync {
    /// Lists the keys starting with `prefix`, in lexicographic order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be listed.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Reads a whole object.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no object exists under `key`.
    async fn get(&self, key: &str) -> Result<Bytes, StoreError>;

    /// Writes a whole object, replacing any previous content.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] if the object cannot be stored.
    async fn put(&self, key: &str, body: Bytes) -> Result<(), StoreError>;

    /// Short description of the backend for log lines.
    fn describe(&self) -> String;
}
