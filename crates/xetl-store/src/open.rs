//! Stores named by the storage configuration.

use std::sync::Arc;
use xetl_types::{StorageBackend, StorageConfig};

use crate::{FileStore, ObjectStore, StoreError};

/// Which side of the pipeline a store serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreRole {
    /// Source partitions.
    Source,
    /// Reports and the watermark.
    Target,
}

/// Opens the store configured for `role`.
///
/// # Errors
///
/// Returns [`StoreError::Config`] if the backend is not configured or not
/// compiled in, and [`StoreError::Credentials`] if S3 credentials are missing.
pub fn open_store(
    storage: &StorageConfig,
    role: StoreRole,
) -> Result<Arc<dyn ObjectStore>, StoreError> {
    let store: Arc<dyn ObjectStore> = match storage.backend {
        StorageBackend::File => Arc::new(FileStore::new(match role {
            StoreRole::Source => &storage.source_root,
            StoreRole::Target => &storage.target_root,
        })),
        StorageBackend::S3 => open_s3(storage, role)?,
    };
    tracing::debug!(?role, store = %store.describe(), "store opened");
    Ok(store)
}

#[cfg(feature = "s3")]
fn open_s3(storage: &StorageConfig, role: StoreRole) -> Result<Arc<dyn ObjectStore>, StoreError> {
    let s3 = storage
        .s3
        .as_ref()
        .ok_or_else(|| StoreError::Config("the s3 backend needs a [storage.s3] table".to_string()))?;
    let bucket = match role {
        StoreRole::Source => &s3.source_bucket,
        StoreRole::Target => &s3.target_bucket,
    };
    Ok(Arc::new(crate::S3Store::from_env(s3, bucket)?))
}

#[cfg(not(feature = "s3"))]
fn open_s3(_storage: &StorageConfig, _role: StoreRole) -> Result<Arc<dyn ObjectStore>, StoreError> {
    Err(StoreError::Config(
        "the s3 backend is not compiled in (enable the `s3` feature)".to_string(),
    ))
}
