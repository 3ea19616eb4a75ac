//! Object store abstraction for the xetl trade report pipeline.
//!
//! - [`ObjectStore`] - Prefix listing, get and put over string keys
//! - [`MemoryStore`] - In-process store
//! - [`FileStore`] - Local directory used as a bucket
//! - [`S3Store`] - Bucket of an S3-compatible service (`s3` feature)
//! - [`open_store`] - The store selected by a [`StorageConfig`](xetl_types::StorageConfig)
//! - [`StoreError`] - Store failures, with [`StoreError::NotFound`] kept distinct

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/xetl/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod file;
mod memory;
mod open;
mod store;

#[cfg(feature = "s3")]
mod s3;

pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use open::{StoreRole, open_store};
pub use store::ObjectStore;

#[cfg(feature = "s3")]
pub use s3::S3Store;
