//! Incremental Xetra trade extraction and daily OHLCV reporting.
//!
//! This is a facade crate that re-exports functionality from the xetl
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use xetl_lib::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EtlConfig::from_file("config.toml".as_ref())?;
//!     let pipeline = Pipeline::from_config(config)?;
//!
//!     let plan = pipeline.plan_at(chrono::Local::now().naive_local()).await?;
//!     println!("{} partitions to read", plan.dates.len());
//!
//!     let summary = pipeline.run().await?;
//!     println!("report: {:?}", summary.report_key);
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/xetl/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use xetl_types::*;

// Re-export object stores
pub use xetl_store::{FileStore, MemoryStore, ObjectStore, StoreError, StoreRole, open_store};

#[cfg(feature = "s3")]
pub use xetl_store::S3Store;

// Re-export codecs
pub use xetl_format::{Codec, CsvCodec, FormatError, OutputFormat};

#[cfg(feature = "parquet")]
pub use xetl_format::ParquetCodec;

// Re-export watermark bookkeeping
pub use xetl_meta::{
    FetchPlan, META_PROCESS_COL, META_PROCESS_DATE_FORMAT, META_SOURCE_DATE_COL, Watermark,
    WatermarkEntry, WatermarkStore,
};

// Re-export extraction and aggregation
pub use xetl_aggregate::{DailyAggregator, DailyOhlcv, DailyReport, Trade};
pub use xetl_extract::{Extractor, PartitionBatch};

// Re-export orchestration
#[cfg(feature = "pipeline")]
pub use xetl_pipeline::{Pipeline, RunSummary};

/// Prelude module for convenient imports.
///
/// ```
/// use xetl_lib::prelude::*;
/// ```
pub mod prelude {
    pub use xetl_types::{DateRange, EtlConfig, EtlError, Frame, Result, Value};

    pub use xetl_store::{FileStore, MemoryStore, ObjectStore, StoreRole, open_store};

    pub use xetl_format::{Codec, CsvCodec, OutputFormat};

    #[cfg(feature = "parquet")]
    pub use xetl_format::ParquetCodec;

    pub use xetl_meta::{FetchPlan, WatermarkStore};

    pub use xetl_extract::Extractor;

    pub use xetl_aggregate::{DailyAggregator, DailyReport};

    #[cfg(feature = "pipeline")]
    pub use xetl_pipeline::{Pipeline, RunSummary};
}
