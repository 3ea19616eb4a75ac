//! Watermark bookkeeping for the xetl trade report pipeline.
//!
//! - [`Watermark`] - Parsed watermark rows
//! - [`WatermarkStore`] - Read, validate, merge and append against an object store
//! - [`FetchPlan`] - Partitions to read and the first date to report

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/xetl/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod plan;
mod store;
mod watermark;

pub use plan::FetchPlan;
pub use store::WatermarkStore;
pub use watermark::{
    META_PROCESS_COL, META_PROCESS_DATE_FORMAT, META_SOURCE_DATE_COL, Watermark, WatermarkEntry,
};
