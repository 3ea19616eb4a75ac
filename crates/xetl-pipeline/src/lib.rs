//! Run orchestration for the xetl trade report pipeline.
//!
//! - [`Pipeline`] - Plan, extract, aggregate, write the report, record the watermark
//! - [`RunSummary`] - What a successful run did

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/xetl/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod pipeline;

pub use pipeline::{Pipeline, RunSummary};
