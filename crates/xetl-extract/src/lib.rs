//! Partition extraction for the xetl trade report pipeline.
//!
//! - [`Extractor`] - Lists date partitions and loads them into one frame
//! - [`PartitionBatch`] - One decoded source object

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/xetl/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod extractor;

pub use extractor::{Extractor, PartitionBatch};
