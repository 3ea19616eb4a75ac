//! Tabular codecs for the xetl trade report pipeline.
//!
//! This crate provides codecs that write and read [`Frame`](xetl_types::Frame)s:
//!
//! - [`CsvCodec`] - Delimited text format
//! - [`ParquetCodec`] - Apache Parquet columnar format

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/xetl/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod codec;
mod csv;

#[cfg(feature = "parquet")]
mod parquet;

pub use crate::csv::CsvCodec;
pub use codec::{Codec, FormatError, OutputFormat};

#[cfg(feature = "parquet")]
pub use crate::parquet::ParquetCodec;
