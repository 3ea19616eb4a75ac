//! Core types for the xetl trade report pipeline.
//!
//! This crate provides the fundamental data structures used throughout xetl:
//!
//! - [`Frame`] - An in-memory table of named columns and [`Value`] rows
//! - [`DateRange`] - Inclusive calendar date range with day iteration
//! - [`EtlConfig`] - Source, target, meta, storage and logging configuration
//! - [`StorageConfig`] - Directory or S3 bucket locations
//! - [`EtlError`] - Error type shared by the pipeline stages

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/xetl/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod date_range;
mod error;
mod frame;

pub use config::{
    EtlConfig, LoggingConfig, MetaConfig, S3Config, SourceConfig, StorageBackend, StorageConfig,
    TargetConfig,
};
pub use date_range::{DATE_FORMAT, DateIterator, DateRange, parse_date};
pub use error::{DateRangeError, EtlError, Result};
pub use frame::{Frame, Value};
