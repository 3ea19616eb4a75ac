//! Daily OHLCV aggregation for the xetl trade report pipeline.
//!
//! - [`Trade`] - One parsed trade row
//! - [`DailyAggregator`] - Batch-to-report transform
//! - [`DailyOhlcv`] - One report row
//! - [`DailyReport`] - Report rows in (instrument, date) order

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/xetl/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod aggregator;
mod daily;
mod trade;

pub use aggregator::DailyAggregator;
pub use daily::{DailyOhlcv, DailyReport, change_pct, round2};
pub use trade::{Trade, TradeColumns};
