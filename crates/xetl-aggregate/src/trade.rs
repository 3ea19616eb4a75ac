//! Parsed trade rows.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use xetl_types::{EtlError, Frame, Result, SourceConfig, Value};

/// Accepted time-of-day layouts, tried in order.
const TIME_FORMATS: &[&str] = &["%H:%M", "%H:%M:%S", "%H:%M:%S%.f"];

/// Timestamp layouts whose date part is accepted as a trading date.
const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// One row of the source trade files.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    /// Instrument identifier.
    pub isin: String,
    /// Trading date.
    pub date: NaiveDate,
    /// Time of day.
    pub time: NaiveTime,
    /// Start price.
    pub start_price: f64,
    /// Minimum price.
    pub min_price: f64,
    /// Maximum price.
    pub max_price: f64,
    /// Traded volume.
    pub volume: f64,
}

impl Trade {
    /// Parses one frame row. Returns `None` if any field is missing or
    /// cannot be parsed.
    ///
    /// Any non-null identifier is accepted, so numeric codes such as a WKN
    /// read as an integer are kept.
    #[must_use]
    pub fn from_row(row: &[Value], columns: &TradeColumns) -> Option<Self> {
        Some(Self {
            isin: parse_identifier(&row[columns.isin])?,
            date: parse_trade_date(&row[columns.date])?,
            time: parse_time(&row[columns.time])?,
            start_price: row[columns.start_price].as_f64()?,
            min_price: row[columns.min_price].as_f64()?,
            max_price: row[columns.max_price].as_f64()?,
            volume: row[columns.volume].as_f64()?,
        })
    }
}

/// Positions of the trade fields in a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeColumns {
    isin: usize,
    date: usize,
    time: usize,
    start_price: usize,
    min_price: usize,
    max_price: usize,
    volume: usize,
}

impl TradeColumns {
    /// Looks up the configured role columns in `frame`.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::MissingColumn`] for the first role column that is
    /// not present.
    pub fn resolve(frame: &Frame, source: &SourceConfig) -> Result<Self> {
        let index = |name: &str| {
            frame
                .column_index(name)
                .ok_or_else(|| EtlError::MissingColumn(name.to_string()))
        };
        Ok(Self {
            isin: index(&source.col_isin)?,
            date: index(&source.col_date)?,
            time: index(&source.col_time)?,
            start_price: index(&source.col_start_price)?,
            min_price: index(&source.col_min_price)?,
            max_price: index(&source.col_max_price)?,
            volume: index(&source.col_traded_vol)?,
        })
    }
}

fn parse_identifier(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Text(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        other => Some(other.to_string()),
    }
}

fn parse_trade_date(value: &Value) -> Option<NaiveDate> {
    value.as_date().or_else(|| {
        let text = value.as_str()?.trim();
        TIMESTAMP_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
            .map(|timestamp| timestamp.date())
    })
}

fn parse_time(value: &Value) -> Option<NaiveTime> {
    let text = value.as_str()?.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(text, format).ok())
}
