//! Synthetic Xetra trade data for benchmarks.

use bytes::Bytes;
use chrono::{Days, NaiveDate, NaiveTime, TimeDelta};
use xetl_lib::{Frame, MemoryStore, ObjectStore, SourceConfig, Value};

/// Shape of a synthetic data set.
#[derive(Debug, Clone, Copy)]
pub struct BenchmarkConfig {
    /// Number of distinct instruments.
    pub instruments: usize,
    /// Number of trading days, starting at [`BenchmarkConfig::first_date`].
    pub days: u64,
    /// Trades per instrument per day.
    pub trades_per_day: usize,
}

impl BenchmarkConfig {
    /// First trading day of every data set.
    #[must_use]
    pub fn first_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 9, 12).unwrap_or_default()
    }

    /// Total number of trade rows.
    #[must_use]
    pub const fn rows(&self) -> u64 {
        self.instruments as u64 * self.days * self.trades_per_day as u64
    }

    /// Dates covered by the data set.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..self.days).filter_map(|offset| Self::first_date().checked_add_days(Days::new(offset)))
    }
}

fn isin(index: usize) -> String {
    format!("DE{index:010}")
}

fn trade_row(instrument: usize, date: NaiveDate, trade: usize) -> Vec<Value> {
    let open = NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default();
    let time = open + TimeDelta::seconds(i64::try_from(trade).unwrap_or(0) * 7 % 30_600);
    // Deterministic price walk per instrument.
    let price = 20.0 + (instrument % 50) as f64 + ((trade * 31 + instrument) % 200) as f64 / 100.0;
    vec![
        isin(instrument).into(),
        "SYN".into(),
        date.to_string().into(),
        time.format("%H:%M:%S").to_string().into(),
        price.into(),
        (price + 0.01).into(),
        (price - 0.05).into(),
        (price + 0.05).into(),
        i64::try_from(trade % 1_000 + 1).unwrap_or(1).into(),
    ]
}

/// Builds an in-memory trade batch.
#[must_use]
pub fn synthetic_batch(config: &BenchmarkConfig) -> Frame {
    let mut frame = Frame::new(SourceConfig::default().columns);
    for date in config.dates() {
        for instrument in 0..config.instruments {
            for trade in 0..config.trades_per_day {
                frame
                    .push_row(trade_row(instrument, date, trade))
                    .expect("row width matches the source columns");
            }
        }
    }
    frame
}

/// Writes one CSV object per date to a fresh [`MemoryStore`].
pub async fn synthetic_store(config: &BenchmarkConfig) -> MemoryStore {
    let store = MemoryStore::new();
    let columns = SourceConfig::default().columns;
    for date in config.dates() {
        let mut body = columns.join(",");
        body.push('\n');
        for instrument in 0..config.instruments {
            for trade in 0..config.trades_per_day {
                let row: Vec<String> = trade_row(instrument, date, trade)
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                body.push_str(&row.join(","));
                body.push('\n');
            }
        }
        let key = format!("{date}/{date}_BINS_XETR.csv");
        store
            .put(&key, Bytes::from(body))
            .await
            .expect("memory store accepts writes");
    }
    store
}
