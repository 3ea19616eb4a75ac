//! Trade batch to daily report transform.

use chrono::{NaiveDate, NaiveTime};
use std::collections::BTreeMap;
use xetl_types::{Frame, Result, SourceConfig};

use crate::daily::change_pct;
use crate::{DailyOhlcv, DailyReport, Trade, TradeColumns};

/// Aggregates trade batches into daily reports.
#[derive(Debug, Clone)]
pub struct DailyAggregator {
    source: SourceConfig,
}

impl DailyAggregator {
    /// Creates an aggregator reading the columns named in `source`.
    #[must_use]
    pub const fn new(source: SourceConfig) -> Self {
        Self { source }
    }

    /// Parses the configured columns of `batch` into trades.
    ///
    /// Rows with a missing or unparseable value are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`xetl_types::EtlError::MissingColumn`] if a configured
    /// column is not in the batch.
    pub fn trades(&self, batch: &Frame) -> Result<Vec<Trade>> {
        let projected = batch.project(&self.source.columns)?.drop_nulls();
        let columns = TradeColumns::resolve(&projected, &self.source)?;

        let trades: Vec<Trade> = projected
            .rows()
            .iter()
            .filter_map(|row| Trade::from_row(row, &columns))
            .collect();

        let dropped = batch.len() - trades.len();
        if dropped > 0 {
            tracing::debug!(dropped, kept = trades.len(), "rows dropped");
        }
        Ok(trades)
    }

    /// Builds the daily report of `batch`, keeping dates from
    /// `effective_start` on.
    ///
    /// Earlier dates in the batch only seed the previous close of the first
    /// reported day.
    ///
    /// # Errors
    ///
    /// Returns [`xetl_types::EtlError::MissingColumn`] if a configured
    /// column is not in a non-empty batch.
    pub fn transform(&self, batch: &Frame, effective_start: NaiveDate) -> Result<DailyReport> {
        if batch.is_empty() {
            tracing::info!("empty batch, nothing to aggregate");
            return Ok(DailyReport::default());
        }

        let trades = self.trades(batch)?;
        let report = Self::aggregate(trades, effective_start);

        if report.is_empty() {
            tracing::info!(%effective_start, "empty report");
        } else {
            tracing::info!(rows = report.len(), %effective_start, "report built");
        }
        Ok(report)
    }

    /// Groups trades by (instrument, date), computes the change against the
    /// previous day, rounds and filters.
    #[must_use]
    pub fn aggregate(
        trades: impl IntoIterator<Item = Trade>,
        effective_start: NaiveDate,
    ) -> DailyReport {
        let mut groups: BTreeMap<(String, NaiveDate), DailyBuilder> = BTreeMap::new();
        for trade in trades {
            let key = (trade.isin.clone(), trade.date);
            match groups.get_mut(&key) {
                Some(builder) => builder.update(&trade),
                None => {
                    groups.insert(key, DailyBuilder::new(&trade));
                }
            }
        }

        let mut rows = Vec::with_capacity(groups.len());
        let mut previous: Option<(String, f64)> = None;
        for ((isin, date), builder) in groups {
            let prev_close = previous
                .as_ref()
                .filter(|(prev_isin, _)| *prev_isin == isin)
                .map(|(_, close)| *close);

            let row = builder.finish(isin, date, prev_close);
            previous = Some((row.isin.clone(), row.close));
            rows.push(row.rounded());
        }

        rows.retain(|row| row.date >= effective_start);
        DailyReport::new(rows)
    }
}

/// Running summary of one (instrument, date) group.
///
/// The opening price is the start price of the latest trade by time of day;
/// equal times resolve to the one seen last. The closing price is reduced
/// from the same per-trade value, so it equals the opening price.
#[derive(Debug)]
struct DailyBuilder {
    latest_time: NaiveTime,
    open: f64,
    min: f64,
    max: f64,
    volume: f64,
}

impl DailyBuilder {
    const fn new(trade: &Trade) -> Self {
        Self {
            latest_time: trade.time,
            open: trade.start_price,
            min: trade.min_price,
            max: trade.max_price,
            volume: trade.volume,
        }
    }

    fn update(&mut self, trade: &Trade) {
        if trade.time >= self.latest_time {
            self.latest_time = trade.time;
            self.open = trade.start_price;
        }
        self.min = self.min.min(trade.min_price);
        self.max = self.max.max(trade.max_price);
        self.volume += trade.volume;
    }

    fn finish(self, isin: String, date: NaiveDate, prev_close: Option<f64>) -> DailyOhlcv {
        DailyOhlcv {
            isin,
            date,
            open: self.open,
            close: self.open,
            min: self.min,
            max: self.max,
            volume: self.volume,
            change_pct: prev_close.and_then(|prev| change_pct(self.open, prev)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use xetl_types::{EtlError, Value};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 9, d).unwrap()
    }

    fn trade_row(
        isin: &str,
        day: u32,
        time: &str,
        start: f64,
        min: f64,
        max: f64,
        vol: i64,
    ) -> Vec<Value> {
        vec![
            isin.into(),
            "SANT".into(),
            date(day).to_string().into(),
            time.into(),
            start.into(),
            start.into(),
            min.into(),
            max.into(),
            vol.into(),
        ]
    }

    fn batch(rows: Vec<Vec<Value>>) -> Frame {
        Frame::try_new(SourceConfig::default().columns, rows).unwrap()
    }

    fn aggregator() -> DailyAggregator {
        DailyAggregator::new(SourceConfig::default())
    }

    fn sample() -> Frame {
        batch(vec![
            trade_row("AT0000A0E9W5", 15, "15:00", 19.70, 19.60, 19.80, 100),
            trade_row("AT0000A0E9W5", 15, "16:00", 19.78, 19.70, 19.90, 150),
            trade_row("AT0000A0E9W5", 16, "13:00", 20.21, 18.21, 20.42, 633),
            trade_row("AT0000A0E9W5", 16, "14:00", 18.27, 18.27, 21.34, 455),
            trade_row("AT0000A0E9W5", 17, "08:00", 20.11, 19.90, 20.61, 10_000),
            trade_row("AT0000A0E9W5", 17, "07:00", 20.58, 20.10, 20.70, 286),
            trade_row("DE0005772206", 16, "09:00", 0.0, 0.0, 0.0, 5),
            trade_row("DE0005772206", 17, "09:00", 7.5, 7.5, 7.5, 5),
        ])
    }

    #[test]
    fn test_one_row_per_instrument_day() {
        let report = aggregator().transform(&sample(), date(15)).unwrap();

        assert_eq!(report.len(), 5);
        let mut keys: Vec<_> = report.rows().iter().map(|r| (r.isin.as_str(), r.date)).collect();
        keys.dedup();
        assert_eq!(keys.len(), 5);
    }

    #[test]
    fn test_opening_is_start_price_of_latest_trade() {
        let report = aggregator().transform(&sample(), date(15)).unwrap();

        let day16 = report.get("AT0000A0E9W5", date(16)).unwrap();
        assert_relative_eq!(day16.open, 18.27);
        assert_relative_eq!(day16.close, 18.27);
        assert_relative_eq!(day16.min, 18.21);
        assert_relative_eq!(day16.max, 21.34);
        assert_relative_eq!(day16.volume, 1088.0);

        // Rows out of time order within a day.
        let day17 = report.get("AT0000A0E9W5", date(17)).unwrap();
        assert_relative_eq!(day17.open, 20.11);
        assert_relative_eq!(day17.volume, 10_286.0);
    }

    #[test]
    fn test_equal_times_keep_last_seen() {
        let frame = batch(vec![
            trade_row("X", 16, "10:00", 1.0, 1.0, 1.0, 1),
            trade_row("X", 16, "10:00", 2.0, 1.0, 2.0, 1),
            trade_row("X", 16, "09:00", 3.0, 1.0, 3.0, 1),
        ]);
        let report = aggregator().transform(&frame, date(16)).unwrap();
        assert_relative_eq!(report.rows()[0].open, 2.0);
    }

    #[test]
    fn test_change_against_previous_day() {
        let report = aggregator().transform(&sample(), date(15)).unwrap();

        assert_eq!(report.get("AT0000A0E9W5", date(15)).unwrap().change_pct, None);
        let day16 = report.get("AT0000A0E9W5", date(16)).unwrap();
        // (18.27 - 19.78) / 19.78 * 100
        assert_relative_eq!(day16.change_pct.unwrap(), -7.63);
        let day17 = report.get("AT0000A0E9W5", date(17)).unwrap();
        // (20.11 - 18.27) / 18.27 * 100
        assert_relative_eq!(day17.change_pct.unwrap(), 10.07);
    }

    #[test]
    fn test_change_does_not_cross_instruments() {
        let report = aggregator().transform(&sample(), date(15)).unwrap();
        assert_eq!(report.get("DE0005772206", date(16)).unwrap().change_pct, None);
    }

    #[test]
    fn test_zero_previous_close_gives_null_change() {
        let report = aggregator().transform(&sample(), date(15)).unwrap();
        assert_eq!(report.get("DE0005772206", date(17)).unwrap().change_pct, None);
    }

    #[test]
    fn test_lookback_day_is_filtered_after_change() {
        let report = aggregator().transform(&sample(), date(16)).unwrap();

        assert!(report.get("AT0000A0E9W5", date(15)).is_none());
        let day16 = report.get("AT0000A0E9W5", date(16)).unwrap();
        assert_relative_eq!(day16.change_pct.unwrap(), -7.63);
    }

    #[test]
    fn test_far_future_start_gives_empty_report() {
        let report = aggregator().transform(&sample(), NaiveDate::MAX).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn test_values_are_rounded() {
        let frame = batch(vec![
            trade_row("X", 15, "10:00", 1.0, 0.994_9, 1.234_5, 1),
            trade_row("X", 16, "10:00", 1.123_456, 1.0, 1.2, 1),
        ]);
        let report = aggregator().transform(&frame, date(15)).unwrap();

        for row in report.rows() {
            for value in [row.open, row.close, row.min, row.max, row.volume]
                .into_iter()
                .chain(row.change_pct)
            {
                assert_relative_eq!(value, (value * 100.0).round() / 100.0);
            }
        }
        // Change is computed before rounding: 12.3456%.
        assert_relative_eq!(report.rows()[1].change_pct.unwrap(), 12.35);
    }

    #[test]
    fn test_rows_with_missing_or_bad_values_are_dropped() {
        let mut missing = trade_row("X", 16, "11:00", 9.0, 9.0, 9.0, 1);
        missing[8] = Value::Null;
        let mut bad_time = trade_row("X", 16, "12:00", 8.0, 8.0, 8.0, 1);
        bad_time[3] = "noon".into();

        let frame = batch(vec![trade_row("X", 16, "10:00", 1.0, 1.0, 1.0, 1), missing, bad_time]);
        let report = aggregator().transform(&frame, date(16)).unwrap();

        assert_eq!(report.len(), 1);
        assert_relative_eq!(report.rows()[0].open, 1.0);
        assert_relative_eq!(report.rows()[0].volume, 1.0);
    }

    #[test]
    fn test_null_in_unconfigured_column_is_ignored() {
        let mut frame = sample();
        frame.concat(
            Frame::try_new(["Note"], vec![vec!["late print".into()]]).unwrap(),
        );
        // The appended row has nulls in every configured column and is dropped;
        // the original rows have a null Note but keep their values.
        let report = aggregator().transform(&frame, date(15)).unwrap();
        assert_eq!(report.len(), 5);
    }

    #[test]
    fn test_empty_batch() {
        let report = aggregator().transform(&Frame::default(), date(15)).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn test_missing_configured_column() {
        let frame = Frame::try_new(["ISIN"], vec![vec!["X".into()]]).unwrap();
        let err = aggregator().transform(&frame, date(15)).unwrap_err();
        assert!(matches!(err, EtlError::MissingColumn(_)));
    }
}
