//! Daily report rows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use xetl_types::{Frame, Result, TargetConfig, Value};

/// Rounds to two decimal places, half away from zero.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Daily summary of one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyOhlcv {
    /// Instrument identifier.
    pub isin: String,
    /// Trading date.
    pub date: NaiveDate,
    /// Opening price.
    pub open: f64,
    /// Closing price.
    pub close: f64,
    /// Lowest price of the day.
    pub min: f64,
    /// Highest price of the day.
    pub max: f64,
    /// Total traded volume.
    pub volume: f64,
    /// Change of `open` against the previous day's close, in percent.
    pub change_pct: Option<f64>,
}

impl DailyOhlcv {
    /// Returns the row with every number rounded to two decimals.
    #[must_use]
    pub fn rounded(self) -> Self {
        Self {
            open: round2(self.open),
            close: round2(self.close),
            min: round2(self.min),
            max: round2(self.max),
            volume: round2(self.volume),
            change_pct: self.change_pct.map(round2),
            ..self
        }
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.isin.clone()),
            Value::Date(self.date),
            Value::Float(self.open),
            Value::Float(self.close),
            Value::Float(self.min),
            Value::Float(self.max),
            Value::Float(self.volume),
            self.change_pct.into(),
        ]
    }
}

/// Percentage change from `previous` to `current`.
///
/// `None` when `previous` is zero or the result is not finite.
#[must_use]
pub fn change_pct(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 {
        return None;
    }
    let change = (current - previous) / previous * 100.0;
    change.is_finite().then_some(change)
}

/// The daily report, ordered by instrument then date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyReport {
    rows: Vec<DailyOhlcv>,
}

impl DailyReport {
    /// Creates a report from rows already in (instrument, date) order.
    #[must_use]
    pub const fn new(rows: Vec<DailyOhlcv>) -> Self {
        Self { rows }
    }

    /// Returns the rows.
    #[must_use]
    pub fn rows(&self) -> &[DailyOhlcv] {
        &self.rows
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the report has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Finds the row of one instrument on one date.
    #[must_use]
    pub fn get(&self, isin: &str, date: NaiveDate) -> Option<&DailyOhlcv> {
        self.rows.iter().find(|r| r.isin == isin && r.date == date)
    }

    /// Converts the report into a frame named after the target columns.
    ///
    /// # Errors
    ///
    /// Returns an error if a row cannot be added to the frame.
    pub fn to_frame(&self, target: &TargetConfig) -> Result<Frame> {
        Frame::try_new(
            target.columns(),
            self.rows.iter().map(DailyOhlcv::values).collect(),
        )
    }
}

impl IntoIterator for DailyReport {
    type Item = DailyOhlcv;
    type IntoIter = std::vec::IntoIter<DailyOhlcv>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn row() -> DailyOhlcv {
        DailyOhlcv {
            isin: "AT0000A0E9W5".to_string(),
            date: NaiveDate::from_ymd_opt(2022, 9, 17).unwrap(),
            open: 20.583,
            close: 20.583,
            min: 20.1149,
            max: 21.0051,
            volume: 1088.0,
            change_pct: Some(12.656_021),
        }
    }

    #[test]
    fn test_round2() {
        assert_relative_eq!(round2(1.005_1), 1.01);
        assert_relative_eq!(round2(-2.345_6), -2.35);
        assert_relative_eq!(round2(20.0), 20.0);
    }

    #[test]
    fn test_rounded_row() {
        let rounded = row().rounded();
        assert_relative_eq!(rounded.open, 20.58);
        assert_relative_eq!(rounded.min, 20.11);
        assert_relative_eq!(rounded.max, 21.01);
        assert_relative_eq!(rounded.change_pct.unwrap(), 12.66);
    }

    #[test]
    fn test_change_pct() {
        assert_relative_eq!(change_pct(20.58, 18.27).unwrap(), 12.643_678_160_919_54, epsilon = 1e-9);
        assert_eq!(change_pct(1.0, 0.0), None);
    }

    #[test]
    fn test_to_frame_uses_target_columns() {
        let mut first = row().rounded();
        first.change_pct = None;
        let report = DailyReport::new(vec![first, row().rounded()]);

        let frame = report.to_frame(&TargetConfig::default()).unwrap();
        assert_eq!(frame.columns(), TargetConfig::default().columns());
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.rows()[0][1], Value::Date(report.rows()[0].date));
        assert!(frame.rows()[0][7].is_null());
        assert_eq!(frame.rows()[1][7], Value::Float(12.66));
    }
}
