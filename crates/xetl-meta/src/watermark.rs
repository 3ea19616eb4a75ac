//! Watermark rows.

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeSet;
use xetl_types::{EtlError, Frame, Result, Value};

/// Column holding the processed partition date.
pub const META_SOURCE_DATE_COL: &str = "source_date";

/// Column holding the time the partition was recorded.
pub const META_PROCESS_COL: &str = "datetime_of_processing";

/// Text format of [`META_PROCESS_COL`].
pub const META_PROCESS_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One processed partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatermarkEntry {
    /// The partition date that was processed.
    pub source_date: NaiveDate,
    /// When it was recorded.
    pub processed_at: NaiveDateTime,
}

/// Parsed watermark rows, in stored order. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Watermark {
    entries: Vec<WatermarkEntry>,
}

impl Watermark {
    /// Builds one row per date, all stamped with `processed_at`.
    #[must_use]
    pub fn new_rows(
        dates: impl IntoIterator<Item = NaiveDate>,
        processed_at: NaiveDateTime,
    ) -> Self {
        Self {
            entries: dates
                .into_iter()
                .map(|source_date| WatermarkEntry {
                    source_date,
                    processed_at,
                })
                .collect(),
        }
    }

    /// Returns an empty frame with the watermark columns.
    #[must_use]
    pub fn empty_frame() -> Frame {
        Frame::new([META_SOURCE_DATE_COL, META_PROCESS_COL])
    }

    /// Parses a frame that already passed schema validation.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::CorruptWatermark`] if a column is missing or a
    /// cell cannot be parsed.
    pub fn from_frame(frame: &Frame, key: &str) -> Result<Self> {
        let corrupt = |reason: String| EtlError::CorruptWatermark {
            key: key.to_string(),
            reason,
        };

        let date_idx = frame
            .column_index(META_SOURCE_DATE_COL)
            .ok_or_else(|| corrupt(format!("missing column '{META_SOURCE_DATE_COL}'")))?;
        let processed_idx = frame
            .column_index(META_PROCESS_COL)
            .ok_or_else(|| corrupt(format!("missing column '{META_PROCESS_COL}'")))?;

        let entries = frame
            .rows()
            .iter()
            .enumerate()
            .map(|(line, row)| -> Result<WatermarkEntry> {
                let source_date = row[date_idx].as_date().ok_or_else(|| {
                    corrupt(format!("row {line}: invalid source date '{}'", row[date_idx]))
                })?;
                let processed_at = parse_processed_at(&row[processed_idx]).ok_or_else(|| {
                    corrupt(format!(
                        "row {line}: invalid processing time '{}'",
                        row[processed_idx]
                    ))
                })?;
                Ok(WatermarkEntry {
                    source_date,
                    processed_at,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { entries })
    }

    /// Converts the rows into a frame with the persisted column layout.
    ///
    /// # Errors
    ///
    /// Returns an error if a row cannot be added to the frame.
    pub fn to_frame(&self) -> Result<Frame> {
        let rows = self
            .entries
            .iter()
            .map(|entry| {
                vec![
                    Value::Date(entry.source_date),
                    Value::Text(
                        entry
                            .processed_at
                            .format(META_PROCESS_DATE_FORMAT)
                            .to_string(),
                    ),
                ]
            })
            .collect();
        Frame::try_new([META_SOURCE_DATE_COL, META_PROCESS_COL], rows)
    }

    /// Returns the rows.
    #[must_use]
    pub fn entries(&self) -> &[WatermarkEntry] {
        &self.entries
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the distinct processed dates.
    #[must_use]
    pub fn processed_dates(&self) -> BTreeSet<NaiveDate> {
        self.entries.iter().map(|e| e.source_date).collect()
    }

    /// Returns true if `date` has been recorded at least once.
    #[must_use]
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.entries.iter().any(|e| e.source_date == date)
    }
}

fn parse_processed_at(value: &Value) -> Option<NaiveDateTime> {
    let text = value.as_str()?;
    NaiveDateTime::parse_from_str(text.trim(), META_PROCESS_DATE_FORMAT).ok()
}
