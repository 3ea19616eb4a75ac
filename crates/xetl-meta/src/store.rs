//! Watermark persistence.

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeSet;
use std::sync::Arc;
use xetl_format::{Codec, CsvCodec};
use xetl_store::ObjectStore;
use xetl_types::{EtlError, Frame, Result};

use crate::{FetchPlan, Watermark};

/// Reads, validates and appends to the watermark object.
///
/// Updates are read-merge-write and not atomic. Two runs appending to the
/// same key concurrently can lose one run's rows; the last write wins. A
/// conditional put on [`ObjectStore`] would be needed to close that window.
#[derive(Debug, Clone)]
pub struct WatermarkStore {
    store: Arc<dyn ObjectStore>,
    key: String,
    codec: CsvCodec,
}

impl WatermarkStore {
    /// Creates a watermark store for the object `key` in `store`.
    pub fn new(store: Arc<dyn ObjectStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            codec: CsvCodec::new(),
        }
    }

    /// Returns the watermark object key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    fn corrupt(&self, reason: impl Into<String>) -> EtlError {
        EtlError::CorruptWatermark {
            key: self.key.clone(),
            reason: reason.into(),
        }
    }

    /// Fetches and decodes the stored table without validating it.
    ///
    /// Returns `Ok(None)` if the object does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::Storage`] if the store fails, or
    /// [`EtlError::CorruptWatermark`] if the bytes are not a table.
    pub async fn read_frame(&self) -> Result<Option<Frame>> {
        let body = match self.store.get(&self.key).await {
            Ok(body) => body,
            Err(e) if e.is_not_found() => {
                tracing::info!(key = %self.key, "no watermark yet, treating as first run");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let frame = self
            .codec
            .decode(&body)
            .await
            .map_err(|e| self.corrupt(e.to_string()))?;
        Ok(Some(frame))
    }

    /// Checks that `frame` has exactly the watermark columns.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::CorruptWatermark`] on any other column set.
    pub fn validate_schema(&self, frame: &Frame) -> Result<()> {
        let expected = Watermark::empty_frame();
        if frame.has_same_column_set(&expected) {
            Ok(())
        } else {
            Err(self.corrupt(format!(
                "expected columns [{}], found [{}]",
                expected.columns().join(", "),
                frame.columns().join(", ")
            )))
        }
    }

    /// Concatenates `new_rows` after `old`. Nothing is deduplicated.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::CorruptWatermark`] if the column sets differ.
    pub fn merge(&self, mut old: Frame, new_rows: Frame) -> Result<Frame> {
        if !old.has_same_column_set(&new_rows) {
            return Err(self.corrupt(format!(
                "cannot merge columns [{}] into [{}]",
                new_rows.columns().join(", "),
                old.columns().join(", ")
            )));
        }
        old.concat(new_rows);
        Ok(old)
    }

    /// Reads and parses the watermark.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::CorruptWatermark`] if the schema or any row is
    /// invalid, or [`EtlError::Storage`] if the store fails.
    pub async fn read(&self) -> Result<Option<Watermark>> {
        let Some(frame) = self.read_frame().await? else {
            return Ok(None);
        };
        self.validate_schema(&frame)?;
        Watermark::from_frame(&frame, &self.key).map(Some)
    }

    /// Overwrites the watermark object with `frame`.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the put fails.
    pub async fn write(&self, frame: &Frame) -> Result<()> {
        let body = self.codec.encode(frame).await?;
        self.store.put(&self.key, body).await?;
        tracing::debug!(key = %self.key, rows = frame.len(), "watermark written");
        Ok(())
    }

    /// Records `dates` as processed at `processed_at`.
    ///
    /// An empty set writes nothing and returns `true`. Otherwise the existing
    /// record is validated, the new rows are appended and the whole table is
    /// written back.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::CorruptWatermark`] if the existing record is
    /// invalid; the stored object is left untouched in that case.
    pub async fn append(
        &self,
        dates: &BTreeSet<NaiveDate>,
        processed_at: NaiveDateTime,
    ) -> Result<bool> {
        if dates.is_empty() {
            tracing::info!(key = %self.key, "no dates to record, watermark unchanged");
            return Ok(true);
        }

        let new_rows = Watermark::new_rows(dates.iter().copied(), processed_at).to_frame()?;
        let merged = match self.read_frame().await? {
            Some(old) => {
                self.validate_schema(&old)?;
                Watermark::from_frame(&old, &self.key)?;
                self.merge(old, new_rows)?
            }
            None => new_rows,
        };

        self.write(&merged).await?;
        tracing::info!(
            key = %self.key,
            dates = dates.len(),
            rows = merged.len(),
            "watermark updated"
        );
        Ok(true)
    }

    /// Reads the watermark and computes the fetch plan for `today`.
    ///
    /// # Errors
    ///
    /// Returns an error if the watermark cannot be read or is corrupt.
    pub async fn fetch_plan(&self, first_date: NaiveDate, today: NaiveDate) -> Result<FetchPlan> {
        let watermark = self.read().await?;
        let plan = FetchPlan::compute(first_date, watermark.as_ref(), today);

        if plan.is_empty() {
            tracing::info!(%first_date, "no dates to fetch");
        } else {
            tracing::info!(
                effective_start = %plan.effective_start,
                dates = plan.dates.len(),
                lookback = ?plan.lookback,
                "fetch plan computed"
            );
        }
        Ok(plan)
    }
}
