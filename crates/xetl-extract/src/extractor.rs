//! Partition listing and loading.

use chrono::NaiveDate;
use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use std::collections::BTreeSet;
use std::sync::Arc;
use xetl_format::{Codec, OutputFormat};
use xetl_store::ObjectStore;
use xetl_types::{DATE_FORMAT, EtlError, Frame, Result, SourceConfig};

/// One decoded source object.
#[derive(Debug, Clone)]
pub struct PartitionBatch {
    /// Partition date the object was listed under.
    pub date: NaiveDate,
    /// Object key.
    pub key: String,
    /// Decoded rows.
    pub frame: Frame,
}

impl PartitionBatch {
    /// Returns the number of rows in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frame.len()
    }

    /// Returns true if the object held no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frame.is_empty()
    }
}

/// Loads date partitions from a source store into one frame.
///
/// A partition is every object whose key starts with the date as
/// `YYYY-MM-DD`. Keys are read in lexicographic order within a date and
/// dates in ascending order.
#[derive(Debug, Clone)]
pub struct Extractor {
    store: Arc<dyn ObjectStore>,
    codec: Arc<dyn Codec>,
}

impl Extractor {
    /// Creates an extractor decoding objects with `codec`.
    pub fn new(store: Arc<dyn ObjectStore>, codec: Arc<dyn Codec>) -> Self {
        Self { store, codec }
    }

    /// Creates an extractor for the source format and delimiter in `source`.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::Format`] if the source format is unknown, or
    /// [`EtlError::Config`] if the delimiter is not ASCII.
    pub fn from_config(store: Arc<dyn ObjectStore>, source: &SourceConfig) -> Result<Self> {
        let format: OutputFormat = source.format.parse()?;
        let delimiter = u8::try_from(source.delimiter).map_err(|_| {
            EtlError::Config(format!(
                "source delimiter '{}' is not a single byte",
                source.delimiter
            ))
        })?;
        Ok(Self::new(store, Arc::from(format.codec(delimiter)?)))
    }

    /// Lists the object keys of one partition, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::Storage`] if the listing fails.
    pub async fn partition_keys(&self, date: NaiveDate) -> Result<Vec<String>> {
        let prefix = date.format(DATE_FORMAT).to_string();
        let mut keys = self.store.list(&prefix).await?;
        keys.sort();
        tracing::debug!(%prefix, keys = keys.len(), "partition listed");
        Ok(keys)
    }

    /// Lists every partition in `dates`, in read order.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::Storage`] if a listing fails.
    pub async fn list_partitions(
        &self,
        dates: &BTreeSet<NaiveDate>,
    ) -> Result<Vec<(NaiveDate, String)>> {
        let mut keys = Vec::new();
        for &date in dates {
            keys.extend(
                self.partition_keys(date)
                    .await?
                    .into_iter()
                    .map(|key| (date, key)),
            );
        }
        Ok(keys)
    }

    /// Reads and decodes one object.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::ExtractionFailure`] if the object cannot be read
    /// or decoded.
    pub async fn load(&self, date: NaiveDate, key: String) -> Result<PartitionBatch> {
        let failure = |reason: String| {
            tracing::error!(%key, %reason, "extraction failed");
            EtlError::ExtractionFailure {
                key: key.clone(),
                reason,
            }
        };

        let body = self
            .store
            .get(&key)
            .await
            .map_err(|e| failure(e.to_string()))?;
        let frame = self
            .codec
            .decode(&body)
            .await
            .map_err(|e| failure(e.to_string()))?;

        tracing::debug!(%key, rows = frame.len(), "object loaded");
        Ok(PartitionBatch { date, key, frame })
    }

    /// Creates a stream that loads `keys` one at a time, in order.
    pub fn load_stream(
        &self,
        keys: Vec<(NaiveDate, String)>,
    ) -> impl Stream<Item = Result<PartitionBatch>> + '_ {
        stream::iter(keys).then(move |(date, key)| self.load(date, key))
    }

    /// Loads every object of every partition in `dates` into one frame.
    ///
    /// Columns are the union over all objects. An empty date set or a set
    /// with no matching objects yields an empty frame.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::ExtractionFailure`] on the first object that
    /// cannot be loaded; no partial frame is returned.
    pub async fn extract(&self, dates: &BTreeSet<NaiveDate>) -> Result<Frame> {
        if dates.is_empty() {
            tracing::info!("no dates to extract");
            return Ok(Frame::default());
        }

        let keys = self.list_partitions(dates).await?;
        if keys.is_empty() {
            tracing::info!(dates = dates.len(), "no source objects matched");
            return Ok(Frame::default());
        }

        let objects = keys.len();
        let frame = self
            .load_stream(keys)
            .try_fold(Frame::default(), |mut acc, batch| async move {
                acc.concat(batch.frame);
                Ok(acc)
            })
            .await?;

        tracing::info!(
            dates = dates.len(),
            objects,
            rows = frame.len(),
            store = %self.store.describe(),
            "extraction complete"
        );
        Ok(frame)
    }
}
