//! Run orchestration.

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use std::fmt::Write as _;
use std::sync::Arc;
use xetl_aggregate::{DailyAggregator, DailyReport};
use xetl_extract::Extractor;
use xetl_format::OutputFormat;
use xetl_meta::{FetchPlan, WatermarkStore};
use xetl_store::{ObjectStore, StoreRole, open_store};
use xetl_types::{EtlConfig, EtlError, Result};

/// Outcome of one successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// The plan the run executed.
    pub plan: FetchPlan,
    /// Rows read from the source.
    pub rows_extracted: usize,
    /// Rows in the report.
    pub rows_reported: usize,
    /// Key the report was written to, if it had rows.
    pub report_key: Option<String>,
    /// Dates appended to the watermark.
    pub dates_recorded: usize,
}

/// One pipeline: watermark, extract, aggregate, write report, record.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: EtlConfig,
    target: Arc<dyn ObjectStore>,
    watermark: WatermarkStore,
    extractor: Extractor,
    aggregator: DailyAggregator,
}

impl Pipeline {
    /// Creates a pipeline reading trades from `source` and writing the report
    /// and watermark to `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the source format in `config` is not supported.
    pub fn new(
        config: EtlConfig,
        source: Arc<dyn ObjectStore>,
        target: Arc<dyn ObjectStore>,
    ) -> Result<Self> {
        let extractor = Extractor::from_config(source, &config.source)?;
        let watermark = WatermarkStore::new(Arc::clone(&target), config.meta.key.clone());
        let aggregator = DailyAggregator::new(config.source.clone());
        Ok(Self {
            config,
            target,
            watermark,
            extractor,
            aggregator,
        })
    }

    /// Creates a pipeline over the stores named in `config.storage`.
    ///
    /// # Errors
    ///
    /// Returns an error if a store cannot be opened or the source format in
    /// `config` is not supported.
    pub fn from_config(config: EtlConfig) -> Result<Self> {
        let source = open_store(&config.storage, StoreRole::Source)?;
        let target = open_store(&config.storage, StoreRole::Target)?;
        Self::new(config, source, target)
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &EtlConfig {
        &self.config
    }

    /// Returns the watermark store.
    #[must_use]
    pub const fn watermark(&self) -> &WatermarkStore {
        &self.watermark
    }

    /// Computes the fetch plan for a run at `now` without running it.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration or the watermark is invalid.
    pub async fn plan_at(&self, now: NaiveDateTime) -> Result<FetchPlan> {
        let first_date = self.config.source.first_extract_date()?;
        self.watermark.fetch_plan(first_date, now.date()).await
    }

    /// Runs the pipeline once, using the local clock.
    ///
    /// # Errors
    ///
    /// See [`Pipeline::run_at`].
    pub async fn run(&self) -> Result<RunSummary> {
        self.run_at(Local::now().naive_local()).await
    }

    /// Runs the pipeline once as of `now`.
    ///
    /// `now` fixes "yesterday" for the fetch plan, the report key and the
    /// watermark timestamp. The watermark is only appended to after the
    /// report is written, or found to be empty.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error. The watermark is unchanged in that case.
    pub async fn run_at(&self, now: NaiveDateTime) -> Result<RunSummary> {
        match self.execute(now).await {
            Ok(summary) => Ok(summary),
            Err(e) => {
                tracing::error!(error = %e, "run aborted, watermark unchanged");
                Err(e)
            }
        }
    }

    async fn execute(&self, now: NaiveDateTime) -> Result<RunSummary> {
        let plan = self.plan_at(now).await?;
        let batch = self.extractor.extract(&plan.dates).await?;
        let report = self.aggregator.transform(&batch, plan.effective_start)?;

        let report_key = if report.is_empty() {
            None
        } else {
            Some(self.write_report(&report, now).await?)
        };

        let dates = plan.dates_to_record();
        self.watermark.append(&dates, now).await?;

        Ok(RunSummary {
            rows_extracted: batch.len(),
            rows_reported: report.len(),
            report_key,
            dates_recorded: dates.len(),
            plan,
        })
    }

    /// Returns the report key for a run at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::Config`] if `target.key_date_format` is not a
    /// valid `strftime` pattern.
    pub fn report_key(&self, now: NaiveDateTime) -> Result<String> {
        let target = &self.config.target;
        let mut key = target.key.clone();
        write!(key, "{}", now.format(&target.key_date_format)).map_err(|_| {
            EtlError::Config(format!(
                "invalid target.key_date_format '{}'",
                target.key_date_format
            ))
        })?;
        Ok(key)
    }

    /// Encodes `report` in the target format and writes it.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::Format`] if the target format is unknown or
    /// encoding fails, or a storage error if the put fails.
    pub async fn write_report(&self, report: &DailyReport, now: NaiveDateTime) -> Result<String> {
        let target = &self.config.target;
        let format = target.format.parse::<OutputFormat>().map_err(|e| {
            tracing::error!(format = %target.format, "unsupported report format");
            EtlError::from(e)
        })?;
        let codec = format.codec(b',')?;

        let key = self.report_key(now)?;
        let frame = report.to_frame(target)?;
        let body = codec.encode(&frame).await?;
        let bytes = body.len();
        self.target.put(&key, body).await?;

        tracing::info!(%key, %format, rows = report.len(), bytes, "report written");
        Ok(key)
    }
}
