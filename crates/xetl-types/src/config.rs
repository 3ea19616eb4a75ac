//! Pipeline configuration.
//!
//! One TOML document with a table per concern. Format strings and column
//! names live here; the algorithms receive the structs explicitly.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{EtlError, Result, parse_date};

/// Complete configuration of a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtlConfig {
    /// Source data layout.
    pub source: SourceConfig,
    /// Report layout and destination.
    pub target: TargetConfig,
    /// Watermark location.
    #[serde(default)]
    pub meta: MetaConfig,
    /// Object store roots.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EtlConfig {
    /// Parses a TOML document and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::Config`] if the document is not valid TOML, does
    /// not match the schema, or fails [`EtlConfig::validate`].
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| EtlError::Config(format!("parse TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EtlError::Config(format!("read config file '{}': {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Checks the values serde cannot check on its own.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.source.first_extract_date()?;

        for (role, column) in self.source.role_columns() {
            if !self.source.columns.iter().any(|c| c == column) {
                return Err(EtlError::Config(format!(
                    "source column for {role} ('{column}') is not listed in source.columns"
                )));
            }
        }

        if !self.source.delimiter.is_ascii() {
            return Err(EtlError::Config(format!(
                "source delimiter '{}' is not a single ASCII character",
                self.source.delimiter
            )));
        }

        if self.target.key_date_format.is_empty() {
            return Err(EtlError::Config(
                "target.key_date_format must not be empty".to_string(),
            ));
        }

        if self.meta.key.is_empty() {
            return Err(EtlError::Config("meta.key must not be empty".to_string()));
        }

        self.storage.validate()
    }
}

/// Layout of the source trade files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// First date a report is wanted for, `YYYY-MM-DD`.
    pub first_extract_date: String,
    /// Columns kept from the source files.
    pub columns: Vec<String>,
    /// Trading date column.
    pub col_date: String,
    /// Instrument identifier column.
    pub col_isin: String,
    /// Time-of-day column.
    pub col_time: String,
    /// Start price column.
    pub col_start_price: String,
    /// Minimum price column.
    pub col_min_price: String,
    /// Maximum price column.
    pub col_max_price: String,
    /// Traded volume column.
    pub col_traded_vol: String,
    /// Field separator of the source files.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Serialization format of the source files.
    #[serde(default = "default_source_format")]
    pub format: String,
}

impl SourceConfig {
    /// Returns the parsed first extract date.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::Config`] if the date is not `YYYY-MM-DD`.
    pub fn first_extract_date(&self) -> Result<NaiveDate> {
        parse_date(&self.first_extract_date).map_err(|e| {
            EtlError::Config(format!(
                "invalid first_extract_date '{}': {e}",
                self.first_extract_date
            ))
        })
    }

    /// Returns `(role, column)` pairs for every column the report needs.
    #[must_use]
    pub fn role_columns(&self) -> [(&'static str, &str); 7] {
        [
            ("date", self.col_date.as_str()),
            ("isin", self.col_isin.as_str()),
            ("time", self.col_time.as_str()),
            ("start price", self.col_start_price.as_str()),
            ("min price", self.col_min_price.as_str()),
            ("max price", self.col_max_price.as_str()),
            ("traded volume", self.col_traded_vol.as_str()),
        ]
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            first_extract_date: "2022-01-01".to_string(),
            columns: [
                "ISIN",
                "Mnemonic",
                "Date",
                "Time",
                "StartPrice",
                "EndPrice",
                "MinPrice",
                "MaxPrice",
                "TradedVolume",
            ]
            .map(String::from)
            .to_vec(),
            col_date: "Date".to_string(),
            col_isin: "ISIN".to_string(),
            col_time: "Time".to_string(),
            col_start_price: "StartPrice".to_string(),
            col_min_price: "MinPrice".to_string(),
            col_max_price: "MaxPrice".to_string(),
            col_traded_vol: "TradedVolume".to_string(),
            delimiter: default_delimiter(),
            format: default_source_format(),
        }
    }
}

/// Layout and destination of the daily report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Instrument identifier column.
    pub col_isin: String,
    /// Date column.
    pub col_date: String,
    /// Opening price column.
    pub col_op_price: String,
    /// Closing price column.
    pub col_clos_price: String,
    /// Minimum price column.
    pub col_min_price: String,
    /// Maximum price column.
    pub col_max_price: String,
    /// Daily traded volume column.
    pub col_dail_trad_vol: String,
    /// Change versus previous closing price column, in percent.
    pub col_ch_prev_clos: String,
    /// Key prefix of report objects.
    pub key: String,
    /// `strftime` pattern appended to the key prefix.
    pub key_date_format: String,
    /// Serialization format of the report, checked when writing.
    pub format: String,
}

impl TargetConfig {
    /// Returns the report column names in output order.
    #[must_use]
    pub fn columns(&self) -> [&str; 8] {
        [
            self.col_isin.as_str(),
            self.col_date.as_str(),
            self.col_op_price.as_str(),
            self.col_clos_price.as_str(),
            self.col_min_price.as_str(),
            self.col_max_price.as_str(),
            self.col_dail_trad_vol.as_str(),
            self.col_ch_prev_clos.as_str(),
        ]
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            col_isin: "isin".to_string(),
            col_date: "date".to_string(),
            col_op_price: "opening_price_eur".to_string(),
            col_clos_price: "closing_price_eur".to_string(),
            col_min_price: "minimum_price_eur".to_string(),
            col_max_price: "maximum_price_eur".to_string(),
            col_dail_trad_vol: "daily_traded_volume".to_string(),
            col_ch_prev_clos: "change_prev_closing_%".to_string(),
            key: "report1/xetra_daily_report1_".to_string(),
            key_date_format: "%Y%m%d_%H%M%S".to_string(),
            format: "parquet".to_string(),
        }
    }
}

/// Watermark location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    /// Key of the watermark object in the target store.
    pub key: String,
}

impl Default for MetaConfig {
    fn default() -> Self {
        Self {
            key: "meta_file.csv".to_string(),
        }
    }
}

/// Kind of object store the pipeline talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Local directories named by `source_root` and `target_root`.
    #[default]
    File,
    /// Buckets of an S3-compatible service, see [`S3Config`].
    S3,
}

/// Where the source partitions are read from and the report is written to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Store kind.
    #[serde(default)]
    pub backend: StorageBackend,
    /// Directory holding the source partitions.
    #[serde(default = "default_source_root")]
    pub source_root: PathBuf,
    /// Directory receiving reports and the watermark.
    #[serde(default = "default_target_root")]
    pub target_root: PathBuf,
    /// Bucket settings, required by the `s3` backend.
    #[serde(default)]
    pub s3: Option<S3Config>,
}

impl StorageConfig {
    /// Checks that the selected backend is fully configured.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::Config`] if the `s3` backend lacks its table or a
    /// bucket name.
    pub fn validate(&self) -> Result<()> {
        if self.backend != StorageBackend::S3 {
            return Ok(());
        }
        let Some(s3) = &self.s3 else {
            return Err(EtlError::Config(
                "storage.backend = \"s3\" needs a [storage.s3] table".to_string(),
            ));
        };
        for (name, value) in [
            ("source_bucket", &s3.source_bucket),
            ("target_bucket", &s3.target_bucket),
            ("access_key_env", &s3.access_key_env),
            ("secret_key_env", &s3.secret_key_env),
        ] {
            if value.is_empty() {
                return Err(EtlError::Config(format!("storage.s3.{name} must not be empty")));
            }
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            source_root: default_source_root(),
            target_root: default_target_root(),
            s3: None,
        }
    }
}

/// Connection settings of an S3-compatible service.
///
/// Credentials never live in the file: only the names of the environment
/// variables holding them do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Config {
    /// Service endpoint, e.g. `https://s3.eu-central-1.amazonaws.com`.
    /// The AWS endpoint of `region` when absent.
    #[serde(default)]
    pub endpoint_url: Option<String>,
    /// Signing region.
    #[serde(default = "default_region")]
    pub region: String,
    /// Bucket holding the source partitions.
    pub source_bucket: String,
    /// Bucket receiving reports and the watermark.
    pub target_bucket: String,
    /// Environment variable holding the access key id.
    #[serde(default = "default_access_key_env")]
    pub access_key_env: String,
    /// Environment variable holding the secret access key.
    #[serde(default = "default_secret_key_env")]
    pub secret_key_env: String,
    /// Address buckets as `<endpoint>/<bucket>` instead of by subdomain.
    #[serde(default)]
    pub force_path_style: bool,
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
    /// `pretty`, `json` or `compact`.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

fn default_source_root() -> PathBuf {
    PathBuf::from("data/source")
}

fn default_target_root() -> PathBuf {
    PathBuf::from("data/target")
}

fn default_region() -> String {
    "eu-central-1".to_string()
}

fn default_access_key_env() -> String {
    "AWS_ACCESS_KEY_ID".to_string()
}

fn default_secret_key_env() -> String {
    "AWS_SECRET_ACCESS_KEY".to_string()
}

fn default_delimiter() -> char {
    ','
}

fn default_source_format() -> String {
    "csv".to_string()
}
