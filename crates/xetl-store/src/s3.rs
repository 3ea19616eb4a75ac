//! S3-compatible bucket.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use xetl_types::S3Config;

use crate::{ObjectStore, StoreError};

/// Object store backed by one bucket of an S3-compatible service.
///
/// Keys are object keys as-is. Credentials come from the environment
/// variables named in [`S3Config`].
#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
    endpoint: String,
}

impl S3Store {
    /// Connects to `bucket` with the credentials found in the environment.
    ///
    /// No request is made until the first call.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Credentials`] if a credential variable is unset.
    pub fn from_env(config: &S3Config, bucket: &str) -> Result<Self, StoreError> {
        Self::from_lookup(config, bucket, |name| std::env::var(name).ok())
    }

    fn from_lookup(
        config: &S3Config,
        bucket: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, StoreError> {
        let var = |name: &str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| StoreError::Credentials {
                    var: name.to_string(),
                })
        };
        let credentials = Credentials::new(
            var(&config.access_key_env)?,
            var(&config.secret_key_env)?,
            None,
            None,
            "xetl",
        );

        let mut builder = aws_sdk_s3::Config::builder()
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .behavior_version(BehaviorVersion::latest())
            .force_path_style(config.force_path_style);
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint.clone());
        }

        let endpoint = config
            .endpoint_url
            .clone()
            .unwrap_or_else(|| format!("https://s3.{}.amazonaws.com", config.region));
        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: bucket.to_string(),
            endpoint,
        })
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let list_err = |reason: String| StoreError::List {
            prefix: prefix.to_string(),
            source: std::io::Error::other(reason),
        };

        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .into_paginator()
            .send();

        let mut keys = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| list_err(DisplayErrorContext(&e).to_string()))?;
            keys.extend(
                page.contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_string)),
            );
        }

        keys.sort();
        tracing::debug!(bucket = %self.bucket, prefix, keys = keys.len(), "prefix listed");
        Ok(keys)
    }

    async fn get(&self, key: &str) -> Result<Bytes, StoreError> {
        let read_err = |reason: String| StoreError::Read {
            key: key.to_string(),
            source: std::io::Error::other(reason),
        };

        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) if e.as_service_error().is_some_and(|se| se.is_no_such_key()) => {
                return Err(StoreError::NotFound {
                    key: key.to_string(),
                });
            }
            Err(e) => return Err(read_err(DisplayErrorContext(&e).to_string())),
        };

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| read_err(e.to_string()))?;
        Ok(body.into_bytes())
    }

    async fn put(&self, key: &str, body: Bytes) -> Result<(), StoreError> {
        let size = body.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| StoreError::Write {
                key: key.to_string(),
                source: std::io::Error::other(DisplayErrorContext(&e).to_string()),
            })?;

        tracing::debug!(key, bytes = size, bucket = %self.bucket, "object written");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("s3://{} at {}", self.bucket, self.endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> S3Config {
        S3Config {
            endpoint_url: Some("http://localhost:9000".to_string()),
            region: "eu-central-1".to_string(),
            source_bucket: "xetra-1234".to_string(),
            target_bucket: "xetra-reports".to_string(),
            access_key_env: "XETRA_ACCESS_KEY".to_string(),
            secret_key_env: "XETRA_SECRET_KEY".to_string(),
            force_path_style: true,
        }
    }

    fn lookup(name: &str) -> Option<String> {
        match name {
            "XETRA_ACCESS_KEY" => Some("access".to_string()),
            "XETRA_SECRET_KEY" => Some("secret".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_credentials_from_named_variables() {
        let store = S3Store::from_lookup(&config(), "xetra-1234", lookup).unwrap();

        assert_eq!(store.describe(), "s3://xetra-1234 at http://localhost:9000");
    }

    #[test]
    fn test_missing_credential_names_variable() {
        let mut config = config();
        config.secret_key_env = "XETRA_UNSET_SECRET".to_string();

        let err = S3Store::from_lookup(&config, "xetra-1234", lookup).unwrap_err();
        assert!(matches!(err, StoreError::Credentials { var } if var == "XETRA_UNSET_SECRET"));
    }

    #[test]
    fn test_empty_credential_is_missing() {
        let err = S3Store::from_lookup(&config(), "xetra-1234", |_| Some(String::new())).unwrap_err();
        assert!(matches!(err, StoreError::Credentials { var } if var == "XETRA_ACCESS_KEY"));
    }

    #[test]
    fn test_default_endpoint_follows_region() {
        let mut config = config();
        config.endpoint_url = None;

        let store = S3Store::from_lookup(&config, "xetra-1234", lookup).unwrap();
        assert_eq!(
            store.describe(),
            "s3://xetra-1234 at https://s3.eu-central-1.amazonaws.com"
        );
    }
}
