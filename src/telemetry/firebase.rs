//! Firebase realtime-database REST client for telemetry records

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

use crate::config::Config;

use super::TelemetryError;

/// Writes whole records under `{base_url}/{path}/{key}.json`
#[derive(Clone)]
pub struct FirebaseClient {
    client: Client,
    base_url: String,
    path: String,
}

impl FirebaseClient {
    pub fn new(base_url: &str, path: &str, timeout: Duration) -> Result<Self, TelemetryError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TelemetryError::Client)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            path: path.trim_matches('/').to_string(),
        })
    }

    /// Build a client from config, `None` when no database URL is set
    pub fn from_config(config: &Config) -> Result<Option<Self>, TelemetryError> {
        config
            .telemetry_url
            .as_deref()
            .map(|url| Self::new(url, &config.telemetry_path, config.telemetry_timeout))
            .transpose()
    }

    /// Get the REST URL for a record key
    pub fn record_url(&self, key: &str) -> String {
        format!("{}/{}/{}.json", self.base_url, self.path, key)
    }

    /// PUT the record, replacing whatever is stored under `key`
    pub async fn put<T: Serialize>(&self, key: &str, data: &T) -> Result<(), TelemetryError> {
        let url = self.record_url(key);

        let response = self
            .client
            .put(&url)
            .header("Content-Type", "application/json")
            .json(data)
            .send()
            .await
            .map_err(TelemetryError::Request)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TelemetryError::Api { status: status.as_u16(), body });
        }

        Ok(())
    }
}
