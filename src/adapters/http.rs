use crate::core::{ConfigProvider, RecordSource};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Fetches the source payload with a single bounded `GET`. No retries.
pub struct HttpSource {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let endpoint = endpoint.into();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EtlError::FetchTransportError {
                endpoint: endpoint.clone(),
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(config.api_endpoint(), config.fetch_timeout())
    }

    fn classify(&self, err: reqwest::Error) -> EtlError {
        if err.is_timeout() {
            EtlError::FetchTimeout {
                endpoint: self.endpoint.clone(),
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            EtlError::FetchTransportError {
                endpoint: self.endpoint.clone(),
                message: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl RecordSource for HttpSource {
    async fn fetch(&self) -> Result<serde_json::Value> {
        tracing::debug!(
            "Making API request to: {} (timeout {:?})",
            self.endpoint,
            self.timeout
        );
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);
        if !status.is_success() {
            return Err(EtlError::FetchTransportError {
                endpoint: self.endpoint.clone(),
                message: format!("unexpected status {}", status),
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| self.classify(e))
    }
}
