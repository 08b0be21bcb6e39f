use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::{Transport, UpstreamRequest, UpstreamResponse};
use crate::WeatherError;

/// Plain reqwest transport. Non-2xx statuses are returned as responses, not
/// errors, so the layers above can decide what to do with them.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("weather-core/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WeatherError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &UpstreamRequest) -> Result<UpstreamResponse, WeatherError> {
        tracing::debug!(url = %request.signature(), "Sending upstream request");

        let res = self
            .http
            .get(&request.url)
            .query(&request.query)
            .send()
            .await
            .map_err(|e| WeatherError::Transport(format!("Failed to send request to {}: {e}", request.url)))?;

        let status = res.status().as_u16();
        let body = res
            .text()
            .await
            .map_err(|e| WeatherError::Transport(format!("Failed to read response body: {e}")))?;

        Ok(UpstreamResponse { status, body })
    }
}
