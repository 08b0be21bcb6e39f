//! Request plumbing between the forecast provider and the network.
//!
//! The stack used in production is `RetryTransport<CachedTransport<HttpTransport>>`:
//! a cache hit never reaches the network, and every retry consults the cache
//! again before going out.

use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc, time::Duration};

use crate::{Config, WeatherError};

pub mod cache;
pub mod http;
pub mod retry;

pub use cache::CachedTransport;
pub use http::HttpTransport;
pub use retry::{RetryPolicy, RetryTransport};

/// A GET request: base URL plus ordered query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
}

impl UpstreamRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), query: Vec::new() }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Full URL including the encoded query string. Used as the cache key.
    pub fn signature(&self) -> String {
        if self.query.is_empty() {
            return self.url.clone();
        }

        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish();
        format!("{}?{}", self.url, query)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn send(&self, request: &UpstreamRequest) -> Result<UpstreamResponse, WeatherError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: &UpstreamRequest) -> Result<UpstreamResponse, WeatherError> {
        (**self).send(request).await
    }
}

/// Build the retrying, caching HTTP stack described by `config`.
pub fn transport_from_config(config: &Config) -> Result<Arc<dyn Transport>, WeatherError> {
    config.validate()?;

    let http = HttpTransport::new(Duration::from_secs(config.upstream.timeout_secs))?;
    let cached = CachedTransport::new(http, Duration::from_secs(config.cache.ttl_secs));
    let policy = RetryPolicy::new(config.retry.max_attempts, config.retry.backoff_factor()?);

    Ok(Arc::new(RetryTransport::new(cached, policy)))
}
