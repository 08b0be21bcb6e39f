//! Fixed-policy retry with exponential backoff.
//!
//! Retries transport failures and retryable statuses (5xx, 408, 429).
//! Any other status, success or failure, goes straight back to the caller.

use async_trait::async_trait;
use std::time::Duration;

use super::{Transport, UpstreamRequest, UpstreamResponse};
use crate::{WeatherError, error::is_retryable_status};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_BACKOFF_FACTOR: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Wait before the first retry; doubles for each one after.
    pub backoff_factor: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_factor: Duration) -> Self {
        Self { max_attempts, backoff_factor }
    }

    /// Wait before retry number `retry` (1-based): `factor * 2^(retry - 1)`.
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.backoff_factor.checked_mul(factor).unwrap_or(Duration::MAX)
    }
}

#[derive(Debug)]
pub struct RetryTransport<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T: Transport> RetryTransport<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    #[cfg(test)]
    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: Transport> Transport for RetryTransport<T> {
    async fn send(&self, request: &UpstreamRequest) -> Result<UpstreamResponse, WeatherError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let outcome = self.inner.send(request).await;

            let retryable = match &outcome {
                Ok(response) => is_retryable_status(response.status),
                Err(e) => e.is_retryable(),
            };

            if !retryable {
                if attempt > 1 && outcome.is_ok() {
                    tracing::info!("Upstream request succeeded on attempt {attempt}");
                }
                return outcome;
            }

            if attempt >= max_attempts {
                tracing::error!("All {max_attempts} upstream attempts exhausted");
                return outcome;
            }

            let delay = self.policy.delay_for_retry(attempt);
            match &outcome {
                Ok(response) => tracing::warn!(
                    "Upstream returned retryable status {}, attempt {attempt} of {max_attempts}; retrying in {delay:?}",
                    response.status
                ),
                Err(e) => tracing::warn!(
                    "Upstream attempt {attempt} of {max_attempts} failed: {e}; retrying in {delay:?}"
                ),
            }

            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
