//! In-memory response cache keyed by request signature.
//!
//! Only successful responses are stored. Entries live for a fixed TTL; an
//! expired entry is evicted when its own signature is looked up, and every
//! store sweeps all expired entries. There is no size bound.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::{collections::HashMap, time::Duration};
use tokio::time::Instant;

use super::{Transport, UpstreamRequest, UpstreamResponse};
use crate::WeatherError;

pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
struct CacheEntry {
    response: UpstreamResponse,
    stored_at: Instant,
}

#[derive(Debug)]
pub struct CachedTransport<T> {
    inner: T,
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl<T: Transport> CachedTransport<T> {
    pub fn new(inner: T, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Number of stored entries, expired ones included until purged.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry older than the TTL. Runs on every store, so stale
    /// entries for signatures that are never requested again do not pile up.
    pub fn purge_expired(&self) -> usize {
        let ttl = self.ttl;
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
        before - entries.len()
    }

    fn lookup(&self, key: &str) -> Option<UpstreamResponse> {
        let mut entries = self.entries.lock();
        let entry = entries.get(key)?;

        if entry.stored_at.elapsed() < self.ttl {
            return Some(entry.response.clone());
        }

        entries.remove(key);
        None
    }
}

#[async_trait]
impl<T: Transport> Transport for CachedTransport<T> {
    async fn send(&self, request: &UpstreamRequest) -> Result<UpstreamResponse, WeatherError> {
        let key = request.signature();

        if let Some(response) = self.lookup(&key) {
            tracing::debug!(url = %key, "Serving upstream response from cache");
            return Ok(response);
        }

        let response = self.inner.send(request).await?;

        if response.is_success() {
            let purged = self.purge_expired();
            if purged > 0 {
                tracing::debug!("Evicted {purged} expired cache entries");
            }
            self.entries.lock().insert(
                key,
                CacheEntry {
                    response: response.clone(),
                    stored_at: Instant::now(),
                },
            );
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::testing::{ScriptedTransport, ok, refused, status};

    fn forecast_request() -> UpstreamRequest {
        UpstreamRequest::new("http://upstream/v1/forecast")
            .param("latitude", 35.6854)
            .param("longitude", 139.7531)
            .param("hourly", "temperature_2m")
    }

    #[tokio::test(start_paused = true)]
    async fn second_fetch_within_ttl_is_served_from_cache() {
        let cache = CachedTransport::new(ScriptedTransport::always(ok("first")), DEFAULT_TTL);

        let a = cache.send(&forecast_request()).await.unwrap();
        tokio::time::advance(Duration::from_secs(3599)).await;
        let b = cache.send(&forecast_request()).await.unwrap();

        assert_eq!(a, b);
        assert_eq!(cache.inner().calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_is_refetched() {
        let inner = ScriptedTransport::new(vec![ok("first")], ok("second"));
        let cache = CachedTransport::new(inner, DEFAULT_TTL);

        cache.send(&forecast_request()).await.unwrap();
        tokio::time::advance(Duration::from_secs(3600)).await;
        let fresh = cache.send(&forecast_request()).await.unwrap();

        assert_eq!(fresh.body, "second");
        assert_eq!(cache.inner().calls(), 2);
    }

    #[tokio::test]
    async fn different_signatures_are_cached_separately() {
        let cache = CachedTransport::new(ScriptedTransport::always(ok("{}")), DEFAULT_TTL);
        let other = UpstreamRequest::new("http://upstream/v1/forecast").param("hourly", "rain");

        cache.send(&forecast_request()).await.unwrap();
        cache.send(&other).await.unwrap();
        cache.send(&other).await.unwrap();

        assert_eq!(cache.inner().calls(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let inner = ScriptedTransport::new(vec![status(500), refused()], ok("{}"));
        let cache = CachedTransport::new(inner, DEFAULT_TTL);

        assert_eq!(cache.send(&forecast_request()).await.unwrap().status, 500);
        assert!(cache.send(&forecast_request()).await.is_err());
        assert!(cache.is_empty());

        assert_eq!(cache.send(&forecast_request()).await.unwrap().status, 200);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.inner().calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn purge_drops_only_stale_entries() {
        let cache = CachedTransport::new(ScriptedTransport::always(ok("{}")), DEFAULT_TTL);
        let later = UpstreamRequest::new("http://upstream/v1/forecast").param("hourly", "rain");

        cache.send(&forecast_request()).await.unwrap();
        tokio::time::advance(Duration::from_secs(1800)).await;
        cache.send(&later).await.unwrap();
        tokio::time::advance(Duration::from_secs(1800)).await;

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn storing_a_response_evicts_stale_entries_for_other_signatures() {
        let cache = CachedTransport::new(ScriptedTransport::always(ok("{}")), DEFAULT_TTL);
        let other = UpstreamRequest::new("http://upstream/v1/forecast").param("hourly", "rain");

        cache.send(&forecast_request()).await.unwrap();
        tokio::time::advance(Duration::from_secs(3600)).await;
        cache.send(&other).await.unwrap();

        assert_eq!(cache.len(), 1);
    }
}
