use crate::{Basket, MarketDataProvider};
use async_trait::async_trait;
use core_types::{CrossSectionSnapshot, TimeSeriesStore};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CacheKey {
    History { instrument_id: String, period_years: u32 },
    CrossSection(Vec<String>),
}

#[derive(Clone)]
enum CachedValue {
    History(TimeSeriesStore),
    CrossSection(CrossSectionSnapshot),
}

/// Wraps a provider and reuses its results for `ttl`.
///
/// Empty results (failed fetches) are never cached, so the next request retries.
pub struct CachedProvider<P> {
    inner: P,
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, (Instant, CachedValue)>>,
}

impl<P: MarketDataProvider> CachedProvider<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    async fn lookup(&self, key: &CacheKey) -> Option<CachedValue> {
        let mut entries = self.entries.lock().await;
        let fresh = entries
            .get(key)
            .filter(|(stored_at, _)| stored_at.elapsed() < self.ttl)
            .map(|(_, value)| value.clone());
        if fresh.is_none() {
            entries.remove(key);
        }
        fresh
    }

    async fn store(&self, key: CacheKey, value: CachedValue) {
        self.entries.lock().await.insert(key, (Instant::now(), value));
    }
}

#[async_trait]
impl<P: MarketDataProvider> MarketDataProvider for CachedProvider<P> {
    async fn fetch_history(&self, instrument_id: &str, period_years: u32) -> TimeSeriesStore {
        let key = CacheKey::History {
            instrument_id: instrument_id.to_string(),
            period_years,
        };
        if let Some(CachedValue::History(store)) = self.lookup(&key).await {
            tracing::debug!(symbol = instrument_id, "History served from cache");
            return store;
        }

        let store = self.inner.fetch_history(instrument_id, period_years).await;
        if !store.is_empty() {
            self.store(key, CachedValue::History(store.clone())).await;
        }
        store
    }

    async fn fetch_cross_section(&self, basket: &Basket) -> CrossSectionSnapshot {
        let key = CacheKey::CrossSection(basket.keys().cloned().collect());
        if let Some(CachedValue::CrossSection(snapshot)) = self.lookup(&key).await {
            tracing::debug!(members = basket.len(), "Cross-section served from cache");
            return snapshot;
        }

        let snapshot = self.inner.fetch_cross_section(basket).await;
        if !snapshot.is_empty() {
            self.store(key, CachedValue::CrossSection(snapshot.clone())).await;
        }
        snapshot
    }
}
