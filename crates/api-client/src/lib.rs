use crate::error::ApiError;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use configuration::{MarketConfig, ProviderSettings};
use core_types::{CrossSectionSnapshot, SnapshotEntry, TimeSeriesStore};
use futures::stream::{self, StreamExt};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

pub mod cache;
pub mod error;
pub mod responses;
// --- Public API ---
pub use cache::CachedProvider;
pub use responses::{ChartResponse, ChartResult, parse_chart};

/// Instrument symbol to sector label.
pub type Basket = BTreeMap<String, String>;

/// The abstract interface for a market data source.
/// This trait is the contract the analysis commands use, allowing the
/// underlying implementation (live, cached or fake) to be swapped out.
///
/// Fetch failures are logged and come back as empty results so that one
/// unavailable instrument never aborts a whole analysis.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Daily bars covering roughly the last `period_years` years.
    async fn fetch_history(&self, instrument_id: &str, period_years: u32) -> TimeSeriesStore;

    /// Latest price and day change of every basket member that could be fetched.
    async fn fetch_cross_section(&self, basket: &Basket) -> CrossSectionSnapshot;

    /// The market's volatility index, empty when the market has none configured.
    async fn fetch_volatility_index(&self, market: &MarketConfig, period_years: u32) -> TimeSeriesStore {
        match &market.vix_symbol {
            Some(symbol) => self.fetch_history(symbol, period_years).await,
            None => {
                tracing::debug!("Market '{}' has no volatility index", market.name);
                TimeSeriesStore::empty(format!("{}-vix", market.name))
            }
        }
    }
}

/// A concrete implementation of the `MarketDataProvider` for the Yahoo chart API.
#[derive(Clone)]
pub struct YahooClient {
    client: reqwest::Client,
    base_url: String,
    max_concurrent_requests: usize,
}

impl YahooClient {
    pub fn new(settings: &ProviderSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko)")
            .timeout(std::time::Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            max_concurrent_requests: settings.max_concurrent_requests.max(1),
        })
    }

    async fn get_chart(&self, symbol: &str, query: &[(&str, String)]) -> Result<ChartResult, ApiError> {
        let url = format!("{}/{}", self.base_url, symbol);
        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();
        let text = response.text().await?;

        // Error bodies carry a `chart.error` object; let the parser surface it.
        let parsed = parse_chart(symbol, &text);
        if !status.is_success() && parsed.is_ok() {
            return Err(ApiError::InvalidData(format!("HTTP {status} for {symbol}")));
        }
        parsed
    }

    /// Fetches daily bars for `symbol` over the last `period_years` years.
    pub async fn try_fetch_history(&self, symbol: &str, period_years: u32) -> Result<TimeSeriesStore, ApiError> {
        let end = Utc::now();
        let start = end - Duration::days(365 * i64::from(period_years));
        let query = [
            ("period1", start.timestamp().to_string()),
            ("period2", end.timestamp().to_string()),
            ("interval", "1d".to_string()),
        ];

        let bars = self.get_chart(symbol, &query).await?.into_bars(symbol);
        Ok(TimeSeriesStore::new(symbol, bars)?)
    }

    /// Latest close and its change against the previous session, from a 5-day window.
    pub async fn try_fetch_quote(&self, symbol: &str, sector_label: &str) -> Result<SnapshotEntry, ApiError> {
        let query = [("range", "5d".to_string()), ("interval", "1d".to_string())];
        let bars = self.get_chart(symbol, &query).await?.into_bars(symbol);

        let [.., previous, latest] = bars.as_slice() else {
            return Err(ApiError::NoData(format!("{symbol}: fewer than two sessions")));
        };

        Ok(SnapshotEntry {
            price: latest.close,
            change_pct: (latest.close - previous.close) / previous.close * Decimal::ONE_HUNDRED,
            volume: latest.volume,
            sector_label: sector_label.to_string(),
        })
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    async fn fetch_history(&self, instrument_id: &str, period_years: u32) -> TimeSeriesStore {
        match self.try_fetch_history(instrument_id, period_years).await {
            Ok(store) => {
                tracing::debug!(symbol = instrument_id, bars = store.len(), "Fetched history");
                store
            }
            Err(e) => {
                tracing::warn!(symbol = instrument_id, "Failed to fetch history: {e}");
                TimeSeriesStore::empty(instrument_id)
            }
        }
    }

    async fn fetch_cross_section(&self, basket: &Basket) -> CrossSectionSnapshot {
        // Owned pairs keep the boxed future free of borrows into `basket`.
        let members: Vec<(String, String)> = basket.iter().map(|(s, l)| (s.clone(), l.clone())).collect();
        let results: Vec<_> = stream::iter(members)
            .map(|(symbol, sector)| async move {
                let result = self.try_fetch_quote(&symbol, &sector).await;
                (symbol, result)
            })
            .buffer_unordered(self.max_concurrent_requests)
            .collect()
            .await;

        let snapshot: CrossSectionSnapshot = results
            .into_iter()
            .filter_map(|(symbol, result)| match result {
                Ok(entry) => Some((symbol, entry)),
                Err(e) => {
                    tracing::warn!(symbol = %symbol, "Failed to fetch quote: {e}");
                    None
                }
            })
            .collect();

        tracing::info!("Fetched {} of {} basket quotes", snapshot.len(), basket.len());
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_normalizes_base_url() {
        let settings = ProviderSettings {
            base_url: "https://example.invalid/chart/".to_string(),
            max_concurrent_requests: 0,
            ..Default::default()
        };
        let client = YahooClient::new(&settings).unwrap();

        assert_eq!(client.base_url, "https://example.invalid/chart");
        assert_eq!(client.max_concurrent_requests, 1);
    }

    fn unreachable_client() -> YahooClient {
        let settings = ProviderSettings {
            base_url: "http://127.0.0.1:9/chart".to_string(),
            request_timeout_secs: 2,
            max_concurrent_requests: 2,
            ..Default::default()
        };
        YahooClient::new(&settings).unwrap()
    }

    fn assert_send<T: Send>(_: &T) {}

    #[tokio::test]
    async fn cross_section_skips_members_that_fail() {
        let client = unreachable_client();
        let basket: Basket = [("RELIANCE.NS", "Energy"), ("TCS.NS", "IT"), ("INFY.NS", "IT")]
            .into_iter()
            .map(|(s, l)| (s.to_string(), l.to_string()))
            .collect();

        let pending = client.fetch_cross_section(&basket);
        assert_send(&pending);
        let snapshot = pending.await;

        assert!(snapshot.is_empty());
        assert_eq!(basket.len(), 3);
    }

    #[tokio::test]
    async fn failed_history_comes_back_empty() {
        let client = unreachable_client();
        let store = client.fetch_history("^NSEI", 1).await;

        assert!(store.is_empty());
        assert_eq!(store.symbol(), "^NSEI");
    }
}
