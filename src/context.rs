use anyhow::Result;
use api_client::{Basket, CachedProvider, MarketDataProvider, YahooClient};
use configuration::{MarketConfig, Settings};
use core_types::{CrossSectionSnapshot, TimeSeriesStore};
use indicatif::{ProgressBar, ProgressStyle};

/// Everything one command needs: the resolved market, the history window and
/// the provider. Built per invocation; nothing outlives the command.
pub struct AnalysisContext<'a> {
    pub settings: &'a Settings,
    pub market: &'a MarketConfig,
    pub years: u32,
    provider: &'a CachedProvider<YahooClient>,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(
        settings: &'a Settings,
        market_id: &str,
        years: Option<u32>,
        provider: &'a CachedProvider<YahooClient>,
    ) -> Result<Self> {
        Ok(Self {
            settings,
            market: settings.market(market_id)?,
            years: years.unwrap_or(settings.analysis.default_years),
            provider,
        })
    }

    /// Main index and volatility index, fetched concurrently.
    pub async fn index_and_volatility(&self) -> (TimeSeriesStore, TimeSeriesStore) {
        let spinner = spinner(format!("Fetching {} and volatility index...", self.market.main_index.name));
        let (index, vix) = futures::join!(
            self.provider.fetch_history(&self.market.main_index.symbol, self.years),
            self.provider.fetch_volatility_index(self.market, self.years),
        );
        spinner.finish_and_clear();
        (index, vix)
    }

    /// Latest quotes of the main index constituents, keyed by symbol.
    pub async fn constituent_snapshot(&self) -> Result<CrossSectionSnapshot> {
        let basket = self.market.constituent_sectors();
        self.fetch_basket(&basket, "constituents").await
    }

    /// Latest quotes of the sector indices, keyed by sector label.
    pub async fn sector_snapshot(&self) -> Result<CrossSectionSnapshot> {
        let basket: Basket = self
            .market
            .sectors
            .iter()
            .map(|s| (s.symbol.clone(), s.name.clone()))
            .collect();
        let by_symbol = self.fetch_basket(&basket, "sectors").await?;

        Ok(by_symbol
            .iter()
            .map(|(_, entry)| (entry.sector_label.clone(), entry.clone()))
            .collect())
    }

    /// Fetches the basket in chunks of `max_concurrent_requests` so the
    /// progress bar advances as each chunk lands.
    async fn fetch_basket(&self, basket: &Basket, what: &str) -> Result<CrossSectionSnapshot> {
        let chunk_size = self.settings.provider.max_concurrent_requests.max(1);
        let members: Vec<(&String, &String)> = basket.iter().collect();

        let progress_bar = ProgressBar::new(members.len() as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("#>-"),
        );
        progress_bar.set_message(format!("Fetching {} {what}...", self.market.name));

        let mut snapshot = CrossSectionSnapshot::new();
        for chunk in members.chunks(chunk_size) {
            let part: Basket = chunk.iter().map(|(s, l)| ((*s).clone(), (*l).clone())).collect();
            snapshot.extend(
                self.provider
                    .fetch_cross_section(&part)
                    .await
                    .iter()
                    .map(|(symbol, entry)| (symbol.clone(), entry.clone())),
            );
            progress_bar.inc(chunk.len() as u64);
        }
        progress_bar.finish_and_clear();

        tracing::info!(
            market = %self.market.name,
            "Loaded {} of {} {what}",
            snapshot.len(),
            basket.len()
        );
        Ok(snapshot)
    }
}

/// Fetches one history behind a spinner.
pub async fn fetch_with_spinner(
    provider: &CachedProvider<YahooClient>,
    symbol: &str,
    years: u32,
) -> TimeSeriesStore {
    let spinner = spinner(format!("Fetching {years}y of {symbol}..."));
    let store = provider.fetch_history(symbol, years).await;
    spinner.finish_and_clear();
    store
}

fn spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_message(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner
}
