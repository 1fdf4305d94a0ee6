use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Longest history, in years, any command may request.
pub const MAX_YEARS: u32 = 15;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub provider: ProviderSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub analysis: AnalysisSettings,
    /// Keyed by market identifier (e.g. "INDIA", "USA").
    pub markets: BTreeMap<String, MarketConfig>,
}

/// Contains parameters for the market data provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Base URL of the chart endpoint, without the trailing symbol.
    pub base_url: String,
    pub request_timeout_secs: u64,
    /// How long fetched series are reused before refetching.
    pub cache_ttl_secs: u64,
    /// Upper bound on in-flight requests during a constituent fan-out.
    pub max_concurrent_requests: usize,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com/v8/finance/chart".to_string(),
            request_timeout_secs: 10,
            cache_ttl_secs: 60,
            max_concurrent_requests: 8,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    /// Where daily log files are written. Logs go to stderr only when unset.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: "market-pulse.log".to_string(),
        }
    }
}

/// Defaults for the analysis commands.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub default_years: u32,
    pub top_movers: usize,
    pub top_days: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            default_years: 5,
            top_movers: 5,
            top_days: 10,
        }
    }
}

/// Everything needed to analyse one market.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
    pub name: String,
    pub currency: String,
    pub main_index: IndexConfig,
    #[serde(default)]
    pub alternative_indices: Vec<NamedSymbol>,
    /// Sector indices or sector ETFs, in display order.
    #[serde(default)]
    pub sectors: Vec<NamedSymbol>,
    pub vix_symbol: Option<String>,
    pub vix_name: Option<String>,
    /// Constituents of the main index with their sector labels.
    #[serde(default)]
    pub constituents: Vec<Constituent>,
}

impl MarketConfig {
    /// Symbol of the sector with the given label, matched case-insensitively.
    pub fn sector_symbol(&self, label: &str) -> Option<&str> {
        self.sectors
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(label))
            .map(|s| s.symbol.as_str())
    }

    /// Constituent symbol to sector label.
    pub fn constituent_sectors(&self) -> BTreeMap<String, String> {
        self.constituents
            .iter()
            .map(|c| (c.symbol.clone(), c.sector.clone()))
            .collect()
    }

    /// Symbol of the main index or an alternative index, matched by name
    /// case-insensitively.
    pub fn index_symbol(&self, name: &str) -> Option<&str> {
        if self.main_index.name.eq_ignore_ascii_case(name) {
            return Some(&self.main_index.symbol);
        }
        self.alternative_indices
            .iter()
            .find(|i| i.name.eq_ignore_ascii_case(name))
            .map(|i| i.symbol.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexConfig {
    pub name: String,
    pub symbol: String,
    pub constituents_count: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedSymbol {
    pub name: String,
    pub symbol: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Constituent {
    pub symbol: String,
    pub sector: String,
}

impl Settings {
    /// Resolves a market by identifier, ignoring case.
    pub fn market(&self, id: &str) -> Result<&MarketConfig, ConfigError> {
        self.markets
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(id))
            .map(|(_, market)| market)
            .ok_or_else(|| ConfigError::UnknownMarket(id.to_string()))
    }

    /// Checks the invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::ValidationError(msg));

        if !(1..=MAX_YEARS).contains(&self.analysis.default_years) {
            return invalid(format!(
                "analysis.default_years must be between 1 and {MAX_YEARS}, got {}",
                self.analysis.default_years
            ));
        }
        if self.analysis.top_movers == 0 || self.analysis.top_days == 0 {
            return invalid("analysis.top_movers and analysis.top_days must be positive".to_string());
        }
        if self.provider.max_concurrent_requests == 0 {
            return invalid("provider.max_concurrent_requests must be positive".to_string());
        }
        if self.markets.is_empty() {
            return invalid("at least one market must be configured".to_string());
        }
        for (id, market) in &self.markets {
            if market.main_index.symbol.trim().is_empty() {
                return invalid(format!("market '{id}' has no main index symbol"));
            }
            if let Some(sector) = market.sectors.iter().find(|s| s.symbol.trim().is_empty()) {
                return invalid(format!("sector '{}' of market '{id}' has no symbol", sector.name));
            }
        }
        Ok(())
    }
}
