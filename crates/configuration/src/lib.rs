use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_logging;
pub use settings::{
    AnalysisSettings, Constituent, IndexConfig, LoggingSettings, MAX_YEARS, MarketConfig,
    NamedSymbol, ProviderSettings, Settings,
};

/// Prefix of environment variables that override file values,
/// e.g. `PULSE__LOGGING__LEVEL=debug`.
pub const ENV_PREFIX: &str = "PULSE";

/// Loads the application configuration from a TOML file.
///
/// This function is the primary entry point for this crate. It reads the configuration file,
/// layers `PULSE__*` environment variables on top, deserializes the result into our
/// strongly-typed `Settings` struct and validates it.
pub fn load_config(path: impl AsRef<Path>) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path.as_ref()))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"
[analysis]
default_years = 3

[markets.INDIA]
name = "India"
currency = "INR"
main_index = { name = "NIFTY 50", symbol = "^NSEI", constituents_count = 50 }
alternative_indices = [
    { name = "SENSEX", symbol = "^BSESN" },
]
sectors = [
    { name = "Bank", symbol = "^NSEBANK" },
    { name = "IT", symbol = "^CNXIT" },
]
vix_symbol = "^INDIAVIX"
constituents = [
    { symbol = "TCS.NS", sector = "Information Technology" },
]
"#;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_markets_and_fills_defaults() {
        let file = write_config(MINIMAL);
        let settings = load_config(file.path()).unwrap();

        assert_eq!(settings.analysis.default_years, 3);
        assert_eq!(settings.analysis.top_movers, 5);
        assert_eq!(settings.provider.cache_ttl_secs, 60);
        assert_eq!(settings.logging.level, "info");

        let india = settings.market("india").unwrap();
        assert_eq!(india.main_index.symbol, "^NSEI");
        assert_eq!(india.sector_symbol("it"), Some("^CNXIT"));
        assert_eq!(
            india.constituent_sectors().get("TCS.NS").map(String::as_str),
            Some("Information Technology")
        );
    }

    #[test]
    fn resolves_indices_by_name() {
        let file = write_config(MINIMAL);
        let settings = load_config(file.path()).unwrap();
        let india = settings.market("INDIA").unwrap();

        assert_eq!(india.index_symbol("sensex"), Some("^BSESN"));
        assert_eq!(india.index_symbol("Nifty 50"), Some("^NSEI"));
        assert_eq!(india.index_symbol("NASDAQ"), None);
        assert_eq!(india.main_index.constituents_count, 50);
    }

    #[test]
    fn environment_overrides_file_values() {
        let file = write_config(MINIMAL);
        // No other test in this crate reads `analysis.top_days`.
        unsafe { std::env::set_var("PULSE__ANALYSIS__TOP_DAYS", "15") };
        let settings = load_config(file.path());
        unsafe { std::env::remove_var("PULSE__ANALYSIS__TOP_DAYS") };

        let settings = settings.unwrap();
        assert_eq!(settings.analysis.top_days, 15);
        assert_eq!(settings.analysis.default_years, 3);
    }

    #[test]
    fn unknown_market_is_an_error() {
        let file = write_config(MINIMAL);
        let settings = load_config(file.path()).unwrap();
        assert!(matches!(settings.market("JAPAN"), Err(ConfigError::UnknownMarket(_))));
    }

    #[test]
    fn rejects_out_of_range_years() {
        let file = write_config(&MINIMAL.replace("default_years = 3", "default_years = 20"));
        assert!(matches!(load_config(file.path()), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }

    #[test]
    fn bundled_config_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config.toml");
        let settings = load_config(path).unwrap();

        let india = settings.market("INDIA").unwrap();
        assert_eq!(india.constituents.len(), 50);
        assert!(settings.market("USA").unwrap().vix_symbol.is_some());
    }
}
