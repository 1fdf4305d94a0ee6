use analytics::seasonality::{MIN_YEAR_SAMPLES, month_name};
use analytics::{
    BreadthEngine, BucketStatistic, IndicatorEngine, IndicatorParams, MarketSchedule, RotationEngine,
    SeasonalityEngine, TrendEngine,
};
use anyhow::{Context, Result, bail};
use api_client::{CachedProvider, YahooClient};
use chrono::{Datelike, Local, Utc};
use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use configuration::{MAX_YEARS, Settings, init_logging, load_config};
use context::{AnalysisContext, fetch_with_spinner};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

mod context;
mod render;

/// History loaded for the indicator snapshot; enough bars for the 200-day average.
const INDICATOR_HISTORY_YEARS: u32 = 1;

/// The main entry point for the Market Pulse dashboard.
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables (e.g. PULSE__* overrides) from a .env file, if any.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let settings = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    // Keep the guard alive so buffered file logs are flushed on exit.
    let _log_guard = init_logging(&settings.logging)?;

    let provider = CachedProvider::new(
        YahooClient::new(&settings.provider)?,
        Duration::from_secs(settings.provider.cache_ttl_secs),
    );

    // Execute the appropriate command
    match cli.command {
        Commands::Seasonality(args) => handle_seasonality(args, &settings, &provider, cli.json).await,
        Commands::Breadth(args) => handle_breadth(args, &settings, &provider, cli.json).await,
        Commands::Rotation(args) => handle_rotation(args, &settings, &provider, cli.json).await,
        Commands::Trend(args) => handle_trend(args, &settings, &provider, cli.json).await,
        Commands::Indicators(args) => handle_indicators(args, &provider, cli.json).await,
        Commands::Markets => {
            render::markets(&settings);
            Ok(())
        }
        Commands::Sessions => handle_sessions(cli.json),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Seasonality, breadth, rotation and trend analytics for equity markets.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    /// Print results as JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calendar seasonality of an index, a sector or any symbol.
    Seasonality(SeasonalityArgs),
    /// Advance/decline breadth of a market's constituents.
    Breadth(MarketArgs),
    /// Hot/Warm/Cool/Cold tiers of a market's sectors.
    Rotation(MarketArgs),
    /// Trend components and period summary of a market's main index.
    Trend(TrendArgs),
    /// Latest technical indicators and sentiment of a symbol.
    Indicators(IndicatorArgs),
    /// List the configured markets.
    Markets,
    /// Open/closed status of the major trading sessions, in India time.
    Sessions,
}

#[derive(Parser)]
#[command(group(ArgGroup::new("target").required(true).args(["symbol", "market"])))]
struct SeasonalityArgs {
    /// Any symbol the provider knows (e.g., "^NSEI", "AAPL").
    #[arg(long)]
    symbol: Option<String>,

    /// A configured market; its main index is used unless --sector or --index is given.
    #[arg(long)]
    market: Option<String>,

    /// Sector label within --market (e.g., "IT").
    #[arg(long, requires = "market")]
    sector: Option<String>,

    /// Main or alternative index of --market, by name (e.g., "SENSEX").
    #[arg(long, requires = "market", conflicts_with = "sector")]
    index: Option<String>,

    /// Years of history; defaults to `analysis.default_years`.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_YEARS)))]
    years: Option<u32>,

    /// Restrict weekly and daily views to one calendar month (1-12).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    month: Option<u32>,

    #[arg(long, value_enum, default_value_t = SeasonalityView::Monthly)]
    view: SeasonalityView,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SeasonalityView {
    Monthly,
    Weekly,
    Daily,
    Weekday,
}

#[derive(Parser)]
struct MarketArgs {
    /// The configured market identifier (e.g., "INDIA").
    #[arg(long)]
    market: String,
}

#[derive(Parser)]
struct TrendArgs {
    #[arg(long)]
    market: String,

    /// Years of history; defaults to `analysis.default_years`.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_YEARS)))]
    years: Option<u32>,
}

#[derive(Parser)]
struct IndicatorArgs {
    #[arg(long)]
    symbol: String,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
struct MonthlyReport {
    table: analytics::SeasonalTable,
    quarters: Vec<analytics::seasonality::QuarterStatistic>,
    best_months: Vec<BucketStatistic>,
    weakest_months: Vec<BucketStatistic>,
    highest_average: Option<BucketStatistic>,
    current_month: Option<BucketStatistic>,
}

async fn handle_seasonality(
    args: SeasonalityArgs,
    settings: &Settings,
    provider: &CachedProvider<YahooClient>,
    json: bool,
) -> Result<()> {
    let years = args.years.unwrap_or(settings.analysis.default_years);

    let symbol = match (&args.symbol, &args.market) {
        (Some(symbol), _) => symbol.clone(),
        (None, Some(market_id)) => {
            let market = settings.market(market_id)?;
            match (&args.sector, &args.index) {
                (Some(label), _) => market
                    .sector_symbol(label)
                    .with_context(|| format!("Market '{market_id}' has no sector '{label}'"))?
                    .to_string(),
                (None, Some(name)) => market
                    .index_symbol(name)
                    .with_context(|| format!("Market '{market_id}' has no index '{name}'"))?
                    .to_string(),
                (None, None) => market.main_index.symbol.clone(),
            }
        }
        (None, None) => bail!("Either --symbol or --market is required"),
    };

    let store = fetch_with_spinner(provider, &symbol, years).await;
    if store.is_empty() {
        bail!("No price history available for {symbol}");
    }
    tracing::info!(symbol = %symbol, bars = store.len(), view = ?args.view, "Running seasonality analysis");

    match args.view {
        SeasonalityView::Monthly => {
            let table = SeasonalityEngine::monthly(&store);
            let report = MonthlyReport {
                quarters: SeasonalityEngine::quarterly(&table.returns),
                best_months: SeasonalityEngine::best_months(&table.stats),
                weakest_months: SeasonalityEngine::weakest_months(&table.stats),
                highest_average: SeasonalityEngine::highest_average(&table.stats).cloned(),
                current_month: table.stat(month_name(Local::now().month())).cloned(),
                table,
            };
            if json {
                return print_json(&report);
            }

            render::seasonal_table(&format!("{symbol}: Monthly Seasonality ({years}y)"), &report.table);
            render::section("Monthly Returns by Year");
            render::heatmap(&report.table.heatmap());
            render::section("Quarterly");
            render::quarters(&report.quarters);
            render::section("Strongest Months");
            render::bucket_stats(&report.best_months);
            render::section("Weakest Months");
            render::bucket_stats(&report.weakest_months);
            if let Some(best) = &report.highest_average {
                render::insight("Highest average month", best);
            }
            if let Some(current) = &report.current_month {
                render::insight("This month historically", current);
            }
        }
        SeasonalityView::Weekly => {
            let table = SeasonalityEngine::weekly(&store, args.month);
            let best_week = SeasonalityEngine::highest_average(&table.stats).cloned();
            if json {
                return print_json(&serde_json::json!({ "table": table, "best_week": best_week }));
            }
            render::seasonal_table(&format!("{symbol}: Week-of-Month Seasonality"), &table);
            render::section("Weekly Returns by Year");
            render::heatmap(&table.heatmap());
            if let Some(best) = &best_week {
                render::insight("Best week of the month", best);
            }
        }
        SeasonalityView::Daily => {
            let table = SeasonalityEngine::daily_of_month(&store, args.month);
            let top_days = SeasonalityEngine::top_days(&table, settings.analysis.top_days);
            if json {
                return print_json(&serde_json::json!({ "table": table, "top_days": top_days }));
            }
            render::seasonal_table(&format!("{symbol}: Day-of-Month Seasonality"), &table);
            if top_days.is_empty() {
                println!("Fewer than {MIN_YEAR_SAMPLES} years of history; best days are not ranked.");
            } else {
                render::section("Best Days");
                render::bucket_stats(&top_days);
            }
        }
        SeasonalityView::Weekday => {
            let table = SeasonalityEngine::day_of_week(&store);
            let insights = SeasonalityEngine::weekday_insights(&table.stats);
            if json {
                return print_json(&serde_json::json!({ "table": table, "insights": insights }));
            }
            render::seasonal_table(&format!("{symbol}: Day-of-Week Seasonality"), &table);
            if let Some(insights) = insights {
                render::weekday_insights(&insights);
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct BreadthReport {
    breadth: analytics::BreadthResult,
    top_movers: analytics::TopMovers,
    sectors: Vec<analytics::breadth::SectorBreadth>,
    sector_overview: Option<analytics::SectorOverview>,
}

async fn handle_breadth(
    args: MarketArgs,
    settings: &Settings,
    provider: &CachedProvider<YahooClient>,
    json: bool,
) -> Result<()> {
    let ctx = AnalysisContext::new(settings, &args.market, None, provider)?;

    let constituents = ctx.constituent_snapshot().await?;
    let Some(breadth) = BreadthEngine::calculate(&constituents) else {
        bail!("No constituent quotes available for {}", ctx.market.name);
    };
    let sectors = ctx.sector_snapshot().await?;

    let report = BreadthReport {
        breadth,
        top_movers: BreadthEngine::top_movers(&constituents, settings.analysis.top_movers),
        sectors: BreadthEngine::sector_breakdown(&constituents),
        sector_overview: BreadthEngine::sector_overview(&sectors),
    };
    if json {
        return print_json(&report);
    }

    render::section(&format!(
        "{} Breadth ({} of {} tracked constituents; the index has {})",
        ctx.market.main_index.name,
        report.breadth.total(),
        ctx.market.constituents.len(),
        ctx.market.main_index.constituents_count
    ));
    render::breadth(&report.breadth);
    render::movers(&report.top_movers);
    render::section("Breadth by Sector");
    render::sector_breakdown(&report.sectors);
    if let Some(overview) = &report.sector_overview {
        render::sector_overview(overview);
    }
    Ok(())
}

async fn handle_rotation(
    args: MarketArgs,
    settings: &Settings,
    provider: &CachedProvider<YahooClient>,
    json: bool,
) -> Result<()> {
    let ctx = AnalysisContext::new(settings, &args.market, None, provider)?;

    let sectors = ctx.sector_snapshot().await?;
    let Some(report) = RotationEngine::classify(&sectors) else {
        bail!("No sector quotes available for {}", ctx.market.name);
    };
    if json {
        return print_json(&report);
    }

    render::section(&format!("{} Sector Rotation", ctx.market.name));
    render::rotation(&report);
    Ok(())
}

#[derive(Serialize)]
struct TrendReport {
    components: analytics::TrendComponents,
    summary: Option<analytics::trend::PeriodSummary>,
}

async fn handle_trend(
    args: TrendArgs,
    settings: &Settings,
    provider: &CachedProvider<YahooClient>,
    json: bool,
) -> Result<()> {
    let ctx = AnalysisContext::new(settings, &args.market, args.years, provider)?;

    let (index, vix) = ctx.index_and_volatility().await;
    let volatility = (!vix.is_empty()).then_some(&vix);
    let Some(components) = TrendEngine::components(&index, volatility) else {
        bail!("No price history available for {}", ctx.market.main_index.symbol);
    };

    let report = TrendReport {
        components,
        summary: TrendEngine::period_summary(&index),
    };
    if json {
        return print_json(&report);
    }

    render::section(&format!("{} Trend ({}y)", ctx.market.main_index.name, ctx.years));
    let vix_name = ctx.market.vix_name.as_deref().unwrap_or("Volatility index");
    render::trend(&report.components, vix_name);
    if let Some(summary) = &report.summary {
        render::section("Period Summary");
        render::period_summary(summary);
    }
    Ok(())
}

async fn handle_indicators(
    args: IndicatorArgs,
    provider: &CachedProvider<YahooClient>,
    json: bool,
) -> Result<()> {
    let engine = IndicatorEngine::new(IndicatorParams::default())?;

    let store = fetch_with_spinner(provider, &args.symbol, INDICATOR_HISTORY_YEARS).await;
    let Some(snapshot) = engine.evaluate(&store)? else {
        bail!("No price history available for {}", args.symbol);
    };
    if json {
        return print_json(&snapshot);
    }

    render::section(&format!("{} Indicators", args.symbol));
    render::indicators(&args.symbol, &snapshot);
    Ok(())
}

fn handle_sessions(json: bool) -> Result<()> {
    let timings = MarketSchedule::standard().timings(Utc::now());
    if json {
        return print_json(&timings);
    }

    render::section("Market Sessions (IST)");
    render::sessions(&timings);
    Ok(())
}
