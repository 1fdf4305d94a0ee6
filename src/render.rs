//! Terminal tables for the analysis results.

use analytics::breadth::{SectorBreadth, TopMovers};
use analytics::seasonality::{Heatmap, QuarterStatistic, WeekdayInsights};
use analytics::trend::PeriodSummary;
use analytics::{
    BreadthResult, BucketStatistic, IndicatorSnapshot, RotationReport, RotationTier, SectorOverview,
    SeasonalTable, SessionStatus, SessionTiming, TrendComponents,
};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use configuration::Settings;
use rust_decimal::Decimal;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn pct(value: Decimal) -> String {
    if value > Decimal::ZERO {
        format!("+{value:.2}%")
    } else {
        format!("{value:.2}%")
    }
}

fn num(value: Decimal) -> String {
    format!("{value:.2}")
}

fn opt(value: Option<Decimal>) -> String {
    value.map(num).unwrap_or_else(|| "-".to_string())
}

/// A percentage cell, green when positive and red when negative.
fn pct_cell(value: Decimal) -> Cell {
    let cell = Cell::new(pct(value));
    if value > Decimal::ZERO {
        cell.fg(Color::Green)
    } else if value < Decimal::ZERO {
        cell.fg(Color::Red)
    } else {
        cell
    }
}

pub fn section(title: &str) {
    println!("\n--- {title} ---");
}

pub fn bucket_stats(stats: &[BucketStatistic]) {
    let mut table = new_table(vec!["Bucket", "Samples", "Up", "Down", "Win Rate", "Avg Return"]);
    for s in stats {
        table.add_row(vec![
            Cell::new(&s.bucket_label),
            Cell::new(s.sample_count),
            Cell::new(s.positive_count),
            Cell::new(s.negative_count),
            Cell::new(format!("{:.1}%", s.win_rate_pct)),
            pct_cell(s.avg_return_pct),
        ]);
    }
    println!("{table}");
}

pub fn seasonal_table(title: &str, table: &SeasonalTable) {
    section(title);
    bucket_stats(&table.stats);
}

/// One-line summary of a single bucket.
pub fn insight(title: &str, stat: &BucketStatistic) {
    println!(
        "{title}: {} ({} avg, {:.1}% up over {} samples)",
        stat.bucket_label,
        pct(stat.avg_return_pct),
        stat.win_rate_pct,
        stat.sample_count
    );
}

pub fn heatmap(heatmap: &Heatmap) {
    let mut header = vec!["Year"];
    header.extend(heatmap.columns.iter().map(String::as_str));
    let mut table = new_table(header);

    for row in &heatmap.rows {
        let mut cells = vec![Cell::new(row.year)];
        cells.extend(
            row.cells
                .iter()
                .map(|c| c.map(pct_cell).unwrap_or_else(|| Cell::new("-"))),
        );
        table.add_row(cells);
    }
    println!("{table}");
}

pub fn quarters(quarters: &[QuarterStatistic]) {
    let mut table = new_table(vec!["Quarter", "Samples", "Win Rate", "Avg Return"]);
    for q in quarters {
        table.add_row(vec![
            Cell::new(q.label()),
            Cell::new(q.sample_count),
            Cell::new(format!("{:.1}%", q.win_rate_pct)),
            pct_cell(q.avg_return_pct),
        ]);
    }
    println!("{table}");
}

pub fn weekday_insights(insights: &WeekdayInsights) {
    println!(
        "Best day: {} ({} avg) | Weakest day: {} ({} avg) | Most consistent: {} ({:.1}% up)",
        insights.best_by_avg.bucket_label,
        pct(insights.best_by_avg.avg_return_pct),
        insights.weakest_by_avg.bucket_label,
        pct(insights.weakest_by_avg.avg_return_pct),
        insights.best_by_win_rate.bucket_label,
        insights.best_by_win_rate.win_rate_pct,
    );
}

pub fn breadth(result: &BreadthResult) {
    let mut table = new_table(vec!["Advancing", "Declining", "Unchanged", "A/D Ratio", "Avg Change", "State"]);
    table.add_row(vec![
        Cell::new(format!("{} ({:.1}%)", result.advancing, result.advancing_pct)).fg(Color::Green),
        Cell::new(format!("{} ({:.1}%)", result.declining, result.declining_pct)).fg(Color::Red),
        Cell::new(result.unchanged),
        Cell::new(num(result.ad_ratio)),
        pct_cell(result.avg_change_pct),
        Cell::new(result.classification),
    ]);
    println!("{table}");
}

pub fn movers(movers: &TopMovers) {
    for (title, list) in [("Top Gainers", &movers.gainers), ("Top Losers", &movers.losers)] {
        section(title);
        let mut table = new_table(vec!["Symbol", "Price", "Change", "Volume"]);
        for m in list {
            table.add_row(vec![
                Cell::new(&m.instrument_id),
                Cell::new(num(m.price)),
                pct_cell(m.change_pct),
                Cell::new(m.volume),
            ]);
        }
        println!("{table}");
    }
}

pub fn sector_breakdown(sectors: &[SectorBreadth]) {
    let mut table = new_table(vec!["Sector", "Members", "Advancing", "Declining", "Avg Change"]);
    for s in sectors {
        table.add_row(vec![
            Cell::new(&s.sector_label),
            Cell::new(s.members),
            Cell::new(s.advancing),
            Cell::new(s.declining),
            pct_cell(s.avg_change_pct),
        ]);
    }
    println!("{table}");
}

pub fn sector_overview(overview: &SectorOverview) {
    println!(
        "Sectors up: {}/{} ({:.1}%) | down: {} ({:.1}%) | avg {} | leader: {} ({})",
        overview.advancing_sectors,
        overview.total_sectors,
        overview.advancing_pct,
        overview.declining_sectors,
        overview.declining_pct,
        pct(overview.avg_change_pct),
        overview.leader,
        pct(overview.leader_change_pct),
    );
}

pub fn rotation(report: &RotationReport) {
    println!(
        "Hot above {} | Cold below {}",
        pct(report.strong_threshold),
        pct(report.weak_threshold)
    );
    let mut table = new_table(vec!["Sector", "Change", "Strength", "Tier"]);
    for s in &report.sectors {
        let tier = Cell::new(s.tier);
        let tier = match s.tier {
            RotationTier::Hot => tier.fg(Color::Red),
            RotationTier::Warm => tier.fg(Color::Yellow),
            RotationTier::Cool => tier.fg(Color::Cyan),
            RotationTier::Cold => tier.fg(Color::Blue),
        };
        table.add_row(vec![
            Cell::new(&s.sector),
            pct_cell(s.change_pct),
            Cell::new(format!("{:.0}", s.strength_score)),
            tier,
        ]);
    }
    println!("{table}");
}

pub fn trend(components: &TrendComponents, vix_name: &str) {
    let mut table = new_table(vec!["Component", "Value", "Reading"]);
    table.add_row(vec![Cell::new("Price"), Cell::new(num(components.price)), Cell::new("")]);
    table.add_row(vec![
        Cell::new("MA20 / MA50"),
        Cell::new(format!("{} / {}", opt(components.short_ma), opt(components.long_ma))),
        Cell::new(reading(components.ma_alignment)),
    ]);
    table.add_row(vec![
        Cell::new("A/D ratio (20d)"),
        Cell::new(opt(components.ad_ratio)),
        Cell::new(reading(components.ad_slope)),
    ]);
    table.add_row(vec![
        Cell::new(vix_name),
        Cell::new(opt(components.volatility_level)),
        Cell::new(reading(components.volatility_regime)),
    ]);
    println!("{table}");
}

fn reading<T: std::fmt::Debug>(value: Option<T>) -> String {
    value.map(|v| format!("{v:?}")).unwrap_or_else(|| "-".to_string())
}

pub fn period_summary(summary: &PeriodSummary) {
    let mut table = new_table(vec!["Start", "End", "Change", "High", "Low", "Up Days", "Down Days"]);
    table.add_row(vec![
        Cell::new(num(summary.start_close)),
        Cell::new(num(summary.end_close)),
        pct_cell(summary.return_pct),
        Cell::new(format!("{} ({:.2}% below)", num(summary.high), summary.below_high_pct)),
        Cell::new(format!("{} ({:.2}% above)", num(summary.low), summary.above_low_pct)),
        Cell::new(format!("{} ({:.1}%)", summary.advancing_days, summary.advancing_share_pct)),
        Cell::new(format!("{} ({:.1}%)", summary.declining_days, summary.declining_share_pct)),
    ]);
    println!("{table}");
}

pub fn indicators(symbol: &str, snapshot: &IndicatorSnapshot) {
    let mut table = new_table(vec!["Indicator", "Value"]);
    let rows = [
        ("Close", num(snapshot.close)),
        ("RSI", num(snapshot.rsi)),
        ("MACD", num(snapshot.macd)),
        ("MACD signal", num(snapshot.macd_signal)),
        ("MACD histogram", num(snapshot.macd_histogram)),
        ("SMA 20", num(snapshot.sma_20)),
        ("SMA 50", num(snapshot.sma_50)),
        ("SMA 200", num(snapshot.sma_200)),
        ("Bollinger upper", num(snapshot.bb_upper)),
        ("Bollinger middle", num(snapshot.bb_middle)),
        ("Bollinger lower", num(snapshot.bb_lower)),
        (
            "Realized volatility",
            snapshot
                .realized_volatility_pct
                .map(|v| format!("{v:.2}%"))
                .unwrap_or_else(|| "-".to_string()),
        ),
    ];
    for (name, value) in rows {
        table.add_row(vec![Cell::new(name), Cell::new(value)]);
    }
    println!("{table}");
    println!("{symbol}: {} (score {})", snapshot.sentiment, snapshot.sentiment_score);
}

pub fn markets(settings: &Settings) {
    let mut table = new_table(vec!["ID", "Market", "Currency", "Main Index", "Sectors", "Constituents", "Volatility"]);
    for (id, market) in &settings.markets {
        table.add_row(vec![
            Cell::new(id),
            Cell::new(&market.name),
            Cell::new(&market.currency),
            Cell::new(format!("{} ({})", market.main_index.name, market.main_index.symbol)),
            Cell::new(market.sectors.len()),
            Cell::new(format!("{} of {}", market.constituents.len(), market.main_index.constituents_count)),
            Cell::new(market.vix_symbol.as_deref().unwrap_or("-")),
        ]);
    }
    println!("{table}");
}

fn clock(time: Option<chrono::NaiveTime>) -> String {
    time.map(|t| t.format("%I:%M %p").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn sessions(timings: &[SessionTiming]) {
    let mut table = new_table(vec!["Market", "Status", "Open (IST)", "Close (IST)", "Local Time"]);
    for t in timings {
        let status = Cell::new(t.status);
        let status = match t.status {
            SessionStatus::Open => status.fg(Color::Green),
            SessionStatus::PreMarket | SessionStatus::PreOpen | SessionStatus::Break | SessionStatus::LunchBreak => {
                status.fg(Color::Yellow)
            }
            SessionStatus::Closed | SessionStatus::Weekend => status.fg(Color::Red),
        };
        table.add_row(vec![
            Cell::new(&t.market),
            status,
            Cell::new(clock(t.open_reported)),
            Cell::new(clock(t.close_reported)),
            Cell::new(clock(Some(t.local_time))),
        ]);
    }
    println!("{table}");
}
