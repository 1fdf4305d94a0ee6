//! Calendar seasonality: win/loss statistics per month, week-of-month,
//! day-of-month and weekday, aggregated across every year in a series.

use crate::returns::ReturnCalculator;
use crate::stats::{mean, share_pct};
use chrono::{Datelike, Weekday};
use core_types::{Bar, TimeSeriesStore};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Minimum number of distinct years a day-of-month bucket needs before it is
/// allowed into the "top days" ranking.
pub const MIN_YEAR_SAMPLES: usize = 3;

/// Number of months reported as best and weakest.
pub const RANKING_SIZE: usize = 3;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Monday to Friday. Weekend-dated bars never make it into a weekday bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TradingWeekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl TradingWeekday {
    /// Maps a calendar weekday, `None` for Saturday and Sunday.
    pub fn from_weekday(weekday: Weekday) -> Option<Self> {
        match weekday {
            Weekday::Mon => Some(Self::Monday),
            Weekday::Tue => Some(Self::Tuesday),
            Weekday::Wed => Some(Self::Wednesday),
            Weekday::Thu => Some(Self::Thursday),
            Weekday::Fri => Some(Self::Friday),
            Weekday::Sat | Weekday::Sun => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
        }
    }
}

/// The calendar bucket a return belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BucketKey {
    Month { year: i32, month: u32 },
    WeekOfMonth { year: i32, month: u32, week: u32 },
    DayOfMonth { year: i32, month: u32, day: u32 },
    DayOfWeek { year: i32, weekday: TradingWeekday },
}

impl BucketKey {
    pub fn year(&self) -> i32 {
        match *self {
            Self::Month { year, .. }
            | Self::WeekOfMonth { year, .. }
            | Self::DayOfMonth { year, .. }
            | Self::DayOfWeek { year, .. } => year,
        }
    }

    /// The label shared by every year's sample of this bucket, e.g. `"Mar"`,
    /// `"Week 2"`, `"Day 15"` or `"Friday"`.
    pub fn label(&self) -> String {
        match *self {
            Self::Month { month, .. } => month_name(month).to_string(),
            Self::WeekOfMonth { week, .. } => format!("Week {week}"),
            Self::DayOfMonth { day, .. } => format!("Day {day}"),
            Self::DayOfWeek { weekday, .. } => weekday.name().to_string(),
        }
    }

    /// Calendar position of the label, used to order tables and heatmap columns.
    fn calendar_order(&self) -> u32 {
        match *self {
            Self::Month { month, .. } => month,
            Self::WeekOfMonth { week, .. } => week,
            Self::DayOfMonth { day, .. } => day,
            Self::DayOfWeek { weekday, .. } => weekday as u32,
        }
    }
}

/// Three-letter month name for a 1-based month number.
pub fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|i| MONTH_NAMES.get(i as usize))
        .copied()
        .unwrap_or("???")
}

/// `((day - 1) / 7) + 1`, clamped to `[1, 5]`.
pub fn week_of_month(day: u32) -> u32 {
    (day.saturating_sub(1) / 7 + 1).clamp(1, 5)
}

/// One return observation for one calendar bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodReturn {
    pub key: BucketKey,
    pub return_pct: Decimal,
}

/// Aggregate statistics over all years' samples sharing a bucket label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketStatistic {
    pub bucket_label: String,
    pub positive_count: usize,
    pub negative_count: usize,
    /// All defined returns, including exact zeros.
    pub sample_count: usize,
    pub win_rate_pct: Decimal,
    pub avg_return_pct: Decimal,
}

/// Quarterly roll-up of monthly returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarterStatistic {
    pub quarter: u32,
    pub sample_count: usize,
    pub avg_return_pct: Decimal,
    pub win_rate_pct: Decimal,
}

impl QuarterStatistic {
    pub fn label(&self) -> String {
        format!("Q{}", self.quarter)
    }
}

/// Best and weakest weekdays of a day-of-week table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdayInsights {
    pub best_by_avg: BucketStatistic,
    pub weakest_by_avg: BucketStatistic,
    pub best_by_win_rate: BucketStatistic,
}

/// A year-by-bucket matrix of returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heatmap {
    pub columns: Vec<String>,
    pub rows: Vec<HeatmapRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapRow {
    pub year: i32,
    /// One cell per column; `None` where the year has no sample for it.
    pub cells: Vec<Option<Decimal>>,
}

/// The raw returns of one granularity together with their per-bucket statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalTable {
    pub returns: Vec<PeriodReturn>,
    /// In calendar order of the bucket labels.
    pub stats: Vec<BucketStatistic>,
}

impl SeasonalTable {
    fn from_returns(returns: Vec<PeriodReturn>) -> Self {
        let stats = SeasonalityEngine::aggregate(&returns);
        Self { returns, stats }
    }

    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }

    pub fn stat(&self, label: &str) -> Option<&BucketStatistic> {
        self.stats.iter().find(|s| s.bucket_label == label)
    }

    /// Pivots the returns into a year-by-bucket matrix. Cells that receive
    /// several returns (e.g. a day number across all months) hold their mean.
    pub fn heatmap(&self) -> Heatmap {
        let columns = ordered_labels(&self.returns);

        let mut cells: BTreeMap<i32, BTreeMap<String, Vec<Decimal>>> = BTreeMap::new();
        for r in &self.returns {
            cells
                .entry(r.key.year())
                .or_default()
                .entry(r.key.label())
                .or_default()
                .push(r.return_pct);
        }

        let rows = cells
            .into_iter()
            .map(|(year, by_label)| HeatmapRow {
                year,
                cells: columns
                    .iter()
                    .map(|c| by_label.get(c).and_then(|v| mean(v)))
                    .collect(),
            })
            .collect();

        Heatmap { columns, rows }
    }
}

/// Bucket labels in calendar order, deduplicated.
fn ordered_labels(returns: &[PeriodReturn]) -> Vec<String> {
    let by_order: BTreeMap<u32, String> = returns
        .iter()
        .map(|r| (r.key.calendar_order(), r.key.label()))
        .collect();
    by_order.into_values().collect()
}

/// A stateless engine that turns a multi-year series into calendar-bucketed statistics.
#[derive(Debug, Default, Clone, Copy)]
pub struct SeasonalityEngine;

impl SeasonalityEngine {
    /// One return per (year, month) present: first to last close of the month.
    pub fn monthly_returns(store: &TimeSeriesStore) -> Vec<PeriodReturn> {
        store
            .bars()
            .chunk_by(|a, b| (a.date.year(), a.date.month()) == (b.date.year(), b.date.month()))
            .filter_map(|month| {
                let first = month.first()?;
                Some(PeriodReturn {
                    key: BucketKey::Month {
                        year: first.date.year(),
                        month: first.date.month(),
                    },
                    return_pct: ReturnCalculator::slice_return(month)?,
                })
            })
            .collect()
    }

    pub fn monthly(store: &TimeSeriesStore) -> SeasonalTable {
        if store.is_empty() {
            tracing::debug!("No bars for {}; monthly seasonality is empty", store.symbol());
        }
        SeasonalTable::from_returns(Self::monthly_returns(store))
    }

    /// One return per (year, month, week-of-month) with at least two bars.
    /// `month` restricts the output to a single calendar month.
    pub fn weekly_returns(store: &TimeSeriesStore, month: Option<u32>) -> Vec<PeriodReturn> {
        let week_key = |b: &Bar| (b.date.year(), b.date.month(), week_of_month(b.date.day()));

        store
            .bars()
            .chunk_by(|a, b| week_key(a) == week_key(b))
            .filter(|week| week.len() >= 2)
            .filter_map(|week| {
                let (year, m, w) = week_key(week.first()?);
                if month.is_some_and(|wanted| wanted != m) {
                    return None;
                }
                Some(PeriodReturn {
                    key: BucketKey::WeekOfMonth { year, month: m, week: w },
                    return_pct: ReturnCalculator::slice_return(week)?,
                })
            })
            .collect()
    }

    pub fn weekly(store: &TimeSeriesStore, month: Option<u32>) -> SeasonalTable {
        SeasonalTable::from_returns(Self::weekly_returns(store, month))
    }

    /// Close-to-close daily returns keyed by day of month.
    ///
    /// Returns are taken against the previous bar of the full series, so the
    /// first trading day of a month compares with the last day of the month before.
    pub fn daily_of_month_returns(store: &TimeSeriesStore, month: Option<u32>) -> Vec<PeriodReturn> {
        let daily = ReturnCalculator::daily_returns(store);

        daily
            .iter()
            .filter_map(|(date, ret)| {
                let return_pct = (*ret)?;
                if month.is_some_and(|wanted| wanted != date.month()) {
                    return None;
                }
                Some(PeriodReturn {
                    key: BucketKey::DayOfMonth {
                        year: date.year(),
                        month: date.month(),
                        day: date.day(),
                    },
                    return_pct,
                })
            })
            .collect()
    }

    pub fn daily_of_month(store: &TimeSeriesStore, month: Option<u32>) -> SeasonalTable {
        SeasonalTable::from_returns(Self::daily_of_month_returns(store, month))
    }

    /// Daily returns keyed by weekday. Weekend-dated bars are dropped.
    pub fn day_of_week_returns(store: &TimeSeriesStore) -> Vec<PeriodReturn> {
        let daily = ReturnCalculator::daily_returns(store);

        daily
            .iter()
            .filter_map(|(date, ret)| {
                let weekday = TradingWeekday::from_weekday(date.weekday())?;
                Some(PeriodReturn {
                    key: BucketKey::DayOfWeek {
                        year: date.year(),
                        weekday,
                    },
                    return_pct: (*ret)?,
                })
            })
            .collect()
    }

    pub fn day_of_week(store: &TimeSeriesStore) -> SeasonalTable {
        SeasonalTable::from_returns(Self::day_of_week_returns(store))
    }

    /// Groups returns by bucket label and computes win/loss statistics.
    ///
    /// Zero returns count towards `sample_count` but towards neither the
    /// positive nor the negative count.
    pub fn aggregate(returns: &[PeriodReturn]) -> Vec<BucketStatistic> {
        let mut groups: BTreeMap<u32, (String, Vec<Decimal>)> = BTreeMap::new();
        for r in returns {
            groups
                .entry(r.key.calendar_order())
                .or_insert_with(|| (r.key.label(), Vec::new()))
                .1
                .push(r.return_pct);
        }

        groups
            .into_values()
            .filter_map(|(label, values)| bucket_statistic(label, &values))
            .collect()
    }

    /// Quarterly average return and win rate, derived from monthly returns.
    pub fn quarterly(monthly_returns: &[PeriodReturn]) -> Vec<QuarterStatistic> {
        let mut quarters: BTreeMap<u32, Vec<Decimal>> = BTreeMap::new();
        for r in monthly_returns {
            if let BucketKey::Month { month, .. } = r.key {
                quarters
                    .entry(month.saturating_sub(1) / 3 + 1)
                    .or_default()
                    .push(r.return_pct);
            }
        }

        quarters
            .into_iter()
            .filter_map(|(quarter, values)| {
                let positives = values.iter().filter(|v| **v > Decimal::ZERO).count();
                Some(QuarterStatistic {
                    quarter,
                    sample_count: values.len(),
                    avg_return_pct: mean(&values)?,
                    win_rate_pct: share_pct(positives, values.len()),
                })
            })
            .collect()
    }

    /// Top months by win rate, ties broken by the higher average return.
    pub fn best_months(stats: &[BucketStatistic]) -> Vec<BucketStatistic> {
        let mut ranked = stats.to_vec();
        ranked.sort_by(|a, b| {
            b.win_rate_pct
                .cmp(&a.win_rate_pct)
                .then_with(|| b.avg_return_pct.cmp(&a.avg_return_pct))
        });
        ranked.truncate(RANKING_SIZE);
        ranked
    }

    /// Bottom months by win rate, ties broken by the lower average return.
    pub fn weakest_months(stats: &[BucketStatistic]) -> Vec<BucketStatistic> {
        let mut ranked = stats.to_vec();
        ranked.sort_by(|a, b| {
            a.win_rate_pct
                .cmp(&b.win_rate_pct)
                .then_with(|| a.avg_return_pct.cmp(&b.avg_return_pct))
        });
        ranked.truncate(RANKING_SIZE);
        ranked
    }

    /// The `n` best day-of-month buckets by average return.
    ///
    /// Only days observed in at least [`MIN_YEAR_SAMPLES`] distinct years take
    /// part; thinner days remain in `table.stats` but are not ranked.
    pub fn top_days(table: &SeasonalTable, n: usize) -> Vec<BucketStatistic> {
        let mut years_per_label: BTreeMap<String, BTreeSet<i32>> = BTreeMap::new();
        for r in &table.returns {
            years_per_label
                .entry(r.key.label())
                .or_default()
                .insert(r.key.year());
        }

        let mut ranked: Vec<BucketStatistic> = table
            .stats
            .iter()
            .filter(|s| {
                years_per_label
                    .get(&s.bucket_label)
                    .is_some_and(|years| years.len() >= MIN_YEAR_SAMPLES)
            })
            .cloned()
            .collect();
        ranked.sort_by(|a, b| b.avg_return_pct.cmp(&a.avg_return_pct));
        ranked.truncate(n);
        ranked
    }

    /// The bucket with the highest average return. Ties go to the earlier bucket.
    pub fn highest_average(stats: &[BucketStatistic]) -> Option<&BucketStatistic> {
        // `max_by` keeps the last of equal elements, hence the reverse.
        stats.iter().rev().max_by(|a, b| a.avg_return_pct.cmp(&b.avg_return_pct))
    }

    /// The bucket with the highest win rate. Ties go to the earlier bucket.
    pub fn most_consistent(stats: &[BucketStatistic]) -> Option<&BucketStatistic> {
        stats.iter().rev().max_by(|a, b| a.win_rate_pct.cmp(&b.win_rate_pct))
    }

    /// Best and weakest weekday by average return and best by win rate.
    pub fn weekday_insights(stats: &[BucketStatistic]) -> Option<WeekdayInsights> {
        let best_by_avg = Self::highest_average(stats)?.clone();
        let weakest_by_avg = stats
            .iter()
            .min_by(|a, b| a.avg_return_pct.cmp(&b.avg_return_pct))?
            .clone();
        let best_by_win_rate = Self::most_consistent(stats)?.clone();

        Some(WeekdayInsights {
            best_by_avg,
            weakest_by_avg,
            best_by_win_rate,
        })
    }
}

fn bucket_statistic(label: String, values: &[Decimal]) -> Option<BucketStatistic> {
    let positive_count = values.iter().filter(|v| **v > Decimal::ZERO).count();
    let negative_count = values.iter().filter(|v| **v < Decimal::ZERO).count();

    Some(BucketStatistic {
        bucket_label: label,
        positive_count,
        negative_count,
        sample_count: values.len(),
        win_rate_pct: share_pct(positive_count, values.len()),
        avg_return_pct: mean(values)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn store(points: &[(NaiveDate, Decimal)]) -> TimeSeriesStore {
        TimeSeriesStore::from_closes("TEST", points.to_vec()).unwrap()
    }

    #[test]
    fn january_return_runs_first_to_last_close() {
        let s = store(&[(date(2024, 1, 1), dec!(100)), (date(2024, 1, 31), dec!(110))]);
        let table = SeasonalityEngine::monthly(&s);

        assert_eq!(table.returns.len(), 1);
        assert_eq!(table.returns[0].return_pct, dec!(10));
        assert_eq!(table.stat("Jan").unwrap().win_rate_pct, dec!(100));
    }

    #[test]
    fn single_bar_month_is_a_zero_sample() {
        let s = store(&[
            (date(2023, 2, 10), dec!(100)),
            (date(2024, 2, 12), dec!(100)),
            (date(2024, 2, 20), dec!(90)),
        ]);
        let stat = SeasonalityEngine::monthly(&s).stat("Feb").cloned().unwrap();

        assert_eq!(stat.sample_count, 2);
        assert_eq!(stat.positive_count, 0);
        assert_eq!(stat.negative_count, 1);
        assert_eq!(stat.win_rate_pct, dec!(0));
        assert_eq!(stat.avg_return_pct, dec!(-5));
    }

    #[test]
    fn week_of_month_clamps_to_five() {
        assert_eq!(week_of_month(1), 1);
        assert_eq!(week_of_month(7), 1);
        assert_eq!(week_of_month(8), 2);
        assert_eq!(week_of_month(29), 5);
        assert_eq!(week_of_month(31), 5);
    }

    #[test]
    fn weekly_skips_single_bar_weeks() {
        let s = store(&[
            (date(2024, 3, 4), dec!(100)),
            (date(2024, 3, 5), dec!(102)),
            (date(2024, 3, 11), dec!(101)),
            (date(2024, 4, 1), dec!(100)),
            (date(2024, 4, 2), dec!(99)),
        ]);

        let all = SeasonalityEngine::weekly_returns(&s, None);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].key, BucketKey::WeekOfMonth { year: 2024, month: 3, week: 1 });
        assert_eq!(all[0].return_pct, dec!(2));

        let april = SeasonalityEngine::weekly_returns(&s, Some(4));
        assert_eq!(april.len(), 1);
        assert_eq!(april[0].return_pct, dec!(-1));
    }

    #[test]
    fn weekday_returns_drop_weekend_bars() {
        // 2024-03-08 is a Friday, 2024-03-09 a Saturday.
        let s = store(&[
            (date(2024, 3, 7), dec!(100)),
            (date(2024, 3, 8), dec!(110)),
            (date(2024, 3, 9), dec!(121)),
            (date(2024, 3, 11), dec!(121)),
        ]);
        let table = SeasonalityEngine::day_of_week(&s);

        let labels: Vec<_> = table.stats.iter().map(|s| s.bucket_label.as_str()).collect();
        assert_eq!(labels, vec!["Monday", "Friday"]);
        assert_eq!(table.stat("Friday").unwrap().avg_return_pct, dec!(10));
        assert_eq!(table.stat("Monday").unwrap().sample_count, 1);
    }

    #[test]
    fn top_days_require_three_distinct_years() {
        let mut points = Vec::new();
        for year in 2020..=2022 {
            points.push((date(year, 5, 4), dec!(100)));
            points.push((date(year, 5, 5), dec!(101)));
        }
        // Day 6 only appears in one year.
        points.push((date(2023, 5, 5), dec!(100)));
        points.push((date(2023, 5, 6), dec!(150)));

        let table = SeasonalityEngine::daily_of_month(&store(&points), Some(5));
        assert!(table.stat("Day 6").is_some());

        let top: Vec<_> = SeasonalityEngine::top_days(&table, 10)
            .into_iter()
            .map(|s| s.bucket_label)
            .collect();
        assert!(top.contains(&"Day 5".to_string()));
        assert!(!top.contains(&"Day 6".to_string()));
    }

    #[test]
    fn top_days_honours_the_requested_count() {
        // Twenty consecutive May days in each of four years, all eligible.
        let mut points = Vec::new();
        for year in 2019..=2022 {
            for day in 1..=20 {
                points.push((date(year, 5, day), Decimal::from(100 + day * (year as u32 - 2018))));
            }
        }
        let table = SeasonalityEngine::daily_of_month(&store(&points), Some(5));
        assert_eq!(table.stats.len(), 20);

        let fifteen = SeasonalityEngine::top_days(&table, 15);
        assert_eq!(fifteen.len(), 15);
        assert!(fifteen.windows(2).all(|w| w[0].avg_return_pct >= w[1].avg_return_pct));

        assert_eq!(SeasonalityEngine::top_days(&table, 50).len(), 20);
        assert!(SeasonalityEngine::top_days(&table, 0).is_empty());
    }

    #[test]
    fn quarters_average_their_months() {
        let returns = vec![
            PeriodReturn { key: BucketKey::Month { year: 2024, month: 1 }, return_pct: dec!(2) },
            PeriodReturn { key: BucketKey::Month { year: 2024, month: 3 }, return_pct: dec!(-4) },
            PeriodReturn { key: BucketKey::Month { year: 2024, month: 11 }, return_pct: dec!(1) },
        ];
        let quarters = SeasonalityEngine::quarterly(&returns);

        assert_eq!(quarters.len(), 2);
        assert_eq!(quarters[0].label(), "Q1");
        assert_eq!(quarters[0].avg_return_pct, dec!(-1));
        assert_eq!(quarters[0].win_rate_pct, dec!(50));
        assert_eq!(quarters[1].label(), "Q4");
    }

    fn stat(label: &str, win: Decimal, avg: Decimal) -> BucketStatistic {
        BucketStatistic {
            bucket_label: label.to_string(),
            positive_count: 0,
            negative_count: 0,
            sample_count: 10,
            win_rate_pct: win,
            avg_return_pct: avg,
        }
    }

    #[test]
    fn rankings_break_ties_on_average_return() {
        let stats = vec![
            stat("Jan", dec!(60), dec!(1)),
            stat("Feb", dec!(60), dec!(2)),
            stat("Mar", dec!(40), dec!(-1)),
            stat("Apr", dec!(40), dec!(-3)),
            stat("May", dec!(80), dec!(0.5)),
        ];

        let best: Vec<_> = SeasonalityEngine::best_months(&stats).into_iter().map(|s| s.bucket_label).collect();
        assert_eq!(best, vec!["May", "Feb", "Jan"]);

        let weakest: Vec<_> = SeasonalityEngine::weakest_months(&stats).into_iter().map(|s| s.bucket_label).collect();
        assert_eq!(weakest, vec!["Apr", "Mar", "Jan"]);
    }

    #[test]
    fn heatmap_pivots_years_by_calendar_columns() {
        let s = store(&[
            (date(2023, 1, 2), dec!(100)),
            (date(2023, 1, 30), dec!(105)),
            (date(2023, 3, 1), dec!(100)),
            (date(2023, 3, 31), dec!(90)),
            (date(2024, 1, 2), dec!(100)),
            (date(2024, 1, 31), dec!(98)),
        ]);
        let heatmap = SeasonalityEngine::monthly(&s).heatmap();

        assert_eq!(heatmap.columns, vec!["Jan", "Mar"]);
        assert_eq!(heatmap.rows.len(), 2);
        assert_eq!(heatmap.rows[0].cells, vec![Some(dec!(5)), Some(dec!(-10))]);
        assert_eq!(heatmap.rows[1].cells, vec![Some(dec!(-2)), None]);
    }

    #[test]
    fn weekday_insights_pick_extremes() {
        let stats = vec![
            stat("Monday", dec!(55), dec!(0.1)),
            stat("Tuesday", dec!(45), dec!(-0.2)),
            stat("Friday", dec!(60), dec!(0.05)),
        ];
        let insights = SeasonalityEngine::weekday_insights(&stats).unwrap();

        assert_eq!(insights.best_by_avg.bucket_label, "Monday");
        assert_eq!(insights.weakest_by_avg.bucket_label, "Tuesday");
        assert_eq!(insights.best_by_win_rate.bucket_label, "Friday");
        assert!(SeasonalityEngine::weekday_insights(&[]).is_none());
    }

    #[test]
    fn highest_average_and_most_consistent_keep_the_first_tie() {
        let stats = vec![
            stat("Week 1", dec!(50), dec!(0.4)),
            stat("Week 2", dec!(70), dec!(0.9)),
            stat("Week 3", dec!(70), dec!(0.9)),
            stat("Week 4", dec!(30), dec!(-0.6)),
        ];

        let best = SeasonalityEngine::highest_average(&stats).unwrap();
        assert_eq!(best.bucket_label, "Week 2");
        let steady = SeasonalityEngine::most_consistent(&stats).unwrap();
        assert_eq!(steady.bucket_label, "Week 2");
        assert!(SeasonalityEngine::highest_average(&[]).is_none());
    }

    #[test]
    fn empty_store_produces_empty_tables() {
        let s = TimeSeriesStore::empty("NONE");
        assert!(SeasonalityEngine::monthly(&s).is_empty());
        assert!(SeasonalityEngine::weekly(&s, None).stats.is_empty());
        assert!(SeasonalityEngine::daily_of_month(&s, None).stats.is_empty());
        assert!(SeasonalityEngine::day_of_week(&s).stats.is_empty());
    }
}
