//! Trend descriptors for a single index: moving averages, the cumulative
//! advance/decline line, the rolling A/D ratio and a handful of classified
//! components. Turning the components into a single verdict is left to the caller.

use crate::returns::ReturnCalculator;
use crate::stats::{ZeroDivisorPolicy, advance_decline_ratio, min_max, pct_change, rescale_to_percent, share_pct};
use core_types::{DerivedSeries, TimeSeriesStore};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

pub const SHORT_MA_WINDOW: usize = 20;
pub const LONG_MA_WINDOW: usize = 50;
pub const AD_RATIO_WINDOW: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaAlignment {
    /// price > MA20 > MA50
    Bullish,
    /// price < MA20 < MA50
    Bearish,
    Mixed,
}

impl MaAlignment {
    pub fn from_levels(price: Decimal, short_ma: Decimal, long_ma: Decimal) -> Self {
        if price > short_ma && short_ma > long_ma {
            Self::Bullish
        } else if price < short_ma && short_ma < long_ma {
            Self::Bearish
        } else {
            Self::Mixed
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Slope {
    Rising,
    Falling,
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VolatilityRegime {
    Low,
    Moderate,
    High,
    Extreme,
}

impl VolatilityRegime {
    /// `< 15` low, `<= 20` moderate, `<= 30` high, above that extreme.
    pub fn from_level(level: Decimal) -> Self {
        if level < dec!(15) {
            Self::Low
        } else if level <= dec!(20) {
            Self::Moderate
        } else if level <= dec!(30) {
            Self::High
        } else {
            Self::Extreme
        }
    }
}

/// The classified trend inputs as of the latest bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendComponents {
    pub price: Decimal,
    pub short_ma: Option<Decimal>,
    pub long_ma: Option<Decimal>,
    /// `None` until both averages are defined.
    pub ma_alignment: Option<MaAlignment>,
    pub ad_slope: Option<Slope>,
    pub ad_ratio: Option<Decimal>,
    pub volatility_level: Option<Decimal>,
    pub volatility_regime: Option<VolatilityRegime>,
}

/// Descriptive statistics over the whole loaded period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub start_close: Decimal,
    pub end_close: Decimal,
    pub change: Decimal,
    pub return_pct: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    /// How far the latest close sits below the period high.
    pub below_high_pct: Decimal,
    /// How far the latest close sits above the period low.
    pub above_low_pct: Decimal,
    pub avg_volume: Decimal,
    pub advancing_days: usize,
    pub declining_days: usize,
    /// Shares of advancing plus declining days; flat days are left out.
    pub advancing_share_pct: Decimal,
    pub declining_share_pct: Decimal,
}

/// A stateless engine for index trend descriptors.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrendEngine;

impl TrendEngine {
    /// Simple moving average of closes, `None` until `window` bars are available.
    pub fn moving_average(store: &TimeSeriesStore, window: usize) -> DerivedSeries<Option<Decimal>> {
        let closes = store.closes();
        let mut values = Vec::with_capacity(closes.len());
        let mut running = Decimal::ZERO;

        for (i, close) in closes.iter().enumerate() {
            running += *close;
            if window > 0 && i >= window {
                running -= closes[i - window];
            }
            let defined = window > 0 && i + 1 >= window;
            values.push(defined.then(|| running / Decimal::from(window)));
        }

        store.derive(format!("sma_{window}"), values)
    }

    /// Cumulative sum of `sign(close - open) * volume` from the first bar.
    pub fn ad_line(store: &TimeSeriesStore) -> DerivedSeries<i64> {
        let values = store
            .bars()
            .iter()
            .scan(0i64, |acc, bar| {
                let volume = i64::try_from(bar.volume).unwrap_or(i64::MAX);
                *acc = acc.saturating_add(bar.direction().saturating_mul(volume));
                Some(*acc)
            })
            .collect();
        store.derive("ad_line", values)
    }

    /// The A/D line rescaled onto `[0, 100]` by its own range. A flat line is all zeros.
    pub fn normalized_ad_line(store: &TimeSeriesStore) -> DerivedSeries<Decimal> {
        let line: Vec<Decimal> = Self::ad_line(store)
            .values()
            .iter()
            .map(|v| Decimal::from(*v))
            .collect();

        let values = match min_max(&line) {
            Some((min, max)) => line.iter().map(|v| rescale_to_percent(*v, min, max)).collect(),
            None => Vec::new(),
        };
        store.derive("ad_line_normalized", values)
    }

    /// Advancing bars over declining bars in a trailing window, with the
    /// declining count floored to one. `None` before the window fills.
    pub fn rolling_ad_ratio(store: &TimeSeriesStore, window: usize) -> DerivedSeries<Option<Decimal>> {
        let directions: Vec<i64> = store.bars().iter().map(|b| b.direction()).collect();

        let values = (0..directions.len())
            .map(|i| {
                if window == 0 || i + 1 < window {
                    return None;
                }
                let slice = &directions[i + 1 - window..=i];
                let advancing = slice.iter().filter(|d| **d > 0).count();
                let declining = slice.iter().filter(|d| **d < 0).count();
                Some(advance_decline_ratio(advancing, declining, ZeroDivisorPolicy::FloorToOne))
            })
            .collect();

        store.derive(format!("ad_ratio_{window}"), values)
    }

    /// Sign of the A/D line change over the trailing `window` bars
    /// (or the whole series when it is shorter).
    pub fn ad_slope(store: &TimeSeriesStore, window: usize) -> Option<Slope> {
        let line = Self::ad_line(store);
        let values = line.values();
        if values.len() < 2 {
            return None;
        }
        let last = *values.last()?;
        let base = values[values.len().saturating_sub(window + 1)];

        Some(match last.cmp(&base) {
            std::cmp::Ordering::Greater => Slope::Rising,
            std::cmp::Ordering::Less => Slope::Falling,
            std::cmp::Ordering::Equal => Slope::Flat,
        })
    }

    /// Latest-bar components. `volatility` is the market's volatility index,
    /// which may be missing or empty. `None` for an empty store.
    pub fn components(store: &TimeSeriesStore, volatility: Option<&TimeSeriesStore>) -> Option<TrendComponents> {
        let Some(latest) = store.last() else {
            tracing::debug!("No bars for {}; no trend components", store.symbol());
            return None;
        };

        let short_ma = Self::moving_average(store, SHORT_MA_WINDOW).last().copied().flatten();
        let long_ma = Self::moving_average(store, LONG_MA_WINDOW).last().copied().flatten();
        let ma_alignment = match (short_ma, long_ma) {
            (Some(short), Some(long)) => Some(MaAlignment::from_levels(latest.close, short, long)),
            _ => None,
        };

        let volatility_level = volatility.and_then(|v| v.last()).map(|b| b.close);

        Some(TrendComponents {
            price: latest.close,
            short_ma,
            long_ma,
            ma_alignment,
            ad_slope: Self::ad_slope(store, AD_RATIO_WINDOW),
            ad_ratio: Self::rolling_ad_ratio(store, AD_RATIO_WINDOW).last().copied().flatten(),
            volatility_level,
            volatility_regime: volatility_level.map(VolatilityRegime::from_level),
        })
    }

    /// `None` for an empty store.
    pub fn period_summary(store: &TimeSeriesStore) -> Option<PeriodSummary> {
        let first = store.first()?;
        let last = store.last()?;
        let bars = store.bars();

        let high = bars.iter().map(|b| b.high).max()?;
        let low = bars.iter().map(|b| b.low).min()?;
        let total_volume: Decimal = bars.iter().map(|b| Decimal::from(b.volume)).sum();
        let advancing_days = bars.iter().filter(|b| b.direction() > 0).count();
        let declining_days = bars.iter().filter(|b| b.direction() < 0).count();
        let directional = advancing_days + declining_days;

        Some(PeriodSummary {
            start_close: first.close,
            end_close: last.close,
            change: last.close - first.close,
            return_pct: ReturnCalculator::period_return(store, 0, store.len() - 1)?,
            high,
            low,
            below_high_pct: -pct_change(high, last.close)?,
            above_low_pct: pct_change(low, last.close)?,
            avg_volume: total_volume / Decimal::from(bars.len()),
            advancing_days,
            declining_days,
            advancing_share_pct: share_pct(advancing_days, directional),
            declining_share_pct: share_pct(declining_days, directional),
        })
    }
}
