use crate::error::AnalyticsError;
use crate::returns::ReturnCalculator;
use crate::stats::{mean, pct_change};
use core_types::TimeSeriesStore;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use ta::Next as _;
use ta::indicators::{BollingerBands, MovingAverageConvergenceDivergence as Macd, RelativeStrengthIndex as Rsi};

/// Trading days per year used to annualize realized volatility.
const TRADING_DAYS: u32 = 252;

/// Parameters for the latest-bar indicator snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorParams {
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bb_period: usize,
    pub bb_std_dev: Decimal,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bb_period: 20,
            bb_std_dev: dec!(2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Bullish,
    Neutral,
    Bearish,
}

impl Sentiment {
    /// Above 20 bullish, below -20 bearish.
    pub fn from_score(score: i32) -> Self {
        if score > 20 {
            Self::Bullish
        } else if score < -20 {
            Self::Bearish
        } else {
            Self::Neutral
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// The inputs of the composite sentiment score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentimentInputs {
    pub rsi: Decimal,
    pub macd_histogram: Decimal,
    pub close: Decimal,
    pub sma_20: Decimal,
    /// Only considered when the series holds at least 50 bars.
    pub sma_50: Option<Decimal>,
    /// Change against the close four bars back, when at least five bars exist.
    pub five_bar_change_pct: Option<Decimal>,
}

impl SentimentInputs {
    pub fn score(&self) -> i32 {
        let mut score = 0;

        score += if self.rsi < dec!(30) {
            30
        } else if self.rsi > dec!(70) {
            -30
        } else if self.rsi < dec!(40) {
            15
        } else if self.rsi > dec!(60) {
            -15
        } else {
            0
        };

        score += if self.macd_histogram > Decimal::ZERO { 20 } else { -20 };
        score += if self.close > self.sma_20 { 15 } else { -15 };

        if let Some(sma_50) = self.sma_50 {
            score += if self.sma_20 > sma_50 { 15 } else { -15 };
        }

        if let Some(change) = self.five_bar_change_pct {
            score += if change > dec!(2) {
                20
            } else if change < dec!(-2) {
                -20
            } else if change > Decimal::ZERO {
                10
            } else {
                -10
            };
        }

        score
    }
}

/// Technical indicators as of the latest bar of a series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub close: Decimal,
    pub rsi: Decimal,
    pub macd: Decimal,
    pub macd_signal: Decimal,
    pub macd_histogram: Decimal,
    /// Simple moving averages; the latest close when the series is shorter than the window.
    pub sma_20: Decimal,
    pub sma_50: Decimal,
    pub sma_200: Decimal,
    pub bb_upper: Decimal,
    pub bb_middle: Decimal,
    pub bb_lower: Decimal,
    /// Annualized, in percent. `None` with fewer than two daily returns.
    pub realized_volatility_pct: Option<Decimal>,
    pub sentiment_score: i32,
    pub sentiment: Sentiment,
}

/// Computes [`IndicatorSnapshot`]s. The `ta` indicators are configured once
/// and cloned fresh for each series, so evaluation never carries state over.
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    params: IndicatorParams,
    rsi: Rsi,
    macd: Macd,
    bb: BollingerBands,
}

impl IndicatorEngine {
    pub fn new(params: IndicatorParams) -> Result<Self, AnalyticsError> {
        if params.rsi_period == 0 || params.bb_period == 0 {
            return Err(AnalyticsError::InvalidParameters(
                "Indicator periods cannot be zero".to_string(),
            ));
        }
        if params.macd_fast >= params.macd_slow {
            return Err(AnalyticsError::InvalidParameters(
                "MACD fast period must be shorter than the slow period".to_string(),
            ));
        }
        if params.bb_std_dev <= Decimal::ZERO {
            return Err(AnalyticsError::InvalidParameters(
                "Bollinger band width must be positive".to_string(),
            ));
        }

        let bb_std_dev = params
            .bb_std_dev
            .to_f64()
            .ok_or_else(|| AnalyticsError::Conversion("bb_std_dev".to_string()))?;

        Ok(Self {
            rsi: Rsi::new(params.rsi_period)
                .map_err(|e| AnalyticsError::IndicatorError(format!("Failed to initialize RSI: {:?}", e)))?,
            macd: Macd::new(params.macd_fast, params.macd_slow, params.macd_signal)
                .map_err(|e| AnalyticsError::IndicatorError(format!("Failed to initialize MACD: {:?}", e)))?,
            bb: BollingerBands::new(params.bb_period, bb_std_dev)
                .map_err(|e| AnalyticsError::IndicatorError(format!("Failed to initialize Bollinger Bands: {:?}", e)))?,
            params,
        })
    }

    pub fn params(&self) -> &IndicatorParams {
        &self.params
    }

    /// `Ok(None)` for an empty store.
    pub fn evaluate(&self, store: &TimeSeriesStore) -> Result<Option<IndicatorSnapshot>, AnalyticsError> {
        let closes = store.closes();
        let Some(&close) = closes.last() else {
            tracing::debug!("No bars for {}; no indicators", store.symbol());
            return Ok(None);
        };

        let mut rsi = self.rsi.clone();
        let mut macd = self.macd.clone();
        let mut bb = self.bb.clone();

        let mut latest = None;
        for c in &closes {
            let c = c
                .to_f64()
                .ok_or_else(|| AnalyticsError::Conversion("close".to_string()))?;
            latest = Some((rsi.next(c), macd.next(c), bb.next(c)));
        }
        let Some((rsi_value, macd_value, bb_value)) = latest else {
            return Ok(None);
        };

        let sma_20 = sma_or_last(&closes, 20);
        let sma_50 = sma_or_last(&closes, 50);
        let sma_200 = sma_or_last(&closes, 200);

        // RSI is 0/0 until the price has moved; read that as neutral.
        let rsi_value = if rsi_value.is_finite() { rsi_value } else { 50.0 };
        let rsi_value = to_decimal(rsi_value, "rsi")?;
        let macd_histogram = to_decimal(macd_value.histogram, "macd_histogram")?;

        let five_bar_change_pct = closes
            .len()
            .checked_sub(5)
            .and_then(|i| pct_change(closes[i], close));

        let inputs = SentimentInputs {
            rsi: rsi_value,
            macd_histogram,
            close,
            sma_20,
            sma_50: (closes.len() >= 50).then_some(sma_50),
            five_bar_change_pct,
        };
        let sentiment_score = inputs.score();

        Ok(Some(IndicatorSnapshot {
            close,
            rsi: rsi_value,
            macd: to_decimal(macd_value.macd, "macd")?,
            macd_signal: to_decimal(macd_value.signal, "macd_signal")?,
            macd_histogram,
            sma_20,
            sma_50,
            sma_200,
            bb_upper: to_decimal(bb_value.upper, "bb_upper")?,
            bb_middle: to_decimal(bb_value.average, "bb_middle")?,
            bb_lower: to_decimal(bb_value.lower, "bb_lower")?,
            realized_volatility_pct: realized_volatility(store),
            sentiment_score,
            sentiment: Sentiment::from_score(sentiment_score),
        }))
    }
}

/// `stdev(daily % change) * sqrt(252)`, using the sample standard deviation.
pub fn realized_volatility(store: &TimeSeriesStore) -> Option<Decimal> {
    let returns: Vec<Decimal> = ReturnCalculator::daily_returns(store)
        .values()
        .iter()
        .flatten()
        .copied()
        .collect();
    if returns.len() < 2 {
        return None;
    }

    let avg = mean(&returns)?;
    let squared: Decimal = returns.iter().map(|r| (*r - avg) * (*r - avg)).sum();
    let variance = squared / Decimal::from(returns.len() - 1);

    Some(variance.sqrt()? * Decimal::from(TRADING_DAYS).sqrt()?)
}

fn sma_or_last(closes: &[Decimal], window: usize) -> Decimal {
    let value = match closes.len().checked_sub(window) {
        Some(start) => mean(&closes[start..]),
        None => closes.last().copied(),
    };
    value.unwrap_or_default()
}

fn to_decimal(value: f64, field: &str) -> Result<Decimal, AnalyticsError> {
    Decimal::from_f64(value).ok_or_else(|| AnalyticsError::Conversion(field.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn store(closes: &[Decimal]) -> TimeSeriesStore {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let series = closes
            .iter()
            .enumerate()
            .map(|(i, c)| (start + Duration::days(i as i64), *c))
            .collect();
        TimeSeriesStore::from_closes("TEST", series).unwrap()
    }

    #[test]
    fn rejects_zero_periods() {
        let params = IndicatorParams {
            rsi_period: 0,
            ..Default::default()
        };
        assert!(matches!(
            IndicatorEngine::new(params),
            Err(AnalyticsError::InvalidParameters(_))
        ));
    }

    #[test]
    fn rejects_inverted_macd_periods() {
        let params = IndicatorParams {
            macd_fast: 26,
            macd_slow: 12,
            ..Default::default()
        };
        assert!(IndicatorEngine::new(params).is_err());
    }

    #[test]
    fn oversold_uptrend_scores_bullish() {
        let inputs = SentimentInputs {
            rsi: dec!(25),
            macd_histogram: dec!(0.4),
            close: dec!(105),
            sma_20: dec!(100),
            sma_50: Some(dec!(98)),
            five_bar_change_pct: Some(dec!(3)),
        };
        assert_eq!(inputs.score(), 100);
        assert_eq!(Sentiment::from_score(inputs.score()), Sentiment::Bullish);
    }

    #[test]
    fn short_history_skips_optional_terms() {
        let inputs = SentimentInputs {
            rsi: dec!(50),
            macd_histogram: dec!(0),
            close: dec!(100),
            sma_20: dec!(100),
            sma_50: None,
            five_bar_change_pct: None,
        };
        // MACD not positive and close not above SMA20.
        assert_eq!(inputs.score(), -35);
        assert_eq!(Sentiment::from_score(-20), Sentiment::Neutral);
        assert_eq!(Sentiment::from_score(-21), Sentiment::Bearish);
    }

    #[test]
    fn short_series_falls_back_to_latest_close() {
        let closes = [dec!(10), dec!(11), dec!(12)];
        assert_eq!(sma_or_last(&closes, 20), dec!(12));
        assert_eq!(sma_or_last(&closes, 2), dec!(11.5));
    }

    #[test]
    fn flat_series_has_zero_volatility() {
        let s = store(&[dec!(100); 10]);
        assert_eq!(realized_volatility(&s), Some(Decimal::ZERO));
        assert_eq!(realized_volatility(&store(&[dec!(100), dec!(101)])), None);
    }

    #[test]
    fn evaluate_covers_latest_bar() {
        let closes: Vec<Decimal> = (0..60).map(|i| Decimal::from(100 + i)).collect();
        let engine = IndicatorEngine::new(IndicatorParams::default()).unwrap();
        let snapshot = engine.evaluate(&store(&closes)).unwrap().unwrap();

        assert_eq!(snapshot.close, dec!(159));
        assert_eq!(snapshot.sma_20, dec!(149.5));
        assert_eq!(snapshot.sma_200, dec!(159));
        assert!(snapshot.macd > Decimal::ZERO);
        assert!(snapshot.rsi > dec!(50));
        assert!(snapshot.realized_volatility_pct.is_some());

        assert_eq!(engine.evaluate(&TimeSeriesStore::empty("NONE")).unwrap(), None);
    }
}
