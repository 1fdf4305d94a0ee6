use crate::error::CoreError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One trading day's OHLCV record for an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: u64,
}

impl Bar {
    /// Creates a new `Bar`, rejecting values that break the OHLC ordering.
    pub fn new(
        date: NaiveDate,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: u64,
    ) -> Result<Self, CoreError> {
        let bar = Self { date, open, high, low, close, volume };
        bar.validate()?;
        Ok(bar)
    }

    /// A bar carrying only a closing value, as published for volatility indices.
    pub fn close_only(date: NaiveDate, close: Decimal) -> Result<Self, CoreError> {
        Self::new(date, close, close, close, close, 0)
    }

    /// Checks `high >= max(open, close) >= min(open, close) >= low > 0`.
    pub fn validate(&self) -> Result<(), CoreError> {
        let invalid = |reason: &str| CoreError::InvalidBar {
            date: self.date,
            reason: reason.to_string(),
        };

        if self.open <= Decimal::ZERO
            || self.high <= Decimal::ZERO
            || self.low <= Decimal::ZERO
            || self.close <= Decimal::ZERO
        {
            return Err(invalid("prices must be positive"));
        }
        if self.high < self.open.max(self.close) {
            return Err(invalid("high is below open or close"));
        }
        if self.low > self.open.min(self.close) {
            return Err(invalid("low is above open or close"));
        }
        Ok(())
    }

    /// Intraday direction of the bar: `1` when it closed above its open,
    /// `-1` below, `0` when flat.
    pub fn direction(&self) -> i64 {
        match self.close.cmp(&self.open) {
            std::cmp::Ordering::Greater => 1,
            std::cmp::Ordering::Less => -1,
            std::cmp::Ordering::Equal => 0,
        }
    }
}

/// An immutable, chronologically ordered sequence of daily bars for one instrument.
///
/// Derived columns (returns, moving averages) are never written back into the
/// store; they are produced as a separate [`DerivedSeries`] keyed by the same
/// dates via [`TimeSeriesStore::derive`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeriesStore {
    symbol: String,
    bars: Vec<Bar>,
}

impl TimeSeriesStore {
    /// Builds a store, validating every bar and the strict date ordering.
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, CoreError> {
        let symbol = symbol.into();

        for bar in &bars {
            bar.validate()?;
        }
        if let Some(pair) = bars.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(CoreError::UnorderedDates {
                symbol,
                date: pair[1].date,
            });
        }

        Ok(Self { symbol, bars })
    }

    /// Builds a store from a bare closing-value series (e.g. a volatility index).
    pub fn from_closes(
        symbol: impl Into<String>,
        closes: Vec<(NaiveDate, Decimal)>,
    ) -> Result<Self, CoreError> {
        let bars = closes
            .into_iter()
            .map(|(date, close)| Bar::close_only(date, close))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(symbol, bars)
    }

    /// An empty store; what a provider hands back when a fetch fails.
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bars: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<Decimal> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    /// Attaches a computed column to this store's date index.
    ///
    /// `values` is paired positionally with the bars; any surplus on either
    /// side is dropped.
    pub fn derive<T>(&self, name: impl Into<String>, values: Vec<T>) -> DerivedSeries<T> {
        let (dates, values): (Vec<NaiveDate>, Vec<T>) = self
            .bars
            .iter()
            .map(|b| b.date)
            .zip(values)
            .unzip();
        DerivedSeries {
            name: name.into(),
            dates,
            values,
        }
    }
}

/// A computed column keyed by the date index of the `TimeSeriesStore` it was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedSeries<T> {
    name: String,
    dates: Vec<NaiveDate>,
    values: Vec<T>,
}

impl<T> DerivedSeries<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.values.get(index)
    }

    pub fn last(&self) -> Option<&T> {
        self.values.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &T)> {
        self.dates.iter().zip(self.values.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn rejects_high_below_close() {
        let result = Bar::new(day(2), dec!(10), dec!(10.5), dec!(9), dec!(11), 100);
        assert!(matches!(result, Err(CoreError::InvalidBar { .. })));
    }

    #[test]
    fn rejects_non_positive_prices() {
        let result = Bar::new(day(2), dec!(0), dec!(1), dec!(0), dec!(1), 100);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_duplicate_dates() {
        let bars = vec![
            Bar::close_only(day(2), dec!(10)).unwrap(),
            Bar::close_only(day(2), dec!(11)).unwrap(),
        ];
        let result = TimeSeriesStore::new("TEST", bars);
        assert_eq!(
            result,
            Err(CoreError::UnorderedDates {
                symbol: "TEST".to_string(),
                date: day(2)
            })
        );
    }

    #[test]
    fn derive_keys_values_by_bar_dates() {
        let store =
            TimeSeriesStore::from_closes("TEST", vec![(day(2), dec!(10)), (day(3), dec!(11))])
                .unwrap();
        let series = store.derive("double", vec![dec!(20), dec!(22)]);

        assert_eq!(series.name(), "double");
        assert_eq!(series.dates(), &[day(2), day(3)]);
        assert_eq!(series.last(), Some(&dec!(22)));
        // The source store is untouched.
        assert_eq!(store.closes(), vec![dec!(10), dec!(11)]);
    }

    #[test]
    fn bar_direction_follows_close_versus_open() {
        let up = Bar::new(day(2), dec!(10), dec!(12), dec!(9), dec!(11), 5).unwrap();
        let down = Bar::new(day(3), dec!(11), dec!(12), dec!(9), dec!(10), 5).unwrap();
        let flat = Bar::close_only(day(4), dec!(10)).unwrap();
        assert_eq!((up.direction(), down.direction(), flat.direction()), (1, -1, 0));
    }
}
