use crate::stats::pct_change;
use core_types::{Bar, DerivedSeries, TimeSeriesStore};
use rust_decimal::Decimal;

/// A stateless calculator for period-over-period percentage returns.
///
/// Undefined returns (empty slice, out-of-range index, zero base price) come
/// back as `None` rather than an error so callers can simply skip them.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReturnCalculator;

impl ReturnCalculator {
    /// `(close[end] - close[start]) / close[start] * 100`.
    pub fn period_return(store: &TimeSeriesStore, start: usize, end: usize) -> Option<Decimal> {
        if start > end {
            return None;
        }
        let first = store.get(start)?;
        let last = store.get(end)?;
        pct_change(first.close, last.close)
    }

    /// Close-to-close return of bar `index` against the bar before it.
    /// Index 0 has no predecessor and therefore no return.
    pub fn daily_return(store: &TimeSeriesStore, index: usize) -> Option<Decimal> {
        if index == 0 {
            return None;
        }
        Self::period_return(store, index - 1, index)
    }

    /// Daily returns for every bar, aligned with the store's dates.
    pub fn daily_returns(store: &TimeSeriesStore) -> DerivedSeries<Option<Decimal>> {
        let values = (0..store.len())
            .map(|i| Self::daily_return(store, i))
            .collect();
        store.derive("daily_return_pct", values)
    }

    /// First-to-last return over a contiguous run of bars (a month, a week).
    ///
    /// A single bar yields exactly zero.
    pub fn slice_return(bars: &[Bar]) -> Option<Decimal> {
        let first = bars.first()?;
        let last = bars.last()?;
        pct_change(first.close, last.close)
    }
}
