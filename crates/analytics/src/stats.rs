//! Small numeric helpers shared by the engines.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let sum: Decimal = values.iter().sum();
    Some(sum / Decimal::from(values.len()))
}

/// Quantile using linear interpolation between closest ranks.
///
/// For `n` sorted values the position is `q * (n - 1)`; the result is
/// interpolated between the two values either side of it. `q` is clamped to
/// `[0, 1]`. Returns `None` for an empty slice.
pub fn quantile_linear(values: &[Decimal], q: Decimal) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort();

    let q = q.clamp(Decimal::ZERO, Decimal::ONE);
    let position = q * Decimal::from(sorted.len() - 1);
    let lower = position.floor();
    let fraction = position - lower;

    let lower_index = lower.to_usize()?;
    let upper_index = (lower_index + 1).min(sorted.len() - 1);

    let low = sorted[lower_index];
    let high = sorted[upper_index];
    Some(low + (high - low) * fraction)
}

/// The min and max of a slice, `None` when empty.
pub fn min_max(values: &[Decimal]) -> Option<(Decimal, Decimal)> {
    values.iter().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((min, max)) => Some((min.min(v), max.max(v))),
    })
}

/// Rescales `value` from `[min, max]` onto `[0, 100]`.
///
/// A zero-width range yields `0`.
pub fn rescale_to_percent(value: Decimal, min: Decimal, max: Decimal) -> Decimal {
    if max == min {
        return Decimal::ZERO;
    }
    (value - min) / (max - min) * Decimal::ONE_HUNDRED
}

/// `part / whole * 100`, or zero when `whole` is zero.
pub fn share_pct(part: usize, whole: usize) -> Decimal {
    if whole == 0 {
        return Decimal::ZERO;
    }
    Decimal::from(part) / Decimal::from(whole) * Decimal::ONE_HUNDRED
}

/// How an advance/decline ratio treats a zero declining count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZeroDivisorPolicy {
    /// Report the advancing count itself (snapshot breadth).
    AdvancingSentinel,
    /// Divide by one instead of zero (rolling window ratio).
    FloorToOne,
}

/// Ratio of advancing to declining counts.
///
/// The two policies are kept apart because the snapshot and the rolling
/// ratio are defined separately; over integer counts they agree.
pub fn advance_decline_ratio(advancing: usize, declining: usize, policy: ZeroDivisorPolicy) -> Decimal {
    if declining > 0 {
        return Decimal::from(advancing) / Decimal::from(declining);
    }
    match policy {
        ZeroDivisorPolicy::AdvancingSentinel => Decimal::from(advancing),
        ZeroDivisorPolicy::FloorToOne => Decimal::from(advancing) / Decimal::ONE,
    }
}

/// Percentage change from `from` to `to`, `None` when `from` is zero.
pub fn pct_change(from: Decimal, to: Decimal) -> Option<Decimal> {
    if from.is_zero() {
        return None;
    }
    Some((to - from) / from * Decimal::ONE_HUNDRED)
}
