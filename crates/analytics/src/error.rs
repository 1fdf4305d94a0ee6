use thiserror::Error;

/// Errors from the few fallible entry points of this crate.
///
/// The seasonality, breadth, rotation and trend engines are total over their
/// inputs and never return these; only engines that take caller-supplied
/// parameters (and cross the `f64` boundary) do.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Engine received invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("An error occurred during indicator calculation: {0}")]
    IndicatorError(String),

    #[error("Failed to convert value for '{0}' between Decimal and f64")]
    Conversion(String),
}
