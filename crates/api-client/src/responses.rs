use crate::error::ApiError;
use chrono::{DateTime, NaiveDate};
use core_types::Bar;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;

// Using `#[serde(rename_all = "camelCase")]` to automatically map from JSON camelCase to Rust snake_case.

/// The envelope of a `GET /v8/finance/chart/{symbol}` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartResponse {
    pub chart: Chart,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

/// Represents an error response from the chart API.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartError {
    pub code: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
    pub meta: Option<ChartMeta>,
    /// Absent when the requested range holds no trading days.
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub symbol: Option<String>,
    pub currency: Option<String>,
    /// Offset of the exchange's local time from UTC, in seconds.
    pub gmtoffset: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Indicators {
    pub quote: Vec<QuoteColumns>,
}

/// Column-oriented OHLCV values, index-aligned with `ChartResult::timestamp`.
/// Any cell may be `null` for halted or partial sessions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QuoteColumns {
    pub open: Vec<Option<f64>>,
    pub high: Vec<Option<f64>>,
    pub low: Vec<Option<f64>>,
    pub close: Vec<Option<f64>>,
    pub volume: Vec<Option<u64>>,
}

/// Parses a chart response body into its first result.
pub fn parse_chart(symbol: &str, body: &str) -> Result<ChartResult, ApiError> {
    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))?;

    if let Some(error) = response.chart.error {
        return Err(ApiError::ApiError {
            code: error.code,
            description: error.description,
        });
    }

    response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| ApiError::NoData(symbol.to_string()))
}

impl ChartResult {
    /// Converts the columns into validated, strictly date-ordered bars.
    ///
    /// Rows with a null field or an impossible OHLC combination are skipped.
    /// When two rows fall on the same trading date the later one wins, which
    /// replaces a stale daily row with the in-progress session.
    pub fn into_bars(self, symbol: &str) -> Vec<Bar> {
        let offset = self.meta.as_ref().and_then(|m| m.gmtoffset).unwrap_or(0);
        let Some(quote) = self.indicators.quote.into_iter().next() else {
            return Vec::new();
        };

        let mut bars: Vec<Bar> = Vec::with_capacity(self.timestamp.len());
        for (i, ts) in self.timestamp.iter().enumerate() {
            let bar = match row_to_bar(&quote, i, *ts + offset) {
                Ok(bar) => bar,
                Err(reason) => {
                    tracing::warn!(symbol, index = i, "Skipping chart row: {reason}");
                    continue;
                }
            };

            match bars.last_mut() {
                Some(prev) if prev.date == bar.date => *prev = bar,
                Some(prev) if prev.date > bar.date => {
                    tracing::warn!(symbol, date = %bar.date, "Skipping out-of-order chart row");
                }
                _ => bars.push(bar),
            }
        }
        bars
    }
}

fn row_to_bar(quote: &QuoteColumns, i: usize, local_ts: i64) -> Result<Bar, String> {
    let cell = |column: &[Option<f64>], name: &str| -> Result<Decimal, String> {
        let value = column
            .get(i)
            .copied()
            .flatten()
            .ok_or_else(|| format!("missing {name}"))?;
        Decimal::from_f64(value)
            .map(|d| d.round_dp(4))
            .ok_or_else(|| format!("unrepresentable {name}: {value}"))
    };

    let date = timestamp_to_date(local_ts).ok_or_else(|| format!("invalid timestamp {local_ts}"))?;
    let volume = quote.volume.get(i).copied().flatten().unwrap_or(0);

    Bar::new(
        date,
        cell(&quote.open, "open")?,
        cell(&quote.high, "high")?,
        cell(&quote.low, "low")?,
        cell(&quote.close, "close")?,
        volume,
    )
    .map_err(|e| e.to_string())
}

fn timestamp_to_date(secs: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    // 2024-03-04 .. 2024-03-07, 14:30 UTC, plus a same-day live row.
    const BODY: &str = r#"{
        "chart": {
            "result": [{
                "meta": { "symbol": "^NSEI", "currency": "INR", "gmtoffset": 19800 },
                "timestamp": [1709562600, 1709649000, 1709735400, 1709821800, 1709825400],
                "indicators": { "quote": [{
                    "open":   [100.0, null,  102.0, 103.0, 103.0],
                    "high":   [102.0, 103.0, 102.5, 105.0, 106.0],
                    "low":    [ 99.0, 100.0, 101.0, 102.0, 102.5],
                    "close":  [101.0, 102.5, 103.0, 104.0, 105.5],
                    "volume": [1000,  2000,  3000,  null,  4000]
                }]}
            }],
            "error": null
        }
    }"#;

    #[test]
    fn skips_null_and_invalid_rows_and_keeps_latest_duplicate() {
        let bars = parse_chart("^NSEI", BODY).unwrap().into_bars("^NSEI");

        // Row 1 has a null open, row 2 has its high below the close and
        // rows 3 and 4 share a trading date.
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(bars[0].close, dec!(101));
        assert_eq!(bars[1].date, NaiveDate::from_ymd_opt(2024, 3, 7).unwrap());
        assert_eq!(bars[1].close, dec!(105.5));
        assert_eq!(bars[1].volume, 4000);
    }

    #[test]
    fn surfaces_chart_errors() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = parse_chart("NOPE", body).unwrap_err();
        assert!(matches!(err, ApiError::ApiError { ref code, .. } if code == "Not Found"));
    }

    #[test]
    fn empty_result_is_no_data() {
        let body = r#"{"chart":{"result":[],"error":null}}"#;
        assert!(matches!(parse_chart("X", body), Err(ApiError::NoData(_))));
    }

    #[test]
    fn malformed_body_is_a_deserialization_error() {
        assert!(matches!(parse_chart("X", "<html>"), Err(ApiError::Deserialization(_))));
    }
}
