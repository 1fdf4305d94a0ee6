use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Bar on {date} violates OHLC ordering: {reason}")]
    InvalidBar { date: NaiveDate, reason: String },

    #[error("Bars for {symbol} are not strictly increasing at {date}")]
    UnorderedDates { symbol: String, date: NaiveDate },
}
