//! Open/closed status of the major trading venues.
//!
//! Each session is evaluated against the venue's own wall clock, so daylight
//! saving in New York or London shifts the session in UTC without any special
//! casing here. Open and close times are reported in India Standard Time.

use chrono::{DateTime, Datelike, NaiveTime, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The zone session times are reported in.
pub const REPORTING_TZ: Tz = chrono_tz::Asia::Kolkata;

/// How long before the open a regular session counts as pre-market.
pub const PRE_MARKET_SECS: u32 = 60 * 60;

const WEEKDAYS: [Weekday; 5] = [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri];

/// A wall-clock time, as seconds after local midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct WallTime(u32);

impl WallTime {
    pub const END_OF_DAY: Self = Self(24 * 3600 - 1);

    pub const fn hm(hour: u32, minute: u32) -> Self {
        Self(hour * 3600 + minute * 60)
    }

    pub fn of(time: NaiveTime) -> Self {
        Self(time.num_seconds_from_midnight())
    }

    pub fn to_naive(self) -> Option<NaiveTime> {
        NaiveTime::from_num_seconds_from_midnight_opt(self.0, 0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Open,
    Closed,
    PreMarket,
    /// Sunday evening before an overnight session starts its week.
    PreOpen,
    LunchBreak,
    /// The daily maintenance gap of an overnight session.
    Break,
    Weekend,
}

impl SessionStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Open => "Open",
            Self::Closed => "Closed",
            Self::PreMarket => "Pre-Market",
            Self::PreOpen => "Pre-Open",
            Self::LunchBreak => "Lunch Break",
            Self::Break => "Break",
            Self::Weekend => "Weekend",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRule {
    /// One daytime session per trading day, optionally split by a lunch break.
    Regular { lunch: Option<(WallTime, WallTime)> },
    /// Opens in the evening and closes the next afternoon. The week starts on
    /// Sunday evening and ends on Friday at the close.
    Overnight,
    /// Trades around the clock.
    Continuous,
}

#[derive(Debug, Clone)]
pub struct TradingSession {
    pub name: String,
    pub timezone: Tz,
    pub open: WallTime,
    pub close: WallTime,
    pub days: Vec<Weekday>,
    pub rule: SessionRule,
}

impl TradingSession {
    fn regular(name: &str, timezone: Tz, open: WallTime, close: WallTime) -> Self {
        Self {
            name: name.to_string(),
            timezone,
            open,
            close,
            days: WEEKDAYS.to_vec(),
            rule: SessionRule::Regular { lunch: None },
        }
    }

    /// Status at a local weekday and wall-clock time of the venue.
    pub fn status_at(&self, weekday: Weekday, time: WallTime) -> SessionStatus {
        if !self.days.contains(&weekday) {
            return SessionStatus::Weekend;
        }

        match self.rule {
            SessionRule::Continuous => SessionStatus::Open,
            SessionRule::Overnight => match weekday {
                Weekday::Sat => SessionStatus::Closed,
                Weekday::Sun if time < self.open => SessionStatus::PreOpen,
                Weekday::Sun => SessionStatus::Open,
                Weekday::Fri if time >= self.close => SessionStatus::Closed,
                Weekday::Fri => SessionStatus::Open,
                _ if time >= self.close && time < self.open => SessionStatus::Break,
                _ => SessionStatus::Open,
            },
            SessionRule::Regular { lunch } => {
                if lunch.is_some_and(|(start, end)| start <= time && time < end) {
                    return SessionStatus::LunchBreak;
                }
                if self.open <= time && time <= self.close {
                    return SessionStatus::Open;
                }
                let until_open = self.open.0.saturating_sub(time.0);
                if until_open > 0 && until_open <= PRE_MARKET_SECS {
                    SessionStatus::PreMarket
                } else {
                    SessionStatus::Closed
                }
            }
        }
    }

    pub fn status(&self, now: DateTime<Utc>) -> SessionStatus {
        let local = now.with_timezone(&self.timezone);
        self.status_at(local.weekday(), WallTime::of(local.time()))
    }

    /// Today's open and close in the venue's zone, converted to `REPORTING_TZ`.
    /// `None` for a wall time skipped by a daylight-saving change.
    fn reported(&self, now: DateTime<Utc>, wall: WallTime) -> Option<NaiveTime> {
        let today = now.with_timezone(&self.timezone).date_naive();
        let local = self
            .timezone
            .from_local_datetime(&today.and_time(wall.to_naive()?))
            .earliest()?;
        Some(local.with_timezone(&REPORTING_TZ).time())
    }
}

/// One row of the session overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTiming {
    pub market: String,
    pub status: SessionStatus,
    pub open_reported: Option<NaiveTime>,
    pub close_reported: Option<NaiveTime>,
    pub local_time: NaiveTime,
}

#[derive(Debug, Clone)]
pub struct MarketSchedule {
    pub sessions: Vec<TradingSession>,
}

impl Default for MarketSchedule {
    fn default() -> Self {
        Self::standard()
    }
}

impl MarketSchedule {
    /// NSE, NYSE, LSE, Tokyo, CME gold and crypto.
    pub fn standard() -> Self {
        let tokyo = TradingSession {
            rule: SessionRule::Regular {
                lunch: Some((WallTime::hm(11, 30), WallTime::hm(12, 30))),
            },
            ..TradingSession::regular("Japan (Tokyo)", chrono_tz::Asia::Tokyo, WallTime::hm(9, 0), WallTime::hm(15, 0))
        };
        let gold = TradingSession {
            name: "Gold (CME)".to_string(),
            timezone: chrono_tz::America::New_York,
            open: WallTime::hm(18, 0),
            close: WallTime::hm(17, 0),
            days: [&WEEKDAYS[..], &[Weekday::Sun][..]].concat(),
            rule: SessionRule::Overnight,
        };
        let crypto = TradingSession {
            name: "Crypto".to_string(),
            timezone: Tz::UTC,
            open: WallTime::hm(0, 0),
            close: WallTime::END_OF_DAY,
            days: [&WEEKDAYS[..], &[Weekday::Sat, Weekday::Sun][..]].concat(),
            rule: SessionRule::Continuous,
        };

        Self {
            sessions: vec![
                TradingSession::regular("India (NSE)", chrono_tz::Asia::Kolkata, WallTime::hm(9, 15), WallTime::hm(15, 30)),
                TradingSession::regular("USA (NYSE)", chrono_tz::America::New_York, WallTime::hm(9, 30), WallTime::hm(16, 0)),
                TradingSession::regular("Europe (LSE)", chrono_tz::Europe::London, WallTime::hm(8, 0), WallTime::hm(16, 30)),
                tokyo,
                gold,
                crypto,
            ],
        }
    }

    pub fn timings(&self, now: DateTime<Utc>) -> Vec<SessionTiming> {
        self.sessions
            .iter()
            .map(|session| SessionTiming {
                market: session.name.clone(),
                status: session.status(now),
                open_reported: session.reported(now, session.open),
                close_reported: session.reported(now, session.close),
                local_time: now.with_timezone(&session.timezone).time(),
            })
            .collect()
    }
}
