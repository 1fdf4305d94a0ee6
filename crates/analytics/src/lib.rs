//! # Market Pulse Analytics Core
//!
//! This crate turns raw daily bars and cross-sectional snapshots into descriptive
//! statistics: seasonal return patterns, market breadth, sector rotation tiers,
//! trend components and a latest-bar indicator snapshot.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of data providers,
//!   configuration or rendering. It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** Every engine is a stateless calculator. Identical inputs
//!   always produce identical outputs, and no engine writes back into its input.
//! - **Total Functions:** Missing data yields `None` or an empty collection rather than an
//!   error. Only the `IndicatorEngine`, which takes caller-supplied parameters, can fail.
//!
//! ## Public API
//!
//! - `ReturnCalculator`: Period and daily percentage returns.
//! - `SeasonalityEngine`: Monthly, weekly, daily and weekday seasonality tables.
//! - `BreadthEngine`: Advance/decline counts, ratio and classification.
//! - `RotationEngine`: Quantile-based Hot/Warm/Cool/Cold sector tiers.
//! - `TrendEngine`: Moving averages, A/D line and classified trend components.
//! - `IndicatorEngine`: RSI, MACD, SMAs, Bollinger bands, volatility and sentiment.
//! - `MarketSchedule`: Open/closed status of the major trading sessions.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod breadth;
pub mod error;
pub mod indicators;
pub mod returns;
pub mod rotation;
pub mod seasonality;
pub mod sessions;
pub mod stats;
pub mod trend;

// Re-export the key components to create a clean, public-facing API.
pub use breadth::{BreadthClassification, BreadthEngine, BreadthResult, SectorOverview, TopMovers};
pub use error::AnalyticsError;
pub use indicators::{IndicatorEngine, IndicatorParams, IndicatorSnapshot, Sentiment};
pub use returns::ReturnCalculator;
pub use rotation::{RotationEngine, RotationReport, RotationTier, SectorRotation};
pub use seasonality::{BucketKey, BucketStatistic, PeriodReturn, SeasonalTable, SeasonalityEngine};
pub use sessions::{MarketSchedule, SessionStatus, SessionTiming};
pub use trend::{TrendComponents, TrendEngine, VolatilityRegime};
