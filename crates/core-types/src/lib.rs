//! # Market Pulse Core Types
//!
//! The Layer 0 vocabulary shared by every other crate: daily bars, the
//! per-instrument `TimeSeriesStore`, derived series keyed by the same date
//! index, and the cross-sectional snapshot of a basket of instruments.
//!
//! Invariants are validated at construction so downstream engines can rely on
//! ordered dates and well-formed OHLC values without re-checking them.

pub mod error;
pub mod snapshot;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use error::CoreError;
pub use snapshot::{CrossSectionSnapshot, SnapshotEntry};
pub use structs::{Bar, DerivedSeries, TimeSeriesStore};
