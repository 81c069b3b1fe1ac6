//! # Momentum Core Types
//!
//! Layer 0 of the workspace: the plain data model shared by every other crate.
//! Observations, series, per-quantity configuration and the insight-cache contract
//! live here. Nothing in this crate performs analytics.

pub mod enums;
pub mod error;
pub mod insight;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{Aggregation, Direction, Frequency, InsightKind, PeriodGranularity, PredictionMethod};
pub use error::CoreError;
pub use insight::{InsightRecord, InsightStore};
pub use structs::{HabitCadenceConfig, MAX_MAGNITUDE, Observation, ObservationSeries, TargetConfig};
