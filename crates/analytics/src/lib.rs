//! # Momentum Analytics Engine
//!
//! This crate turns the observations logged against a metric or habit into trend
//! signals, progress scores, anomaly flags, correlations, forecasts, streaks,
//! completion rates, calendar heatmaps and period-over-period comparisons.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of storage,
//!   UI or network services. It depends only on `core-types` and `configuration`.
//! - **Stateless Calculation:** Every analyzer is a plain function from an immutable
//!   `ObservationSeries` to a freshly built result. `AnalyticsEngine` only bundles the
//!   configured thresholds; it caches nothing.
//! - **Insufficient data is not an error:** too few observations produce `None` or an
//!   empty result. Errors are reserved for invalid input and invalid parameters.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: the facade applying configured defaults to every analyzer.
//! - One module per analyzer (`trend`, `progress`, `anomaly`, `correlation`,
//!   `prediction`, `streak`, `completion`, `heatmap`, `period`).
//! - `SeriesReport`: the combined result, also the insight-cache payload.
//! - `refresh_insight`: recompute-on-expiry against an external `InsightStore`.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod anomaly;
mod calendar;
pub mod completion;
pub mod correlation;
pub mod engine;
pub mod error;
pub mod heatmap;
pub mod insight;
pub mod period;
pub mod prediction;
pub mod progress;
pub mod report;
mod stats;
pub mod streak;
pub mod trend;

#[cfg(test)]
mod test_support;

// Re-export the key components to create a clean, public-facing API.
pub use anomaly::{AnomalyResult, Severity};
pub use completion::CompletionRate;
pub use correlation::{CorrelationDirection, CorrelationResult, CorrelationStrength};
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use heatmap::{Heatmap, HeatmapCell};
pub use insight::refresh_insight;
pub use period::{PeriodComparison, PeriodStats};
pub use prediction::{ConfidenceInterval, PredictionResult};
pub use progress::ProgressResult;
pub use report::{SeriesReport, SeriesSummary};
pub use streak::{Streak, StreakSet};
pub use trend::TrendAnalysis;
