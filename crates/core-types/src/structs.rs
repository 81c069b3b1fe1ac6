use crate::enums::{Direction, Frequency};
use crate::error::CoreError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Largest accepted magnitude for a logged value or target. Squared deviations
/// of values in this range, summed over any realistic series, stay finite.
pub const MAX_MAGNITUDE: f64 = 1e100;

fn is_representable(value: f64) -> bool {
    value.is_finite() && value.abs() <= MAX_MAGNITUDE
}

/// A single logged value of a tracked quantity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl Observation {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }

    /// The calendar day (UTC) this observation falls on.
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// The goal attached to a tracked quantity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TargetConfig {
    #[serde(default)]
    pub target_value: Option<f64>,
    #[serde(default)]
    pub direction: Direction,
}

impl TargetConfig {
    pub fn new(target_value: Option<f64>, direction: Direction) -> Result<Self, CoreError> {
        let config = Self {
            target_value,
            direction,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        match self.target_value {
            Some(target) if !is_representable(target) => Err(CoreError::InvalidInput(
                "target_value".to_string(),
                format!("must be a finite number within ±{:e}, got {}", MAX_MAGNITUDE, target),
            )),
            _ => Ok(()),
        }
    }
}

/// Expected cadence of a habit-style series (countable daily events).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HabitCadenceConfig {
    #[serde(default)]
    pub daily_target: Option<f64>,
    #[serde(default)]
    pub weekly_target: Option<f64>,
    #[serde(default)]
    pub frequency: Frequency,
}

impl HabitCadenceConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        for (name, target) in [
            ("daily_target", self.daily_target),
            ("weekly_target", self.weekly_target),
        ] {
            if let Some(t) = target {
                if !is_representable(t) || t < 0.0 {
                    return Err(CoreError::InvalidInput(
                        name.to_string(),
                        format!("must be a non-negative number up to {:e}, got {}", MAX_MAGNITUDE, t),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// The wire shape of a series before validation.
#[derive(Debug, Deserialize)]
struct RawSeries {
    #[serde(default)]
    observations: Vec<Observation>,
    #[serde(default)]
    target: TargetConfig,
}

impl TryFrom<RawSeries> for ObservationSeries {
    type Error = CoreError;

    fn try_from(raw: RawSeries) -> Result<Self, Self::Error> {
        ObservationSeries::new(raw.observations, raw.target)
    }
}

/// All observations of one tracked quantity, sorted ascending by timestamp.
///
/// Construction is the validation boundary: non-finite values and values beyond
/// [`MAX_MAGNITUDE`] never get past it, and callers may hand observations over
/// in any order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSeries")]
pub struct ObservationSeries {
    observations: Vec<Observation>,
    target: TargetConfig,
}

impl ObservationSeries {
    pub fn new(mut observations: Vec<Observation>, target: TargetConfig) -> Result<Self, CoreError> {
        target.validate()?;

        if let Some(bad) = observations.iter().find(|o| !is_representable(o.value)) {
            return Err(CoreError::InvalidInput(
                "observation.value".to_string(),
                format!("value {} at {} is not finite or exceeds ±{:e}", bad.value, bad.timestamp, MAX_MAGNITUDE),
            ));
        }

        // Stable sort: same-instant observations keep the caller's order.
        observations.sort_by_key(|o| o.timestamp);
        tracing::trace!(count = observations.len(), "Built observation series.");

        Ok(Self {
            observations,
            target,
        })
    }

    /// A series with no target, direction `Higher`.
    pub fn untargeted(observations: Vec<Observation>) -> Result<Self, CoreError> {
        Self::new(observations, TargetConfig::default())
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn target(&self) -> &TargetConfig {
        &self.target
    }

    pub fn direction(&self) -> Direction {
        self.target.direction
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first(&self) -> Option<&Observation> {
        self.observations.first()
    }

    pub fn latest(&self) -> Option<&Observation> {
        self.observations.last()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.observations.iter().map(|o| o.value)
    }

    /// The most recent `max_len` observations, still ascending.
    pub fn tail(&self, max_len: usize) -> &[Observation] {
        let skip = self.observations.len().saturating_sub(max_len);
        &self.observations[skip..]
    }
}
