use crate::error::AnalyticsError;
use configuration::ProgressThresholds;
use core_types::{CoreError, Direction};
use serde::{Deserialize, Serialize};

/// How far a current value is toward its target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressResult {
    /// Always within `[0, 100]`.
    pub percentage: f64,
    pub is_on_track: bool,
    /// The "at target" milestone: percentage at or above the milestone ratio.
    pub is_at_target: bool,
}

fn clamp_percentage(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 100.0) }
}

/// Percentage when the ratio itself is undefined: all or nothing.
fn met_or_missed(met: bool) -> f64 {
    if met { 100.0 } else { 0.0 }
}

fn require_finite(name: &str, value: f64) -> Result<(), AnalyticsError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CoreError::InvalidInput(name.to_string(), format!("must be a finite number, got {}", value)).into())
    }
}

/// Scores `current` against an optional `target` for the given direction.
///
/// A missing target is never "off track". Division-by-zero cases collapse to
/// 0 or 100 so the percentage is always a finite number in `[0, 100]`.
pub fn calculate_progress(
    current: f64,
    target: Option<f64>,
    direction: Direction,
    thresholds: &ProgressThresholds,
) -> Result<ProgressResult, AnalyticsError> {
    require_finite("current", current)?;

    let Some(target) = target else {
        return Ok(ProgressResult {
            percentage: 0.0,
            is_on_track: true,
            is_at_target: false,
        });
    };
    require_finite("target", target)?;

    let (raw_percentage, is_on_track) = match direction {
        Direction::Higher => {
            let on_track = current >= thresholds.on_track_ratio * target;
            let pct = if target == 0.0 {
                met_or_missed(current >= target)
            } else {
                current / target * 100.0
            };
            (pct, on_track)
        }
        Direction::Lower => {
            if current == 0.0 && target > 0.0 {
                (0.0, false)
            } else {
                let on_track = current <= thresholds.lower_tolerance_ratio * target;
                let pct = if current == 0.0 {
                    met_or_missed(on_track)
                } else {
                    target / current * 100.0
                };
                (pct, on_track)
            }
        }
        Direction::Target => {
            let band = thresholds.target_band_ratio * target.abs();
            let distance = (current - target).abs();
            let pct = if band == 0.0 {
                met_or_missed(distance == 0.0)
            } else {
                100.0 - distance / band * 100.0
            };
            (pct, distance <= band)
        }
    };

    let percentage = clamp_percentage(raw_percentage);
    let is_at_target = percentage >= thresholds.milestone_ratio * 100.0;

    tracing::debug!(
        current,
        target,
        ?direction,
        percentage,
        is_on_track,
        "Progress computed."
    );

    Ok(ProgressResult {
        percentage,
        is_on_track,
        is_at_target,
    })
}
