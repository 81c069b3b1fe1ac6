use chrono::Duration;
use configuration::CorrelationSettings;
use core_types::{Observation, ObservationSeries};
use serde::{Deserialize, Serialize};

/// Each series needs this many observations, and the alignment this many pairs.
pub const MIN_PAIRS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    Weak,
    Moderate,
    Strong,
}

impl CorrelationStrength {
    pub fn from_coefficient(r: f64) -> Self {
        let magnitude = r.abs();
        if magnitude >= 0.7 {
            CorrelationStrength::Strong
        } else if magnitude >= 0.4 {
            CorrelationStrength::Moderate
        } else {
            CorrelationStrength::Weak
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationDirection {
    Positive,
    Negative,
    None,
}

/// Linear association between two time-aligned series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    /// Pearson coefficient in `[-1, 1]`.
    pub coefficient: f64,
    pub strength: CorrelationStrength,
    pub direction: CorrelationDirection,
    /// Number of aligned pairs the coefficient was computed from.
    pub sample_size: usize,
}

/// Pairs each observation of `a` with the nearest observation of `b` no further
/// than `window` away. Unmatched `a` observations are dropped.
///
/// Both slices must be sorted ascending by timestamp. Runs as a two-pointer
/// merge; when two candidates are equally close the earlier one wins.
pub fn align_series(a: &[Observation], b: &[Observation], window: Duration) -> Vec<(f64, f64)> {
    let mut pairs = Vec::with_capacity(a.len().min(b.len()));
    if b.is_empty() {
        return pairs;
    }

    let mut j = 0;
    for observation in a {
        while j + 1 < b.len() && b[j + 1].timestamp <= observation.timestamp {
            j += 1;
        }

        let distance = |candidate: &Observation| {
            let delta = candidate.timestamp - observation.timestamp;
            if delta < Duration::zero() { -delta } else { delta }
        };
        let mut nearest = &b[j];
        if let Some(next) = b.get(j + 1) {
            if distance(next) < distance(nearest) {
                nearest = next;
            }
        }

        if distance(nearest) <= window {
            pairs.push((observation.value, nearest.value));
        }
    }

    pairs
}

/// Pearson correlation coefficient. Zero variance on either side yields 0.
pub fn pearson(pairs: &[(f64, f64)]) -> f64 {
    if pairs.is_empty() {
        return 0.0;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut covariance, mut variance_x, mut variance_y) = (0.0, 0.0, 0.0);
    for (x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        covariance += dx * dy;
        variance_x += dx * dx;
        variance_y += dy * dy;
    }

    let denominator = (variance_x * variance_y).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    (covariance / denominator).clamp(-1.0, 1.0)
}

/// Correlates two series after aligning them in time.
///
/// Returns `None` when either series, or the aligned pairs, number fewer than three.
pub fn correlate(
    a: &ObservationSeries,
    b: &ObservationSeries,
    settings: &CorrelationSettings,
) -> Option<CorrelationResult> {
    if a.len() < MIN_PAIRS || b.len() < MIN_PAIRS {
        return None;
    }

    // A window too large to represent pairs everything, like the largest one that is.
    let window = Duration::try_hours(settings.window_hours).unwrap_or(Duration::MAX);
    let pairs = align_series(
        a.tail(settings.max_series_len),
        b.tail(settings.max_series_len),
        window,
    );
    if pairs.len() < MIN_PAIRS {
        tracing::debug!(pairs = pairs.len(), "Not enough aligned pairs to correlate.");
        return None;
    }

    let coefficient = pearson(&pairs);
    let direction = if coefficient > 0.0 {
        CorrelationDirection::Positive
    } else if coefficient < 0.0 {
        CorrelationDirection::Negative
    } else {
        CorrelationDirection::None
    };

    tracing::debug!(coefficient, pairs = pairs.len(), "Correlation computed.");

    Some(CorrelationResult {
        coefficient,
        strength: CorrelationStrength::from_coefficient(coefficient),
        direction,
        sample_size: pairs.len(),
    })
}
