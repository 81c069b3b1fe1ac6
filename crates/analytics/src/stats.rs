//! Small numeric helpers shared by the analyzers.

/// Relative tolerance under which a spread is treated as zero.
const ZERO_SPREAD_TOLERANCE: f64 = 1e-12;

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation around a precomputed mean.
pub(crate) fn population_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// True when `spread` is indistinguishable from rounding noise at the scale of `reference`.
pub(crate) fn is_negligible(spread: f64, reference: f64) -> bool {
    spread <= ZERO_SPREAD_TOLERANCE * reference.abs().max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_std_dev() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let m = mean(&values).unwrap();
        assert_eq!(m, 5.0);
        assert_eq!(population_std_dev(&values, m), 2.0);
        assert!(mean(&[]).is_none());
    }

    #[test]
    fn test_float_noise_is_negligible() {
        let values = [0.1; 10];
        let m = mean(&values).unwrap();
        assert!(is_negligible(population_std_dev(&values, m), m));
        assert!(!is_negligible(0.01, 1.0));
    }
}
