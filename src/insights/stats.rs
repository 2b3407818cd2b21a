//! Statistics helpers for insight generation

use crate::entry::DayAggregate;

/// Variance products below this are treated as zero
const VARIANCE_EPSILON: f64 = 1e-12;

/// Outcome of a Pearson correlation over paired samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PearsonOutcome {
    /// Fewer than 3 pairs
    Insufficient { n: usize },
    /// At least one series has no variance
    NoVariance { n: usize },
    /// Coefficient in [-1, 1]
    Coefficient { r: f64, n: usize },
}

impl PearsonOutcome {
    /// Number of pairs the outcome is based on
    pub fn sample_size(&self) -> usize {
        match *self {
            PearsonOutcome::Insufficient { n }
            | PearsonOutcome::NoVariance { n }
            | PearsonOutcome::Coefficient { n, .. } => n,
        }
    }
}

/// Minimum number of pairs for a correlation
pub const MIN_CORRELATION_PAIRS: usize = 3;

/// Calculate the Pearson correlation coefficient of paired samples
pub fn pearson(x: &[f64], y: &[f64]) -> PearsonOutcome {
    let n = x.len().min(y.len());
    if n < MIN_CORRELATION_PAIRS {
        return PearsonOutcome::Insufficient { n };
    }

    let (x, y) = (&x[..n], &y[..n]);
    let mean_x = mean(x).unwrap_or(0.0);
    let mean_y = mean(y).unwrap_or(0.0);

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y.iter()) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denominator = (var_x * var_y).sqrt();
    if !denominator.is_finite() || denominator < VARIANCE_EPSILON {
        return PearsonOutcome::NoVariance { n };
    }

    let r = (cov / denominator).clamp(-1.0, 1.0);
    PearsonOutcome::Coefficient { r, n }
}

/// Energy/stress pairs for days where both are recorded
pub fn paired_levels(days: &[DayAggregate]) -> (Vec<f64>, Vec<f64>) {
    days.iter()
        .filter_map(|d| match (d.energy_avg, d.stress_avg) {
            (Some(e), Some(s)) => Some((e, s)),
            _ => None,
        })
        .unzip()
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Human-readable correlation strength
pub fn correlation_strength(r: f64) -> &'static str {
    let abs_r = r.abs();
    if abs_r > 0.7 {
        "Strong"
    } else if abs_r > 0.4 {
        "Moderate"
    } else {
        "Weak"
    }
}

/// Confidence for a computed correlation
///
/// Grows with sample size, is penalized when the days with data cover less
/// than 70% of the requested period, and is capped at 1.0.
pub fn correlation_confidence(r: f64, n: usize, period: u32) -> f64 {
    let mut base = if n < 7 {
        0.6
    } else if n < 14 {
        0.8
    } else {
        0.9
    };

    if period > 0 && (n as f64 / period as f64) < 0.7 {
        base *= 0.8;
    }

    (base + r.abs() * 0.2).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pearson_perfect_positive() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![2.0, 4.0, 6.0, 8.0, 10.0];
        match pearson(&x, &y) {
            PearsonOutcome::Coefficient { r, n } => {
                assert!((r - 1.0).abs() < 0.001);
                assert_eq!(n, 5);
            }
            other => panic!("Expected coefficient, got {:?}", other),
        }
    }

    #[test]
    fn test_pearson_perfect_negative() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![10.0, 8.0, 6.0, 4.0, 2.0];
        match pearson(&x, &y) {
            PearsonOutcome::Coefficient { r, .. } => assert!((r + 1.0).abs() < 0.001),
            other => panic!("Expected coefficient, got {:?}", other),
        }
    }

    #[test]
    fn test_pearson_insufficient_pairs() {
        assert_eq!(
            pearson(&[8.0, 8.0], &[2.0, 2.0]),
            PearsonOutcome::Insufficient { n: 2 }
        );
        assert_eq!(pearson(&[], &[]), PearsonOutcome::Insufficient { n: 0 });
    }

    #[test]
    fn test_pearson_no_variance() {
        let x = vec![7.333333333333333; 6];
        let y = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        assert_eq!(pearson(&x, &y), PearsonOutcome::NoVariance { n: 6 });
    }

    #[test]
    fn test_correlation_strength_labels() {
        assert_eq!(correlation_strength(0.8), "Strong");
        assert_eq!(correlation_strength(-0.75), "Strong");
        assert_eq!(correlation_strength(0.5), "Moderate");
        assert_eq!(correlation_strength(-0.41), "Moderate");
        assert_eq!(correlation_strength(0.4), "Weak");
        assert_eq!(correlation_strength(-0.1), "Weak");
    }

    #[test]
    fn test_confidence_bases_and_penalty() {
        // n < 7, full period
        assert!((correlation_confidence(0.0, 5, 5) - 0.6).abs() < 1e-9);
        // 7 <= n < 14
        assert!((correlation_confidence(0.5, 10, 10) - 0.9).abs() < 1e-9);
        // n >= 14, capped
        assert_eq!(correlation_confidence(1.0, 20, 20), 1.0);
        // incomplete period: 10 of 30 days
        assert!((correlation_confidence(0.0, 10, 30) - 0.64).abs() < 1e-9);
    }

    #[test]
    fn test_paired_levels_requires_both() {
        let days = vec![
            DayAggregate {
                date: "2024-03-01".into(),
                energy_avg: Some(5.0),
                stress_avg: Some(3.0),
            },
            DayAggregate {
                date: "2024-03-02".into(),
                energy_avg: Some(6.0),
                stress_avg: None,
            },
        ];
        let (e, s) = paired_levels(&days);
        assert_eq!(e, vec![5.0]);
        assert_eq!(s, vec![3.0]);
    }
}
