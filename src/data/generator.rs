use chrono::{Duration, NaiveDateTime};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use thiserror::Error;

use crate::state::measurement::Measurement;

/// One hourly observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: NaiveDateTime,
    pub measurement: Measurement,
    pub value: f64,
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error("sample count must be positive, got {0}")]
    InvalidSampleCount(usize),
    #[error("invalid distribution for {measurement}: {reason}")]
    Distribution {
        measurement: Measurement,
        reason: String,
    },
}

/// Columns are drawn in this order so a given seed always yields the same
/// series per measurement.
const DRAW_ORDER: [Measurement; 2] = [Measurement::No2, Measurement::Co2];

/// Generate `n_hours` synthetic samples per measurement, one per hour counting
/// backwards from `reference` (most recent first).
///
/// Values are folded to be non-negative, so the distribution is not a true
/// Gaussian near zero.
pub fn generate_samples(
    n_hours: usize,
    reference: NaiveDateTime,
    seed: u64,
) -> Result<Vec<Sample>, DataError> {
    if n_hours == 0 {
        return Err(DataError::InvalidSampleCount(n_hours));
    }

    let timestamps: Vec<NaiveDateTime> = (0..n_hours)
        .map(|h| reference - Duration::hours(h as i64))
        .collect();

    let mut rng = StdRng::seed_from_u64(seed);
    let mut samples = Vec::with_capacity(n_hours * DRAW_ORDER.len());

    for measurement in DRAW_ORDER {
        let (loc, scale) = measurement.distribution();
        let normal = Normal::new(loc, scale).map_err(|e| DataError::Distribution {
            measurement,
            reason: e.to_string(),
        })?;
        for &timestamp in &timestamps {
            samples.push(Sample {
                timestamp,
                measurement,
                value: normal.sample(&mut rng).abs(),
            });
        }
    }

    tracing::debug!(n_hours, seed, total = samples.len(), "generated synthetic samples");
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn reference() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 6, 26)
            .unwrap()
            .and_hms_opt(23, 0, 0)
            .unwrap()
    }

    #[test]
    fn produces_n_non_negative_samples_per_measurement() {
        for n in [1, 7, 48, 500] {
            let samples = generate_samples(n, reference(), 10).unwrap();
            for m in Measurement::ALL {
                let count = samples.iter().filter(|s| s.measurement == m).count();
                assert_eq!(count, n);
            }
            assert!(samples.iter().all(|s| s.value >= 0.0 && s.value.is_finite()));
        }
    }

    #[test]
    fn rejects_zero_hours() {
        let err = generate_samples(0, reference(), 10).unwrap_err();
        assert!(matches!(err, DataError::InvalidSampleCount(0)));
    }

    #[test]
    fn timestamps_step_back_hourly() {
        let samples = generate_samples(3, reference(), 1).unwrap();
        let co2: Vec<NaiveDateTime> = samples
            .iter()
            .filter(|s| s.measurement == Measurement::Co2)
            .map(|s| s.timestamp)
            .collect();
        assert_eq!(co2[0], reference());
        assert_eq!(co2[1], reference() - Duration::hours(1));
        assert_eq!(co2[2], reference() - Duration::hours(2));
    }

    #[test]
    fn same_seed_is_reproducible() {
        let a = generate_samples(100, reference(), 10).unwrap();
        let b = generate_samples(100, reference(), 10).unwrap();
        assert_eq!(a, b);

        let c = generate_samples(100, reference(), 11).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn values_centre_near_distribution_mean() {
        let samples = generate_samples(4000, reference(), 10).unwrap();
        for m in Measurement::ALL {
            let values: Vec<f64> = samples
                .iter()
                .filter(|s| s.measurement == m)
                .map(|s| s.value)
                .collect();
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            let (loc, _) = m.distribution();
            assert!((mean - loc).abs() < 3.0, "{m}: mean {mean} far from {loc}");
        }
    }
}
