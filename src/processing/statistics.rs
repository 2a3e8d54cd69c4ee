use serde::{Deserialize, Serialize};

use crate::state::measurement::Statistic;

/// Summary statistics for one measurement over one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    pub mean: f64,
    pub median: f64,
    pub max: f64,
    pub min: f64,
    /// Population standard deviation; zero for a single value.
    pub std: f64,
}

impl DailyStats {
    /// Compute statistics from values, filtering out NaN and infinities.
    pub fn compute(values: &[f64]) -> Option<Self> {
        let mut vals: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if vals.is_empty() {
            return None;
        }

        let count = vals.len();
        let min = vals.iter().copied().fold(f64::INFINITY, f64::min);
        let max = vals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        // Clamp so rounding in the sum can't push the mean outside [min, max].
        let mean = (vals.iter().sum::<f64>() / count as f64).clamp(min, max);

        vals.sort_by(|a, b| a.total_cmp(b));
        let median = if count % 2 == 0 {
            (vals[count / 2 - 1] + vals[count / 2]) / 2.0
        } else {
            vals[count / 2]
        };

        let variance = vals.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;
        let std = variance.sqrt();

        Some(DailyStats {
            mean,
            median,
            max,
            min,
            std,
        })
    }

    pub fn get(&self, stat: Statistic) -> f64 {
        match stat {
            Statistic::Mean => self.mean,
            Statistic::Median => self.median,
            Statistic::Max => self.max,
            Statistic::Min => self.min,
            Statistic::Std => self.std,
        }
    }

    pub fn set(&mut self, stat: Statistic, value: f64) {
        match stat {
            Statistic::Mean => self.mean = value,
            Statistic::Median => self.median = value,
            Statistic::Max => self.max = value,
            Statistic::Min => self.min = value,
            Statistic::Std => self.std = value,
        }
    }

    /// True when every value is finite, mean and median lie in [min, max]
    /// and std is non-negative.
    pub fn is_consistent(&self) -> bool {
        let within = |v: f64| v >= self.min && v <= self.max;
        Statistic::ALL.iter().all(|&s| self.get(s).is_finite())
            && within(self.mean)
            && within(self.median)
            && self.std >= 0.0
    }

    pub fn band(&self) -> (f64, f64) {
        (self.mean - self.std, self.mean + self.std)
    }
}
