use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The gases tracked by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Measurement {
    #[serde(rename = "CO2")]
    Co2,
    #[serde(rename = "NO2")]
    No2,
}

impl Measurement {
    /// Display order for checklists, styles and CSV columns.
    pub const ALL: [Measurement; 2] = [Measurement::Co2, Measurement::No2];

    pub fn name(&self) -> &'static str {
        match self {
            Measurement::Co2 => "CO2",
            Measurement::No2 => "NO2",
        }
    }

    /// Centre and spread of the normal distribution used for synthetic samples.
    pub fn distribution(&self) -> (f64, f64) {
        match self {
            Measurement::Co2 => (80.0, 20.0),
            Measurement::No2 => (50.0, 15.0),
        }
    }

    /// Fill colour of the mean +/- std band. Not user-configurable.
    pub fn band_fill(&self) -> [u8; 4] {
        match self {
            Measurement::Co2 => [128, 128, 128, 255],
            Measurement::No2 => [248, 230, 189, 255],
        }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown measurement '{0}'")]
pub struct UnknownMeasurement(pub String);

impl FromStr for Measurement {
    type Err = UnknownMeasurement;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Measurement::ALL
            .iter()
            .copied()
            .find(|m| m.name() == trimmed)
            .ok_or_else(|| UnknownMeasurement(s.to_string()))
    }
}

/// Per-day summary statistics, in the column order used by exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Statistic {
    Mean,
    Median,
    Max,
    Min,
    Std,
}

impl Statistic {
    pub const ALL: [Statistic; 5] = [
        Statistic::Mean,
        Statistic::Median,
        Statistic::Max,
        Statistic::Min,
        Statistic::Std,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Statistic::Mean => "mean",
            Statistic::Median => "median",
            Statistic::Max => "max",
            Statistic::Min => "min",
            Statistic::Std => "std",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Statistic::ALL.iter().copied().find(|s| s.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_names() {
        assert_eq!("CO2".parse::<Measurement>().unwrap(), Measurement::Co2);
        assert_eq!(" NO2 ".parse::<Measurement>().unwrap(), Measurement::No2);
    }

    #[test]
    fn rejects_unknown_names() {
        let err = "SO2".parse::<Measurement>().unwrap_err();
        assert_eq!(err, UnknownMeasurement("SO2".into()));
        assert!("co2".parse::<Measurement>().is_err());
    }

    #[test]
    fn statistic_names_round_trip() {
        for stat in Statistic::ALL {
            assert_eq!(Statistic::from_name(stat.name()), Some(stat));
        }
        assert_eq!(Statistic::from_name("variance"), None);
    }
}
