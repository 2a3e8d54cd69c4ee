use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Startup settings. Every field is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub window_title: String,
    /// Hours of synthetic history to generate.
    pub n_hours: usize,
    pub seed: u64,
    /// Most recent sample time; local now when unset.
    pub reference_time: Option<NaiveDateTime>,
    /// Bounds of the value-range control and its initial selection.
    pub y_range: (f64, f64),
    pub initial_measurements: Vec<String>,
    pub csv_file_name: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            window_title: "Daily Atmospheric NO2 and CO2 Concentration".to_string(),
            n_hours: 4000,
            seed: 10,
            reference_time: None,
            y_range: (0.0, 160.0),
            initial_measurements: vec!["CO2".to_string()],
            csv_file_name: "data.csv".to_string(),
        }
    }
}

impl DashboardConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: DashboardConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Config from the file named by the first command-line argument, or
    /// defaults when none is given.
    pub fn from_args() -> Result<Self, ConfigError> {
        match std::env::args_os().nth(1) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_hours == 0 {
            return Err(ConfigError::Invalid("n_hours must be positive".into()));
        }
        let (lo, hi) = self.y_range;
        if !lo.is_finite() || !hi.is_finite() || lo >= hi {
            return Err(ConfigError::Invalid(format!("bad y_range ({lo}, {hi})")));
        }
        Ok(())
    }
}
