use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::state::measurement::{Measurement, Statistic};

/// How the mean line of a measurement is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerMode {
    #[serde(rename = "lines")]
    Lines,
    #[serde(rename = "markers")]
    Markers,
    #[serde(rename = "lines+markers")]
    LinesAndMarkers,
}

impl Default for MarkerMode {
    fn default() -> Self {
        MarkerMode::LinesAndMarkers
    }
}

impl MarkerMode {
    pub const ALL: [MarkerMode; 3] = [
        MarkerMode::LinesAndMarkers,
        MarkerMode::Lines,
        MarkerMode::Markers,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MarkerMode::Lines => "Lines",
            MarkerMode::Markers => "Markers",
            MarkerMode::LinesAndMarkers => "Lines and markers",
        }
    }

    pub fn draws_line(&self) -> bool {
        matches!(self, MarkerMode::Lines | MarkerMode::LinesAndMarkers)
    }

    pub fn draws_markers(&self) -> bool {
        matches!(self, MarkerMode::Markers | MarkerMode::LinesAndMarkers)
    }
}

/// Colour per statistic for one measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatColors {
    pub mean: [u8; 4],
    pub median: [u8; 4],
    pub std: [u8; 4],
    pub max: [u8; 4],
    pub min: [u8; 4],
}

impl StatColors {
    pub fn get(&self, stat: Statistic) -> [u8; 4] {
        match stat {
            Statistic::Mean => self.mean,
            Statistic::Median => self.median,
            Statistic::Max => self.max,
            Statistic::Min => self.min,
            Statistic::Std => self.std,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementStyle {
    pub colors: StatColors,
    pub marker_mode: MarkerMode,
}

impl MeasurementStyle {
    pub fn default_for(measurement: Measurement) -> Self {
        let colors = match measurement {
            Measurement::Co2 => StatColors {
                mean: [99, 110, 250, 255],   // #636EFA
                median: [239, 85, 59, 255],  // #EF553B
                std: [254, 203, 82, 255],    // #FECB52
                max: [171, 99, 250, 255],    // #AB63FA
                min: [0, 204, 150, 255],     // #00CC96
            },
            Measurement::No2 => StatColors {
                mean: [31, 119, 180, 255],   // #1F77B4
                median: [255, 127, 14, 255], // #FF7F0E
                std: [25, 211, 243, 255],    // #19D3F3
                max: [214, 39, 40, 255],     // #D62728
                min: [140, 86, 75, 255],     // #8C564B
            },
        };
        Self {
            colors,
            marker_mode: MarkerMode::default(),
        }
    }
}

/// Display settings for every measurement. Passed by value into each render;
/// editing it never touches the underlying data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleConfig {
    pub measurements: BTreeMap<Measurement, MeasurementStyle>,
}

impl StyleConfig {
    pub fn get(&self, measurement: Measurement) -> MeasurementStyle {
        self.measurements
            .get(&measurement)
            .copied()
            .unwrap_or_else(|| MeasurementStyle::default_for(measurement))
    }

    pub fn get_mut(&mut self, measurement: Measurement) -> &mut MeasurementStyle {
        self.measurements
            .entry(measurement)
            .or_insert_with(|| MeasurementStyle::default_for(measurement))
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            measurements: Measurement::ALL
                .iter()
                .map(|&m| (m, MeasurementStyle::default_for(m)))
                .collect(),
        }
    }
}

pub fn color32(color: [u8; 4]) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(color[0], color[1], color[2], color[3])
}

/// Format as `#RRGGBB`, the form colour inputs report.
pub fn to_hex(color: [u8; 4]) -> String {
    format!("#{:02X}{:02X}{:02X}", color[0], color[1], color[2])
}
