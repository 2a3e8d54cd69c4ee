//! Chart description built from the daily aggregate table.
//!
//! [`build_chart`] is a pure function of the table and a [`RenderRequest`];
//! the UI calls it on every widget change and paints whatever comes back.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::datetime::parse_date;
use crate::processing::aggregation::{date_extent, DailyAggregate};
use crate::state::measurement::{Measurement, UnknownMeasurement};
use crate::state::style::{MarkerMode, StyleConfig};

pub const X_AXIS_TITLE: &str = "Date";
pub const Y_AXIS_TITLE: &str = "Concentration (\u{03bc} mol/m2)";
pub const BAND_OPACITY: f32 = 0.4;

const WHITE: [u8; 4] = [255, 255, 255, 255];
const GRAY: [u8; 4] = [128, 128, 128, 255];
const BLACK: [u8; 4] = [0, 0, 0, 255];

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ChartError {
    #[error("unknown measurement '{0}'")]
    UnknownMeasurement(String),
    #[error("invalid date '{0}'")]
    InvalidDate(String),
    #[error("date range starts after it ends ({start} > {end})")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    #[error("invalid value range ({0}, {1})")]
    InvalidValueRange(f64, f64),
}

impl From<UnknownMeasurement> for ChartError {
    fn from(err: UnknownMeasurement) -> Self {
        ChartError::UnknownMeasurement(err.0)
    }
}

/// Everything needed to draw one chart. Dates and measurement names are kept
/// as the widgets report them and validated here.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub date_range: Option<(String, String)>,
    pub y_range: Option<(f64, f64)>,
    pub measurements: Vec<String>,
    pub style: StyleConfig,
}

/// Which part of a measurement's display a trace belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceRole {
    Mean,
    BandLower,
    BandUpper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fill {
    None,
    /// Fill down to the previous trace.
    ToNextY,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub name: String,
    pub measurement: Measurement,
    pub role: TraceRole,
    pub x: Vec<NaiveDate>,
    pub y: Vec<f64>,
    pub mode: MarkerMode,
    pub color: [u8; 4],
    pub opacity: f32,
    pub fill: Fill,
    pub fill_color: Option<[u8; 4]>,
    pub show_legend: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeSlider {
    pub visible: bool,
    pub range: (NaiveDate, NaiveDate),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateAxis {
    pub title: String,
    pub show_grid: bool,
    pub grid_color: [u8; 4],
    pub zero_line_color: [u8; 4],
    pub range: Option<(NaiveDate, NaiveDate)>,
    pub range_slider: Option<RangeSlider>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueAxis {
    pub title: String,
    pub show_grid: bool,
    pub grid_color: [u8; 4],
    pub zero_line_color: [u8; 4],
    /// `None` means auto-scale.
    pub range: Option<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub title: String,
    pub plot_bg: [u8; 4],
    pub x_axis: DateAxis,
    pub y_axis: ValueAxis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub traces: Vec<Trace>,
    pub layout: Layout,
}

impl ChartSpec {
    pub fn traces_for(&self, measurement: Measurement) -> impl Iterator<Item = &Trace> {
        self.traces.iter().filter(move |t| t.measurement == measurement)
    }
}

fn parse_date_range(range: &(String, String)) -> Result<(NaiveDate, NaiveDate), ChartError> {
    let start = parse_date(&range.0).ok_or_else(|| ChartError::InvalidDate(range.0.clone()))?;
    let end = parse_date(&range.1).ok_or_else(|| ChartError::InvalidDate(range.1.clone()))?;
    if start > end {
        return Err(ChartError::InvalidDateRange { start, end });
    }
    Ok((start, end))
}

fn validate_value_range((lo, hi): (f64, f64)) -> Result<(f64, f64), ChartError> {
    if !lo.is_finite() || !hi.is_finite() || lo >= hi {
        return Err(ChartError::InvalidValueRange(lo, hi));
    }
    Ok((lo, hi))
}

/// Mean line plus the two band boundaries for one measurement.
fn measurement_traces(
    table: &[DailyAggregate],
    measurement: Measurement,
    style: &StyleConfig,
) -> [Trace; 3] {
    let style = style.get(measurement);

    let mut x = Vec::with_capacity(table.len());
    let mut mean = Vec::with_capacity(table.len());
    let mut lower = Vec::with_capacity(table.len());
    let mut upper = Vec::with_capacity(table.len());
    for row in table {
        if let Some(stats) = row.get(measurement) {
            let (lo, hi) = stats.band();
            x.push(row.date);
            mean.push(stats.mean);
            lower.push(lo);
            upper.push(hi);
        }
    }

    let band = |role: TraceRole, y: Vec<f64>| Trace {
        name: format!("{measurement} std"),
        measurement,
        role,
        x: x.clone(),
        y,
        mode: MarkerMode::Lines,
        color: style.colors.std,
        opacity: BAND_OPACITY,
        fill: if role == TraceRole::BandUpper { Fill::ToNextY } else { Fill::None },
        fill_color: (role == TraceRole::BandUpper).then(|| measurement.band_fill()),
        show_legend: false,
    };
    let lower_trace = band(TraceRole::BandLower, lower);
    let upper_trace = band(TraceRole::BandUpper, upper);

    let mean_trace = Trace {
        name: format!("{measurement} mean"),
        measurement,
        role: TraceRole::Mean,
        x,
        y: mean,
        mode: style.marker_mode,
        color: style.colors.mean,
        opacity: 1.0,
        fill: Fill::None,
        fill_color: None,
        show_legend: true,
    };

    [mean_trace, lower_trace, upper_trace]
}

fn layout(x_range: Option<(NaiveDate, NaiveDate)>, y_range: Option<(f64, f64)>) -> Layout {
    Layout {
        title: String::new(),
        plot_bg: WHITE,
        x_axis: DateAxis {
            title: X_AXIS_TITLE.to_string(),
            show_grid: true,
            grid_color: GRAY,
            zero_line_color: BLACK,
            range: x_range,
            range_slider: x_range.map(|range| RangeSlider { visible: true, range }),
        },
        y_axis: ValueAxis {
            title: Y_AXIS_TITLE.to_string(),
            show_grid: true,
            grid_color: GRAY,
            zero_line_color: BLACK,
            range: y_range,
        },
    }
}

/// Build the chart for `request` over the full aggregate table.
///
/// Every requested measurement contributes three traces: the mean line, then
/// the lower and upper band boundaries. Any invalid input rejects the whole
/// request.
pub fn build_chart(table: &[DailyAggregate], request: &RenderRequest) -> Result<ChartSpec, ChartError> {
    let measurements = request
        .measurements
        .iter()
        .map(|name| name.parse::<Measurement>())
        .collect::<Result<Vec<_>, _>>()?;

    let x_range = match &request.date_range {
        Some(range) => Some(parse_date_range(range)?),
        None => date_extent(table),
    };
    let y_range = request.y_range.map(validate_value_range).transpose()?;

    let traces = measurements
        .iter()
        .flat_map(|&m| measurement_traces(table, m, &request.style))
        .collect::<Vec<_>>();

    tracing::debug!(
        measurements = measurements.len(),
        traces = traces.len(),
        "built chart"
    );

    Ok(ChartSpec {
        traces,
        layout: layout(x_range, y_range),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::generator::generate_samples;
    use crate::processing::aggregation::aggregate_daily;

    fn table() -> Vec<DailyAggregate> {
        let reference = NaiveDate::from_ymd_opt(2021, 6, 30)
            .unwrap()
            .and_hms_opt(23, 0, 0)
            .unwrap();
        aggregate_daily(&generate_samples(24 * 30, reference, 10).unwrap())
    }

    fn request(measurements: &[&str]) -> RenderRequest {
        RenderRequest {
            date_range: None,
            y_range: None,
            measurements: measurements.iter().map(|s| s.to_string()).collect(),
            style: StyleConfig::default(),
        }
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 6, day).unwrap()
    }

    #[test]
    fn three_traces_per_measurement() {
        let table = table();
        assert_eq!(build_chart(&table, &request(&[])).unwrap().traces.len(), 0);
        assert_eq!(build_chart(&table, &request(&["CO2"])).unwrap().traces.len(), 3);
        assert_eq!(build_chart(&table, &request(&["CO2", "NO2"])).unwrap().traces.len(), 6);
    }

    #[test]
    fn trace_order_and_styling() {
        let table = table();
        let mut req = request(&["NO2"]);
        req.style.get_mut(Measurement::No2).marker_mode = MarkerMode::Markers;
        req.style.get_mut(Measurement::No2).colors.mean = [1, 2, 3, 255];
        req.style.get_mut(Measurement::No2).colors.std = [4, 5, 6, 255];
        let chart = build_chart(&table, &req).unwrap();

        let roles: Vec<TraceRole> = chart.traces.iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![TraceRole::Mean, TraceRole::BandLower, TraceRole::BandUpper]);

        let mean = &chart.traces[0];
        assert_eq!(mean.name, "NO2 mean");
        assert_eq!(mean.mode, MarkerMode::Markers);
        assert_eq!(mean.color, [1, 2, 3, 255]);
        assert!(mean.show_legend);

        let (lower, upper) = (&chart.traces[1], &chart.traces[2]);
        for band in [lower, upper] {
            assert!(!band.show_legend);
            assert_eq!(band.mode, MarkerMode::Lines);
            assert_eq!(band.opacity, BAND_OPACITY);
            assert_eq!(band.color, [4, 5, 6, 255]);
        }
        assert_eq!(lower.fill, Fill::None);
        assert_eq!(upper.fill, Fill::ToNextY);
        assert_eq!(upper.fill_color, Some(Measurement::No2.band_fill()));
    }

    #[test]
    fn band_brackets_mean_by_std() {
        let table = table();
        let chart = build_chart(&table, &request(&["CO2"])).unwrap();
        let (mean, lower, upper) = (&chart.traces[0], &chart.traces[1], &chart.traces[2]);
        assert_eq!(mean.x.len(), table.len());
        for (i, row) in table.iter().enumerate() {
            let stats = row.get(Measurement::Co2).unwrap();
            assert_eq!(mean.x[i], row.date);
            assert_eq!(mean.y[i], stats.mean);
            assert!((upper.y[i] - lower.y[i] - 2.0 * stats.std).abs() < 1e-9);
        }
    }

    #[test]
    fn band_colors_differ_by_measurement() {
        let chart = build_chart(&table(), &request(&["CO2", "NO2"])).unwrap();
        let fills: Vec<[u8; 4]> = chart.traces.iter().filter_map(|t| t.fill_color).collect();
        assert_eq!(fills.len(), 2);
        assert_ne!(fills[0], fills[1]);
    }

    #[test]
    fn y_range_is_applied_exactly() {
        let mut req = request(&["CO2"]);
        req.y_range = Some((0.0, 160.0));
        let chart = build_chart(&table(), &req).unwrap();
        assert_eq!(chart.layout.y_axis.range, Some((0.0, 160.0)));

        let auto = build_chart(&table(), &request(&["CO2"])).unwrap();
        assert_eq!(auto.layout.y_axis.range, None);
    }

    #[test]
    fn x_range_defaults_to_data_extent() {
        let table = table();
        let chart = build_chart(&table, &request(&["CO2"])).unwrap();
        let extent = (d(1), d(30));
        assert_eq!(chart.layout.x_axis.range, Some(extent));
        assert_eq!(
            chart.layout.x_axis.range_slider,
            Some(RangeSlider { visible: true, range: extent })
        );

        let empty = build_chart(&[], &request(&["CO2"])).unwrap();
        assert_eq!(empty.layout.x_axis.range, None);
        assert_eq!(empty.layout.x_axis.range_slider, None);
        assert!(empty.traces.iter().all(|t| t.x.is_empty()));
    }

    #[test]
    fn x_range_and_slider_follow_request() {
        let mut req = request(&["CO2"]);
        req.date_range = Some(("2021-06-03".into(), "2021-06-26T00:00:00".into()));
        let chart = build_chart(&table(), &req).unwrap();
        assert_eq!(chart.layout.x_axis.range, Some((d(3), d(26))));
        assert_eq!(chart.layout.x_axis.range_slider.unwrap().range, (d(3), d(26)));
        // Data is not sliced; the axis range selects the window.
        assert_eq!(chart.traces[0].x.len(), 30);
    }

    #[test]
    fn layout_is_shared_across_measurements() {
        let table = table();
        let one = build_chart(&table, &request(&["CO2"])).unwrap();
        let both = build_chart(&table, &request(&["CO2", "NO2"])).unwrap();
        assert_eq!(one.layout, both.layout);
        assert_eq!(both.layout.x_axis.title, X_AXIS_TITLE);
        assert_eq!(both.layout.y_axis.title, Y_AXIS_TITLE);
        assert_eq!(both.traces_for(Measurement::No2).count(), 3);
    }

    #[test]
    fn rejects_invalid_requests() {
        let table = table();

        let err = build_chart(&table, &request(&["CO2", "O3"])).unwrap_err();
        assert_eq!(err, ChartError::UnknownMeasurement("O3".into()));

        let mut req = request(&["CO2"]);
        req.date_range = Some(("2021-06-03".into(), "June 26".into()));
        assert_eq!(
            build_chart(&table, &req).unwrap_err(),
            ChartError::InvalidDate("June 26".into())
        );

        req.date_range = Some(("2021-06-26".into(), "2021-06-03".into()));
        assert!(matches!(
            build_chart(&table, &req).unwrap_err(),
            ChartError::InvalidDateRange { .. }
        ));

        let mut req = request(&["CO2"]);
        req.y_range = Some((160.0, 0.0));
        assert_eq!(
            build_chart(&table, &req).unwrap_err(),
            ChartError::InvalidValueRange(160.0, 0.0)
        );
        req.y_range = Some((50.0, 50.0));
        assert_eq!(
            build_chart(&table, &req).unwrap_err(),
            ChartError::InvalidValueRange(50.0, 50.0)
        );
        req.y_range = Some((0.0, f64::NAN));
        assert!(build_chart(&table, &req).is_err());
    }

    #[test]
    fn chart_serializes_to_json() {
        let chart = build_chart(&table(), &request(&["CO2"])).unwrap();
        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["traces"][0]["mode"], "lines+markers");
        assert_eq!(json["traces"][2]["fill"], "ToNextY");
        assert_eq!(json["layout"]["x_axis"]["range"][0], "2021-06-01");
    }
}
