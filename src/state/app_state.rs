use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::config::DashboardConfig;
use crate::data::datetime::format_date;
use crate::processing::aggregation::{date_extent, DailyAggregate};
use crate::render::chart::{build_chart, ChartError, ChartSpec, RenderRequest};
use crate::state::measurement::Measurement;
use crate::state::style::StyleConfig;

pub const VERSION: &str = "0.1.0";

/// Direction for table column sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Current value of every dashboard control.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetState {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub y_range: (f64, f64),
    pub selected: BTreeSet<Measurement>,
    pub style: StyleConfig,
}

impl WidgetState {
    /// Snapshot the widgets as a render request, dates formatted the way a
    /// date picker reports them.
    pub fn to_request(&self) -> RenderRequest {
        RenderRequest {
            date_range: Some((format_date(self.start_date), format_date(self.end_date))),
            y_range: Some(self.y_range),
            measurements: Measurement::ALL
                .iter()
                .filter(|m| self.selected.contains(*m))
                .map(|m| m.name().to_string())
                .collect(),
            style: self.style.clone(),
        }
    }
}

pub struct AppState {
    /// Read-only after startup.
    pub table: Vec<DailyAggregate>,
    pub widgets: WidgetState,
    /// Widget values last submitted for rendering, accepted or not.
    pub rendered_widgets: WidgetState,
    pub chart: ChartSpec,
    /// Limits of the value-range control.
    pub y_limits: (f64, f64),
    pub show_table: bool,
    pub table_sort: Option<(usize, SortDirection)>,
    /// Set when the plot should snap to the chart's axis ranges.
    pub reset_view: bool,
}

impl AppState {
    pub fn new(table: Vec<DailyAggregate>, config: &DashboardConfig) -> Result<Self, ChartError> {
        let today = chrono::Local::now().date_naive();
        let (start_date, end_date) = date_extent(&table).unwrap_or((today, today));
        let selected = config
            .initial_measurements
            .iter()
            .map(|name| name.parse::<Measurement>())
            .collect::<Result<BTreeSet<_>, _>>()?;

        let widgets = WidgetState {
            start_date,
            end_date,
            y_range: config.y_range,
            selected,
            style: StyleConfig::default(),
        };
        let chart = build_chart(&table, &widgets.to_request())?;

        Ok(Self {
            table,
            rendered_widgets: widgets.clone(),
            widgets,
            chart,
            y_limits: config.y_range,
            show_table: false,
            table_sort: None,
            reset_view: true,
        })
    }

    /// Rebuild the chart if any widget changed since the last render.
    ///
    /// A rejected request leaves the previous chart in place.
    pub fn refresh(&mut self) -> Result<bool, ChartError> {
        if self.widgets == self.rendered_widgets {
            return Ok(false);
        }
        self.rendered_widgets = self.widgets.clone();
        let chart = build_chart(&self.table, &self.widgets.to_request())?;
        let axes_changed = chart.layout != self.chart.layout;
        self.chart = chart;
        self.reset_view |= axes_changed;
        Ok(true)
    }

    pub fn date_extent(&self) -> Option<(NaiveDate, NaiveDate)> {
        date_extent(&self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::generator::generate_samples;
    use crate::processing::aggregation::aggregate_daily;

    fn state() -> AppState {
        let reference = NaiveDate::from_ymd_opt(2021, 6, 26)
            .unwrap()
            .and_hms_opt(23, 0, 0)
            .unwrap();
        let table = aggregate_daily(&generate_samples(24 * 10, reference, 10).unwrap());
        AppState::new(table, &DashboardConfig::default()).unwrap()
    }

    #[test]
    fn starts_with_full_extent_and_default_selection() {
        let state = state();
        assert_eq!(state.widgets.start_date, NaiveDate::from_ymd_opt(2021, 6, 17).unwrap());
        assert_eq!(state.widgets.end_date, NaiveDate::from_ymd_opt(2021, 6, 26).unwrap());
        assert_eq!(state.widgets.selected, BTreeSet::from([Measurement::Co2]));
        assert_eq!(state.chart.traces.len(), 3);
        assert_eq!(state.chart.layout.y_axis.range, Some((0.0, 160.0)));
    }

    #[test]
    fn request_lists_measurements_in_display_order() {
        let mut state = state();
        state.widgets.selected = BTreeSet::from([Measurement::No2, Measurement::Co2]);
        let req = state.widgets.to_request();
        assert_eq!(req.measurements, vec!["CO2".to_string(), "NO2".to_string()]);
        assert_eq!(
            req.date_range,
            Some(("2021-06-17".to_string(), "2021-06-26".to_string()))
        );
    }

    #[test]
    fn refresh_only_when_widgets_change() {
        let mut state = state();
        assert!(!state.refresh().unwrap());

        state.widgets.selected.insert(Measurement::No2);
        assert!(state.refresh().unwrap());
        assert_eq!(state.chart.traces.len(), 6);
        assert!(!state.refresh().unwrap());
    }

    #[test]
    fn rejected_request_keeps_previous_chart() {
        let mut state = state();
        let before = state.chart.clone();
        state.widgets.start_date = NaiveDate::from_ymd_opt(2021, 7, 1).unwrap();
        state.widgets.selected.insert(Measurement::No2);

        assert!(matches!(state.refresh(), Err(ChartError::InvalidDateRange { .. })));
        assert_eq!(state.chart, before);
        // Not retried until a widget changes again.
        assert!(!state.refresh().unwrap());
    }

    #[test]
    fn rejects_unknown_initial_measurement() {
        let config = DashboardConfig {
            initial_measurements: vec!["CH4".to_string()],
            ..DashboardConfig::default()
        };
        assert!(AppState::new(Vec::new(), &config).is_err());
    }
}
