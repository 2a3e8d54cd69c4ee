use chrono::{Datelike, NaiveDate, NaiveDateTime};

/// Canonical date format used in exports and date widgets.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Datetime forms a date widget may report; the time part is dropped.
pub const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse a calendar date, accepting `YYYY-MM-DD` or an ISO datetime that is
/// truncated to its date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(d) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
        return Some(d);
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Plot x coordinate for a date: days since 0001-01-01.
pub fn date_to_plot_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

/// Inverse of [`date_to_plot_x`], rounding to the nearest day.
pub fn plot_x_to_date(x: f64) -> Option<NaiveDate> {
    if !x.is_finite() || x.abs() > i32::MAX as f64 {
        return None;
    }
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

/// Axis tick label for a plot x coordinate.
pub fn format_plot_x(x: f64) -> String {
    match plot_x_to_date(x) {
        Some(d) => format_date(d),
        None => format!("{x:.1}"),
    }
}
