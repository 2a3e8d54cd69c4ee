use chrono::{Duration, NaiveDate};
use egui_plot::{Legend, Line, Plot, PlotBounds, PlotPoints, Points, Polygon};

use crate::data::datetime::{date_to_plot_x, format_plot_x, plot_x_to_date};
use crate::render::chart::{ChartSpec, Fill, Trace, TraceRole};
use crate::state::style::color32;

const OVERVIEW_HEIGHT: f32 = 70.0;

fn plot_points(trace: &Trace, y: &[f64]) -> Vec<[f64; 2]> {
    trace
        .x
        .iter()
        .zip(y)
        .map(|(d, v)| [date_to_plot_x(*d), *v])
        .collect()
}

/// Y bounds of all traces between two plot x positions, padded by 5%.
pub fn auto_y_range(chart: &ChartSpec, x_min: f64, x_max: f64) -> Option<(f64, f64)> {
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for t in &chart.traces {
        for (d, v) in t.x.iter().zip(&t.y) {
            let x = date_to_plot_x(*d);
            if x >= x_min && x <= x_max && v.is_finite() {
                y_min = y_min.min(*v);
                y_max = y_max.max(*v);
            }
        }
    }
    if y_min.is_finite() && y_max.is_finite() {
        let padding = ((y_max - y_min) * 0.05).max(0.5);
        Some((y_min - padding, y_max + padding))
    } else {
        None
    }
}

/// Plot bounds implied by the chart's axis settings.
pub fn view_bounds(chart: &ChartSpec) -> Option<([f64; 2], [f64; 2])> {
    let (start, end) = chart.layout.x_axis.range?;
    let x_min = date_to_plot_x(start) - 0.5;
    let x_max = date_to_plot_x(end) + 0.5;
    let (y_min, y_max) = match chart.layout.y_axis.range {
        Some(range) => range,
        None => auto_y_range(chart, x_min, x_max)?,
    };
    Some(([x_min, y_min], [x_max, y_max]))
}

/// Fill between a lower and upper boundary, one quad per date step so every
/// polygon stays convex.
fn band_polygons(lower: &[[f64; 2]], upper: &[[f64; 2]]) -> Vec<Vec<[f64; 2]>> {
    let n = lower.len().min(upper.len());
    (1..n)
        .map(|i| vec![lower[i - 1], lower[i], upper[i], upper[i - 1]])
        .collect()
}

fn draw_trace(plot_ui: &mut egui_plot::PlotUi, trace: &Trace, previous: Option<&Trace>) {
    let color = color32(trace.color).gamma_multiply(trace.opacity);
    let points = plot_points(trace, &trace.y);

    if trace.fill == Fill::ToNextY {
        if let (Some(prev), Some(fill)) = (previous, trace.fill_color) {
            let fill = color32(fill).gamma_multiply(trace.opacity);
            let lower = plot_points(prev, &prev.y);
            for quad in band_polygons(&lower, &points) {
                plot_ui.polygon(
                    Polygon::new(PlotPoints::new(quad))
                        .fill_color(fill)
                        .stroke(egui::Stroke::NONE),
                );
            }
        }
    }

    let legend_name = trace.show_legend.then(|| trace.name.clone());
    if trace.mode.draws_line() {
        let mut line = Line::new(PlotPoints::new(points.clone()))
            .color(color)
            .width(if trace.role == TraceRole::Mean { 2.0 } else { 1.0 });
        if let Some(name) = &legend_name {
            line = line.name(name);
        }
        plot_ui.line(line);
    }
    if trace.mode.draws_markers() {
        let mut markers = Points::new(PlotPoints::new(points)).color(color).radius(3.0).filled(true);
        if let Some(name) = &legend_name {
            markers = markers.name(name);
        }
        plot_ui.points(markers);
    }
}

/// Paint the chart. When `reset_view` is set the plot snaps to the chart's
/// axis ranges and the flag is cleared.
pub fn show_chart(ui: &mut egui::Ui, chart: &ChartSpec, reset_view: &mut bool, height: f32) {
    let layout = &chart.layout;
    let bounds = view_bounds(chart);

    let plot = Plot::new("gas_chart")
        .height(height)
        .legend(Legend::default())
        .show_grid(layout.x_axis.show_grid || layout.y_axis.show_grid)
        .x_axis_label(layout.x_axis.title.clone())
        .y_axis_label(layout.y_axis.title.clone())
        .x_axis_formatter(|mark, _range| format_plot_x(mark.value))
        .label_formatter(|name, value| {
            let date = format_plot_x(value.x);
            if name.is_empty() {
                format!("{date}\n{:.2}", value.y)
            } else {
                format!("{name}\n{date}\n{:.2}", value.y)
            }
        });

    plot.show(ui, |plot_ui| {
        if *reset_view {
            if let Some((min, max)) = bounds {
                plot_ui.set_plot_bounds(PlotBounds::from_min_max(min, max));
            }
            *reset_view = false;
        }

        let mut previous: Option<&Trace> = None;
        for trace in &chart.traces {
            draw_trace(plot_ui, trace, previous);
            previous = Some(trace);
        }
    });
}

/// Move a date window so it is centred on `center_x`, keeping its width and
/// staying inside `extent`.
pub fn shift_window(
    window: (NaiveDate, NaiveDate),
    extent: (NaiveDate, NaiveDate),
    center_x: f64,
) -> Option<(NaiveDate, NaiveDate)> {
    let width = (window.1 - window.0).num_days();
    let extent_width = (extent.1 - extent.0).num_days();
    if width >= extent_width {
        return Some(extent);
    }
    let center = plot_x_to_date(center_x)?;
    let mut start = center - Duration::days(width / 2);
    if start < extent.0 {
        start = extent.0;
    }
    if start + Duration::days(width) > extent.1 {
        start = extent.1 - Duration::days(width);
    }
    Some((start, start + Duration::days(width)))
}

/// Compact overview of the whole data extent with the selected window
/// highlighted. Dragging on it moves the window; returns the new window.
pub fn show_range_slider(
    ui: &mut egui::Ui,
    chart: &ChartSpec,
    extent: Option<(NaiveDate, NaiveDate)>,
) -> Option<(NaiveDate, NaiveDate)> {
    let slider = chart.layout.x_axis.range_slider.filter(|s| s.visible)?;
    let extent = extent?;

    let y_bounds = auto_y_range(chart, f64::NEG_INFINITY, f64::INFINITY).unwrap_or((0.0, 1.0));
    let (x_min, x_max) = (date_to_plot_x(extent.0) - 0.5, date_to_plot_x(extent.1) + 0.5);

    let window_color = ui.visuals().selection.bg_fill.gamma_multiply(0.35);
    let response = Plot::new("gas_chart_range_slider")
        .height(OVERVIEW_HEIGHT)
        .show_axes([true, false])
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .allow_double_click_reset(false)
        .show_x(false)
        .show_y(false)
        .x_axis_formatter(|mark, _range| format_plot_x(mark.value))
        .show(ui, |plot_ui| {
            plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                [x_min, y_bounds.0],
                [x_max, y_bounds.1],
            ));

            let (w0, w1) = (
                date_to_plot_x(slider.range.0) - 0.5,
                date_to_plot_x(slider.range.1) + 0.5,
            );
            plot_ui.polygon(
                Polygon::new(PlotPoints::new(vec![
                    [w0, y_bounds.0],
                    [w1, y_bounds.0],
                    [w1, y_bounds.1],
                    [w0, y_bounds.1],
                ]))
                .fill_color(window_color)
                .stroke(egui::Stroke::new(1.0, window_color)),
            );

            for trace in chart.traces.iter().filter(|t| t.role == TraceRole::Mean) {
                plot_ui.line(
                    Line::new(PlotPoints::new(plot_points(trace, &trace.y)))
                        .color(color32(trace.color))
                        .width(1.0),
                );
            }

            plot_ui.pointer_coordinate().map(|p| p.x)
        });

    if !(response.response.dragged() || response.response.clicked()) {
        return None;
    }
    let center_x = response.inner?;
    shift_window(slider.range, extent, center_x).filter(|w| *w != slider.range)
}
