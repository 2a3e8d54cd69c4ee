use crate::state::app_state::WidgetState;
use crate::state::measurement::Measurement;
use crate::state::style::{to_hex, MarkerMode};

/// Requests from the control panel that the app handles outside the UI pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    None,
    DownloadCsv,
    SaveStyle,
    LoadStyle,
    ToggleTableView,
}

const SLIDER_STEP: f64 = 1.0;

pub fn range_label(range: (f64, f64)) -> String {
    format!("Concentration range: ({}, {})", range.0, range.1)
}

/// Allowed spans for the min and max sliders. The two handles stay at least
/// one step apart so the value range never collapses.
pub fn slider_spans(range: (f64, f64), limits: (f64, f64)) -> ((f64, f64), (f64, f64)) {
    let lo_span = (limits.0, (range.1 - SLIDER_STEP).max(limits.0));
    let hi_span = ((range.0 + SLIDER_STEP).min(limits.1), limits.1);
    (lo_span, hi_span)
}

/// Draw every dashboard control. Widget values are edited in place; the
/// caller detects changes by comparing against the last rendered state.
pub fn show_controls(
    ui: &mut egui::Ui,
    widgets: &mut WidgetState,
    y_limits: (f64, f64),
    show_table: bool,
) -> ControlAction {
    let mut action = ControlAction::None;

    // --- Date range ---
    ui.horizontal(|ui| {
        ui.label("From");
        ui.add(egui_extras::DatePickerButton::new(&mut widgets.start_date).id_salt("start_date"));
        ui.label("to");
        ui.add(egui_extras::DatePickerButton::new(&mut widgets.end_date).id_salt("end_date"));
    });
    if widgets.start_date > widgets.end_date {
        ui.colored_label(
            egui::Color32::from_rgb(220, 60, 60),
            "Start date is after end date",
        );
    }

    ui.add_space(4.0);

    // --- Value range ---
    ui.label(range_label(widgets.y_range));
    let (lo_span, _) = slider_spans(widgets.y_range, y_limits);
    ui.add(
        egui::Slider::new(&mut widgets.y_range.0, lo_span.0..=lo_span.1)
            .step_by(SLIDER_STEP)
            .text("min"),
    );
    let (_, hi_span) = slider_spans(widgets.y_range, y_limits);
    ui.add(
        egui::Slider::new(&mut widgets.y_range.1, hi_span.0..=hi_span.1)
            .step_by(SLIDER_STEP)
            .text("max"),
    );

    ui.add_space(4.0);

    // --- Measurements ---
    ui.horizontal(|ui| {
        for m in Measurement::ALL {
            let mut on = widgets.selected.contains(&m);
            if ui.checkbox(&mut on, m.name()).changed() {
                if on {
                    widgets.selected.insert(m);
                } else {
                    widgets.selected.remove(&m);
                }
            }
            ui.add_space(12.0);
        }
    });

    ui.separator();

    // --- Style ---
    egui::Grid::new("style_grid")
        .num_columns(4)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            for m in Measurement::ALL {
                let style = widgets.style.get_mut(m);
                ui.label(egui::RichText::new(m.name()).strong());

                ui.horizontal(|ui| {
                    ui.color_edit_button_srgba_unmultiplied(&mut style.colors.mean)
                        .on_hover_text(to_hex(style.colors.mean));
                    ui.label("mean");
                });
                ui.horizontal(|ui| {
                    ui.color_edit_button_srgba_unmultiplied(&mut style.colors.std)
                        .on_hover_text(to_hex(style.colors.std));
                    ui.label("std");
                });

                egui::ComboBox::from_id_salt(format!("marker_{}", m.name()))
                    .selected_text(style.marker_mode.label())
                    .width(150.0)
                    .show_ui(ui, |ui| {
                        for mode in MarkerMode::ALL {
                            ui.selectable_value(&mut style.marker_mode, mode, mode.label());
                        }
                    });
                ui.end_row();
            }
        });

    ui.separator();

    ui.horizontal_wrapped(|ui| {
        if ui.button("Download CSV").on_hover_text("Export the daily table").clicked() {
            action = ControlAction::DownloadCsv;
        }
        let table_label = if show_table { "Graph View" } else { "Table View" };
        if ui
            .button(table_label)
            .on_hover_text("Toggle between chart and data table")
            .clicked()
        {
            action = ControlAction::ToggleTableView;
        }
        if ui.button("Save Style").clicked() {
            action = ControlAction::SaveStyle;
        }
        if ui.button("Load Style").clicked() {
            action = ControlAction::LoadStyle;
        }
    });

    action
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_label_matches_widget_text() {
        assert_eq!(range_label((0.0, 160.0)), "Concentration range: (0, 160)");
        assert_eq!(range_label((12.5, 80.0)), "Concentration range: (12.5, 80)");
    }

    #[test]
    fn slider_handles_cannot_meet() {
        let (lo_span, hi_span) = slider_spans((40.0, 41.0), (0.0, 160.0));
        assert_eq!(lo_span, (0.0, 40.0));
        assert_eq!(hi_span, (41.0, 160.0));
        assert!(lo_span.1 < hi_span.0);

        let (lo_span, hi_span) = slider_spans((0.0, 160.0), (0.0, 160.0));
        assert_eq!(lo_span, (0.0, 159.0));
        assert_eq!(hi_span, (1.0, 160.0));
    }
}
