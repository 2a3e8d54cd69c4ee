use eframe::egui;

use crate::config::DashboardConfig;
use crate::data::export;
use crate::render::chart::ChartError;
use crate::state::app_state::{AppState, VERSION};
use crate::state::style::StyleConfig;
use crate::ui::chart_panel;
use crate::ui::controls::{self, ControlAction};
use crate::ui::table_view;

/// The gas concentration dashboard.
pub struct GasPlotApp {
    pub state: AppState,
    pub config: DashboardConfig,
    /// A file or export error shown in the footer until dismissed.
    pub error_message: Option<String>,
    /// Why the current widget state could not be rendered. Cleared by the
    /// next successful render.
    pub render_error: Option<String>,
}

impl GasPlotApp {
    pub fn new(cc: &eframe::CreationContext<'_>, state: AppState, config: DashboardConfig) -> Self {
        let ctx = &cc.egui_ctx;
        let mut style = (*ctx.style()).clone();

        style.text_styles.insert(
            egui::TextStyle::Body,
            egui::FontId::proportional(15.0),
        );
        style.text_styles.insert(
            egui::TextStyle::Heading,
            egui::FontId::proportional(22.0),
        );
        style.spacing.button_padding = egui::vec2(10.0, 5.0);
        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        style.visuals.window_corner_radius = egui::CornerRadius::same(8);
        style.visuals.widgets.inactive.corner_radius = egui::CornerRadius::same(6);
        style.visuals.widgets.hovered.corner_radius = egui::CornerRadius::same(6);
        style.visuals.widgets.active.corner_radius = egui::CornerRadius::same(6);

        ctx.set_style(style);
        // White plot background, as the chart layout asks for.
        ctx.set_visuals(egui::Visuals::light());

        Self {
            state,
            config,
            error_message: None,
            render_error: None,
        }
    }

    /// Export the aggregate table to a CSV file via a save dialog.
    fn download_csv(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .set_file_name(&self.config.csv_file_name)
            .add_filter("CSV Files", &["csv"])
            .save_file()
        {
            if let Err(e) = export::save_csv(&self.state.table, &path) {
                tracing::error!("Failed to export CSV: {e}");
                self.error_message = Some(format!("Failed to export CSV: {e}"));
            }
        }
    }

    /// Save the current style settings to a JSON file.
    fn save_style(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .set_file_name("style.json")
            .add_filter("Style", &["json"])
            .save_file()
        {
            match serde_json::to_string_pretty(&self.state.widgets.style) {
                Ok(json) => {
                    if let Err(e) = std::fs::write(&path, json) {
                        tracing::error!("Failed to save style: {e}");
                        self.error_message = Some(format!("Failed to save style: {e}"));
                    } else {
                        tracing::info!("Style saved to {:?}", path);
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to serialize style: {e}");
                    self.error_message = Some(format!("Failed to serialize style: {e}"));
                }
            }
        }
    }

    /// Replace the style settings with ones loaded from a JSON file.
    fn load_style(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Style", &["json"])
            .pick_file()
        {
            match std::fs::read_to_string(&path) {
                Ok(json) => match serde_json::from_str::<StyleConfig>(&json) {
                    Ok(style) => {
                        self.state.widgets.style = style;
                        tracing::info!("Style loaded from {:?}", path);
                    }
                    Err(e) => {
                        self.error_message = Some(format!("Failed to parse style: {e}"));
                    }
                },
                Err(e) => {
                    self.error_message = Some(format!("Failed to read file: {e}"));
                }
            }
        }
    }
}

/// Record the outcome of a refresh in `render_error`. Returns the message
/// when the request was rejected.
fn apply_refresh(
    outcome: Result<bool, ChartError>,
    render_error: &mut Option<String>,
) -> Option<String> {
    match outcome {
        Ok(true) => {
            tracing::debug!("chart re-rendered");
            *render_error = None;
            None
        }
        Ok(false) => None,
        Err(e) => {
            let message = format!("Render request rejected: {e}");
            *render_error = Some(message.clone());
            Some(message)
        }
    }
}

impl eframe::App for GasPlotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // --- Header panel ---
        egui::TopBottomPanel::top("header")
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(16, 8)))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading(&self.config.window_title);
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.small(format!("v{VERSION}"));
                    });
                });
            });

        // --- Footer panel ---
        egui::TopBottomPanel::bottom("footer")
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(16, 6)))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let days = self.state.table.len();
                    ui.label(egui::RichText::new(format!("{days} days")).weak());

                    if let Some(msg) = &self.render_error {
                        ui.separator();
                        ui.colored_label(egui::Color32::from_rgb(220, 140, 40), msg);
                    }
                    if let Some(msg) = &self.error_message {
                        ui.separator();
                        ui.colored_label(egui::Color32::from_rgb(220, 60, 60), msg);
                        if ui.small_button("dismiss").clicked() {
                            self.error_message = None;
                        }
                    }
                });
            });

        // --- Controls ---
        let mut action = ControlAction::None;
        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(360.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    action = controls::show_controls(
                        ui,
                        &mut self.state.widgets,
                        self.state.y_limits,
                        self.state.show_table,
                    );
                });
            });

        // --- Chart or table ---
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.show_table {
                table_view::show_table_view(
                    ui,
                    &self.state.table,
                    &self.state.widgets.style,
                    &mut self.state.table_sort,
                );
                return;
            }

            let chart_height = (ui.available_height() - 100.0).max(200.0);
            chart_panel::show_chart(ui, &self.state.chart, &mut self.state.reset_view, chart_height);
            ui.add_space(6.0);
            let extent = self.state.date_extent();
            if let Some((start, end)) = chart_panel::show_range_slider(ui, &self.state.chart, extent) {
                self.state.widgets.start_date = start;
                self.state.widgets.end_date = end;
            }
        });

        match action {
            ControlAction::None => {}
            ControlAction::DownloadCsv => self.download_csv(),
            ControlAction::SaveStyle => self.save_style(),
            ControlAction::LoadStyle => self.load_style(),
            ControlAction::ToggleTableView => self.state.show_table = !self.state.show_table,
        }

        if let Some(message) = apply_refresh(self.state.refresh(), &mut self.render_error) {
            tracing::warn!("{message}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_error_tracks_latest_refresh() {
        let mut render_error = None;

        let message = apply_refresh(Err(ChartError::InvalidValueRange(50.0, 50.0)), &mut render_error);
        assert_eq!(message.as_deref(), Some("Render request rejected: invalid value range (50, 50)"));
        assert_eq!(render_error, message);

        assert_eq!(apply_refresh(Ok(false), &mut render_error), None);
        assert!(render_error.is_some());

        assert_eq!(apply_refresh(Ok(true), &mut render_error), None);
        assert!(render_error.is_none());
    }
}
