use eframe::egui;
use gasplot::app::GasPlotApp;
use gasplot::config::DashboardConfig;
use gasplot::data::generator::generate_samples;
use gasplot::processing::aggregation::aggregate_daily;
use gasplot::state::app_state::AppState;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = DashboardConfig::from_args()?;
    let reference = config
        .reference_time
        .unwrap_or_else(|| chrono::Local::now().naive_local());

    let samples = generate_samples(config.n_hours, reference, config.seed)?;
    let table = aggregate_daily(&samples);
    tracing::info!(
        hours = config.n_hours,
        days = table.len(),
        "generated synthetic gas data"
    );

    let state = AppState::new(table, &config)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(config.window_title.clone())
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 600.0]),
        renderer: eframe::Renderer::Wgpu,
        ..Default::default()
    };

    eframe::run_native(
        "gasplot",
        options,
        Box::new(move |cc| Ok(Box::new(GasPlotApp::new(cc, state, config)))),
    )?;
    Ok(())
}
