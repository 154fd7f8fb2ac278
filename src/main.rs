mod app;
mod deploy;
mod flux;
mod settings;
mod views;

use app::FluxDashboard;
use eframe::egui;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([700.0, 500.0])
            .with_title("Flux Dashboard"),
        ..Default::default()
    };

    eframe::run_native(
        "Flux Dashboard",
        options,
        Box::new(|cc| Ok(Box::new(FluxDashboard::new(cc)))),
    )
}
