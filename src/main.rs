mod app;
mod controller;
mod error;
mod formats;
mod models;
mod progress;
mod settings;
mod ui;
mod utils;
mod writer;

use app::CompressorApp;

use tracing::info;

fn main() -> Result<(), eframe::Error> {
    // RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting File Compressor");

    let options = eframe::NativeOptions {
        vsync: true,
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([500.0, 600.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "File Compressor",
        options,
        Box::new(|_| Ok(Box::<CompressorApp>::default())),
    )
}
