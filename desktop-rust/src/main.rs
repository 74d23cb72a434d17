mod app;
mod io;

use app::{configure_fonts, ClassifierApp};
use classifier_common::presentation;
use eframe::egui;
use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([960.0, 620.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        presentation::TITLE,
        options,
        Box::new(|cc| {
            configure_fonts(&cc.egui_ctx);
            Box::new(ClassifierApp::new())
        }),
    )
}
