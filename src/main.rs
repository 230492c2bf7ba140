//! Process Tracker - Judicial Process Classification & Inactivity Alerts
//!
//! A Rust application that classifies a CSV export of judicial processes by
//! their last action and flags processes without activity for two months.

mod data;
mod gui;

use eframe::egui;
use gui::TrackerApp;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> anyhow::Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([1000.0, 600.0])
            .with_title("Process Tracker"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Process Tracker",
        options,
        Box::new(|cc| Ok(Box::new(TrackerApp::new(cc)))),
    )
    .map_err(|e| anyhow::anyhow!("failed to start the window: {e}"))
}
