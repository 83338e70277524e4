mod app;
mod color;
mod ui;

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use app::RustyBasketApp;
use clap::Parser;
use eframe::egui;
use rusty_basket::AnalysisConfig;

/// Interactive customer purchase dashboard.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Dataset to open on start-up (defaults to the configured dataset)
    #[arg(long)]
    data: Option<PathBuf>,

    /// JSON file with analysis settings
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = AnalysisConfig::load(args.config.as_deref())?;
    let data_path = args
        .data
        .unwrap_or_else(|| config.default_dataset.clone());

    let mut app = RustyBasketApp::new(config);
    if data_path.exists() {
        app.load_path(&data_path);
    } else {
        log::info!("No dataset at {}, starting empty", data_path.display());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([640.0, 420.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Basket – Customer Insights",
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow!("failed to start the dashboard: {e}"))
}
