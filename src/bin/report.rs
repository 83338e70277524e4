//! Batch report: load a customer table, clean it, aggregate it and write
//! the chart tables plus a JSON summary.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use rusty_basket::report::Report;
use rusty_basket::{load_file, AnalysisConfig, FilterSelection};

/// Customer purchase behaviour report
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the customer table (.csv, .json or .parquet)
    #[arg(short, long, default_value = "data/customer_data.csv")]
    input: PathBuf,

    /// Directory for report.json and the chart tables
    #[arg(short, long, default_value = "visuals")]
    output_dir: PathBuf,

    /// JSON file with analysis settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the high-income revenue threshold
    #[arg(long)]
    high_income_threshold: Option<f64>,

    /// Keep only these product categories (repeatable; default: all)
    #[arg(long = "category")]
    categories: Vec<String>,

    /// Keep only these discount flags (repeatable; default: all)
    #[arg(long = "discount")]
    discounts: Vec<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let mut config = AnalysisConfig::load(args.config.as_deref())?;
    if let Some(threshold) = args.high_income_threshold {
        config.high_income_threshold = threshold;
    }

    let start = Instant::now();
    let raw = load_file(&args.input)
        .with_context(|| format!("loading {}", args.input.display()))?;

    let selection = if args.categories.is_empty() && args.discounts.is_empty() {
        None
    } else {
        // An omitted dimension keeps every value present in the raw table.
        let categories = if args.categories.is_empty() {
            raw.distinct(rusty_basket::Column::Category)
        } else {
            args.categories.clone()
        };
        let discounts = if args.discounts.is_empty() {
            raw.distinct(rusty_basket::Column::Discount)
        } else {
            args.discounts.clone()
        };
        Some(FilterSelection::new(categories, discounts))
    };

    let report = Report::build(&raw, selection.as_ref(), &config);

    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("creating {}", args.output_dir.display()))?;
    let json_path = args.output_dir.join("report.json");
    report.write_json(&json_path)?;
    let tables = report.write_chart_tables(&args.output_dir)?;

    println!("{}", report.render_text());
    log::info!("Report written to {}", json_path.display());
    for path in &tables {
        log::info!("Chart table written to {}", path.display());
    }
    log::info!("Finished in {:.2}s", start.elapsed().as_secs_f64());

    Ok(())
}
