use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use data_loader::{RatingStore, RatingTableWriter, StoreStats};
use pipeline::{BatchDriver, BatchSummary};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;
use ubcf::{PredictionMode, Predictor};

/// ubcf-fill - fills the gaps of a ratings table with user-based
/// collaborative filtering
#[derive(Parser, Debug)]
#[command(name = "ubcf-fill")]
#[command(about = "Predict missing ratings with Pearson-weighted top-k neighbors", long_about = None)]
struct Cli {
    /// Ratings table to complete (userId,movieId,rating; 0 = missing)
    #[arg(short, long, default_value = "train.csv")]
    input: PathBuf,

    /// Where to write the completed table
    #[arg(short, long, default_value = "output.csv")]
    output: PathBuf,

    /// Neighbor model used for predictions
    #[arg(long, value_enum, default_value_t = Mode::Compatible)]
    mode: Mode,

    /// Predict users in parallel
    #[arg(long)]
    parallel: bool,

    /// Print the run summary as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Single-rating neighbors; neighbor-backed predictions are always 0
    Compatible,
    /// Full-profile Pearson weights with mean fallbacks
    Weighted,
}

impl From<Mode> for PredictionMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Compatible => PredictionMode::Compatible,
            Mode::Weighted => PredictionMode::Weighted,
        }
    }
}

/// Everything a finished run reports
#[derive(Debug)]
struct RunReport {
    store: StoreStats,
    batch: BatchSummary,
    elapsed: Duration,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let report = run(&cli)?;

    if cli.json {
        print_json(&cli, &report)?;
    } else {
        print_summary(&cli, &report);
    }
    Ok(())
}

/// Load, predict, write
fn run(cli: &Cli) -> Result<RunReport> {
    let start = Instant::now();

    // Phase one: the output file is not touched until the input is known good
    let store = RatingStore::load_from_file(&cli.input)
        .with_context(|| format!("Failed to load ratings from {}", cli.input.display()))?
        .freeze();
    let store_stats = store.stats();

    // Phase two
    let predictor = Predictor::new(store).with_mode(cli.mode.into());
    let driver = BatchDriver::new(predictor).with_parallel(cli.parallel);

    let mut writer = RatingTableWriter::create(&cli.output)
        .with_context(|| format!("Failed to create {}", cli.output.display()))?;
    let batch = driver
        .run(&mut writer)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;

    let elapsed = start.elapsed();
    info!(elapsed_us = elapsed.as_micros() as u64, "Run finished");

    Ok(RunReport {
        store: store_stats,
        batch,
        elapsed,
    })
}

/// Helper function to format and print the run summary
fn print_summary(cli: &Cli, report: &RunReport) {
    let store = &report.store;
    let batch = &report.batch;

    println!("{}", "Rating completion finished".bold().blue());
    println!("{}Input:  {}", "• ".green(), cli.input.display());
    println!("{}Output: {}", "• ".green(), cli.output.display());
    println!("{}Mode:   {:?}", "• ".green(), cli.mode);
    println!(
        "{}Store:  {} users, {} movies, {} ratings ({} duplicates overwritten)",
        "• ".cyan(),
        store.users,
        store.movies,
        store.ratings,
        store.duplicates
    );
    println!(
        "{}Rows:   {} written, {} observed, {} predicted ({} from neighbors, {} fallbacks)",
        "• ".cyan(),
        batch.rows,
        batch.observed,
        batch.predicted,
        batch.neighbor_predictions,
        batch.fallback_predictions
    );

    let micros = report.elapsed.as_micros();
    let seconds = report.elapsed.as_secs_f64();
    println!("Time taken: {} microseconds", micros);
    println!("Time taken: {} milliseconds", report.elapsed.as_millis());
    println!("Time taken: {} seconds", seconds);
    println!("Time taken: {} minutes", seconds / 60.0);
}

fn print_json(cli: &Cli, report: &RunReport) -> Result<()> {
    let summary = serde_json::json!({
        "input": cli.input,
        "output": cli.output,
        "mode": PredictionMode::from(cli.mode),
        "store": report.store,
        "batch": report.batch,
        "elapsed_us": report.elapsed.as_micros() as u64,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
