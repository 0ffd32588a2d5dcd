//! Command-line parsing for the sector rotation toolkit.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the analysis code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "nrot", version, about = "NEPSE Sector Rotation Toolkit")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the momentum rotation backtest over candidate lookback windows.
    Rotate(RotateArgs),
    /// Normalize and rebase a sector CSV, print diagnostics, optionally chart.
    Rebase(RebaseArgs),
    /// Print market summary / market capitalization JSON dumps as tables.
    Summary(SummaryArgs),
    /// Rank brokers by net buy/sell percentage from a brokerwise CSV.
    Broker(BrokerArgs),
    /// Incrementally fetch sector index history from the exchange API.
    Fetch(FetchArgs),
    /// Replot a previously exported equity JSON.
    Plot(PlotArgs),
}

/// Common input options: a CSV on disk, or a deterministic synthetic sample.
#[derive(Debug, Parser, Clone)]
pub struct InputArgs {
    /// Sector index CSV (any supported header vintage).
    #[arg(short = 'i', long, value_name = "CSV")]
    pub input: Option<PathBuf>,

    /// Use a synthetic sample instead of a file.
    #[arg(long, conflicts_with = "input")]
    pub sample: bool,

    /// Number of trading days in the synthetic sample.
    #[arg(long, default_value_t = 400)]
    pub sample_days: usize,

    /// Random seed for the synthetic sample.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Restrict the analysis to these sectors (kebab-case names).
    #[arg(long, value_delimiter = ',')]
    pub sectors: Vec<String>,

    /// Rebase anchor date (YYYY-MM-DD); defaults to the earliest date.
    #[arg(long)]
    pub anchor: Option<NaiveDate>,
}

/// Options for the rotation backtest.
#[derive(Debug, Parser, Clone)]
pub struct RotateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Candidate momentum lookback windows (trading days).
    #[arg(short = 'w', long, value_delimiter = ',', default_values_t = [5, 10, 15, 20, 30])]
    pub windows: Vec<usize>,

    /// Fraction of equity paid per leader switch (0.005 = 50bp).
    #[arg(long, default_value_t = 0.005)]
    pub cost: f64,

    /// Show the last N rotations of the winning window.
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Also print the daily-return correlation matrix.
    #[arg(long)]
    pub correlation: bool,

    /// Export the ranked windows to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the winning window's equity curve to JSON.
    #[arg(long = "export-equity", value_name = "JSON")]
    pub export_equity: Option<PathBuf>,
}

/// Options for normalize/rebase + charting.
#[derive(Debug, Parser, Clone)]
pub struct RebaseArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Render the rebased series to a PNG chart.
    #[arg(long, value_name = "PNG")]
    pub chart: Option<PathBuf>,

    /// Event-marker CSV (date,label) drawn as vertical lines on the chart.
    #[arg(long, value_name = "CSV")]
    pub events: Option<PathBuf>,

    /// Also print the daily-return correlation matrix.
    #[arg(long)]
    pub correlation: bool,

    /// Chart width in pixels.
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Chart height in pixels.
    #[arg(long, default_value_t = 720)]
    pub height: u32,
}

/// Options for printing market summary dumps.
#[derive(Debug, Parser)]
pub struct SummaryArgs {
    /// Market summary JSON (daily turnover/transactions dump).
    #[arg(long, value_name = "JSON")]
    pub summary: Option<PathBuf>,

    /// Market capitalization JSON.
    #[arg(long = "market-cap", value_name = "JSON")]
    pub market_cap: Option<PathBuf>,

    /// Show only the last N rows of each table.
    #[arg(long, default_value_t = 15)]
    pub tail: usize,

    /// Render the full series (not just the tail) to a PNG chart.
    #[arg(long, value_name = "PNG")]
    pub chart: Option<PathBuf>,

    /// Chart width in pixels.
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Chart height in pixels.
    #[arg(long, default_value_t = 720)]
    pub height: u32,
}

/// Options for the broker net buy/sell ranking.
#[derive(Debug, Parser)]
pub struct BrokerArgs {
    /// Brokerwise trading CSV with `member`, `buy`, and `sell` columns.
    #[arg(short = 'i', long, value_name = "CSV")]
    pub input: PathBuf,

    /// Show the top N brokers by absolute net percentage.
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Render the ranking as a horizontal bar chart PNG.
    #[arg(long, value_name = "PNG")]
    pub chart: Option<PathBuf>,

    /// Chart width in pixels.
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Chart height in pixels.
    #[arg(long, default_value_t = 720)]
    pub height: u32,
}

/// Options for the incremental fetcher.
#[derive(Debug, Parser)]
pub struct FetchArgs {
    /// Output CSV; appended to (and resumed from) if it exists.
    #[arg(short = 'o', long, value_name = "CSV")]
    pub out: PathBuf,

    /// First business date to request (YYYY-MM-DD).
    #[arg(long)]
    pub start: NaiveDate,

    /// Last business date to request; defaults to today.
    #[arg(long)]
    pub end: Option<NaiveDate>,
}

/// Options for replotting a saved equity JSON.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Equity JSON produced by `nrot rotate --export-equity`.
    #[arg(long, value_name = "JSON")]
    pub equity: PathBuf,

    /// Output PNG path.
    #[arg(short = 'o', long, value_name = "PNG")]
    pub out: PathBuf,

    /// Chart width in pixels.
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Chart height in pixels.
    #[arg(long, default_value_t = 720)]
    pub height: u32,
}
