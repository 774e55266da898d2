//! Command-line parsing for the race forecaster.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the modeling code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "pollcast", version, about = "Poll-weighted election race forecaster")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Forecast every race: win probabilities from polls, the structural
    /// prior, and the generic ballot.
    Forecast(ForecastArgs),
    /// Print the structural partisan lean per race (no polling involved).
    Leans(LeansArgs),
}

/// Options for a full forecast run.
#[derive(Debug, Parser, Clone)]
pub struct ForecastArgs {
    /// Per-race poll CSV (State,Date,Poll,Sample,Type,DEM,GOP,IND).
    #[arg(long, value_name = "CSV")]
    pub polls: PathBuf,

    /// Historical presidential results CSV (State,Clinton,Trump,Obama,Romney).
    #[arg(long, value_name = "CSV")]
    pub results: PathBuf,

    /// Generic-ballot CSV (Date,Poll,Sample,Type,DEM,GOP).
    #[arg(long, value_name = "CSV")]
    pub generic: PathBuf,

    /// Race list file, one race per line (default: the built-in Senate list).
    #[arg(long, value_name = "FILE")]
    pub races: Option<PathBuf>,

    /// As-of date (YYYY-MM-DD) poll ages are measured against (default: today).
    #[arg(long)]
    pub asof: Option<NaiveDate>,

    /// Eligibility window in days; older polls are excluded.
    #[arg(long, default_value_t = 60)]
    pub window_days: i64,

    /// Cap on a single poll's weight.
    #[arg(long, default_value_t = 1000.0)]
    pub weight_cap: f64,

    /// National-average two-party margin subtracted by the lean estimator.
    #[arg(long, default_value_t = 0.03075)]
    pub national_margin: f64,

    /// Print a run summary before the per-race lines.
    #[arg(long)]
    pub summary: bool,

    /// Export per-race forecasts to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the full run (knobs + baseline + forecasts) to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

/// Options for printing structural leans.
#[derive(Debug, Parser)]
pub struct LeansArgs {
    /// Historical presidential results CSV (State,Clinton,Trump,Obama,Romney).
    #[arg(long, value_name = "CSV")]
    pub results: PathBuf,

    /// Race list file, one race per line (default: the built-in Senate list).
    #[arg(long, value_name = "FILE")]
    pub races: Option<PathBuf>,

    /// National-average two-party margin subtracted by the lean estimator.
    #[arg(long, default_value_t = 0.03075)]
    pub national_margin: f64,
}
