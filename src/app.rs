//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - initializes tracing
//! - parses CLI arguments
//! - runs the forecast pipeline
//! - prints reports and writes optional exports

use clap::Parser;

use crate::cli::{Cli, Command, ForecastArgs, LeansArgs};
use crate::domain::ForecastConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `pollcast` binary.
pub fn run() -> Result<(), AppError> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Command::Forecast(args) => handle_forecast(args),
        Command::Leans(args) => handle_leans(args),
    }
}

/// Diagnostics (skipped rows, baseline details) go to stderr so stdout stays
/// a clean report.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pollcast=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init()
        .ok();
}

fn handle_forecast(args: ForecastArgs) -> Result<(), AppError> {
    let config = forecast_config_from_args(&args);
    let run = pipeline::run_forecast(&config)?;

    if config.summary {
        print!("{}", crate::report::format_run_summary(&run, &config));
    }
    print!("{}", crate::report::format_forecasts(&run.forecasts));

    if let Some(path) = &config.export_csv {
        crate::io::export::write_forecasts_csv(path, &run.forecasts)?;
    }
    if let Some(path) = &config.export_json {
        crate::io::export::write_run_json(
            path,
            &config,
            run.generic_margin,
            run.generic_dispersion,
            &run.forecasts,
        )?;
    }

    Ok(())
}

fn handle_leans(args: LeansArgs) -> Result<(), AppError> {
    let results = crate::io::ingest::load_results(&args.results)?;
    let races = pipeline::load_races(args.races.as_deref())?;
    let leans = pipeline::compute_leans(&results, args.national_margin);
    print!("{}", crate::report::format_leans(&races, &leans));
    Ok(())
}

pub fn forecast_config_from_args(args: &ForecastArgs) -> ForecastConfig {
    ForecastConfig {
        polls_path: args.polls.clone(),
        results_path: args.results.clone(),
        generic_path: args.generic.clone(),
        races_path: args.races.clone(),
        asof: args.asof.unwrap_or_else(|| chrono::Local::now().date_naive()),
        window_days: args.window_days,
        weight_cap: args.weight_cap,
        national_margin: args.national_margin,
        summary: args.summary,
        export_csv: args.export.clone(),
        export_json: args.export_json.clone(),
    }
}
