//! Export forecasts to CSV or JSON.
//!
//! The CSV export is meant to be easy to consume in spreadsheets or
//! downstream scripts; the JSON export captures the full run (knobs +
//! baseline + forecasts) for comparisons across runs.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{Forecast, ForecastConfig, RunFile};
use crate::error::AppError;

/// Write per-race forecasts to a CSV file.
pub fn write_forecasts_csv(path: &Path, forecasts: &[Forecast]) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display()))
    })?;

    writeln!(file, "race,margin,dispersion,dem_prob,gop_prob,polls_counted,no_recent_polls")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for f in forecasts {
        writeln!(
            file,
            "{},{:.6},{:.6},{:.6},{:.6},{},{}",
            f.race,
            f.margin,
            f.dispersion,
            f.dem_prob,
            f.gop_prob,
            f.polls_counted,
            !f.has_recent_polls(),
        )
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

/// Write the full run to a JSON file.
pub fn write_run_json(
    path: &Path,
    config: &ForecastConfig,
    generic_margin: f64,
    generic_dispersion: f64,
    forecasts: &[Forecast],
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create run JSON '{}': {e}", path.display()))
    })?;

    let run = RunFile {
        tool: "pollcast".to_string(),
        asof: config.asof,
        window_days: config.window_days,
        weight_cap: config.weight_cap,
        national_margin: config.national_margin,
        generic_margin,
        generic_dispersion,
        forecasts: forecasts.to_vec(),
    };

    serde_json::to_writer_pretty(file, &run)
        .map_err(|e| AppError::new(2, format!("Failed to write run JSON: {e}")))?;

    Ok(())
}
