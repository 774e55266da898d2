//! Reporting: formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the model code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use std::collections::HashMap;

use crate::app::pipeline::RunOutput;
use crate::domain::{Forecast, ForecastConfig, race_state};

/// One output line per race:
/// `<race> - Democratic: <d>%, Republican: <g>%`, with a trailing warning
/// when no recent polls were counted for the race.
pub fn format_forecast_line(f: &Forecast) -> String {
    let mut line = format!(
        "{} - Democratic: {:.1}%, Republican: {:.1}%",
        f.race,
        f.dem_prob * 100.0,
        f.gop_prob * 100.0
    );
    if !f.has_recent_polls() {
        line.push_str(" - WARNING: NO RECENT POLLS");
    }
    line
}

/// All per-race lines, in race-list order.
pub fn format_forecasts(forecasts: &[Forecast]) -> String {
    let mut out = String::new();
    for f in forecasts {
        out.push_str(&format_forecast_line(f));
        out.push('\n');
    }
    out
}

/// Run summary: inputs, knobs, and the national baseline.
pub fn format_run_summary(run: &RunOutput, config: &ForecastConfig) -> String {
    let mut out = String::new();

    out.push_str("=== pollcast - Race Forecast ===\n");
    out.push_str(&format!("As-of: {}\n", config.asof));
    out.push_str(&format!(
        "Window: {}d | weight cap: {} | national margin: {}\n",
        config.window_days, config.weight_cap, config.national_margin
    ));
    out.push_str(&format!(
        "Inputs: {} poll rows | priors for {} states\n",
        run.polls_loaded, run.states_with_priors
    ));
    out.push_str(&format!(
        "Generic ballot: margin={:+.2}% | dispersion={:.2}% ({} polls)\n",
        run.generic_margin * 100.0,
        run.generic_dispersion * 100.0,
        run.generic_polls_counted
    ));

    let without_polls = run.forecasts.iter().filter(|f| !f.has_recent_polls()).count();
    out.push_str(&format!(
        "Races: {} | without recent polls: {}\n",
        run.forecasts.len(),
        without_polls
    ));
    out.push('\n');

    out
}

/// Structural-lean lines for the `leans` subcommand.
///
/// Leans are displayed PVI-style: `D+x.x` / `R+x.x`, `EVEN` when the index
/// rounds to zero. Races without historical rows say so instead.
pub fn format_leans(races: &[String], leans: &HashMap<String, f64>) -> String {
    let mut out = String::new();
    for race in races {
        match leans.get(race_state(race)) {
            Some(&lean) => {
                out.push_str(&format!("{race}: {}\n", format_lean(lean)));
            }
            None => {
                out.push_str(&format!("{race}: no historical results\n"));
            }
        }
    }
    out
}

fn format_lean(lean: f64) -> String {
    let rounded = (lean.abs() * 10.0).round() / 10.0;
    if rounded == 0.0 {
        return "EVEN".to_string();
    }
    if lean > 0.0 {
        format!("D+{rounded:.1}")
    } else {
        format!("R+{rounded:.1}")
    }
}
