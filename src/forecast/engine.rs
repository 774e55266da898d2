//! Forecast engine: blend the race-level polling signal with the national
//! signal, then map the blended margin to win probabilities.
//!
//! The probability model treats each party's true vote share as
//! N(0.5, dispersion) and evaluates the CDF at the party's forecast share.
//! Both probabilities are computed independently from the same distribution;
//! the engine does not force them to complement each other.

use crate::domain::Forecast;
use crate::math::normal_cdf;

/// Divisor converting lean index points onto the margin scale.
pub const LEAN_SCALE: f64 = 50.0;

/// Weight on race-level polling relative to the national signal.
const RACE_POLL_WEIGHT: f64 = 4.0;

/// Per-race inputs to the engine.
#[derive(Debug, Clone, Default)]
pub struct RaceSignals {
    /// Structural lean in index points; `None` when the state has no rows in
    /// the historical dataset (the prior simply drops out).
    pub lean: Option<f64>,
    /// National generic-ballot margin (fraction).
    pub generic_margin: f64,
    /// Global fallback dispersion from the generic-ballot series. Always
    /// positive; the pipeline refuses to run without it.
    pub generic_dispersion: f64,
    /// Race-level polling margin, when the race had eligible polls.
    pub race_margin: Option<f64>,
    /// Race-level dispersion, when at least 2 margins were recorded.
    pub race_dispersion: Option<f64>,
    /// Eligible polls counted for the race.
    pub polls_counted: usize,
}

impl RaceSignals {
    /// The national signal: structural lean plus the generic-ballot margin.
    pub fn national_signal(&self) -> f64 {
        self.lean.map_or(0.0, |l| l / LEAN_SCALE) + self.generic_margin
    }
}

/// Forecast a single race.
pub fn forecast_race(race: &str, signals: &RaceSignals) -> Forecast {
    let national = signals.national_signal();
    let margin = match signals.race_margin {
        Some(m) => (RACE_POLL_WEIGHT * m + national) / (RACE_POLL_WEIGHT + 1.0),
        None => national,
    };

    let dem_share = 0.5 + margin / 2.0;
    let gop_share = 0.5 - margin / 2.0;

    // A race dispersion of exactly zero carries no spread information.
    let dispersion = match signals.race_dispersion {
        Some(sd) if sd > 0.0 => sd,
        _ => signals.generic_dispersion,
    };

    Forecast {
        race: race.to_string(),
        margin,
        dispersion,
        dem_prob: normal_cdf(dem_share, 0.5, dispersion),
        gop_prob: normal_cdf(gop_share, 0.5, dispersion),
        polls_counted: signals.polls_counted,
    }
}
