//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during aggregation and forecasting
//! - exported to JSON/CSV
//! - reloaded later for comparisons across runs

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Poll methodology type, from the CSV `Type` column.
///
/// The divisor encodes a manual credibility discount: registered-voter and
/// internal/partisan polls are judged less reliable than likely-voter polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollType {
    Registered,
    Internal,
    Likely,
}

impl PollType {
    /// Parse the CSV `Type` value.
    ///
    /// Anything other than the three known values is a data-entry defect that
    /// must be fixed at the source, so it aborts the whole run (exit code 2)
    /// rather than degrading into a skipped row.
    pub fn parse(s: &str) -> Result<Self, AppError> {
        match s.trim() {
            "Registered" => Ok(PollType::Registered),
            "Internal" => Ok(PollType::Internal),
            "Likely" => Ok(PollType::Likely),
            other => Err(AppError::new(2, format!("Unknown poll type '{other}'"))),
        }
    }

    /// Credibility divisor applied to the raw age-decayed weight.
    pub fn weight_divisor(self) -> f64 {
        match self {
            PollType::Registered => 2.0,
            PollType::Internal => 4.0,
            PollType::Likely => 1.0,
        }
    }
}

/// A single opinion poll, normalized from a CSV row.
///
/// Vote shares are fractions in `[0, 1]`; `None` means the candidate was not
/// on the ballot or the share was not reported. Generic-ballot rows carry
/// `race = NATIONAL_RACE` and `ind = None`.
#[derive(Debug, Clone)]
pub struct Poll {
    pub race: String,
    pub date: NaiveDate,
    pub pollster: String,
    pub sample: f64,
    pub kind: PollType,
    pub dem: Option<f64>,
    pub gop: Option<f64>,
    pub ind: Option<f64>,
}

/// Race label attached to generic-ballot polls, which have no state.
pub const NATIONAL_RACE: &str = "National";

/// Presidential vote totals for one state across the two reference elections.
///
/// Used only to compute the structural partisan-lean prior.
#[derive(Debug, Clone)]
pub struct PresidentialResult {
    pub state: String,
    /// Most recent reference election (CSV: Clinton / Trump).
    pub dem_recent: f64,
    pub gop_recent: f64,
    /// Earlier reference election (CSV: Obama / Romney).
    pub dem_prior: f64,
    pub gop_prior: f64,
}

/// Weighted vote totals accumulated over one race's eligible polls
/// (or over the generic-ballot series for the national baseline).
///
/// Built fresh per aggregation pass and discarded after producing a margin
/// and a dispersion; `margins` holds one effective two-candidate margin per
/// counted poll.
#[derive(Debug, Clone, Default)]
pub struct RaceAggregate {
    pub dem_votes: f64,
    pub gop_votes: f64,
    pub ind_votes: f64,
    pub total_votes: f64,
    pub margins: Vec<f64>,
    pub polls_counted: usize,
}

/// Terminal output entity, one per race in the race list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forecast {
    pub race: String,
    /// Blended point-estimate margin (fraction, positive favors Democrats —
    /// or the independent-adjusted margin in qualifying three-way races).
    pub margin: f64,
    /// Standard deviation of the win-probability model.
    pub dispersion: f64,
    pub dem_prob: f64,
    pub gop_prob: f64,
    /// Number of race-level polls counted inside the eligibility window.
    /// Zero means the forecast rests on the national signal alone.
    pub polls_counted: usize,
}

impl Forecast {
    pub fn has_recent_polls(&self) -> bool {
        self.polls_counted > 0
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults). Model constants live here
/// as named parameters so the model code carries no embedded literals.
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    pub polls_path: PathBuf,
    pub results_path: PathBuf,
    pub generic_path: PathBuf,
    /// Optional race-list file; `None` uses `DEFAULT_RACES`.
    pub races_path: Option<PathBuf>,

    /// Poll ages are measured against this date.
    pub asof: NaiveDate,
    /// Eligibility window: polls older than this many days are excluded.
    pub window_days: i64,
    /// Cap on a single poll's weight, so one large-sample poll cannot
    /// dominate a race.
    pub weight_cap: f64,
    /// National-average two-party margin subtracted by the lean estimator.
    pub national_margin: f64,

    pub summary: bool,
    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}

/// A saved run file (JSON).
///
/// The "portable" representation of one forecast run: the knobs that shaped
/// it, the national baseline, and the per-race forecasts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunFile {
    pub tool: String,
    pub asof: NaiveDate,
    pub window_days: i64,
    pub weight_cap: f64,
    pub national_margin: f64,
    pub generic_margin: f64,
    pub generic_dispersion: f64,
    pub forecasts: Vec<Forecast>,
}

/// Default race list: the 2018 Senate cycle, in output order.
///
/// `(S)` marks a special election; the historical lookup strips the suffix so
/// both Mississippi races share Mississippi's presidential results.
pub const DEFAULT_RACES: &[&str] = &[
    "Arizona",
    "California",
    "Connecticut",
    "Delaware",
    "Florida",
    "Hawaii",
    "Indiana",
    "Maine",
    "Maryland",
    "Massachusetts",
    "Michigan",
    "Minnesota",
    "Minnesota (S)",
    "Mississippi",
    "Mississippi (S)",
    "Missouri",
    "Montana",
    "Nebraska",
    "Nevada",
    "New Jersey",
    "New Mexico",
    "New York",
    "North Dakota",
    "Ohio",
    "Pennsylvania",
    "Rhode Island",
    "Tennessee",
    "Texas",
    "Utah",
    "Vermont",
    "Virginia",
    "Washington",
    "West Virginia",
    "Wisconsin",
    "Wyoming",
];

/// Suffix marking a special election on a race name.
pub const SPECIAL_SUFFIX: &str = " (S)";

/// The state whose historical results a race draws its prior from.
pub fn race_state(race: &str) -> &str {
    race.strip_suffix(SPECIAL_SUFFIX).unwrap_or(race)
}
