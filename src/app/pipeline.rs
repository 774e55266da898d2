//! Shared forecast pipeline used by the CLI front-end.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load -> structural leans -> national baseline -> per-race forecasts
//!
//! The CLI can then focus on presentation (printing vs exports).

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::domain::{
    DEFAULT_RACES, Forecast, ForecastConfig, Poll, PresidentialResult, RaceAggregate, race_state,
};
use crate::error::AppError;
use crate::forecast::{RaceSignals, aggregate_polls, forecast_race, partisan_lean};
use crate::io::ingest;

/// All computed outputs of a single forecast run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// One forecast per race, in race-list order.
    pub forecasts: Vec<Forecast>,
    /// National generic-ballot margin (fraction).
    pub generic_margin: f64,
    /// Global fallback dispersion from the generic-ballot series.
    pub generic_dispersion: f64,
    /// Generic-ballot polls counted inside the window.
    pub generic_polls_counted: usize,
    /// Rows loaded from the poll dataset (before windowing/dedup).
    pub polls_loaded: usize,
    /// States with historical results (and therefore a structural prior).
    pub states_with_priors: usize,
}

/// Execute the full forecast pipeline from the configured input files.
pub fn run_forecast(config: &ForecastConfig) -> Result<RunOutput, AppError> {
    // 1) Load the three datasets and the race list.
    let polls = ingest::load_polls(&config.polls_path)?;
    let results = ingest::load_results(&config.results_path)?;
    let generic = ingest::load_generic(&config.generic_path)?;
    let races = load_races(config.races_path.as_deref())?;

    run_with_inputs(&polls, &results, &generic, &races, config)
}

/// Execute the pipeline with pre-loaded inputs.
///
/// This is the testable core: everything after this point is pure
/// computation over immutable data.
pub fn run_with_inputs(
    polls: &[Poll],
    results: &[PresidentialResult],
    generic: &[Poll],
    races: &[String],
    config: &ForecastConfig,
) -> Result<RunOutput, AppError> {
    if races.is_empty() {
        return Err(AppError::new(3, "Race list is empty."));
    }

    // 2) Structural leans, one per state.
    let leans = compute_leans(results, config.national_margin);

    // 3) National baseline from the generic-ballot series, computed once and
    //    shared by every race.
    let baseline = aggregate_polls(generic, config);
    let generic_margin = baseline.margin().ok_or_else(|| {
        AppError::new(3, "No eligible generic-ballot polls within the window.")
    })?;
    let generic_dispersion = usable_generic_dispersion(&baseline)?;
    debug!(
        "generic baseline: margin={generic_margin:.4}, dispersion={generic_dispersion:.4}, polls={}",
        baseline.polls_counted
    );

    // 4) Group race polls, preserving row order within each race (pollster
    //    dedup is first-encountered wins).
    let by_race = group_by_race(polls);

    // 5) Per-race forecasts. Races are independent and all inputs are
    //    read-only, so the parallel map cannot change results.
    let forecasts: Vec<Forecast> = races
        .par_iter()
        .map(|race| {
            let agg = by_race
                .get(race.as_str())
                .map(|ps| aggregate_polls(ps, config))
                .unwrap_or_default();
            let signals = RaceSignals {
                lean: leans.get(race_state(race)).copied(),
                generic_margin,
                generic_dispersion,
                race_margin: agg.margin(),
                race_dispersion: agg.dispersion(),
                polls_counted: agg.polls_counted,
            };
            forecast_race(race, &signals)
        })
        .collect();

    for f in &forecasts {
        let finite = f.margin.is_finite()
            && f.dispersion.is_finite()
            && f.dem_prob.is_finite()
            && f.gop_prob.is_finite();
        if !finite {
            return Err(AppError::new(4, format!("Non-finite forecast for '{}'.", f.race)));
        }
    }

    Ok(RunOutput {
        forecasts,
        generic_margin,
        generic_dispersion,
        generic_polls_counted: baseline.polls_counted,
        polls_loaded: polls.len(),
        states_with_priors: leans.len(),
    })
}

/// Resolve the race list: the given file, or the built-in default.
pub fn load_races(races_path: Option<&std::path::Path>) -> Result<Vec<String>, AppError> {
    match races_path {
        Some(path) => ingest::load_race_list(path),
        None => Ok(DEFAULT_RACES.iter().map(|s| s.to_string()).collect()),
    }
}

/// Structural lean per state. Duplicate states keep the first row.
pub fn compute_leans(results: &[PresidentialResult], national_margin: f64) -> HashMap<String, f64> {
    let mut leans = HashMap::new();
    for r in results {
        if leans.contains_key(&r.state) {
            warn!("duplicate historical rows for '{}', keeping the first", r.state);
            continue;
        }
        leans.insert(r.state.clone(), partisan_lean(r, national_margin));
    }
    leans
}

/// A race can only fall back to the generic dispersion if that dispersion is
/// a positive real number; otherwise the whole run is undecidable.
fn usable_generic_dispersion(baseline: &RaceAggregate) -> Result<f64, AppError> {
    match baseline.dispersion() {
        Some(sd) if sd > 0.0 => Ok(sd),
        Some(_) => Err(AppError::new(
            3,
            "Generic-ballot margins have zero spread; no usable fallback dispersion.",
        )),
        None => Err(AppError::new(
            3,
            "Fewer than 2 eligible generic-ballot polls; the fallback dispersion is undefined.",
        )),
    }
}

fn group_by_race(polls: &[Poll]) -> HashMap<String, Vec<Poll>> {
    let mut by_race: HashMap<String, Vec<Poll>> = HashMap::new();
    for p in polls {
        by_race.entry(p.race.clone()).or_default().push(p.clone());
    }
    by_race
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PollType;
    use crate::math::std_normal_cdf;
    use chrono::NaiveDate;

    fn asof() -> NaiveDate {
        NaiveDate::from_ymd_opt(2018, 11, 1).unwrap()
    }

    fn config() -> ForecastConfig {
        ForecastConfig {
            polls_path: "polls.csv".into(),
            results_path: "results.csv".into(),
            generic_path: "generic.csv".into(),
            races_path: None,
            asof: asof(),
            window_days: 60,
            weight_cap: 1000.0,
            national_margin: 0.03075,
            summary: false,
            export_csv: None,
            export_json: None,
        }
    }

    fn generic_poll(days_old: i64, pollster: &str, dem: f64, gop: f64) -> Poll {
        Poll {
            race: crate::domain::NATIONAL_RACE.to_string(),
            date: asof() - chrono::Duration::days(days_old),
            pollster: pollster.to_string(),
            sample: 800.0,
            kind: PollType::Likely,
            dem: Some(dem),
            gop: Some(gop),
            ind: None,
        }
    }

    fn historical(state: &str) -> PresidentialResult {
        PresidentialResult {
            state: state.to_string(),
            dem_recent: 51.0,
            gop_recent: 45.0,
            dem_prior: 52.0,
            gop_prior: 47.0,
        }
    }

    #[test]
    fn single_generic_poll_is_insufficient_data() {
        let generic = vec![generic_poll(10, "Quincy", 0.48, 0.44)];
        let races = vec!["Testland".to_string()];
        let err =
            run_with_inputs(&[], &[historical("Testland")], &generic, &races, &config()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn race_without_polls_uses_the_national_signal() {
        let generic = vec![
            generic_poll(10, "Quincy", 0.48, 0.44),
            generic_poll(20, "Acme", 0.46, 0.44),
        ];
        let races = vec!["Testland".to_string()];
        let cfg = config();
        let run =
            run_with_inputs(&[], &[historical("Testland")], &generic, &races, &cfg).unwrap();

        assert_eq!(run.forecasts.len(), 1);
        let f = &run.forecasts[0];
        assert_eq!(f.polls_counted, 0);
        assert!(!f.has_recent_polls());

        // Expected national signal: lean/50 + generic margin.
        let lean = partisan_lean(&historical("Testland"), cfg.national_margin);
        let expected_margin = lean / 50.0 + run.generic_margin;
        assert!((f.margin - expected_margin).abs() < 1e-12);

        // Probabilities from the generic dispersion.
        let dem_share = 0.5 + f.margin / 2.0;
        let expected = std_normal_cdf((dem_share - 0.5) / run.generic_dispersion);
        assert!((f.dem_prob - expected).abs() < 1e-12);
    }

    #[test]
    fn race_missing_from_historical_data_still_forecasts() {
        let generic = vec![
            generic_poll(10, "Quincy", 0.48, 0.44),
            generic_poll(20, "Acme", 0.46, 0.44),
        ];
        let races = vec!["Atlantis".to_string()];
        let run = run_with_inputs(&[], &[], &generic, &races, &config()).unwrap();

        // No prior: the margin degrades to the generic-ballot margin alone.
        assert!((run.forecasts[0].margin - run.generic_margin).abs() < 1e-12);
        assert_eq!(run.states_with_priors, 0);
    }

    #[test]
    fn special_election_shares_its_state_prior() {
        let generic = vec![
            generic_poll(10, "Quincy", 0.48, 0.44),
            generic_poll(20, "Acme", 0.46, 0.44),
        ];
        let races = vec!["Testland".to_string(), "Testland (S)".to_string()];
        let run =
            run_with_inputs(&[], &[historical("Testland")], &generic, &races, &config()).unwrap();
        assert!((run.forecasts[0].margin - run.forecasts[1].margin).abs() < 1e-12);
    }

    #[test]
    fn race_polls_blend_four_to_one_with_the_national_signal() {
        let generic = vec![
            generic_poll(10, "Quincy", 0.48, 0.44),
            generic_poll(20, "Acme", 0.46, 0.44),
        ];
        let race_polls = vec![
            Poll {
                race: "Testland".to_string(),
                date: asof() - chrono::Duration::days(5),
                pollster: "Local A".to_string(),
                sample: 600.0,
                kind: PollType::Likely,
                dem: Some(0.50),
                gop: Some(0.42),
                ind: None,
            },
            Poll {
                race: "Testland".to_string(),
                date: asof() - chrono::Duration::days(8),
                pollster: "Local B".to_string(),
                sample: 500.0,
                kind: PollType::Likely,
                dem: Some(0.46),
                gop: Some(0.44),
                ind: None,
            },
        ];
        let races = vec!["Testland".to_string()];
        let cfg = config();
        let run = run_with_inputs(
            &race_polls,
            &[historical("Testland")],
            &generic,
            &races,
            &cfg,
        )
        .unwrap();

        let f = &run.forecasts[0];
        assert_eq!(f.polls_counted, 2);
        assert!(f.has_recent_polls());

        let agg = aggregate_polls(&race_polls, &cfg);
        let lean = partisan_lean(&historical("Testland"), cfg.national_margin);
        let national = lean / 50.0 + run.generic_margin;
        let expected = (4.0 * agg.margin().unwrap() + national) / 5.0;
        assert!((f.margin - expected).abs() < 1e-12);

        // Two race margins exist, so the race's own dispersion applies.
        assert!((f.dispersion - agg.dispersion().unwrap()).abs() < 1e-12);
    }

    #[test]
    fn single_poll_race_falls_back_to_generic_dispersion() {
        let generic = vec![
            generic_poll(10, "Quincy", 0.48, 0.44),
            generic_poll(20, "Acme", 0.46, 0.44),
        ];
        let race_polls = vec![Poll {
            race: "Testland".to_string(),
            date: asof() - chrono::Duration::days(5),
            pollster: "Local A".to_string(),
            sample: 600.0,
            kind: PollType::Likely,
            dem: Some(0.50),
            gop: Some(0.42),
            ind: None,
        }];
        let races = vec!["Testland".to_string()];
        let run = run_with_inputs(&race_polls, &[], &generic, &races, &config()).unwrap();

        let f = &run.forecasts[0];
        assert_eq!(f.polls_counted, 1);
        // One margin is not enough for a race-level dispersion.
        assert!((f.dispersion - run.generic_dispersion).abs() < 1e-12);
    }

    #[test]
    fn forecasts_preserve_race_list_order() {
        let generic = vec![
            generic_poll(10, "Quincy", 0.48, 0.44),
            generic_poll(20, "Acme", 0.46, 0.44),
        ];
        let races: Vec<String> = ["Zeta", "Alpha", "Midgard"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let run = run_with_inputs(&[], &[], &generic, &races, &config()).unwrap();
        let order: Vec<&str> = run.forecasts.iter().map(|f| f.race.as_str()).collect();
        assert_eq!(order, vec!["Zeta", "Alpha", "Midgard"]);
    }

    #[test]
    fn empty_race_list_is_rejected() {
        let generic = vec![
            generic_poll(10, "Quincy", 0.48, 0.44),
            generic_poll(20, "Acme", 0.46, 0.44),
        ];
        let err = run_with_inputs(&[], &[], &generic, &[], &config()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
