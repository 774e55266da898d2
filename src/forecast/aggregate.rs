//! Race-level poll aggregation.
//!
//! Given the polls for one race (or the generic-ballot series for the
//! national baseline), produce weighted vote totals, one effective margin per
//! counted poll, and a counted-poll count. The aggregation is a fold over an
//! immutable slice, so nothing is shared across races.
//!
//! Eligibility rules:
//! - polls older than the window are excluded entirely
//! - one poll per pollster: the first row encountered in input order wins,
//!   so callers must preserve the dataset's row order

use std::collections::HashSet;

use crate::domain::{ForecastConfig, Poll, RaceAggregate};
use crate::forecast::allocate::allocate_with_undecided;
use crate::forecast::weight::poll_weight;
use crate::math::sample_stdev;

/// Aggregate one race's polls into vote totals and per-poll margins.
pub fn aggregate_polls(polls: &[Poll], config: &ForecastConfig) -> RaceAggregate {
    let mut seen: HashSet<&str> = HashSet::new();

    polls.iter().fold(RaceAggregate::default(), |mut agg, poll| {
        let age = (config.asof - poll.date).num_days();
        if age > config.window_days {
            return agg;
        }
        if !seen.insert(poll.pollster.as_str()) {
            return agg;
        }

        let weight = poll_weight(age as f64, poll.sample, poll.kind).min(config.weight_cap);
        let split = allocate_with_undecided(weight, poll.dem, poll.gop, poll.ind);

        agg.dem_votes += split.dem;
        agg.gop_votes += split.gop;
        agg.ind_votes += split.ind;
        agg.total_votes = agg.dem_votes + agg.gop_votes + agg.ind_votes;
        agg.margins.push(effective_margin(poll.dem, poll.gop, poll.ind));
        agg.polls_counted += 1;
        agg
    })
}

/// Effective two-candidate margin for one set of raw shares.
///
/// When an independent polls at least as high as the second-largest share,
/// the race is effectively independent-vs-leading-major-party: the margin is
/// `ind - gop` when the Republican leads the Democrat (or the Democrat share
/// is missing), else `dem - ind`. Otherwise it is the plain `dem - gop`
/// margin. Missing shares count as 0.0.
pub fn effective_margin(dem: Option<f64>, gop: Option<f64>, ind: Option<f64>) -> f64 {
    let d = dem.unwrap_or(0.0);
    let g = gop.unwrap_or(0.0);
    match ind {
        Some(i) if i >= second_largest(d, g, i) => {
            if g > d || dem.is_none() {
                i - g
            } else {
                d - i
            }
        }
        _ => d - g,
    }
}

fn second_largest(a: f64, b: f64, c: f64) -> f64 {
    let mut v = [a, b, c];
    v.sort_by(|x, y| y.partial_cmp(x).unwrap_or(std::cmp::Ordering::Equal));
    v[1]
}

impl RaceAggregate {
    /// Aggregate-level effective margin, as a fraction of all weighted votes.
    ///
    /// Applies the same top-two rule as the per-poll margins, on the
    /// aggregated totals. `None` when no polls were counted — the caller
    /// falls back to the national signal alone.
    pub fn margin(&self) -> Option<f64> {
        if self.total_votes == 0.0 {
            return None;
        }
        let t = self.total_votes;
        Some(effective_margin(
            Some(self.dem_votes / t),
            Some(self.gop_votes / t),
            Some(self.ind_votes / t),
        ))
    }

    /// Sample standard deviation of the recorded per-poll margins.
    ///
    /// `None` when fewer than 2 margins were recorded; the caller substitutes
    /// the generic-ballot dispersion.
    pub fn dispersion(&self) -> Option<f64> {
        sample_stdev(&self.margins)
    }
}
