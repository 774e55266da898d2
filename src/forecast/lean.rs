//! Structural partisan-lean prior (a Cook PVI analogue).
//!
//! The lean measures how much more favorable a state is to one party than the
//! country as a whole, using two-party margins from the two reference
//! presidential elections. Positive favors Democrats; magnitude is in index
//! points (half-percentage-points of two-party margin above the national
//! average).

use crate::domain::PresidentialResult;

/// Signed lean index for one state.
///
/// `national_margin` is the national-average two-party margin subtracted
/// before scaling (`ForecastConfig::national_margin`).
pub fn partisan_lean(result: &PresidentialResult, national_margin: f64) -> f64 {
    let recent = two_party_margin(result.dem_recent, result.gop_recent);
    let prior = two_party_margin(result.dem_prior, result.gop_prior);
    let avg = (recent + prior) / 2.0;
    (avg - national_margin) / 2.0 * 100.0
}

/// Dem-minus-GOP margin of the two-party vote.
fn two_party_margin(dem: f64, gop: f64) -> f64 {
    let total = dem + gop;
    dem / total - gop / total
}
