//! Poll weighting: sample size, age decay, methodology discount.
//!
//! A poll's influence starts at its sample size and decays exponentially with
//! age over a 60-day horizon, so a fresh 800-person poll outweighs a stale
//! 2000-person one. The methodology divisor then discounts registered-voter
//! and internal polls relative to likely-voter polls.

use crate::domain::PollType;

/// Age-decay horizon in days.
///
/// Numerically equal to the default eligibility window, but a separate
/// constant: the window decides which polls count at all, the horizon decides
/// how fast counted polls fade.
pub const DECAY_DAYS: f64 = 60.0;

/// Raw weight for a single poll.
///
/// Callers cap the result at `ForecastConfig::weight_cap` before use so one
/// large-sample poll cannot dominate a race.
pub fn poll_weight(age_days: f64, sample: f64, kind: PollType) -> f64 {
    sample * (-age_days / DECAY_DAYS).exp() / kind.weight_divisor()
}
