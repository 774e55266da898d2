//! Vote allocation: decided shares plus the proportional undecided break.

/// Weighted votes assigned to each candidate by one allocation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VoteSplit {
    pub dem: f64,
    pub gop: f64,
    pub ind: f64,
}

impl VoteSplit {
    pub fn total(&self) -> f64 {
        self.dem + self.gop + self.ind
    }
}

/// Distribute `weight` across candidates proportionally to their raw shares.
///
/// A missing share means the candidate is not on the ballot or was not
/// reported; it contributes nothing.
pub fn allocate(weight: f64, dem: Option<f64>, gop: Option<f64>, ind: Option<f64>) -> VoteSplit {
    VoteSplit {
        dem: weight * dem.unwrap_or(0.0),
        gop: weight * gop.unwrap_or(0.0),
        ind: weight * ind.unwrap_or(0.0),
    }
}

/// A poll's full contribution: decided votes at the poll's weight, then the
/// undecided remainder allocated to the same shares (undecided voters are
/// assumed to break in the same proportion as decided voters).
///
/// Shares need not sum to 1. When they sum above 1 the undecided pool goes
/// negative and the contribution shrinks accordingly.
pub fn allocate_with_undecided(
    weight: f64,
    dem: Option<f64>,
    gop: Option<f64>,
    ind: Option<f64>,
) -> VoteSplit {
    let decided = allocate(weight, dem, gop, ind);
    let undecided = allocate(weight - decided.total(), dem, gop, ind);
    VoteSplit {
        dem: decided.dem + undecided.dem,
        gop: decided.gop + undecided.gop,
        ind: decided.ind + undecided.ind,
    }
}
