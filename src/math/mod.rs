//! Mathematical utilities: summary statistics and the normal CDF.

pub mod stats;

pub use stats::*;
