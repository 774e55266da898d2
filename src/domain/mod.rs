//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - normalized input records (`Poll`, `PresidentialResult`)
//! - the poll methodology enum (`PollType`)
//! - aggregation and forecast outputs (`RaceAggregate`, `Forecast`)
//! - the run configuration (`ForecastConfig`)

pub mod types;

pub use types::*;
