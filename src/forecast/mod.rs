//! The forecasting model: poll weighting, vote allocation, the structural
//! partisan-lean prior, race-level aggregation, and the forecast engine.

pub mod aggregate;
pub mod allocate;
pub mod engine;
pub mod lean;
pub mod weight;

pub use aggregate::*;
pub use allocate::*;
pub use engine::*;
pub use lean::*;
pub use weight::*;
