//! `pollcast` library crate.
//!
//! The binary (`pollcast`) is a thin wrapper around this library so that:
//!
//! - the forecasting model is testable without spawning processes
//! - modules are reusable (e.g., future backtesting harness, notebooks, etc.)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod forecast;
pub mod io;
pub mod math;
pub mod report;
