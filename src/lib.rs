//! `comed-prices` library crate.
//!
//! The binary (`comed`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the timestamp normalizer, feed parser, week windower and aggregator are
//!   reusable on their own
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod plot;
pub mod report;
pub mod time;
