//! Input/output helpers.
//!
//! - feed payload ingest + validation (`ingest`)
//! - CSV exports of observations and weekly statistics (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
