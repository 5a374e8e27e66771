//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - validated price observations (`Observation`) and sorted sets of them (`ObservationSet`)
//! - presentation options (`ReferenceLine`, `OutputFormat`)
//! - the run configuration derived from CLI flags (`ReportConfig`)

pub mod types;

pub use types::*;
