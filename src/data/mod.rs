//! Price data sources.
//!
//! - the live ComEd feed client (`comed`)
//! - a time-bucketed fetch cache (`cache`)
//! - synthetic demo data used when the live feed is unavailable (`sample`)

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::{AppError, EXIT_USAGE, FeedError};

pub mod cache;
pub mod comed;
pub mod sample;

pub use cache::FetchCache;
pub use comed::ComedClient;
pub use sample::generate_demo;

/// Anything that can return a raw pricing payload for a time range.
///
/// Implementations return the whole payload or a definite failure, never a
/// partial one.
pub trait PriceSource {
    fn fetch(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Value, FeedError>;
}

/// Read an optional non-negative integer setting from the environment.
pub(crate) fn env_u64(name: &str, default: u64) -> Result<u64, AppError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| AppError::new(EXIT_USAGE, format!("Invalid {name} '{raw}' (expected a whole number)."))),
        Err(_) => Ok(default),
    }
}
