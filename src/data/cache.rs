//! Time-bucketed fetch cache.
//!
//! Holds at most one payload, keyed by `floor(now / ttl)`. A lookup in the same
//! bucket returns the stored payload; a new bucket triggers a fetch. Failed
//! fetches are never stored.
//!
//! The cache is passed into the pipeline explicitly. It is `Send + Sync`, so
//! concurrent report runs can share one instance.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use crate::data::env_u64;
use crate::error::{AppError, EXIT_USAGE, FeedError};

pub const DEFAULT_TTL_SECS: u64 = 300;

struct Entry {
    key: i64,
    payload: Arc<Value>,
}

pub struct FetchCache {
    ttl: Duration,
    slot: Mutex<Option<Entry>>,
}

impl FetchCache {
    /// A zero TTL is treated as one second.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl: ttl.max(Duration::from_secs(1)),
            slot: Mutex::new(None),
        }
    }

    /// Reads `COMED_CACHE_TTL_SECS` (also from `.env`).
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let secs = env_u64("COMED_CACHE_TTL_SECS", DEFAULT_TTL_SECS)?;
        if secs == 0 {
            return Err(AppError::new(EXIT_USAGE, "COMED_CACHE_TTL_SECS must be > 0."));
        }
        Ok(Self::new(Duration::from_secs(secs)))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn bucket_key(&self, now: DateTime<Utc>) -> i64 {
        let width = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX).max(1);
        now.timestamp().div_euclid(width)
    }

    /// Return the payload cached for `now`'s bucket, or run `fetch` and store its result.
    ///
    /// The lock is held across `fetch`, so concurrent callers in the same bucket
    /// trigger a single request.
    pub fn get_or_fetch<F>(&self, now: DateTime<Utc>, fetch: F) -> Result<Arc<Value>, FeedError>
    where
        F: FnOnce() -> Result<Value, FeedError>,
    {
        let key = self.bucket_key(now);
        let mut slot = self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(entry) = slot.as_ref().filter(|e| e.key == key) {
            debug!(bucket = key, "fetch cache hit");
            return Ok(Arc::clone(&entry.payload));
        }

        debug!(bucket = key, "fetch cache miss");
        let payload = Arc::new(fetch()?);
        *slot = Some(Entry {
            key,
            payload: Arc::clone(&payload),
        });
        Ok(payload)
    }

    /// Drop the stored payload; the next lookup fetches.
    pub fn clear(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = None;
    }
}
