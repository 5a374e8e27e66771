//! ComEd hourly-pricing API integration (5-minute feed).

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use serde_json::Value;
use tracing::{debug, info};

use crate::data::{PriceSource, env_u64};
use crate::error::{AppError, EXIT_USAGE, FeedError};
use crate::time::MARKET_TZ;

pub const DEFAULT_BASE_URL: &str = "https://hourlypricing.comed.com/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const FEED_TYPE: &str = "5minutefeed";

pub struct ComedClient {
    client: Client,
    base_url: String,
}

impl ComedClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::new(EXIT_USAGE, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Reads `COMED_API_URL` and `COMED_TIMEOUT_SECS` (also from `.env`).
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let base_url = std::env::var("COMED_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let timeout_secs = env_u64("COMED_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(AppError::new(EXIT_USAGE, "COMED_TIMEOUT_SECS must be > 0."));
        }
        Self::new(base_url, Duration::from_secs(timeout_secs))
    }
}

impl PriceSource for ComedClient {
    fn fetch(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Value, FeedError> {
        let (date_start, date_end) = range_params(start, end);
        info!(url = %self.base_url, %date_start, %date_end, "fetching price feed");

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("type", FEED_TYPE),
                ("datestart", date_start.as_str()),
                ("dateend", date_end.as_str()),
            ])
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    FeedError::Fetch(format!("request timed out: {e}"))
                } else {
                    FeedError::Fetch(format!("request failed: {e}"))
                }
            })?;

        if !resp.status().is_success() {
            return Err(FeedError::Fetch(format!("request failed with status {}", resp.status())));
        }

        let body: Value = resp
            .json()
            .map_err(|e| FeedError::Fetch(format!("Error parsing JSON response: {e}")))?;

        debug!(
            items = body.as_array().map(Vec::len).unwrap_or(0),
            "price feed payload received"
        );
        Ok(body)
    }
}

/// `datestart` / `dateend` query values: whole days in market time,
/// `YYYYMMDD0000` through `YYYYMMDD2359`.
pub fn range_params(start: DateTime<Utc>, end: DateTime<Utc>) -> (String, String) {
    let start = start.with_timezone(&MARKET_TZ);
    let end = end.with_timezone(&MARKET_TZ);
    (
        format!("{}0000", start.format("%Y%m%d")),
        format!("{}2359", end.format("%Y%m%d")),
    )
}
