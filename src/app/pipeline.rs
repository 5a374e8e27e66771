//! Shared "report pipeline" logic used by every subcommand.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! fetch (through the cache) -> parse -> week windows -> weekly stats -> recent activity
//!
//! The subcommands can then focus on presentation (tables, charts, JSON, exports).

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{info, warn};

use crate::data::{FetchCache, PriceSource, generate_demo};
use crate::domain::{Observation, ObservationSet, ReportConfig};
use crate::error::{AppError, FeedError};
use crate::io::ingest::{ParsedFeed, parse_feed};
use crate::report::{PriceStats, WeeklySummary, summarize_weeks};
use crate::time::{MARKET_TZ, WeekWindow, week_windows};

/// Where the observations of a run came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DataSource {
    Live,
    Demo { reason: String },
}

impl DataSource {
    pub fn is_demo(&self) -> bool {
        matches!(self, DataSource::Demo { .. })
    }
}

/// All computed outputs of a single report run.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutput {
    pub generated_at: DateTime<Tz>,
    pub source: DataSource,
    pub items_considered: usize,
    pub items_skipped: usize,
    pub observations: ObservationSet,
    pub windows: Vec<WeekWindow>,
    pub weekly: Vec<WeeklySummary>,
    /// Most recent observations, newest first.
    pub recent: Vec<Observation>,
    pub recent_stats: Option<PriceStats>,
}

/// Fetch, parse and aggregate one report.
///
/// Recoverable feed failures fall back to demo data when the config allows it;
/// an empty result is always returned as an error.
pub fn run_report(
    config: &ReportConfig,
    source: &dyn PriceSource,
    cache: Option<&FetchCache>,
    now: DateTime<Utc>,
) -> Result<RunOutput, AppError> {
    if config.demo {
        return run_demo(config, now, "requested with --demo");
    }

    let start = now - Duration::days(config.lookback_days);
    match fetch_and_parse(source, cache, start, now) {
        Ok(parsed) => Ok(build_report(
            config,
            now,
            DataSource::Live,
            parsed.items_considered,
            parsed.skipped.len(),
            parsed.observations,
        )),
        Err(err) if err.is_recoverable() && config.fallback_to_demo => {
            warn!(error = %err, "live feed unavailable, showing demo data");
            run_demo(config, now, &err.to_string())
        }
        Err(err) => Err(err.into()),
    }
}

fn run_demo(config: &ReportConfig, now: DateTime<Utc>, reason: &str) -> Result<RunOutput, AppError> {
    let observations = generate_demo(now, config.seed)?;
    let items = observations.len();
    Ok(build_report(
        config,
        now,
        DataSource::Demo {
            reason: reason.to_string(),
        },
        items,
        0,
        observations,
    ))
}

fn fetch_and_parse(
    source: &dyn PriceSource,
    cache: Option<&FetchCache>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<ParsedFeed, FeedError> {
    let payload = match cache {
        Some(cache) => cache.get_or_fetch(end, || source.fetch(start, end))?,
        None => Arc::new(source.fetch(start, end)?),
    };

    let parsed = parse_feed(&payload)?.require_observations()?;
    info!(
        observations = parsed.observations.len(),
        items = parsed.items_considered,
        skipped = parsed.skipped.len(),
        "price feed parsed"
    );
    Ok(parsed)
}

/// Aggregate an already-parsed observation set.
pub fn build_report(
    config: &ReportConfig,
    now: DateTime<Utc>,
    source: DataSource,
    items_considered: usize,
    items_skipped: usize,
    observations: ObservationSet,
) -> RunOutput {
    let generated_at = now.with_timezone(&MARKET_TZ);
    let windows = week_windows(generated_at, config.weeks);
    let weekly = summarize_weeks(&observations, &windows);

    let latest = observations.latest(config.recent_points);
    let recent_stats = PriceStats::from_observations(latest);
    let recent: Vec<Observation> = latest.iter().rev().copied().collect();

    RunOutput {
        generated_at,
        source,
        items_considered,
        items_skipped,
        observations,
        windows,
        weekly,
        recent,
        recent_stats,
    }
}
