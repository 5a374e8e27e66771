//! Shared domain types.
//!
//! Observations are values: built once per fetch cycle, never patched. A new
//! fetch produces a new [`ObservationSet`].

use std::path::PathBuf;

use chrono::DateTime;
use chrono_tz::Tz;
use clap::ValueEnum;
use serde::Serialize;

use crate::time::WeekWindow;

/// Inclusive sanity bound on cents-per-kWh prices.
pub const PRICE_MIN: f64 = 0.0;
pub const PRICE_MAX: f64 = 1000.0;

/// One pricing sample.
///
/// The only constructor rejects prices outside `[PRICE_MIN, PRICE_MAX]` (and NaN),
/// so a stored observation always satisfies the bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Observation {
    instant: DateTime<Tz>,
    price: f64,
}

impl Observation {
    pub fn new(instant: DateTime<Tz>, price: f64) -> Option<Self> {
        if price_in_range(price) {
            Some(Self { instant, price })
        } else {
            None
        }
    }

    pub fn instant(&self) -> DateTime<Tz> {
        self.instant
    }

    /// Cents per kWh.
    pub fn price(&self) -> f64 {
        self.price
    }
}

fn price_in_range(price: f64) -> bool {
    (PRICE_MIN..=PRICE_MAX).contains(&price)
}

/// Observations sorted ascending by instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ObservationSet {
    items: Vec<Observation>,
}

impl ObservationSet {
    /// Sort (stable) and wrap.
    pub fn from_unsorted(mut items: Vec<Observation>) -> Self {
        items.sort_by_key(|o| o.instant);
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[Observation] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.items.iter()
    }

    pub fn first(&self) -> Option<&Observation> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&Observation> {
        self.items.last()
    }

    /// Observations with `window.start <= instant <= window.end`.
    pub fn within(&self, window: &WeekWindow) -> &[Observation] {
        let lo = self.items.partition_point(|o| o.instant < window.start);
        let hi = self.items.partition_point(|o| o.instant <= window.end);
        &self.items[lo..hi.max(lo)]
    }

    /// The `n` most recent observations, still ascending.
    pub fn latest(&self, n: usize) -> &[Observation] {
        let start = self.items.len().saturating_sub(n);
        &self.items[start..]
    }
}

impl<'a> IntoIterator for &'a ObservationSet {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Horizontal reference line drawn on charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceLine {
    None,
    Average,
    Median,
}

/// How the report is written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Number of week windows, most recent first.
    pub weeks: usize,
    /// Days of history requested from the feed.
    pub lookback_days: i64,
    /// Observations shown in the recent-activity block (144 = 12h of 5-minute data).
    pub recent_points: usize,

    pub line: ReferenceLine,
    pub format: OutputFormat,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    /// Skip the network and render demo data.
    pub demo: bool,
    /// Use demo data when the live fetch fails.
    pub fallback_to_demo: bool,
    /// Seed for demo data.
    pub seed: Option<u64>,
    pub use_cache: bool,

    pub export_observations: Option<PathBuf>,
    pub export_weeks: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            weeks: 5,
            lookback_days: 30,
            recent_points: 144,
            line: ReferenceLine::Average,
            format: OutputFormat::Text,
            plot: true,
            plot_width: 96,
            plot_height: 12,
            demo: false,
            fallback_to_demo: true,
            seed: None,
            use_cache: true,
            export_observations: None,
            export_weeks: None,
        }
    }
}
