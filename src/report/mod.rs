//! Reporting utilities: per-window price statistics.
//!
//! `summarize` is the aggregator the formatters and exports consume. An empty
//! window is a normal state (e.g. weeks before the fetch lookback began) and is
//! represented by `None`, never by NaN statistics.

use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;

use crate::domain::{Observation, ObservationSet};
use crate::time::WeekWindow;

pub mod format;

pub use format::*;

/// Summary statistics over a non-empty set of prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

impl PriceStats {
    /// `None` for an empty slice.
    pub fn from_prices(prices: &[f64]) -> Option<Self> {
        if prices.is_empty() {
            return None;
        }

        let mut sorted = prices.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let median = if count % 2 == 0 {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        } else {
            sorted[count / 2]
        };

        Some(PriceStats {
            count,
            mean,
            median,
            min: sorted[0],
            max: sorted[count - 1],
        })
    }

    pub fn from_observations(observations: &[Observation]) -> Option<Self> {
        let prices: Vec<f64> = observations.iter().map(Observation::price).collect();
        Self::from_prices(&prices)
    }
}

/// Statistics for one week window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeeklyStats {
    pub window: WeekWindow,
    pub stats: PriceStats,
    /// Earliest observation inside the window.
    pub first_seen: DateTime<Tz>,
    /// Latest observation inside the window.
    pub last_seen: DateTime<Tz>,
}

impl WeeklyStats {
    /// Data starts after the window's first day or stops before its last day.
    pub fn is_partial(&self) -> bool {
        self.first_seen.date_naive() > self.window.first_day() || self.last_seen.date_naive() < self.window.last_day()
    }

    /// `MM/DD - MM/DD` of the days that actually have data.
    pub fn coverage_label(&self) -> String {
        format!("{} - {}", self.first_seen.format("%m/%d"), self.last_seen.format("%m/%d"))
    }
}

/// A window and its stats; `stats` is `None` when the window holds no data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeeklySummary {
    pub window: WeekWindow,
    pub stats: Option<WeeklyStats>,
}

/// Aggregate the observations that fall inside `window` (inclusive bounds).
pub fn summarize(set: &ObservationSet, window: &WeekWindow) -> Option<WeeklyStats> {
    let inside = set.within(window);
    let stats = PriceStats::from_observations(inside)?;
    // Non-empty and sorted, so the ends are the observed extremes.
    let first_seen = inside.first()?.instant();
    let last_seen = inside.last()?.instant();

    Some(WeeklyStats {
        window: *window,
        stats,
        first_seen,
        last_seen,
    })
}

/// Summarize every window, preserving their order.
pub fn summarize_weeks(set: &ObservationSet, windows: &[WeekWindow]) -> Vec<WeeklySummary> {
    windows
        .iter()
        .map(|w| WeeklySummary {
            window: *w,
            stats: summarize(set, w),
        })
        .collect()
}
