//! Formatted terminal output: feed summary, weekly table, recent activity and charts.
//!
//! We keep formatting code in one place so:
//! - the fetch/aggregation code stays clean and testable
//! - output changes are localized (important for snapshot-style tests)

use crate::app::pipeline::{DataSource, RunOutput};
use crate::domain::{Observation, ReferenceLine, ReportConfig};
use crate::error::{AppError, EXIT_USAGE};
use crate::plot::{HLine, render_price_bars};
use crate::report::{PriceStats, WeeklyStats, WeeklySummary};

/// `4.3¢`
pub fn fmt_cents(v: f64) -> String {
    format!("{v:.1}¢")
}

/// Header block: source, item counts, observed range, latest price.
pub fn format_run_summary(run: &RunOutput) -> String {
    let mut out = String::new();

    out.push_str("=== comed - ComEd 5-minute prices ===\n");
    out.push_str(&format!("Generated: {}\n", run.generated_at.format("%Y-%m-%d %H:%M %Z")));

    match &run.source {
        DataSource::Live => out.push_str(&format!(
            "Source: live feed | items={} | skipped={}\n",
            run.items_considered, run.items_skipped
        )),
        DataSource::Demo { reason } => out.push_str(&format!("Source: demo data ({reason})\n")),
    }

    let obs = &run.observations;
    if let (Some(first), Some(last)) = (obs.first(), obs.last()) {
        let prices: Vec<f64> = obs.iter().map(Observation::price).collect();
        let lo = prices.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        out.push_str(&format!(
            "Observations: n={} | {} .. {} | price=[{}, {}]\n",
            obs.len(),
            first.instant().format("%m/%d %H:%M"),
            last.instant().format("%m/%d %H:%M"),
            fmt_cents(lo),
            fmt_cents(hi),
        ));
        out.push_str(&format!(
            "Latest: {} at {}\n",
            fmt_cents(last.price()),
            last.instant().format("%m/%d %H:%M")
        ));
    } else {
        out.push_str("Observations: n=0\n");
    }

    out.trim_end().to_string()
}

/// One row per window, most recent first. Empty windows print `no data`.
pub fn format_weekly_table(weekly: &[WeeklySummary]) -> String {
    let mut out = String::new();

    out.push_str("Weekly prices (Sunday-Saturday, America/Chicago):\n");
    out.push_str(&format!(
        "{:<5} {:<15} {:>6} {:>8} {:>8} {:>8} {:>8}  {}\n",
        "Week", "Dates", "Points", "Avg", "Median", "Min", "Max", "Coverage"
    ));
    out.push_str(&format!("{:-<86}\n", ""));

    for summary in weekly {
        let w = &summary.window;
        match &summary.stats {
            Some(ws) => {
                let s = &ws.stats;
                let coverage = if ws.is_partial() {
                    format!("{} (partial)", ws.coverage_label())
                } else {
                    "full".to_string()
                };
                out.push_str(&format!(
                    "{:<5} {:<15} {:>6} {:>8} {:>8} {:>8} {:>8}  {}\n",
                    w.index,
                    w.label(),
                    s.count,
                    fmt_cents(s.mean),
                    fmt_cents(s.median),
                    fmt_cents(s.min),
                    fmt_cents(s.max),
                    coverage,
                ));
            }
            None => out.push_str(&format!("{:<5} {:<15} {:>6}  no data\n", w.index, w.label(), 0)),
        }
    }

    out.trim_end().to_string()
}

/// Recent observations (already newest first) plus their statistics.
pub fn format_recent(recent: &[Observation], stats: Option<&PriceStats>) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Recent activity (last {} observations, newest first):\n",
        recent.len()
    ));
    if let Some(s) = stats {
        out.push_str(&format!(
            "Avg: {} | Median: {} | Min: {} | Max: {}\n",
            fmt_cents(s.mean),
            fmt_cents(s.median),
            fmt_cents(s.min),
            fmt_cents(s.max)
        ));
    }
    out.push_str(&format!("{:<12} {:>8}\n", "Time", "Price"));
    out.push_str(&format!("{:-<21}\n", ""));
    for o in recent {
        out.push_str(&format!(
            "{:<12} {:>8}\n",
            o.instant().format("%m/%d %H:%M").to_string(),
            fmt_cents(o.price())
        ));
    }

    out.trim_end().to_string()
}

/// `Week N: MM/DD - MM/DD | Avg: x.x¢`, with the median appended when it is the
/// chart's reference line.
pub fn week_chart_title(weekly: &WeeklyStats, line: ReferenceLine) -> String {
    let mut title = format!(
        "Week {}: {} | Avg: {}",
        weekly.window.index,
        weekly.window.label(),
        fmt_cents(weekly.stats.mean)
    );
    if line == ReferenceLine::Median {
        title.push_str(&format!(" | Median: {}", fmt_cents(weekly.stats.median)));
    }
    title
}

/// `Data available: MM/DD - MM/DD (partial week)` for partial weeks.
pub fn partial_caption(weekly: &WeeklyStats) -> Option<String> {
    weekly
        .is_partial()
        .then(|| format!("Data available: {} (partial week)", weekly.coverage_label()))
}

/// The horizontal line to draw for `stats`, if any.
pub fn reference_line(stats: &PriceStats, line: ReferenceLine) -> Option<HLine> {
    match line {
        ReferenceLine::None => None,
        ReferenceLine::Average => Some(HLine {
            label: "Avg",
            value: stats.mean,
        }),
        ReferenceLine::Median => Some(HLine {
            label: "Median",
            value: stats.median,
        }),
    }
}

/// Recent-activity chart followed by one chart per non-empty week.
pub fn format_charts(run: &RunOutput, config: &ReportConfig) -> String {
    let mut out = String::new();

    if let Some(stats) = &run.recent_stats {
        let mut recent = run.recent.clone();
        recent.reverse();
        out.push_str("Recent activity:\n");
        out.push_str(&render_price_bars(
            &recent,
            None,
            reference_line(stats, config.line),
            config.plot_width,
            config.plot_height,
        ));
        out.push('\n');
    }

    for summary in &run.weekly {
        let Some(weekly) = &summary.stats else { continue };
        out.push_str(&week_chart_title(weekly, config.line));
        out.push('\n');
        if let Some(caption) = partial_caption(weekly) {
            out.push_str(&caption);
            out.push('\n');
        }
        out.push_str(&render_price_bars(
            run.observations.within(&weekly.window),
            Some((weekly.window.start, weekly.window.end)),
            reference_line(&weekly.stats, config.line),
            config.plot_width,
            config.plot_height,
        ));
        out.push('\n');
    }

    out.trim_end().to_string()
}

/// Pretty-printed JSON of the whole run.
pub fn format_json(run: &RunOutput) -> Result<String, AppError> {
    serde_json::to_string_pretty(run).map_err(|e| AppError::new(EXIT_USAGE, format!("Failed to serialize report: {e}")))
}
