//! Command-line parsing for the ComEd price reporter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fetch/aggregation code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{OutputFormat, ReferenceLine};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "comed", version, about = "ComEd 5-minute electricity price reporter")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch prices and print the full report: feed summary, weekly table,
    /// recent activity and charts.
    Report(ReportArgs),
    /// Print the weekly statistics table only (useful for scripting).
    Weeks(ReportArgs),
    /// Re-render the report on a fixed interval.
    Watch(WatchArgs),
}

/// Common options for fetching and reporting.
#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    /// Number of calendar weeks (Sunday-Saturday) to summarize, most recent first.
    #[arg(short = 'w', long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..=52))]
    pub weeks: u32,

    /// Days of history requested from the feed.
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(i64).range(1..=3650))]
    pub lookback_days: i64,

    /// Number of most recent observations in the recent-activity block.
    #[arg(long, default_value_t = 144)]
    pub recent: usize,

    /// Reference line drawn on charts.
    #[arg(long, value_enum, default_value_t = ReferenceLine::Average)]
    pub line: ReferenceLine,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Disable the terminal charts.
    #[arg(long)]
    pub no_plot: bool,

    /// Chart width (columns).
    #[arg(long, default_value_t = 96)]
    pub width: usize,

    /// Chart height (rows).
    #[arg(long, default_value_t = 12)]
    pub height: usize,

    /// Use synthetic demo data instead of the live feed.
    #[arg(long)]
    pub demo: bool,

    /// Fail instead of falling back to demo data when the feed is unavailable.
    #[arg(long)]
    pub no_fallback: bool,

    /// Random seed for demo data.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Always fetch, bypassing the fetch cache.
    #[arg(long)]
    pub no_cache: bool,

    /// Export parsed observations to CSV.
    #[arg(long = "export-observations", value_name = "CSV")]
    pub export_observations: Option<PathBuf>,

    /// Export weekly statistics to CSV.
    #[arg(long = "export-weeks", value_name = "CSV")]
    pub export_weeks: Option<PathBuf>,

    /// Debug-level logging on stderr (`RUST_LOG` takes precedence).
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Options for watch mode.
#[derive(Debug, Args, Clone)]
pub struct WatchArgs {
    #[command(flatten)]
    pub report: ReportArgs,

    /// Seconds between refreshes.
    #[arg(long, default_value_t = 300, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,

    /// Stop after this many refreshes (runs until interrupted when omitted).
    #[arg(long)]
    pub iterations: Option<u64>,
}
