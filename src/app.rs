//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - initializes logging
//! - fetches the ComEd feed (or demo data)
//! - aggregates weekly and recent statistics
//! - prints reports/charts
//! - writes optional exports

use std::thread;
use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use tracing::{info, warn};

use crate::cli::{Command, ReportArgs, WatchArgs};
use crate::data::{ComedClient, FetchCache, PriceSource};
use crate::domain::{OutputFormat, ReportConfig};
use crate::error::AppError;

pub mod pipeline;

use pipeline::RunOutput;

/// Entry point for the `comed` binary.
pub fn run() -> Result<(), AppError> {
    // We want `comed` and `comed --weeks 8` to behave like `comed report ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Report(args) => handle_report(args, OutputMode::Full),
        Command::Weeks(args) => handle_report(args, OutputMode::WeeksOnly),
        Command::Watch(args) => handle_watch(args),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Full,
    WeeksOnly,
}

/// Live client and cache, built once per process.
struct Sources {
    client: ComedClient,
    cache: Option<FetchCache>,
}

impl Sources {
    fn from_env(config: &ReportConfig) -> Result<Self, AppError> {
        let client = ComedClient::from_env()?;
        let cache = if config.use_cache { Some(FetchCache::from_env()?) } else { None };
        Ok(Self { client, cache })
    }

    fn run(&self, config: &ReportConfig) -> Result<RunOutput, AppError> {
        pipeline::run_report(config, &self.client, self.cache.as_ref(), Utc::now())
    }
}

fn handle_report(args: ReportArgs, mode: OutputMode) -> Result<(), AppError> {
    crate::logging::init(args.verbose);
    let config = report_config_from_args(&args);
    let sources = Sources::from_env(&config)?;

    let run = sources.run(&config)?;
    print_run(&run, &config, mode)?;
    write_exports(&run, &config)
}

fn handle_watch(args: WatchArgs) -> Result<(), AppError> {
    crate::logging::init(args.report.verbose);
    let config = report_config_from_args(&args.report);
    let sources = Sources::from_env(&config)?;
    let interval = Duration::from_secs(args.interval);

    let summary = watch(&config, &sources.client, sources.cache.as_ref(), interval, args.iterations)?;
    info!(cycles = summary.cycles, failed = summary.failed, "watch finished");
    Ok(())
}

/// Outcome of a bounded watch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WatchSummary {
    cycles: u64,
    failed: u64,
}

/// Refresh loop behind `comed watch`.
///
/// A failed cycle is reported on stderr and the loop keeps going; the cache is
/// cleared so the next cycle refetches. Export failures end the loop.
fn watch(
    config: &ReportConfig,
    source: &dyn PriceSource,
    cache: Option<&FetchCache>,
    interval: Duration,
    iterations: Option<u64>,
) -> Result<WatchSummary, AppError> {
    let mut summary = WatchSummary { cycles: 0, failed: 0 };
    loop {
        summary.cycles += 1;
        info!(iteration = summary.cycles, "refreshing report");

        match pipeline::run_report(config, source, cache, Utc::now()) {
            Ok(run) => {
                print_run(&run, config, OutputMode::Full)?;
                write_exports(&run, config)?;
            }
            Err(err) => {
                summary.failed += 1;
                warn!(iteration = summary.cycles, exit_code = err.exit_code(), "refresh failed");
                eprintln!("{err}");
                if let Some(cache) = cache {
                    cache.clear();
                }
            }
        }

        if iterations.is_some_and(|n| summary.cycles >= n) {
            return Ok(summary);
        }
        if config.format == OutputFormat::Text {
            println!("\nNext refresh in {}s (Ctrl-C to stop)\n", interval.as_secs());
        }
        thread::sleep(interval);
    }
}

fn print_run(run: &RunOutput, config: &ReportConfig, mode: OutputMode) -> Result<(), AppError> {
    if config.format == OutputFormat::Json {
        println!("{}", crate::report::format_json(run)?);
        return Ok(());
    }

    if mode == OutputMode::Full {
        println!("{}\n", crate::report::format_run_summary(run));
    }

    println!("{}", crate::report::format_weekly_table(&run.weekly));

    if mode == OutputMode::Full {
        println!(
            "\n{}",
            crate::report::format_recent(&run.recent, run.recent_stats.as_ref())
        );
        if config.plot {
            println!("\n{}", crate::report::format_charts(run, config));
        }
    }

    Ok(())
}

fn write_exports(run: &RunOutput, config: &ReportConfig) -> Result<(), AppError> {
    if let Some(path) = &config.export_observations {
        crate::io::export::write_observations_csv(path, run.observations.as_slice())?;
        info!(path = %path.display(), "observations exported");
    }
    if let Some(path) = &config.export_weeks {
        crate::io::export::write_weeks_csv(path, &run.weekly)?;
        info!(path = %path.display(), "weekly statistics exported");
    }
    Ok(())
}

pub fn report_config_from_args(args: &ReportArgs) -> ReportConfig {
    ReportConfig {
        weeks: args.weeks as usize,
        lookback_days: args.lookback_days,
        recent_points: args.recent,
        line: args.line,
        format: args.format,
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        demo: args.demo,
        fallback_to_demo: !args.no_fallback,
        seed: args.seed,
        use_cache: !args.no_cache,
        export_observations: args.export_observations.clone(),
        export_weeks: args.export_weeks.clone(),
    }
}

/// Rewrite argv so `comed` defaults to `comed report`.
///
/// Rules:
/// - `comed`                         -> `comed report`
/// - `comed --weeks 8 ...`           -> `comed report --weeks 8 ...`
/// - `comed --help/--version/-h`     -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("report".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "report" | "weeks" | "watch");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "report flags".
    if arg1.starts_with('-') {
        argv.insert(1, "report".to_string());
        return argv;
    }

    argv
}
