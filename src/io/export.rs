//! Export observations and weekly statistics to CSV.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream scripts.
//! Instants are written as RFC 3339 in market time.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::Observation;
use crate::error::{AppError, EXIT_USAGE};
use crate::report::WeeklySummary;

/// Write parsed observations to a CSV file.
pub fn write_observations_csv(path: &Path, observations: &[Observation]) -> Result<(), AppError> {
    let mut file = create(path)?;
    write_observations(&mut file, observations)
        .and_then(|()| file.flush())
        .map_err(|e| AppError::new(EXIT_USAGE, format!("Failed to write observations CSV '{}': {e}", path.display())))
}

/// Write one row per week window to a CSV file; empty weeks have blank statistics.
pub fn write_weeks_csv(path: &Path, weekly: &[WeeklySummary]) -> Result<(), AppError> {
    let mut file = create(path)?;
    write_weeks(&mut file, weekly)
        .and_then(|()| file.flush())
        .map_err(|e| AppError::new(EXIT_USAGE, format!("Failed to write weeks CSV '{}': {e}", path.display())))
}

fn create(path: &Path) -> Result<BufWriter<File>, AppError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| AppError::new(EXIT_USAGE, format!("Failed to create export CSV '{}': {e}", path.display())))
}

fn write_observations<W: Write>(out: &mut W, observations: &[Observation]) -> std::io::Result<()> {
    writeln!(out, "instant,epoch_ms,price_cents")?;
    for o in observations {
        writeln!(
            out,
            "{},{},{:.4}",
            o.instant().to_rfc3339(),
            o.instant().timestamp_millis(),
            o.price()
        )?;
    }
    Ok(())
}

fn write_weeks<W: Write>(out: &mut W, weekly: &[WeeklySummary]) -> std::io::Result<()> {
    writeln!(
        out,
        "week,start,end,count,mean,median,min,max,first_seen,last_seen,partial"
    )?;
    for summary in weekly {
        let w = &summary.window;
        match &summary.stats {
            Some(ws) => writeln!(
                out,
                "{},{},{},{},{:.4},{:.4},{:.4},{:.4},{},{},{}",
                w.index,
                w.start.to_rfc3339(),
                w.end.to_rfc3339(),
                ws.stats.count,
                ws.stats.mean,
                ws.stats.median,
                ws.stats.min,
                ws.stats.max,
                ws.first_seen.to_rfc3339(),
                ws.last_seen.to_rfc3339(),
                ws.is_partial(),
            )?,
            None => writeln!(out, "{},{},{},0,,,,,,,", w.index, w.start.to_rfc3339(), w.end.to_rfc3339())?,
        }
    }
    Ok(())
}
