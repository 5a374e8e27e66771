//! ASCII bar charts for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - price bars: `#` (one column = mean price of the observations in that time slice)
//! - reference line (average/median): `-` over empty cells, `=` across bars

use chrono::DateTime;
use chrono_tz::Tz;

use crate::domain::Observation;

/// A horizontal line drawn across the chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HLine {
    pub label: &'static str,
    pub value: f64,
}

/// Render a bar chart of prices over time.
///
/// `span` fixes the x-axis (e.g. a week window); otherwise the data extent is used.
pub fn render_price_bars(
    observations: &[Observation],
    span: Option<(DateTime<Tz>, DateTime<Tz>)>,
    line: Option<HLine>,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(4);

    let Some((t0, t1)) = span.or_else(|| data_span(observations)) else {
        return "Plot: (no data)\n".to_string();
    };

    let columns = column_means(observations, t0, t1, width);
    let y_max = columns
        .iter()
        .flatten()
        .copied()
        .chain(line.map(|l| l.value))
        .fold(0.0_f64, f64::max);
    let y_max = pad_max(y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    for (x, mean) in columns.iter().enumerate() {
        let Some(mean) = mean else { continue };
        let top = map_y(*mean, y_max, height);
        for row in grid.iter_mut().skip(top) {
            row[x] = '#';
        }
    }

    if let Some(l) = line {
        let y = map_y(l.value, y_max, height);
        for cell in grid[y].iter_mut() {
            *cell = if *cell == '#' { '=' } else { '-' };
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {} .. {} | price=[0.0, {y_max:.1}]¢",
        t0.format("%m/%d %H:%M"),
        t1.format("%m/%d %H:%M"),
    ));
    if let Some(l) = line {
        out.push_str(&format!(" | {}: {:.1}¢", l.label, l.value));
    }
    out.push('\n');

    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }

    out
}

fn data_span(observations: &[Observation]) -> Option<(DateTime<Tz>, DateTime<Tz>)> {
    let first = observations.iter().map(|o| o.instant()).min()?;
    let last = observations.iter().map(|o| o.instant()).max()?;
    Some((first, last))
}

/// Mean price per time slice; `None` for slices without observations.
fn column_means(observations: &[Observation], t0: DateTime<Tz>, t1: DateTime<Tz>, width: usize) -> Vec<Option<f64>> {
    let mut sums = vec![0.0_f64; width];
    let mut counts = vec![0usize; width];

    for o in observations {
        let t = o.instant();
        if t < t0 || t > t1 {
            continue;
        }
        let x = map_x(t, t0, t1, width);
        sums[x] += o.price();
        counts[x] += 1;
    }

    sums.into_iter()
        .zip(counts)
        .map(|(s, n)| (n > 0).then(|| s / n as f64))
        .collect()
}

fn pad_max(max: f64, frac: f64) -> f64 {
    if max <= 0.0 {
        return 1.0;
    }
    max * (1.0 + frac)
}

fn map_x(t: DateTime<Tz>, t0: DateTime<Tz>, t1: DateTime<Tz>, width: usize) -> usize {
    let span = (t1 - t0).num_milliseconds();
    if span <= 0 {
        return 0;
    }
    let u = ((t - t0).num_milliseconds() as f64 / span as f64).clamp(0.0, 1.0);
    ((u * (width as f64 - 1.0)).round() as usize).min(width - 1)
}

/// Row index for a value; row 0 is the top.
fn map_y(v: f64, y_max: f64, height: usize) -> usize {
    let u = (v / y_max).clamp(0.0, 1.0);
    let row_from_bottom = (u * (height as f64 - 1.0)).round() as usize;
    (height - 1).saturating_sub(row_from_bottom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::MARKET_TZ;
    use chrono::TimeZone;

    fn obs(h: u32, price: f64) -> Observation {
        Observation::new(MARKET_TZ.with_ymd_and_hms(2024, 7, 10, h, 0, 0).unwrap(), price).unwrap()
    }

    #[test]
    fn renders_fixed_grid() {
        let data = vec![obs(0, 1.0), obs(6, 4.0), obs(12, 2.0)];
        let plot = render_price_bars(&data, None, None, 20, 6);
        let lines: Vec<&str> = plot.lines().collect();
        assert_eq!(lines.len(), 7);
        assert!(lines[0].starts_with("Plot: 07/10 00:00 .. 07/10 12:00"));
        // The tallest bar reaches the top rows; the bottom row has all three bars.
        assert_eq!(lines[6].matches('#').count(), 3);
    }

    #[test]
    fn reference_line_is_drawn() {
        let data = vec![obs(0, 1.0), obs(12, 3.0)];
        let plot = render_price_bars(&data, None, Some(HLine { label: "Avg", value: 2.0 }), 20, 6);
        assert!(plot.contains("Avg: 2.0¢"));
        assert!(plot.lines().skip(1).any(|l| l.contains('-') && l.contains('=')));
    }

    #[test]
    fn empty_input_without_span() {
        assert_eq!(render_price_bars(&[], None, None, 20, 6), "Plot: (no data)\n");
    }

    #[test]
    fn map_y_puts_max_on_top() {
        assert_eq!(map_y(10.0, 10.0, 5), 0);
        assert_eq!(map_y(0.0, 10.0, 5), 4);
    }
}
