//! Synthetic demo prices, used when the live feed cannot be reached.
//!
//! One week of 5-minute observations with a daily cycle:
//! `price = max(0, 5 + 2·sin(hour·π/12) + ε)`, `ε ~ N(0, 1)`.

use std::f64::consts::PI;

use chrono::{DateTime, Duration, Timelike, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::domain::ObservationSet;
use crate::error::{AppError, EXIT_FEED};
use crate::io::ingest::retain_valid;
use crate::time::MARKET_TZ;

const DEMO_DAYS: i64 = 7;
const STEP_MINUTES: i64 = 5;
const BASE_PRICE: f64 = 5.0;
const DAILY_AMPLITUDE: f64 = 2.0;

/// Generate demo observations ending at `now`.
///
/// With a `seed` the output is reproducible; otherwise it is drawn from OS entropy.
pub fn generate_demo(now: DateTime<Utc>, seed: Option<u64>) -> Result<ObservationSet, AppError> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let noise = Normal::new(0.0, 1.0).map_err(|e| AppError::new(EXIT_FEED, format!("Noise distribution error: {e}")))?;

    let end = now.with_timezone(&MARKET_TZ);
    let mut t = end - Duration::days(DEMO_DAYS);
    let mut points = Vec::with_capacity((DEMO_DAYS * 24 * 60 / STEP_MINUTES) as usize + 1);

    while t <= end {
        let daily = DAILY_AMPLITUDE * (f64::from(t.hour()) * PI / 12.0).sin();
        let price = (BASE_PRICE + daily + noise.sample(&mut rng)).max(0.0);
        points.push((t, price));
        t += Duration::minutes(STEP_MINUTES);
    }

    Ok(retain_valid(points))
}
