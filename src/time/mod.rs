//! Time handling in the feed's civil time zone.
//!
//! - timestamp normalization (`normalize`)
//! - Sunday–Saturday week windows anchored to "now" (`weeks`)

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

pub mod normalize;
pub mod weeks;

pub use normalize::*;
pub use weeks::*;

/// Civil time zone all instants are expressed in.
pub const MARKET_TZ: Tz = chrono_tz::America::Chicago;

/// Resolve a local wall-clock time in [`MARKET_TZ`] to an instant.
///
/// Ambiguous (fall-back) times take the earlier instant. Nonexistent
/// (spring-forward) times shift forward one minute at a time, up to two hours.
pub fn resolve_local(naive: NaiveDateTime) -> DateTime<Tz> {
    use chrono::offset::LocalResult::*;
    match MARKET_TZ.from_local_datetime(&naive) {
        Single(dt) => dt,
        Ambiguous(earliest, _) => earliest,
        None => {
            let mut t = naive;
            for _ in 0..120 {
                t += chrono::Duration::minutes(1);
                if let Single(dt) = MARKET_TZ.from_local_datetime(&t) {
                    return dt;
                }
            }
            // No zone has a gap this long; read the wall time as UTC.
            Utc.from_utc_datetime(&naive).with_timezone(&MARKET_TZ)
        }
    }
}
