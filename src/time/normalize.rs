//! Timestamp normalization.
//!
//! The pricing feed has been seen to encode timestamps several ways. We detect
//! the encoding explicitly ([`TimestampFormat::detect`]) and apply one
//! deterministic rule per variant:
//!
//! | variant        | shape                        | meaning                        |
//! |----------------|------------------------------|--------------------------------|
//! | `EpochMillis`  | 13 digits                    | ms since Unix epoch, UTC       |
//! | `CivilSeconds` | 14 digits `YYYYMMDDHHMMSS`   | naive civil time, assumed UTC  |
//! | `CivilMinutes` | 12 digits `YYYYMMDDHHMM`     | naive civil time, assumed UTC  |
//! | `GeneralText`  | anything else                | ISO-8601 / RFC 3339 text       |
//!
//! Whatever the input, the result is expressed in [`MARKET_TZ`].

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

use super::MARKET_TZ;

/// Why a single timestamp could not be normalized.
///
/// Always recoverable: the caller drops the observation it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty timestamp")]
    Empty,
    #[error("epoch milliseconds out of range: '{0}'")]
    EpochOutOfRange(String),
    #[error("invalid compact timestamp '{0}'")]
    InvalidCompact(String),
    #[error("unrecognized timestamp '{0}'")]
    Unrecognized(String),
}

/// Closed set of timestamp encodings understood by [`normalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampFormat {
    EpochMillis,
    CivilSeconds,
    CivilMinutes,
    GeneralText,
}

impl TimestampFormat {
    /// Classify a raw timestamp by length and the all-digits predicate.
    pub fn detect(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return TimestampFormat::GeneralText;
        }
        match raw.len() {
            13 => TimestampFormat::EpochMillis,
            14 => TimestampFormat::CivilSeconds,
            12 => TimestampFormat::CivilMinutes,
            _ => TimestampFormat::GeneralText,
        }
    }
}

/// Convert a raw feed timestamp into an instant in [`MARKET_TZ`].
pub fn normalize(raw: &str) -> Result<DateTime<Tz>, ParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ParseError::Empty);
    }

    let utc = match TimestampFormat::detect(raw) {
        TimestampFormat::EpochMillis => parse_epoch_millis(raw)?,
        TimestampFormat::CivilSeconds => parse_compact(raw, "%Y%m%d%H%M%S")?,
        TimestampFormat::CivilMinutes => parse_compact(raw, "%Y%m%d%H%M")?,
        TimestampFormat::GeneralText => parse_text(raw)?,
    };

    Ok(utc.with_timezone(&MARKET_TZ))
}

fn parse_epoch_millis(raw: &str) -> Result<DateTime<Utc>, ParseError> {
    let millis: i64 = raw
        .parse()
        .map_err(|_| ParseError::EpochOutOfRange(raw.to_string()))?;
    DateTime::from_timestamp_millis(millis).ok_or_else(|| ParseError::EpochOutOfRange(raw.to_string()))
}

fn parse_compact(raw: &str, fmt: &str) -> Result<DateTime<Utc>, ParseError> {
    let naive = NaiveDateTime::parse_from_str(raw, fmt).map_err(|_| ParseError::InvalidCompact(raw.to_string()))?;
    Ok(Utc.from_utc_datetime(&naive))
}

fn parse_text(raw: &str) -> Result<DateTime<Utc>, ParseError> {
    // A trailing `Z` is the UTC designator.
    let owned;
    let text = match raw.strip_suffix('Z') {
        Some(rest) => {
            owned = format!("{rest}+00:00");
            owned.as_str()
        }
        None => raw,
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }

    const OFFSET_FMTS: [&str; 6] = [
        "%Y-%m-%dT%H:%M:%S%.f%:z",
        "%Y-%m-%d %H:%M:%S%.f%:z",
        "%Y-%m-%dT%H:%M:%S%.f%z",
        "%Y-%m-%d %H:%M:%S%.f%z",
        "%Y-%m-%dT%H:%M%:z",
        "%Y-%m-%d %H:%M%:z",
    ];
    for fmt in OFFSET_FMTS {
        if let Ok(dt) = DateTime::<FixedOffset>::parse_from_str(text, fmt) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    // No zone information: assume UTC.
    const NAIVE_FMTS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in NAIVE_FMTS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN)));
    }

    Err(ParseError::Unrecognized(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Offset, Timelike};

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn detect_dispatches_on_length_and_digits() {
        assert_eq!(TimestampFormat::detect("1700000000000"), TimestampFormat::EpochMillis);
        assert_eq!(TimestampFormat::detect("20240115093000"), TimestampFormat::CivilSeconds);
        assert_eq!(TimestampFormat::detect("202401150930"), TimestampFormat::CivilMinutes);
        assert_eq!(TimestampFormat::detect("2024-01-15T09:30:00Z"), TimestampFormat::GeneralText);
        // Right length, but not all digits.
        assert_eq!(TimestampFormat::detect("2024011509300a"), TimestampFormat::GeneralText);
        assert_eq!(TimestampFormat::detect("170000000000"), TimestampFormat::CivilMinutes);
        assert_eq!(TimestampFormat::detect("17000000000"), TimestampFormat::GeneralText);
    }

    #[test]
    fn epoch_millis_in_standard_time() {
        // 2023-11-14 22:13:20Z is 16:13:20 CST (UTC-6).
        let dt = normalize("1700000000000").unwrap();
        assert_eq!(dt.timestamp(), 1_700_000_000);
        assert_eq!(dt.with_timezone(&Utc), utc(2023, 11, 14, 22, 13, 20));
        assert_eq!(dt.hour(), 16);
        assert_eq!(dt.offset().fix().local_minus_utc(), -6 * 3600);
    }

    #[test]
    fn epoch_millis_in_daylight_time() {
        // 2024-07-03 09:46:40Z is 04:46:40 CDT (UTC-5).
        let dt = normalize("1720000000000").unwrap();
        assert_eq!(dt.with_timezone(&Utc), utc(2024, 7, 3, 9, 46, 40));
        assert_eq!(dt.hour(), 4);
        assert_eq!(dt.offset().fix().local_minus_utc(), -5 * 3600);
    }

    #[test]
    fn epoch_millis_whole_seconds_are_floored() {
        let dt = normalize("1700000000999").unwrap();
        assert_eq!(dt.timestamp(), 1_700_000_000);
        assert_eq!(dt.timestamp_subsec_millis(), 999);
    }

    #[test]
    fn compact_forms_are_naive_utc() {
        let secs = normalize("20240115093015").unwrap();
        assert_eq!(secs.with_timezone(&Utc), utc(2024, 1, 15, 9, 30, 15));
        assert_eq!(secs.hour(), 3);

        let mins = normalize("202407011200").unwrap();
        assert_eq!(mins.with_timezone(&Utc), utc(2024, 7, 1, 12, 0, 0));
        assert_eq!(mins.hour(), 7);
    }

    #[test]
    fn compact_form_with_impossible_date_fails() {
        assert_eq!(
            normalize("20241345093015"),
            Err(ParseError::InvalidCompact("20241345093015".to_string()))
        );
    }

    #[test]
    fn general_text_variants() {
        let want = utc(2024, 3, 10, 14, 30, 0);
        assert_eq!(normalize("2024-03-10T14:30:00Z").unwrap().with_timezone(&Utc), want);
        assert_eq!(normalize("2024-03-10T09:30:00-05:00").unwrap().with_timezone(&Utc), want);
        assert_eq!(normalize("2024-03-10T14:30:00").unwrap().with_timezone(&Utc), want);
        assert_eq!(normalize("2024-03-10 14:30:00").unwrap().with_timezone(&Utc), want);
        assert_eq!(normalize("2024-03-10T14:30").unwrap().with_timezone(&Utc), want);
        assert_eq!(
            normalize("2024-03-10").unwrap().with_timezone(&Utc),
            utc(2024, 3, 10, 0, 0, 0)
        );
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert_eq!(normalize("bad"), Err(ParseError::Unrecognized("bad".to_string())));
        assert_eq!(normalize("   "), Err(ParseError::Empty));
    }
}
