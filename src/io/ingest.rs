//! Feed payload ingest and normalization.
//!
//! This module is responsible for turning an arbitrarily shaped pricing payload
//! into a clean, sorted [`ObservationSet`].
//!
//! Design goals:
//! - **Strict top-level shape** (an unrecognized payload fails the whole cycle)
//! - **Item-level validation** (skip bad items, but report what happened)
//! - **Deterministic field lookup** (fixed, ordered candidate names)
//! - **Separation of concerns**: no network or windowing logic here

use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::{Observation, ObservationSet};
use crate::error::FeedError;
use crate::time::{ParseError, normalize};

/// Keys searched, in order, for the list of items in a keyed payload.
pub const CONTAINER_KEYS: [&str; 5] = ["data", "prices", "feed", "results", "items"];
/// Item fields searched, in order, for the timestamp.
pub const TIMESTAMP_FIELDS: [&str; 5] = ["millisUTC", "timestamp", "time", "date", "datetime"];
/// Item fields searched, in order, for the price.
pub const PRICE_FIELDS: [&str; 4] = ["price", "value", "cost", "rate"];

/// Why an item did not produce an observation.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NotARecord,
    MissingTimestamp,
    MissingPrice,
    BadTimestamp(ParseError),
    PriceOutOfRange(f64),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NotARecord => write!(f, "item is not a record"),
            SkipReason::MissingTimestamp => write!(f, "no usable timestamp field"),
            SkipReason::MissingPrice => write!(f, "no numeric price field"),
            SkipReason::BadTimestamp(e) => write!(f, "{e}"),
            SkipReason::PriceOutOfRange(p) => write!(f, "price {p} outside [0, 1000]"),
        }
    }
}

/// An item-level problem encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSkip {
    /// Position in the candidate item list (0-based).
    pub index: usize,
    pub reason: SkipReason,
}

/// Ingest output: sorted observations + how many items were looked at.
#[derive(Debug, Clone)]
pub struct ParsedFeed {
    pub observations: ObservationSet,
    pub items_considered: usize,
    pub skipped: Vec<ItemSkip>,
}

impl ParsedFeed {
    /// Treat "items present, none valid" as a degraded-data failure.
    pub fn require_observations(self) -> Result<Self, FeedError> {
        if self.observations.is_empty() {
            return Err(FeedError::EmptyResult {
                items_considered: self.items_considered,
            });
        }
        Ok(self)
    }
}

/// Extract observations from a raw feed payload.
///
/// The only fatal error is an unrecognized top-level shape; item-level problems
/// are collected in [`ParsedFeed::skipped`].
pub fn parse_feed(payload: &Value) -> Result<ParsedFeed, FeedError> {
    let items = candidate_items(payload)?;

    let mut observations = Vec::with_capacity(items.len());
    let mut skipped = Vec::new();

    for (index, item) in items.iter().enumerate() {
        match parse_item(item) {
            Ok(obs) => observations.push(obs),
            Err(reason) => skipped.push(ItemSkip { index, reason }),
        }
    }

    if !skipped.is_empty() {
        debug!(
            items = items.len(),
            skipped = skipped.len(),
            first_reason = %skipped[0].reason,
            "skipped feed items"
        );
    }

    Ok(ParsedFeed {
        observations: ObservationSet::from_unsorted(observations),
        items_considered: items.len(),
        skipped,
    })
}

fn candidate_items(payload: &Value) -> Result<&[Value], FeedError> {
    match payload {
        Value::Array(items) => Ok(items.as_slice()),
        Value::Object(map) => {
            for key in CONTAINER_KEYS {
                if let Some(Value::Array(items)) = map.get(key) {
                    return Ok(items.as_slice());
                }
            }
            if is_single_record(map) {
                return Ok(std::slice::from_ref(payload));
            }
            Err(FeedError::Format("unexpected shape".to_string()))
        }
        other => Err(FeedError::Format(format!("unexpected shape: {}", value_kind(other)))),
    }
}

/// A bare object counts as one item only if it carries a timestamp field.
fn is_single_record(map: &Map<String, Value>) -> bool {
    TIMESTAMP_FIELDS.iter().any(|f| map.contains_key(*f))
}

fn parse_item(item: &Value) -> Result<Observation, SkipReason> {
    let Value::Object(record) = item else {
        return Err(SkipReason::NotARecord);
    };

    let raw_ts = find_timestamp(record).ok_or(SkipReason::MissingTimestamp)?;
    let price = find_price(record).ok_or(SkipReason::MissingPrice)?;

    let instant = normalize(&raw_ts).map_err(SkipReason::BadTimestamp)?;
    Observation::new(instant, price).ok_or(SkipReason::PriceOutOfRange(price))
}

/// The first timestamp field present wins, even if its value turns out unusable.
fn find_timestamp(record: &Map<String, Value>) -> Option<String> {
    let value = TIMESTAMP_FIELDS.iter().find_map(|f| record.get(*f))?;
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => number_to_timestamp(n),
        _ => None,
    }
}

fn number_to_timestamp(n: &serde_json::Number) -> Option<String> {
    if let Some(i) = n.as_i64() {
        return (i != 0).then(|| i.to_string());
    }
    if let Some(u) = n.as_u64() {
        return Some(u.to_string());
    }
    // Whole-valued floats (e.g. `1.7e12`) are rendered as integers.
    let f = n.as_f64()?;
    if f.is_finite() && f.fract() == 0.0 && f != 0.0 && f.abs() < i64::MAX as f64 {
        Some((f as i64).to_string())
    } else {
        Some(f.to_string())
    }
}

/// The first price field holding a numeric value wins; unconvertible ones are passed over.
fn find_price(record: &Map<String, Value>) -> Option<f64> {
    PRICE_FIELDS
        .iter()
        .filter_map(|f| record.get(*f))
        .find_map(numeric_value)
}

fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Build a set from `(instant, price)` pairs, dropping out-of-range prices.
pub fn retain_valid(prices: impl IntoIterator<Item = (chrono::DateTime<chrono_tz::Tz>, f64)>) -> ObservationSet {
    let items = prices
        .into_iter()
        .filter_map(|(t, p)| Observation::new(t, p))
        .collect();
    ObservationSet::from_unsorted(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn data_container_with_one_bad_timestamp() {
        let payload = json!({
            "data": [
                {"millisUTC": "1700000000000", "price": "3.5"},
                {"millisUTC": "bad", "price": "1.0"}
            ]
        });
        let parsed = parse_feed(&payload).unwrap();
        assert_eq!(parsed.items_considered, 2);
        assert_eq!(parsed.observations.len(), 1);

        let obs = parsed.observations.first().unwrap();
        assert_eq!(obs.instant().with_timezone(&Utc), Utc.timestamp_opt(1_700_000_000, 0).unwrap());
        assert_eq!(obs.price(), 3.5);

        assert_eq!(parsed.skipped.len(), 1);
        assert_eq!(parsed.skipped[0].index, 1);
        assert!(matches!(parsed.skipped[0].reason, SkipReason::BadTimestamp(_)));
    }

    #[test]
    fn bare_array_of_live_feed_records() {
        // Shape of the live 5-minute feed: numeric strings, newest first.
        let payload = json!([
            {"millisUTC": "1720000600000", "price": "4.1"},
            {"millisUTC": "1720000300000", "price": "3.9"},
            {"millisUTC": "1720000000000", "price": "-0.2"}
        ]);
        let parsed = parse_feed(&payload).unwrap();
        assert_eq!(parsed.items_considered, 3);
        let prices: Vec<f64> = parsed.observations.iter().map(|o| o.price()).collect();
        assert_eq!(prices, vec![3.9, 4.1]);
        assert_eq!(parsed.skipped[0].reason, SkipReason::PriceOutOfRange(-0.2));
    }

    #[test]
    fn output_is_sorted_and_bounded() {
        let payload = json!({"prices": [
            {"timestamp": "2024-07-03T12:00:00Z", "value": 5.0},
            {"timestamp": "2024-07-01T12:00:00Z", "value": 1001.0},
            {"timestamp": "2024-07-02T12:00:00Z", "value": 0.0},
            {"timestamp": "2024-07-01T00:00:00Z", "value": 1000.0}
        ]});
        let parsed = parse_feed(&payload).unwrap();
        let obs = parsed.observations.as_slice();
        assert_eq!(obs.len(), 3);
        assert!(obs.windows(2).all(|w| w[0].instant() <= w[1].instant()));
        assert!(obs.iter().all(|o| (0.0..=1000.0).contains(&o.price())));
    }

    #[test]
    fn container_keys_are_checked_in_order() {
        // `data` is not a list, so `feed` is used.
        let payload = json!({
            "data": "nope",
            "feed": [{"time": "202407011200", "cost": 2.0}],
            "items": [{"time": "202407011300", "cost": 9.0}]
        });
        let parsed = parse_feed(&payload).unwrap();
        assert_eq!(parsed.observations.len(), 1);
        assert_eq!(parsed.observations.first().unwrap().price(), 2.0);
    }

    #[test]
    fn first_present_timestamp_field_wins() {
        // `millisUTC` is present but null: the item is skipped, `date` is not consulted.
        let payload = json!([{"millisUTC": null, "date": "2024-07-01", "price": 1.0}]);
        let parsed = parse_feed(&payload).unwrap();
        assert!(parsed.observations.is_empty());
        assert_eq!(parsed.skipped[0].reason, SkipReason::MissingTimestamp);
    }

    #[test]
    fn first_numeric_price_field_wins() {
        let payload = json!([{"timestamp": "1700000000000", "price": "n/a", "value": true, "rate": "2.25"}]);
        let parsed = parse_feed(&payload).unwrap();
        assert_eq!(parsed.observations.first().unwrap().price(), 2.25);
    }

    #[test]
    fn boolean_price_is_not_numeric() {
        let payload = json!([
            {"millisUTC": "1700000000000", "price": true},
            {"millisUTC": "1700000300000", "price": false}
        ]);
        let parsed = parse_feed(&payload).unwrap();
        assert!(parsed.observations.is_empty());
        assert_eq!(parsed.skipped.len(), 2);
        assert!(parsed.skipped.iter().all(|s| s.reason == SkipReason::MissingPrice));
    }

    #[test]
    fn numeric_timestamps_are_rendered_as_digits() {
        let payload = json!([{"millisUTC": 1700000000000_i64, "price": 3.0}]);
        let parsed = parse_feed(&payload).unwrap();
        assert_eq!(parsed.observations.len(), 1);
    }

    #[test]
    fn non_record_items_are_skipped() {
        let payload = json!({"results": [1, "x", {"date": "2024-07-01T00:00:00", "price": 1.5}]});
        let parsed = parse_feed(&payload).unwrap();
        assert_eq!(parsed.items_considered, 3);
        assert_eq!(parsed.observations.len(), 1);
        assert_eq!(parsed.skipped.len(), 2);
        assert!(parsed.skipped.iter().all(|s| s.reason == SkipReason::NotARecord));
    }

    #[test]
    fn single_record_is_a_one_item_list() {
        let payload = json!({"datetime": "2024-07-01T10:00:00-05:00", "price": 2.0});
        let parsed = parse_feed(&payload).unwrap();
        assert_eq!(parsed.items_considered, 1);
        assert_eq!(parsed.observations.len(), 1);
    }

    #[test]
    fn unrecognized_shapes_are_format_errors() {
        assert!(matches!(parse_feed(&json!({"foo": 1})), Err(FeedError::Format(_))));
        assert!(matches!(parse_feed(&json!("text")), Err(FeedError::Format(_))));
        assert!(matches!(parse_feed(&Value::Null), Err(FeedError::Format(_))));
    }

    #[test]
    fn zero_valid_items_is_an_empty_result() {
        let payload = json!([{"price": 1.0}, {"millisUTC": "bad", "price": 2.0}]);
        let err = parse_feed(&payload).unwrap().require_observations().unwrap_err();
        assert_eq!(err, FeedError::EmptyResult { items_considered: 2 });
    }

    #[test]
    fn retain_valid_drops_out_of_range() {
        let t = crate::time::MARKET_TZ.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let set = retain_valid(vec![(t, 1.0), (t, -1.0), (t, 2000.0)]);
        assert_eq!(set.len(), 1);
    }
}
