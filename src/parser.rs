//! JSON parser for station readings payloads.
//!
//! The observations endpoint returns an object keyed by ISO-8601 timestamp:
//!
//! ```json
//! {
//!   "2025-06-01T09:05:00-04:00": { "temperature": 21.4, "rainfall": 0 },
//!   "2025-06-01T09:20:00-04:00": { "temperature": 21.9 }
//! }
//! ```
//!
//! Document order is kept so that the normalizer's first-seen rule refers to
//! the order the station sent.

use std::collections::BTreeMap;
use std::fmt;

use anyhow::Result;
use serde::de::{Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::WeatherError;
use crate::readings::{Metrics, RawReadingSet, Reading, parse_timestamp};

/// Payload entries in document order.
struct Payload(Vec<(String, Option<BTreeMap<String, Value>>)>);

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PayloadVisitor;

        impl<'de> Visitor<'de> for PayloadVisitor {
            type Value = Payload;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object keyed by timestamp")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Payload, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry()? {
                    entries.push(entry);
                }
                Ok(Payload(entries))
            }

            // Some station endpoints answer "no data" with `null` or `[]`.
            fn visit_unit<E>(self) -> Result<Payload, E> {
                Ok(Payload(Vec::new()))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Payload, A::Error> {
                if seq.next_element::<serde::de::IgnoredAny>()?.is_some() {
                    return Err(serde::de::Error::custom("expected an empty array"));
                }
                Ok(Payload(Vec::new()))
            }
        }

        deserializer.deserialize_any(PayloadVisitor)
    }
}

/// Decodes a readings payload into a (not yet normalized) [`RawReadingSet`].
///
/// Numeric metric values are kept, `null` becomes an absent value, and any
/// other value type is skipped.
///
/// # Errors
///
/// Returns an error if the bytes are not JSON of the expected shape or a
/// timestamp key cannot be parsed.
pub fn parse_readings(bytes: &[u8]) -> Result<RawReadingSet> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(RawReadingSet::default());
    }

    let payload: Payload = serde_json::from_slice(bytes)
        .map_err(|e| WeatherError::InvalidPayload(e.to_string()))?;

    let mut readings = Vec::with_capacity(payload.0.len());
    for (raw_ts, values) in payload.0 {
        let timestamp = parse_timestamp(&raw_ts)?;
        let mut metrics = Metrics::new();

        for (name, value) in values.unwrap_or_default() {
            match value {
                Value::Number(n) => {
                    metrics.insert(name, n.as_f64());
                }
                Value::Null => {
                    metrics.insert(name, None);
                }
                other => debug!(
                    timestamp = %raw_ts,
                    metric = %name,
                    value = %other,
                    "Skipping non-numeric metric"
                ),
            }
        }

        readings.push(Reading::new(timestamp, metrics));
    }

    Ok(RawReadingSet::new(readings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readings::tests::ts;

    #[test]
    fn test_parse_readings() {
        let body = br#"{
            "2025-06-01T09:05:00-04:00": {"temperature": 21.4, "rainfall": 0, "status": "ok"},
            "2025-06-01T09:20:00-04:00": {"temperature": null}
        }"#;

        let set = parse_readings(body).unwrap();

        assert_eq!(set.len(), 2);
        let first = &set.as_slice()[0];
        assert_eq!(first.timestamp, ts("2025-06-01T13:05:00Z"));
        assert_eq!(first.value("temperature"), Some(21.4));
        assert_eq!(first.value("rainfall"), Some(0.0));
        assert!(!first.metrics.contains_key("status"));

        let second = &set.as_slice()[1];
        assert!(second.metrics.contains_key("temperature"));
        assert_eq!(second.value("temperature"), None);
    }

    #[test]
    fn test_parse_keeps_document_order() {
        let body = br#"{
            "2025-06-01T12:00:00Z": {"temperature": 1},
            "2025-06-01T08:00:00-04:00": {"temperature": 2}
        }"#;

        let set = parse_readings(body).unwrap().normalize();

        assert_eq!(set.len(), 1);
        assert_eq!(set.as_slice()[0].value("temperature"), Some(1.0));
    }

    #[test]
    fn test_parse_empty_payloads() {
        assert!(parse_readings(b"").unwrap().is_empty());
        assert!(parse_readings(b"{}").unwrap().is_empty());
        assert!(parse_readings(b"null").unwrap().is_empty());
        assert!(parse_readings(b"[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_invalid_payloads() {
        assert!(parse_readings(b"[1, 2]").is_err());
        assert!(parse_readings(b"not json").is_err());
        assert!(parse_readings(br#"{"not a time": {}}"#).is_err());
    }

    #[test]
    fn test_parse_null_reading_body() {
        let set = parse_readings(br#"{"2025-06-01T12:00:00Z": null}"#).unwrap();

        assert_eq!(set.len(), 1);
        assert!(set.as_slice()[0].metrics.is_empty());
    }
}
