//! Conversion of wire records into canonical [`Unit`] values.
//!
//! Normalization is per record: a record that fails is reported as a
//! [`MalformedRecord`] and dropped, while the rest of the batch is kept.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::unit::{Location, Unit};
use crate::source::RawUnitRecord;

/// Reasons a single wire record cannot be normalized.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedRecord {
    /// The record is not an object, or a field has the wrong JSON type.
    #[error("invalid record shape: {0}")]
    Shape(String),

    /// A required field is absent or null.
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// `location_coordinates` is not a pair of numbers.
    #[error("invalid location_coordinates: {0}")]
    BadLocation(String),

    /// `last_updated` is not a valid ISO-8601 timestamp.
    #[error("invalid last_updated timestamp `{0}`")]
    BadTimestamp(String),
}

/// A record that was dropped from a batch, with its position in the batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejected {
    pub index: usize,
    pub error: MalformedRecord,
}

/// Result of normalizing a whole batch.
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    /// Units in input order, malformed records skipped.
    pub units: Vec<Unit>,
    pub rejected: Vec<Rejected>,
}

/// Normalize one raw JSON record.
pub fn normalize(value: &Value) -> Result<Unit, MalformedRecord> {
    if !value.is_object() {
        return Err(MalformedRecord::Shape(format!(
            "expected an object, found {}",
            json_kind(value)
        )));
    }
    let record =
        RawUnitRecord::deserialize(value).map_err(|e| MalformedRecord::Shape(e.to_string()))?;
    normalize_record(record)
}

/// Normalize an already-deserialized wire record.
pub fn normalize_record(record: RawUnitRecord) -> Result<Unit, MalformedRecord> {
    let id = record.robot_id.ok_or(MalformedRecord::MissingField("robot_id"))?;
    let online = record
        .online_status
        .ok_or(MalformedRecord::MissingField("online_status"))?;
    let battery_pct = record
        .battery_percentage
        .ok_or(MalformedRecord::MissingField("battery_percentage"))?;
    let cpu_pct = record.cpu_usage.ok_or(MalformedRecord::MissingField("cpu_usage"))?;
    let ram_usage = record
        .ram_consumption
        .ok_or(MalformedRecord::MissingField("ram_consumption"))?;
    let last_updated = record
        .last_updated
        .ok_or(MalformedRecord::MissingField("last_updated"))?;
    let coordinates = record
        .location_coordinates
        .ok_or(MalformedRecord::MissingField("location_coordinates"))?;

    let last_updated_at = parse_timestamp(&last_updated)
        .ok_or_else(|| MalformedRecord::BadTimestamp(last_updated.clone()))?;
    let location = parse_location(&coordinates)?;

    Ok(Unit {
        id,
        online,
        battery_pct,
        cpu_pct,
        ram_usage,
        last_updated_at,
        location,
    })
}

/// Normalize a batch, keeping every valid record in input order.
pub fn normalize_batch(records: &[Value]) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();
    for (index, value) in records.iter().enumerate() {
        match normalize(value) {
            Ok(unit) => batch.units.push(unit),
            Err(error) => batch.rejected.push(Rejected { index, error }),
        }
    }
    batch
}

/// Parse an ISO-8601 timestamp.
///
/// Accepts RFC 3339 with an offset, or a naive date-time (optionally with
/// fractional seconds) which is taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn parse_location(value: &Value) -> Result<Location, MalformedRecord> {
    let Some(items) = value.as_array() else {
        return Err(MalformedRecord::BadLocation(format!(
            "expected an array, found {}",
            json_kind(value)
        )));
    };
    if items.len() != 2 {
        return Err(MalformedRecord::BadLocation(format!(
            "expected 2 elements, found {}",
            items.len()
        )));
    }
    match (items[0].as_f64(), items[1].as_f64()) {
        (Some(latitude), Some(longitude)) => Ok(Location {
            latitude,
            longitude,
        }),
        _ => Err(MalformedRecord::BadLocation(
            "coordinates must be numbers".to_string(),
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn record(id: &str) -> Value {
        json!({
            "robot_id": id,
            "online_status": true,
            "battery_percentage": 85,
            "cpu_usage": 60,
            "ram_consumption": 2048,
            "last_updated": "2024-12-12T11:00:00",
            "location_coordinates": [34.0522, -118.2437]
        })
    }

    #[test]
    fn test_normalize_valid_record() {
        let unit = normalize(&record("robot_123")).unwrap();
        assert_eq!(unit.id, "robot_123");
        assert!(unit.online);
        assert_eq!(unit.battery_pct, 85.0);
        assert_eq!(unit.cpu_pct, 60.0);
        assert_eq!(unit.ram_usage, 2048.0);
        assert_eq!(
            unit.last_updated_at,
            Utc.with_ymd_and_hms(2024, 12, 12, 11, 0, 0).unwrap()
        );
        assert_eq!(unit.location.latitude, 34.0522);
        assert_eq!(unit.location.longitude, -118.2437);
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let raw = record("robot_1");
        assert_eq!(normalize(&raw).unwrap(), normalize(&raw).unwrap());
    }

    #[test]
    fn test_each_required_field_is_checked() {
        for field in [
            "robot_id",
            "online_status",
            "battery_percentage",
            "cpu_usage",
            "ram_consumption",
            "last_updated",
            "location_coordinates",
        ] {
            let mut raw = record("r");
            raw.as_object_mut().unwrap().remove(field);
            assert_eq!(
                normalize(&raw),
                Err(MalformedRecord::MissingField(field)),
                "field {field}"
            );
        }
    }

    #[test]
    fn test_null_field_counts_as_missing() {
        let mut raw = record("r");
        raw["cpu_usage"] = Value::Null;
        assert_eq!(
            normalize(&raw),
            Err(MalformedRecord::MissingField("cpu_usage"))
        );
    }

    #[test]
    fn test_wrong_type_is_shape_error() {
        let mut raw = record("r");
        raw["online_status"] = json!("yes");
        assert!(matches!(normalize(&raw), Err(MalformedRecord::Shape(_))));

        let not_object = normalize(&json!([1, 2]));
        assert!(matches!(not_object, Err(MalformedRecord::Shape(_))));
    }

    #[test]
    fn test_location_must_be_numeric_pair() {
        for bad in [
            json!([1.0]),
            json!([1.0, 2.0, 3.0]),
            json!(["a", 2.0]),
            json!({"lat": 1}),
        ] {
            let mut raw = record("r");
            raw["location_coordinates"] = bad;
            let result = normalize(&raw);
            assert!(matches!(result, Err(MalformedRecord::BadLocation(_))));
        }
    }

    #[test]
    fn test_bad_timestamp() {
        let mut raw = record("r");
        raw["last_updated"] = json!("yesterday");
        assert_eq!(
            normalize(&raw),
            Err(MalformedRecord::BadTimestamp("yesterday".to_string()))
        );
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 12, 12, 11, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-12-12T11:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-12-12T11:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-12-12T13:00:00+02:00"), Some(expected));
        assert!(parse_timestamp("2024-12-12T11:00:00.250").is_some());
        assert!(parse_timestamp("2024-12-12").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_out_of_range_values_pass_through() {
        let mut raw = record("r");
        raw["battery_percentage"] = json!(140);
        raw["cpu_usage"] = json!(-5);
        let unit = normalize(&raw).unwrap();
        assert_eq!(unit.battery_pct, 140.0);
        assert_eq!(unit.cpu_pct, -5.0);
    }

    #[test]
    fn test_batch_drops_only_the_malformed_record() {
        let valid: Vec<Value> = (0..5).map(|i| record(&format!("r{i}"))).collect();

        for bad_pos in 0..=valid.len() {
            let mut records = valid.clone();
            records.insert(bad_pos, json!({"robot_id": "broken"}));

            let batch = normalize_batch(&records);
            assert_eq!(batch.units.len(), valid.len());
            assert_eq!(batch.rejected.len(), 1);
            assert_eq!(batch.rejected[0].index, bad_pos);

            let ids: Vec<&str> = batch.units.iter().map(|u| u.id.as_str()).collect();
            assert_eq!(ids, ["r0", "r1", "r2", "r3", "r4"]);
        }
    }
}
