//! Wire format of the telemetry endpoint.
//!
//! These types mirror the JSON records served by `GET /robots`. Every field
//! is optional at this layer so that a record with a missing field can be
//! reported precisely by the normalizer instead of failing the whole batch.

use serde::{Deserialize, Serialize};

/// One robot record as served by the endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawUnitRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub robot_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub online_status: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_percentage: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_usage: Option<f64>,

    /// RAM consumption in MB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ram_consumption: Option<f64>,

    /// ISO-8601 timestamp, with or without a UTC offset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,

    /// Expected to be `[latitude, longitude]`; validated by the normalizer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_coordinates: Option<serde_json::Value>,
}
