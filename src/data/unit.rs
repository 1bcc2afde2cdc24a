//! Canonical telemetry model.
//!
//! [`Unit`] values are built fresh by the normalizer on every poll and are
//! never patched in place; a new [`Snapshot`] replaces the previous one
//! wholesale.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Geographic position of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// One monitored robot in canonical form.
///
/// Metric values are carried exactly as reported. Out-of-range readings
/// (e.g. a battery above 100) are kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Unique within a snapshot, stable across polls.
    pub id: String,
    pub online: bool,
    pub battery_pct: f64,
    pub cpu_pct: f64,
    /// Absolute RAM consumption (MB as reported by the endpoint).
    pub ram_usage: f64,
    pub last_updated_at: DateTime<Utc>,
    pub location: Location,
}

/// One complete poll result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Units in the order the endpoint returned them.
    pub units: Vec<Unit>,
    pub fetched_at: DateTime<Utc>,
    /// Number of records dropped by the normalizer for this snapshot.
    pub dropped: usize,
}

impl Snapshot {
    /// Create a snapshot from already-normalized units.
    pub fn new(units: Vec<Unit>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            units,
            fetched_at,
            dropped: 0,
        }
    }

    /// Returns the number of units in the snapshot.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Look up a unit by id.
    pub fn get(&self, id: &str) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }
}
