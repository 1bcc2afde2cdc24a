//! Presentation attributes derived from raw unit metrics.
//!
//! These are pure functions of a [`Unit`] and a [`BandThresholds`] table, so
//! the rendering layer never has to interpret raw numbers itself.

use serde::{Deserialize, Serialize};

use super::unit::Unit;

/// Thresholds for battery banding and row highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandThresholds {
    /// Battery below this is critical.
    pub critical_below: f64,
    /// Battery below this (and not critical) is a warning.
    pub warning_below: f64,
    /// Online units below this battery level get an alert highlight.
    pub low_battery_alert: f64,
}

impl Default for BandThresholds {
    fn default() -> Self {
        Self {
            critical_below: 15.0,
            warning_below: 50.0,
            low_battery_alert: 20.0,
        }
    }
}

/// Battery severity band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatteryBand {
    Nominal,
    Warning,
    Critical,
}

impl BatteryBand {
    /// Band a battery percentage. Boundary values belong to the higher band.
    pub fn classify(battery_pct: f64, thresholds: &BandThresholds) -> Self {
        if battery_pct < thresholds.critical_below {
            BatteryBand::Critical
        } else if battery_pct < thresholds.warning_below {
            BatteryBand::Warning
        } else {
            BatteryBand::Nominal
        }
    }

    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            BatteryBand::Nominal => "OK",
            BatteryBand::Warning => "LOW",
            BatteryBand::Critical => "CRIT",
        }
    }
}

/// How a table row should be emphasised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowHighlight {
    Normal,
    /// Unit is offline; rendered dimmed.
    Offline,
    /// Unit is online with battery under the alert level.
    LowBattery,
}

/// Everything the rendering layer needs beyond the raw unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayAttributes {
    pub battery_band: BatteryBand,
    pub highlight: RowHighlight,
    /// CPU usage as a `[0, 1]` ratio for gauge widgets.
    pub cpu_gauge: f64,
}

/// Compute the display attributes of a unit.
pub fn derive(unit: &Unit, thresholds: &BandThresholds) -> DisplayAttributes {
    let highlight = if !unit.online {
        RowHighlight::Offline
    } else if unit.battery_pct < thresholds.low_battery_alert {
        RowHighlight::LowBattery
    } else {
        RowHighlight::Normal
    };

    DisplayAttributes {
        battery_band: BatteryBand::classify(unit.battery_pct, thresholds),
        highlight,
        cpu_gauge: gauge_ratio(unit.cpu_pct),
    }
}

fn gauge_ratio(pct: f64) -> f64 {
    if pct.is_nan() {
        return 0.0;
    }
    (pct / 100.0).clamp(0.0, 1.0)
}
