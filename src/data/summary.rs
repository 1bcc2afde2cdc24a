//! Fleet-wide counts over a whole snapshot.

use serde::Serialize;

use super::band::{BandThresholds, BatteryBand};
use super::unit::Unit;

/// Aggregate counts shown in the header and exports.
///
/// Always computed over the unfiltered snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FleetSummary {
    pub total: usize,
    pub online: usize,
    pub offline: usize,
    pub nominal: usize,
    pub warning: usize,
    pub critical: usize,
}

impl FleetSummary {
    pub fn from_units(units: &[Unit], thresholds: &BandThresholds) -> Self {
        let mut summary = Self {
            total: units.len(),
            ..Default::default()
        };

        for unit in units {
            if unit.online {
                summary.online += 1;
            } else {
                summary.offline += 1;
            }
            match BatteryBand::classify(unit.battery_pct, thresholds) {
                BatteryBand::Nominal => summary.nominal += 1,
                BatteryBand::Warning => summary.warning += 1,
                BatteryBand::Critical => summary.critical += 1,
            }
        }

        summary
    }

    /// The worst battery band present, if any units exist.
    pub fn worst_band(&self) -> Option<BatteryBand> {
        if self.critical > 0 {
            Some(BatteryBand::Critical)
        } else if self.warning > 0 {
            Some(BatteryBand::Warning)
        } else if self.nominal > 0 {
            Some(BatteryBand::Nominal)
        } else {
            None
        }
    }
}
