//! User-selected filtering of units.

use serde::{Deserialize, Serialize};

use super::unit::Unit;

/// Which connectivity state a unit must be in to pass the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnlineState {
    #[default]
    Any,
    Online,
    Offline,
}

impl OnlineState {
    /// Cycle Any → Online → Offline → Any.
    pub fn next(self) -> Self {
        match self {
            OnlineState::Any => OnlineState::Online,
            OnlineState::Online => OnlineState::Offline,
            OnlineState::Offline => OnlineState::Any,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OnlineState::Any => "any",
            OnlineState::Online => "online",
            OnlineState::Offline => "offline",
        }
    }

    fn matches(&self, online: bool) -> bool {
        match self {
            OnlineState::Any => true,
            OnlineState::Online => online,
            OnlineState::Offline => !online,
        }
    }
}

/// Predicate parameters chosen by the user.
///
/// All clauses must pass for a unit to be kept.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub online_state: OnlineState,
    /// Inclusive lower bound on battery percentage.
    pub min_battery_pct: f64,
    /// Case-sensitive literal substring of the unit id; empty matches all.
    pub id_substring: String,
}

impl FilterCriteria {
    /// Check whether a unit passes every clause.
    pub fn matches(&self, unit: &Unit) -> bool {
        self.online_state.matches(unit.online)
            && unit.battery_pct >= self.min_battery_pct
            && (self.id_substring.is_empty() || unit.id.contains(self.id_substring.as_str()))
    }

    /// Returns true when no clause restricts the result.
    pub fn is_unrestricted(&self) -> bool {
        self.online_state == OnlineState::Any
            && self.min_battery_pct <= 0.0
            && self.id_substring.is_empty()
    }
}

/// Apply the criteria, preserving input order.
pub fn apply<'a>(units: &'a [Unit], criteria: &FilterCriteria) -> Vec<&'a Unit> {
    units.iter().filter(|u| criteria.matches(u)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::unit::Location;
    use chrono::Utc;

    fn unit(id: &str, online: bool, battery: f64) -> Unit {
        Unit {
            id: id.to_string(),
            online,
            battery_pct: battery,
            cpu_pct: 10.0,
            ram_usage: 512.0,
            last_updated_at: Utc::now(),
            location: Location {
                latitude: 0.0,
                longitude: 0.0,
            },
        }
    }

    fn ids(units: &[&Unit]) -> Vec<String> {
        units.iter().map(|u| u.id.clone()).collect()
    }

    #[test]
    fn test_default_criteria_keeps_everything() {
        let units = vec![unit("a", true, 0.0), unit("b", false, 100.0)];
        let criteria = FilterCriteria::default();
        assert!(criteria.is_unrestricted());
        assert_eq!(apply(&units, &criteria).len(), 2);
    }

    #[test]
    fn test_online_and_battery_scenario() {
        let units = vec![
            unit("on-10", true, 10.0),
            unit("off-80", false, 80.0),
            unit("on-25", true, 25.0),
            unit("off-30", false, 30.0),
            unit("on-90", true, 90.0),
        ];
        let criteria = FilterCriteria {
            online_state: OnlineState::Online,
            min_battery_pct: 20.0,
            ..Default::default()
        };

        assert_eq!(ids(&apply(&units, &criteria)), ["on-25", "on-90"]);
    }

    #[test]
    fn test_offline_state() {
        let units = vec![unit("a", true, 50.0), unit("b", false, 50.0)];
        let criteria = FilterCriteria {
            online_state: OnlineState::Offline,
            ..Default::default()
        };
        assert_eq!(ids(&apply(&units, &criteria)), ["b"]);
    }

    #[test]
    fn test_battery_boundary_is_inclusive() {
        let units = vec![unit("a", true, 19.9), unit("b", true, 20.0)];
        let criteria = FilterCriteria {
            min_battery_pct: 20.0,
            ..Default::default()
        };
        assert_eq!(ids(&apply(&units, &criteria)), ["b"]);
    }

    #[test]
    fn test_id_substring_is_case_sensitive() {
        let units = vec![unit("robot_1", true, 50.0), unit("Robot_2", true, 50.0)];
        let criteria = FilterCriteria {
            id_substring: "robot".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&apply(&units, &criteria)), ["robot_1"]);
    }

    #[test]
    fn test_empty_result_is_valid() {
        let units = vec![unit("a", true, 50.0)];
        let criteria = FilterCriteria {
            id_substring: "zzz".to_string(),
            ..Default::default()
        };
        assert!(apply(&units, &criteria).is_empty());
    }

    #[test]
    fn test_tightening_min_battery_never_grows_result() {
        let units: Vec<Unit> = (0..40)
            .map(|i| unit(&format!("u{i}"), i % 3 != 0, ((i * 37) % 101) as f64))
            .collect();

        for state in [OnlineState::Any, OnlineState::Online, OnlineState::Offline] {
            let mut previous = usize::MAX;
            for min in (0..=110).step_by(5) {
                let criteria = FilterCriteria {
                    online_state: state,
                    min_battery_pct: min as f64,
                    id_substring: String::new(),
                };
                let result = apply(&units, &criteria);
                assert!(result.len() <= previous);
                assert!(result.iter().all(|u| units.iter().any(|x| std::ptr::eq(x, *u))));
                previous = result.len();
            }
        }
    }

    #[test]
    fn test_online_state_cycles() {
        assert_eq!(OnlineState::Any.next(), OnlineState::Online);
        assert_eq!(OnlineState::Online.next(), OnlineState::Offline);
        assert_eq!(OnlineState::Offline.next(), OnlineState::Any);
    }
}
