//! Capacity Evaluator — utilization and availability of a desk
//!
//! Pure functions over a [`Desk`]. A desk is available while its utilization
//! stays strictly below the threshold; a desk sitting exactly on the
//! threshold is saturated.

use super::{Desk, DeskStatus};
use crate::error::{Result, RoutingError};
use serde::{Deserialize, Serialize};

/// Utilization (percent) at which a desk stops accepting regular assignments
pub const DEFAULT_AVAILABILITY_THRESHOLD: f64 = 90.0;

/// Availability policy applied to every desk in a registry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapacityPolicy {
    /// Desks are available while utilization < this value (percent)
    pub availability_threshold: f64,
}

impl Default for CapacityPolicy {
    fn default() -> Self {
        Self {
            availability_threshold: DEFAULT_AVAILABILITY_THRESHOLD,
        }
    }
}

impl CapacityPolicy {
    /// Create a policy with a custom threshold in (0, 100].
    pub fn new(availability_threshold: f64) -> Result<Self> {
        if !availability_threshold.is_finite()
            || availability_threshold <= 0.0
            || availability_threshold > 100.0
        {
            return Err(RoutingError::configuration(format!(
                "availability threshold {} must be within (0, 100]",
                availability_threshold
            )));
        }
        Ok(Self {
            availability_threshold,
        })
    }

    /// `current_load / max_capacity * 100`
    pub fn utilization(&self, desk: &Desk) -> f64 {
        utilization(desk)
    }

    pub fn is_available(&self, desk: &Desk) -> bool {
        self.utilization(desk) < self.availability_threshold
    }

    /// Snapshot a desk for status reporting
    pub fn status(&self, desk: &Desk) -> DeskStatus {
        let utilization = self.utilization(desk);
        DeskStatus {
            tier: desk.tier,
            specialty: desk.specialty.clone(),
            max_capacity: desk.max_capacity,
            current_load: desk.current_load(),
            utilization_pct: (utilization * 100.0).round() / 100.0,
            available: utilization < self.availability_threshold,
        }
    }
}

/// Utilization percentage of a desk.
///
/// Computed as `load * 100 / max` so that exact ratios such as 9/10 land on
/// exactly 90.0. `max_capacity` is validated non-zero at construction.
pub fn utilization(desk: &Desk) -> f64 {
    (desk.current_load() as f64 * 100.0) / desk.max_capacity as f64
}

/// Availability under the default 90% threshold
pub fn is_available(desk: &Desk) -> bool {
    utilization(desk) < DEFAULT_AVAILABILITY_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desk::Tier;

    fn desk(load: u32, max: u32) -> Desk {
        Desk::new("SD", "general", Tier::General, max, load).unwrap()
    }

    #[test]
    fn test_utilization() {
        assert_eq!(utilization(&desk(0, 20)), 0.0);
        assert_eq!(utilization(&desk(12, 20)), 60.0);
        assert_eq!(utilization(&desk(20, 20)), 100.0);
    }

    #[test]
    fn test_exact_threshold_is_unavailable() {
        assert_eq!(utilization(&desk(9, 10)), 90.0);
        assert!(!is_available(&desk(9, 10)));
        assert_eq!(utilization(&desk(18, 20)), 90.0);
        assert!(!is_available(&desk(18, 20)));
        assert!(is_available(&desk(17, 20)));
    }

    #[test]
    fn test_availability_matches_threshold_for_all_pairs() {
        for max in 1..=40u32 {
            for load in 0..=max {
                let d = desk(load, max);
                assert_eq!(is_available(&d), utilization(&d) < 90.0, "{}/{}", load, max);
            }
        }
    }

    #[test]
    fn test_custom_threshold() {
        let policy = CapacityPolicy::new(50.0).unwrap();
        assert!(policy.is_available(&desk(4, 10)));
        assert!(!policy.is_available(&desk(5, 10)));
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        assert!(CapacityPolicy::new(0.0).is_err());
        assert!(CapacityPolicy::new(120.0).is_err());
        assert!(CapacityPolicy::new(f64::NAN).is_err());
        assert!(CapacityPolicy::new(100.0).is_ok());
    }

    #[test]
    fn test_status_rounds_utilization() {
        let status = CapacityPolicy::default().status(&desk(1, 3));
        assert_eq!(status.utilization_pct, 33.33);
        assert!(status.available);
        assert_eq!(status.current_load, 1);
        assert_eq!(status.max_capacity, 3);
    }
}
