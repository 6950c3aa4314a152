//! Desk model — tiers, desk records and capacity snapshots
//!
//! A desk is a support team with a specialty, a tier and a hard limit on
//! concurrent tickets. Desks are built once from configuration and their
//! shape never changes afterwards; only `current_load` moves, and only
//! through the registry.
//!
//! ```text
//! Tier         | Alias | Typical desks
//! -------------|-------|-------------------------------------------
//! General      | N1    | Service Desk 1, 2, 5, 6, 7
//! Escalation   | N2    | Squad - Mesa Ongoing
//! Specialist   | N3    | Vida Ley, SCTR, soportedigital, soporteapp
//! ```

pub mod capacity;
pub mod registry;

pub use capacity::{CapacityPolicy, DEFAULT_AVAILABILITY_THRESHOLD};
pub use registry::{DeskRegistry, DeskTable, SharedDeskRegistry};

use crate::error::{Result, RoutingError};
use serde::{Deserialize, Serialize};

/// Support tiers, in increasing order of specialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    /// First-line service desks
    #[serde(alias = "N1", alias = "general")]
    General,
    /// Second-line squad handling escalations from N1
    #[serde(alias = "N2", alias = "escalation")]
    Escalation,
    /// Product or domain specialists
    #[serde(alias = "N3", alias = "specialist")]
    Specialist,
}

impl Tier {
    pub fn all() -> &'static [Tier] {
        &[Tier::General, Tier::Escalation, Tier::Specialist]
    }

    /// Short support-level label (N1/N2/N3)
    pub fn level(&self) -> &'static str {
        match self {
            Self::General => "N1",
            Self::Escalation => "N2",
            Self::Specialist => "N3",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::General => write!(f, "General"),
            Self::Escalation => write!(f, "Escalation"),
            Self::Specialist => write!(f, "Specialist"),
        }
    }
}

/// A support desk with its live load
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Desk {
    /// Unique desk name
    pub name: String,
    /// Human-readable specialty label
    pub specialty: String,
    pub tier: Tier,
    /// Maximum concurrent tickets (always > 0)
    pub max_capacity: u32,
    current_load: u32,
}

impl Desk {
    /// Build a validated desk record.
    pub fn new(
        name: impl Into<String>,
        specialty: impl Into<String>,
        tier: Tier,
        max_capacity: u32,
        current_load: u32,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RoutingError::configuration("desk name must not be empty"));
        }
        if max_capacity == 0 {
            return Err(RoutingError::configuration(format!(
                "desk '{}' has max_capacity 0",
                name
            )));
        }
        if current_load > max_capacity {
            return Err(RoutingError::configuration(format!(
                "desk '{}' starts with load {} above capacity {}",
                name, current_load, max_capacity
            )));
        }
        Ok(Self {
            name,
            specialty: specialty.into(),
            tier,
            max_capacity,
            current_load,
        })
    }

    pub fn current_load(&self) -> u32 {
        self.current_load
    }

    /// Whether the desk holds as many tickets as its capacity allows
    pub fn is_full(&self) -> bool {
        self.current_load >= self.max_capacity
    }

    /// Add one ticket, clamping at capacity. Returns the new load.
    pub(crate) fn increment(&mut self) -> u32 {
        if self.current_load < self.max_capacity {
            self.current_load += 1;
        }
        self.current_load
    }

    /// Remove one ticket, saturating at zero. Returns the new load.
    pub(crate) fn release(&mut self) -> u32 {
        self.current_load = self.current_load.saturating_sub(1);
        self.current_load
    }
}

/// Point-in-time view of a desk, as reported by `GetDeskStatus`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeskStatus {
    pub tier: Tier,
    pub specialty: String,
    pub max_capacity: u32,
    pub current_load: u32,
    /// Utilization rounded to two decimals
    pub utilization_pct: f64,
    pub available: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desk_rejects_zero_capacity() {
        let err = Desk::new("Service Desk 1", "general", Tier::General, 0, 0).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_desk_rejects_load_above_capacity() {
        assert!(Desk::new("Service Desk 1", "general", Tier::General, 5, 6).is_err());
        assert!(Desk::new("Service Desk 1", "general", Tier::General, 5, 5).is_ok());
    }

    #[test]
    fn test_desk_rejects_blank_name() {
        assert!(Desk::new("  ", "general", Tier::General, 5, 0).is_err());
    }

    #[test]
    fn test_increment_clamps_at_capacity() {
        let mut desk = Desk::new("SD", "general", Tier::General, 2, 1).unwrap();
        assert_eq!(desk.increment(), 2);
        assert!(desk.is_full());
        assert_eq!(desk.increment(), 2);
        assert_eq!(desk.current_load(), 2);
    }

    #[test]
    fn test_release_saturates_at_zero() {
        let mut desk = Desk::new("SD", "general", Tier::General, 2, 1).unwrap();
        assert_eq!(desk.release(), 0);
        assert_eq!(desk.release(), 0);
    }

    #[test]
    fn test_tier_aliases() {
        let tier: Tier = serde_json::from_str("\"N3\"").unwrap();
        assert_eq!(tier, Tier::Specialist);
        let tier: Tier = serde_json::from_str("\"escalation\"").unwrap();
        assert_eq!(tier, Tier::Escalation);
        assert_eq!(serde_json::to_string(&Tier::General).unwrap(), "\"General\"");
        assert_eq!(Tier::Escalation.level(), "N2");
        assert_eq!(Tier::Specialist.to_string(), "Specialist");
    }
}
