//! Desk Registry — shared, synchronized desk load state
//!
//! [`DeskTable`] is the plain data: desks in configuration order plus a name
//! index and the capacity policy. [`DeskRegistry`] wraps the table in a
//! mutex and is the only way to mutate load from concurrent requests.
//!
//! An assignment must select a desk and reserve a slot on it atomically,
//! otherwise two requests can both pick the last free slot. Callers run the
//! whole select-then-reserve sequence inside [`DeskRegistry::transact`].

use super::{CapacityPolicy, Desk, DeskStatus, Tier};
use crate::config::RegistryConfig;
use crate::error::{Result, RoutingError};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Shared reference to a DeskRegistry
pub type SharedDeskRegistry = Arc<DeskRegistry>;

/// Desks in registry order with a name index
#[derive(Debug, Clone)]
pub struct DeskTable {
    desks: Vec<Desk>,
    index: HashMap<String, usize>,
    policy: CapacityPolicy,
}

impl DeskTable {
    /// Build a table, rejecting duplicate names and registries that have no
    /// General desk to fall back on.
    pub fn new(desks: Vec<Desk>, policy: CapacityPolicy) -> Result<Self> {
        let mut index = HashMap::with_capacity(desks.len());
        for (pos, desk) in desks.iter().enumerate() {
            if index.insert(desk.name.clone(), pos).is_some() {
                return Err(RoutingError::configuration(format!(
                    "duplicate desk name '{}'",
                    desk.name
                )));
            }
        }
        if !desks.iter().any(|d| d.tier == Tier::General) {
            return Err(RoutingError::configuration(
                "registry has no General desk to fall back on",
            ));
        }
        Ok(Self {
            desks,
            index,
            policy,
        })
    }

    pub fn policy(&self) -> &CapacityPolicy {
        &self.policy
    }

    /// All desks in registry (insertion) order
    pub fn desks(&self) -> &[Desk] {
        &self.desks
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Result<&Desk> {
        self.index
            .get(name)
            .map(|&pos| &self.desks[pos])
            .ok_or_else(|| RoutingError::unknown_desk(name))
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut Desk> {
        match self.index.get(name) {
            Some(&pos) => Ok(&mut self.desks[pos]),
            None => Err(RoutingError::unknown_desk(name)),
        }
    }

    /// Desks of `tier`, least utilized first. Ties keep registry order.
    pub fn desks_by_tier(&self, tier: Tier) -> Vec<&Desk> {
        let mut desks: Vec<&Desk> = self.desks.iter().filter(|d| d.tier == tier).collect();
        // sort_by is stable
        desks.sort_by(|a, b| {
            self.policy
                .utilization(a)
                .partial_cmp(&self.policy.utilization(b))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        desks
    }

    /// First desk of `tier` in registry order, regardless of load
    pub fn first_of_tier(&self, tier: Tier) -> Option<&Desk> {
        self.desks.iter().find(|d| d.tier == tier)
    }

    /// Number of desks of `tier` currently below the availability threshold
    pub fn available_count(&self, tier: Tier) -> usize {
        self.desks
            .iter()
            .filter(|d| d.tier == tier && self.policy.is_available(d))
            .count()
    }

    pub fn utilization(&self, name: &str) -> Result<f64> {
        Ok(self.policy.utilization(self.get(name)?))
    }

    pub fn is_available(&self, desk: &Desk) -> bool {
        self.policy.is_available(desk)
    }

    /// Add one ticket to a desk, clamping at capacity. Returns the new load.
    pub fn increment_load(&mut self, name: &str) -> Result<u32> {
        let desk = self.get_mut(name)?;
        let load = desk.increment();
        debug!(desk = %name, load, max = desk.max_capacity, "Desk load incremented");
        Ok(load)
    }

    /// Remove one ticket from a desk, saturating at zero. Returns the new load.
    pub fn release_load(&mut self, name: &str) -> Result<u32> {
        let desk = self.get_mut(name)?;
        let load = desk.release();
        debug!(desk = %name, load, "Desk load released");
        Ok(load)
    }

    pub fn status(&self) -> BTreeMap<String, DeskStatus> {
        self.desks
            .iter()
            .map(|d| (d.name.clone(), self.policy.status(d)))
            .collect()
    }
}

/// Registry of all desks, safe to share across concurrent pipeline runs
#[derive(Debug)]
pub struct DeskRegistry {
    table: Mutex<DeskTable>,
}

impl DeskRegistry {
    pub fn new(table: DeskTable) -> Self {
        Self {
            table: Mutex::new(table),
        }
    }

    /// Build a validated registry from configuration
    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        Ok(Self::new(config.build_table()?))
    }

    /// Create a shared reference to this registry
    pub fn shared(self) -> SharedDeskRegistry {
        Arc::new(self)
    }

    fn lock(&self) -> Result<MutexGuard<'_, DeskTable>> {
        self.table.lock().map_err(|_| RoutingError::LockPoisoned {
            resource: "desk registry",
        })
    }

    /// Run `f` with exclusive access to the desk table.
    ///
    /// The lock is held for the duration of `f` only; keep it to in-memory
    /// work.
    pub fn transact<R>(&self, f: impl FnOnce(&mut DeskTable) -> Result<R>) -> Result<R> {
        let mut table = self.lock()?;
        f(&mut table)
    }

    /// Copy of a desk record
    pub fn get(&self, name: &str) -> Result<Desk> {
        self.lock()?.get(name).cloned()
    }

    /// Copies of the desks of `tier`, least utilized first
    pub fn desks_by_tier(&self, tier: Tier) -> Result<Vec<Desk>> {
        Ok(self
            .lock()?
            .desks_by_tier(tier)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn increment_load(&self, name: &str) -> Result<u32> {
        self.lock()?.increment_load(name)
    }

    pub fn release_load(&self, name: &str) -> Result<u32> {
        self.lock()?.release_load(name)
    }

    /// `GetDeskStatus`: every desk keyed by name
    pub fn status(&self) -> Result<BTreeMap<String, DeskStatus>> {
        Ok(self.lock()?.status())
    }

    pub fn policy(&self) -> Result<CapacityPolicy> {
        Ok(*self.lock()?.policy())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.desks().len())
    }
}
