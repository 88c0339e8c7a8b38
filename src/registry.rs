//! Registry routing saves and range queries to lazily created groups.

use crate::error::{check_device, check_group, RegistryError, Result};
use crate::group::{GroupStore, StateRange};
use crate::types::{RebuildPolicy, RegistryStats, ServiceState};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// Registry configuration.
#[derive(Clone, Debug, Default)]
pub struct RegistryConfig {
    /// How winning saves publish snapshots.
    pub rebuild_policy: RebuildPolicy,

    /// Shard count for the group map and every device map.
    /// Must be a power of two greater than one. `None` uses dashmap's default.
    pub shard_amount: Option<usize>,

    /// Initial device capacity of each new group.
    pub device_capacity: usize,
}

impl RegistryConfig {
    fn validate(&self) -> Result<()> {
        if let Some(shards) = self.shard_amount {
            if shards < 2 || !shards.is_power_of_two() {
                return Err(RegistryError::InvalidConfig(format!(
                    "shard_amount must be a power of two greater than one, got {}",
                    shards
                )));
            }
        }
        Ok(())
    }
}

/// Tracks the highest processed transaction number per device, per group.
///
/// Construct one instance at the composition root and share it by
/// reference or `Arc`; every method takes `&self`.
pub struct Registry {
    config: RegistryConfig,

    /// Group stores by name. Installed once, never removed.
    groups: DashMap<Arc<str>, Arc<GroupStore>>,
}

impl Registry {
    /// Create a registry with the default configuration.
    pub fn new() -> Self {
        Self {
            config: RegistryConfig::default(),
            groups: DashMap::new(),
        }
    }

    /// Create a registry with a custom configuration.
    pub fn with_config(config: RegistryConfig) -> Result<Self> {
        config.validate()?;

        let groups = match config.shard_amount {
            Some(shards) => DashMap::with_shard_amount(shards),
            None => DashMap::new(),
        };

        Ok(Self { config, groups })
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Record that `device_id` in `group` has processed `processed_transaction_number`.
    ///
    /// Lower or equal numbers than the one already stored are ignored.
    pub fn save(
        &self,
        group: &str,
        device_id: &str,
        processed_transaction_number: u64,
    ) -> Result<()> {
        check_group(group)?;
        let state = ServiceState::new(device_id, processed_transaction_number)?;
        self.group_or_create(group).update(state);
        Ok(())
    }

    /// Same as [`Registry::save`] for an already built state.
    pub fn save_state(&self, group: &str, state: ServiceState) -> Result<()> {
        check_group(group)?;
        self.group_or_create(group).update(state);
        Ok(())
    }

    /// Devices in `group` whose processed number is at least `from`,
    /// ordered by number then id. Unknown groups yield an empty range.
    pub fn find(&self, group: &str, from: u64) -> Result<StateRange> {
        check_group(group)?;
        Ok(match self.group(group) {
            Some(store) => store.range_query(from),
            None => StateRange::empty(),
        })
    }

    /// Current authoritative number for one device, if it was ever saved.
    pub fn get(&self, group: &str, device_id: &str) -> Result<Option<u64>> {
        check_group(group)?;
        check_device(device_id)?;
        Ok(self.group(group).and_then(|store| store.get(device_id)))
    }

    /// Look up an existing group without creating it.
    pub fn group(&self, group: &str) -> Option<Arc<GroupStore>> {
        self.groups.get(group).map(|entry| Arc::clone(entry.value()))
    }

    /// Names of every group saved to so far, sorted.
    pub fn groups(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .groups
            .iter()
            .map(|entry| entry.key().to_string())
            .collect();
        names.sort();
        names
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Counters summed across all groups.
    pub fn stats(&self) -> RegistryStats {
        let stores: Vec<Arc<GroupStore>> = self
            .groups
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        let mut stats = RegistryStats::default();
        for store in &stores {
            stats.absorb(&store.stats());
        }
        stats
    }

    /// Get the group store, installing exactly one on first use.
    fn group_or_create(&self, group: &str) -> Arc<GroupStore> {
        if let Some(existing) = self.group(group) {
            return existing;
        }

        let entry = self.groups.entry(Arc::from(group)).or_insert_with(|| {
            debug!(group, "creating group store");
            Arc::new(GroupStore::new(
                Arc::from(group),
                self.config.rebuild_policy,
                self.config.device_capacity,
                self.config.shard_amount,
            ))
        });
        Arc::clone(entry.value())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
