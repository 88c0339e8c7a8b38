//! Core types for the transaction registry.

use crate::error::{check_device, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Highest transaction number a device has processed, as last observed.
///
/// Ordered by `processed_transaction_number` ascending, then by `id`
/// byte-wise ascending. Two states are equal only if both fields match.
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ServiceState {
    pub(crate) id: Arc<str>,
    pub(crate) processed_transaction_number: u64,
}

impl ServiceState {
    /// Create a state for a device. The id must be non-empty.
    pub fn new(id: impl Into<Arc<str>>, processed_transaction_number: u64) -> Result<Self> {
        let id = id.into();
        check_device(&id)?;
        Ok(Self {
            id,
            processed_transaction_number,
        })
    }

    /// Sorts before every legitimate state with the same number.
    pub(crate) fn lower_bound(processed_transaction_number: u64) -> Self {
        Self {
            id: Arc::from(""),
            processed_transaction_number,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn processed_transaction_number(&self) -> u64 {
        self.processed_transaction_number
    }

    /// True if this state should replace `current` under the highest-wins rule.
    pub(crate) fn supersedes(&self, current: &ServiceState) -> bool {
        self.processed_transaction_number > current.processed_transaction_number
    }
}

impl Ord for ServiceState {
    fn cmp(&self, other: &Self) -> Ordering {
        self.processed_transaction_number
            .cmp(&other.processed_transaction_number)
            .then_with(|| self.id.as_bytes().cmp(other.id.as_bytes()))
    }
}

impl PartialOrd for ServiceState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceState({}@{})", self.id, self.processed_transaction_number)
    }
}

/// How a winning save publishes the group's snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RebuildPolicy {
    /// Drop a rebuild once a newer value for the same device is visible;
    /// the newer writer publishes a snapshot that covers it.
    #[default]
    AbandonSuperseded,
    /// Every winning save retries until its own rebuild is published.
    AlwaysRebuild,
}

/// Counters and sizes for one group.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStats {
    /// Devices tracked in the authoritative map.
    pub devices: u64,
    /// Entries in the currently published snapshot.
    pub snapshot_len: u64,
    /// Version of the currently published snapshot.
    pub snapshot_version: u64,
    /// Snapshots successfully published.
    pub publications: u64,
    /// Failed snapshot compare-and-swaps that were retried.
    pub cas_retries: u64,
    /// Rebuilds dropped because a newer value for the same device arrived.
    pub abandoned_rebuilds: u64,
    /// Saves that did not win and so never attempted a rebuild.
    pub skipped_rebuilds: u64,
}

/// Aggregated counters across every group.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    pub groups: u64,
    pub devices: u64,
    pub publications: u64,
    pub cas_retries: u64,
    pub abandoned_rebuilds: u64,
    pub skipped_rebuilds: u64,
}

impl RegistryStats {
    pub(crate) fn absorb(&mut self, group: &GroupStats) {
        self.groups += 1;
        self.devices += group.devices;
        self.publications += group.publications;
        self.cas_retries += group.cas_retries;
        self.abandoned_rebuilds += group.abandoned_rebuilds;
        self.skipped_rebuilds += group.skipped_rebuilds;
    }
}
