//! Highest-wins device map with an atomically published ordered snapshot.

use super::snapshot::{GroupSnapshot, StateRange};
use crate::types::{GroupStats, RebuildPolicy, ServiceState};
use arc_swap::ArcSwap;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Device states for one group.
pub struct GroupStore {
    /// Group name, kept for diagnostics.
    name: Arc<str>,

    /// Authoritative highest state per device. Entries are never removed.
    latest: DashMap<Arc<str>, ServiceState>,

    /// Currently published snapshot of `latest`.
    index: ArcSwap<GroupSnapshot>,

    policy: RebuildPolicy,

    publications: AtomicU64,
    cas_retries: AtomicU64,
    abandoned_rebuilds: AtomicU64,
    skipped_rebuilds: AtomicU64,
}

impl GroupStore {
    /// Create an empty group store.
    pub(crate) fn new(
        name: Arc<str>,
        policy: RebuildPolicy,
        device_capacity: usize,
        shard_amount: Option<usize>,
    ) -> Self {
        let latest = match shard_amount {
            Some(shards) => DashMap::with_capacity_and_shard_amount(device_capacity, shards),
            None => DashMap::with_capacity(device_capacity),
        };

        Self {
            name,
            latest,
            index: ArcSwap::from_pointee(GroupSnapshot::empty()),
            policy,
            publications: AtomicU64::new(0),
            cas_retries: AtomicU64::new(0),
            abandoned_rebuilds: AtomicU64::new(0),
            skipped_rebuilds: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record `state` if it is the highest seen for its device, then make
    /// sure a snapshot containing it (or something newer) gets published.
    pub fn update(&self, state: ServiceState) {
        if !self.upsert(&state) {
            self.skipped_rebuilds.fetch_add(1, Ordering::Relaxed);
            return;
        }
        self.publish(&state);
    }

    /// Atomic highest-wins merge. Returns true if `state` is now the stored value.
    ///
    /// The shard write lock is held for the whole compare-and-replace and
    /// released before returning, so a later writer that supersedes this value
    /// and then rebuilds is guaranteed to observe it.
    fn upsert(&self, state: &ServiceState) -> bool {
        match self.latest.entry(Arc::clone(&state.id)) {
            Entry::Occupied(mut entry) => {
                if state.supersedes(entry.get()) {
                    entry.insert(state.clone());
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(state.clone());
                true
            }
        }
    }

    /// True if the stored value for the device is now newer than `state`.
    fn is_superseded(&self, state: &ServiceState) -> bool {
        self.latest
            .get(state.id())
            .map_or(false, |current| current.supersedes(state))
    }

    /// Rebuild-and-swap loop run by a winning writer.
    fn publish(&self, state: &ServiceState) {
        loop {
            let current = self.index.load_full();

            let next = Arc::new(GroupSnapshot::build(
                current.version() + 1,
                self.latest.iter().map(|entry| entry.value().clone()),
            ));

            if self.policy == RebuildPolicy::AbandonSuperseded && self.is_superseded(state) {
                self.abandoned_rebuilds.fetch_add(1, Ordering::Relaxed);
                trace!(
                    group = %self.name,
                    device = state.id(),
                    number = state.processed_transaction_number(),
                    "rebuild abandoned, superseded"
                );
                return;
            }

            let previous = self.index.compare_and_swap(&current, next);
            if Arc::ptr_eq(&previous, &current) {
                self.publications.fetch_add(1, Ordering::Relaxed);
                trace!(
                    group = %self.name,
                    version = current.version() + 1,
                    "snapshot published"
                );
                return;
            }

            self.cas_retries.fetch_add(1, Ordering::Relaxed);
            trace!(group = %self.name, device = state.id(), "snapshot swap lost, retrying");
        }
    }

    /// States with a processed number of at least `from`, in snapshot order.
    pub fn range_query(&self, from: u64) -> StateRange {
        self.index.load_full().range_from(from)
    }

    /// The currently published snapshot.
    pub fn snapshot(&self) -> Arc<GroupSnapshot> {
        self.index.load_full()
    }

    /// Authoritative current number for a device, bypassing the snapshot.
    pub fn get(&self, device_id: &str) -> Option<u64> {
        self.latest
            .get(device_id)
            .map(|state| state.processed_transaction_number())
    }

    /// Number of devices ever seen in this group.
    pub fn len(&self) -> usize {
        self.latest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }

    pub fn stats(&self) -> GroupStats {
        let snapshot = self.index.load();
        GroupStats {
            devices: self.latest.len() as u64,
            snapshot_len: snapshot.len() as u64,
            snapshot_version: snapshot.version(),
            publications: self.publications.load(Ordering::Relaxed),
            cas_retries: self.cas_retries.load(Ordering::Relaxed),
            abandoned_rebuilds: self.abandoned_rebuilds.load(Ordering::Relaxed),
            skipped_rebuilds: self.skipped_rebuilds.load(Ordering::Relaxed),
        }
    }
}
