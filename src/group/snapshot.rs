//! Immutable ordered snapshots and range views over them.

use crate::types::ServiceState;
use std::sync::Arc;

/// A published, never-mutated view of one group's device states,
/// sorted by transaction number then device id.
#[derive(Debug)]
pub struct GroupSnapshot {
    version: u64,
    states: Box<[ServiceState]>,
}

impl GroupSnapshot {
    /// The snapshot a group starts with.
    pub(crate) fn empty() -> Self {
        Self {
            version: 0,
            states: Box::default(),
        }
    }

    /// Build from an unordered set of states with unique ids.
    pub(crate) fn build(version: u64, states: impl IntoIterator<Item = ServiceState>) -> Self {
        let mut states: Vec<ServiceState> = states.into_iter().collect();
        states.sort_unstable();
        Self {
            version,
            states: states.into_boxed_slice(),
        }
    }

    /// Publication counter; 0 is the initial empty snapshot.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn states(&self) -> &[ServiceState] {
        &self.states
    }

    /// Index of the first state with a number `>= from`.
    fn lower_bound(&self, from: u64) -> usize {
        let bound = ServiceState::lower_bound(from);
        self.states.partition_point(|state| *state < bound)
    }

    /// All states with a number in `[from, u64::MAX]`.
    pub fn range_from(self: &Arc<Self>, from: u64) -> StateRange {
        StateRange {
            start: self.lower_bound(from),
            snapshot: Arc::clone(self),
        }
    }
}

/// Ordered states at or above a threshold, pinned to one snapshot.
///
/// Iterating twice yields the same sequence; later saves are never
/// visible through an already obtained range.
#[derive(Debug, Clone)]
pub struct StateRange {
    snapshot: Arc<GroupSnapshot>,
    start: usize,
}

impl StateRange {
    /// A range over nothing, used for unknown groups.
    pub(crate) fn empty() -> Self {
        Self {
            snapshot: Arc::new(GroupSnapshot::empty()),
            start: 0,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ServiceState> {
        self.as_slice().iter()
    }

    pub fn as_slice(&self) -> &[ServiceState] {
        &self.snapshot.states[self.start..]
    }

    pub fn len(&self) -> usize {
        self.snapshot.len() - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn first(&self) -> Option<&ServiceState> {
        self.as_slice().first()
    }

    pub fn last(&self) -> Option<&ServiceState> {
        self.as_slice().last()
    }

    pub fn to_vec(&self) -> Vec<ServiceState> {
        self.as_slice().to_vec()
    }

    /// Version of the snapshot this range reads from.
    pub fn snapshot_version(&self) -> u64 {
        self.snapshot.version
    }
}

impl<'a> IntoIterator for &'a StateRange {
    type Item = &'a ServiceState;
    type IntoIter = std::slice::Iter<'a, ServiceState>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
