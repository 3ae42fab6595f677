use std::collections::{btree_map, BTreeMap};

use crate::{ConnectionId, ResetToken};

/// DataType stored in CidQueue
pub(crate) type CidData = (ConnectionId, Option<ResetToken>);

/// Spare connection IDs offered by the peer, ordered by sequence number
///
/// Never holds the active CID. Offers may arrive out of order or with gaps; the spare with the
/// lowest sequence number is always the next one to be used.
#[derive(Debug, Default)]
pub(crate) struct CidQueue {
    entries: BTreeMap<u64, CidData>,
}

impl CidQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record a spare CID
    ///
    /// Returns `false`, leaving the existing entry in place, if `sequence` is already queued.
    pub(crate) fn insert(&mut self, sequence: u64, data: CidData) -> bool {
        match self.entries.entry(sequence) {
            btree_map::Entry::Vacant(e) => {
                e.insert(data);
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }

    pub(crate) fn get(&self, sequence: u64) -> Option<&CidData> {
        self.entries.get(&sequence)
    }

    /// Remove and return the spare with the lowest sequence number
    pub(crate) fn pop_front(&mut self) -> Option<(u64, CidData)> {
        self.entries.pop_first()
    }

    /// Remove every spare with a sequence number below `retire_prior_to`, lowest first
    pub(crate) fn drain_below(
        &mut self,
        retire_prior_to: u64,
    ) -> impl Iterator<Item = (u64, CidData)> {
        let kept = self.entries.split_off(&retire_prior_to);
        std::mem::replace(&mut self.entries, kept).into_iter()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sequence numbers of all spares, lowest first
    pub(crate) fn sequences(&self) -> impl Iterator<Item = u64> + '_ {
        self.entries.keys().copied()
    }
}
