//! Per-signal subscriber lists.
//!
//! Each signal owns one channel list: the computations to re-run when its
//! value changes, in the order they first subscribed.
//!
//! # Deduplication
//!
//! A computation re-reads the same signals every time it re-runs. Appending
//! it again on each read would make a single write run it several times, so
//! a subscription is skipped when the list already holds an entry for the
//! same computation. An entry's dependency set is the computation's own live
//! set, which makes "same dependency set" and "same computation" coincide.
//! The check spans the whole list, not only the most recent entry.
//!
//! Entries are removed by the runtime when a computation re-runs and no
//! longer reads the signal.

use super::computation::{Computation, ComputationId};

/// Ordered, deduplicated list of subscribed computations.
#[derive(Debug, Default)]
pub(crate) struct ChannelList {
    subscribers: Vec<Computation>,
}

impl ChannelList {
    /// Append `computation` unless it is already represented.
    ///
    /// Returns `true` if a new entry was appended.
    pub(crate) fn subscribe(&mut self, computation: &Computation) -> bool {
        if self.contains(computation.id()) {
            return false;
        }
        self.subscribers.push(computation.clone());
        true
    }

    /// Remove the entry for `id`, keeping the order of the others.
    pub(crate) fn unsubscribe(&mut self, id: ComputationId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|c| c.id() != id);
        self.subscribers.len() != before
    }

    pub(crate) fn contains(&self, id: ComputationId) -> bool {
        self.subscribers.iter().any(|c| c.id() == id)
    }

    /// Copy of the current entries, used to notify without holding a borrow
    /// on the list while subscribers run.
    pub(crate) fn snapshot(&self) -> Vec<Computation> {
        self.subscribers.clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.subscribers.len()
    }
}
