//! Eviction Policy Module
//!
//! Victim-selection strategies behind a small observer interface.

use bytes::Bytes;

use crate::engine::RecencyIndex;

// == Eviction Policy ==
/// A victim-selection strategy.
///
/// The coordinator feeds the policy every read, write, and delete; when the
/// memory tracker reports an overshoot it asks for victims one at a time.
/// Implementations are not synchronized; the coordinator's mutex serializes
/// all calls.
pub trait EvictionPolicy: Send {
    /// Observes a read of `key`.
    fn on_read(&mut self, key: &Bytes);

    /// Observes a write of `key`.
    fn on_write(&mut self, key: &Bytes);

    /// Observes the deletion of `key`.
    fn on_delete(&mut self, key: &Bytes);

    /// Selects the next eviction victim, or `None` if nothing can be
    /// evicted. The victim is forgotten by the policy.
    fn select_victim(&mut self) -> Option<Bytes>;
}

// == No Eviction ==
/// Policy that never evicts. Writes past the memory limit are tolerated;
/// the deployer opted out of eviction.
#[derive(Debug, Default)]
pub struct NoEviction;

impl EvictionPolicy for NoEviction {
    fn on_read(&mut self, _key: &Bytes) {}

    fn on_write(&mut self, _key: &Bytes) {}

    fn on_delete(&mut self, _key: &Bytes) {}

    fn select_victim(&mut self) -> Option<Bytes> {
        None
    }
}

// == LRU Policy ==
/// Least-recently-used victim selection across the whole dataset.
///
/// Backed by a recency index with no effective capacity; the index's
/// overflow signal is unused here because the memory tracker decides when to
/// evict.
#[derive(Debug)]
pub struct LruPolicy {
    recency: RecencyIndex,
}

impl LruPolicy {
    pub fn new() -> Self {
        Self {
            // Capacity is a formality for the policy index; usize::MAX can
            // never be exceeded and the constructor only rejects zero.
            recency: RecencyIndex::new(usize::MAX).expect("nonzero capacity"),
        }
    }
}

impl Default for LruPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl EvictionPolicy for LruPolicy {
    fn on_read(&mut self, key: &Bytes) {
        self.recency.touch(key.clone());
    }

    fn on_write(&mut self, key: &Bytes) {
        self.recency.touch(key.clone());
    }

    fn on_delete(&mut self, key: &Bytes) {
        self.recency.remove(key);
    }

    fn select_victim(&mut self) -> Option<Bytes> {
        self.recency.pop_least_recent()
    }
}
