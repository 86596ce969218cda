//! Eviction Coordinator Module
//!
//! Couples the memory tracker to the active victim-selection policy.

use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::Mutex;

use crate::eviction::memory_tracker::MemoryTracker;
use crate::eviction::policy::EvictionPolicy;

// == Eviction Coordinator ==
/// Process-wide eviction bookkeeping.
///
/// The tracker is updated lock-free; the policy and the per-key size table
/// live behind one mutex. The size table remembers the delta reserved for
/// each key so overwrites, deletions, and victim selection release exactly
/// what was reserved. Shard locks are never taken from here: the coordinator
/// only names victims, the façade deletes them.
pub struct EvictionCoordinator {
    memory_tracker: MemoryTracker,
    state: Mutex<CoordinatorState>,
}

struct CoordinatorState {
    policy: Box<dyn EvictionPolicy>,
    /// key -> bytes reserved for it
    sizes: HashMap<Bytes, u64>,
}

impl EvictionCoordinator {
    // == Constructor ==
    pub fn new(memory_tracker: MemoryTracker, policy: Box<dyn EvictionPolicy>) -> Self {
        Self {
            memory_tracker,
            state: Mutex::new(CoordinatorState {
                policy,
                sizes: HashMap::new(),
            }),
        }
    }

    // == Observers ==
    /// Records a read of `key`.
    pub fn on_read(&self, key: &Bytes) {
        self.state.lock().policy.on_read(key);
    }

    /// Records a write of `key` costing `delta` bytes.
    ///
    /// Overwrites release the key's previous reservation first, so repeated
    /// writes to one key do not inflate the counter.
    pub fn on_write(&self, key: &Bytes, delta: u64) {
        let mut state = self.state.lock();

        if let Some(previous) = state.sizes.insert(key.clone(), delta) {
            self.memory_tracker.release(previous);
        }
        self.memory_tracker.reserve(delta);
        state.policy.on_write(key);
    }

    /// Records the deletion of `key`. Safe to call for keys the coordinator
    /// never saw; nothing is released then.
    pub fn on_delete(&self, key: &Bytes) {
        let mut state = self.state.lock();

        if let Some(delta) = state.sizes.remove(key.as_ref()) {
            self.memory_tracker.release(delta);
        }
        state.policy.on_delete(key);
    }

    // == Victim Selection ==
    /// Names victims until usage is back under the limit.
    ///
    /// Each victim's reservation is released immediately so the loop
    /// terminates; the caller must then delete the returned keys from their
    /// shards. Returns an empty vector when not over the limit.
    pub fn collect_eviction_candidates(&self) -> Vec<Bytes> {
        let mut state = self.state.lock();
        let mut victims = Vec::new();

        while self.memory_tracker.is_over_limit() {
            let Some(victim) = state.policy.select_victim() else {
                break;
            };

            if let Some(delta) = state.sizes.remove(victim.as_ref()) {
                self.memory_tracker.release(delta);
            }
            victims.push(victim);
        }

        victims
    }

    // == Accessors ==
    /// Returns the current approximate usage in bytes.
    pub fn current_usage(&self) -> u64 {
        self.memory_tracker.current_usage()
    }

    /// Returns the configured memory limit in bytes.
    pub fn max_limit(&self) -> u64 {
        self.memory_tracker.max_limit()
    }

    /// Returns true if usage exceeds the limit.
    pub fn is_over_limit(&self) -> bool {
        self.memory_tracker.is_over_limit()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::eviction::policy::{LruPolicy, NoEviction};

    fn b(s: &str) -> Bytes {
        Bytes::copy_from_slice(s.as_bytes())
    }

    fn lru_coordinator(limit: u64) -> EvictionCoordinator {
        EvictionCoordinator::new(
            MemoryTracker::new(limit).unwrap(),
            Box::new(LruPolicy::new()),
        )
    }

    #[test]
    fn test_write_reserves_delete_releases() {
        let coordinator = lru_coordinator(1000);

        coordinator.on_write(&b("a"), 100);
        assert_eq!(coordinator.current_usage(), 100);

        coordinator.on_delete(&b("a"));
        assert_eq!(coordinator.current_usage(), 0);
    }

    #[test]
    fn test_overwrite_releases_previous_reservation() {
        let coordinator = lru_coordinator(1000);

        coordinator.on_write(&b("a"), 100);
        coordinator.on_write(&b("a"), 250);

        assert_eq!(coordinator.current_usage(), 250);
    }

    #[test]
    fn test_delete_of_unknown_key_is_noop() {
        let coordinator = lru_coordinator(1000);

        coordinator.on_write(&b("a"), 100);
        coordinator.on_delete(&b("ghost"));

        assert_eq!(coordinator.current_usage(), 100);
    }

    #[test]
    fn test_collect_when_under_limit_is_empty() {
        let coordinator = lru_coordinator(1000);

        coordinator.on_write(&b("a"), 100);

        assert!(coordinator.collect_eviction_candidates().is_empty());
        assert_eq!(coordinator.current_usage(), 100);
    }

    #[test]
    fn test_collect_drains_least_recent_until_under_limit() {
        let coordinator = lru_coordinator(250);

        coordinator.on_write(&b("a"), 100);
        coordinator.on_write(&b("b"), 100);
        coordinator.on_write(&b("c"), 100);
        assert!(coordinator.is_over_limit());

        let victims = coordinator.collect_eviction_candidates();

        // Oldest write goes first; one release brings usage to 200
        assert_eq!(victims, vec![b("a")]);
        assert!(!coordinator.is_over_limit());
        assert_eq!(coordinator.current_usage(), 200);
    }

    #[test]
    fn test_read_refreshes_victim_order() {
        let coordinator = lru_coordinator(250);

        coordinator.on_write(&b("a"), 100);
        coordinator.on_write(&b("b"), 100);
        coordinator.on_read(&b("a"));
        coordinator.on_write(&b("c"), 100);

        let victims = coordinator.collect_eviction_candidates();
        assert_eq!(victims, vec![b("b")]);
    }

    #[test]
    fn test_none_policy_breaks_out_when_over_limit() {
        let coordinator =
            EvictionCoordinator::new(MemoryTracker::new(100).unwrap(), Box::new(NoEviction));

        coordinator.on_write(&b("a"), 500);
        assert!(coordinator.is_over_limit());

        // The policy offers no victims; the loop must still terminate
        assert!(coordinator.collect_eviction_candidates().is_empty());
        assert!(coordinator.is_over_limit());
    }
}
