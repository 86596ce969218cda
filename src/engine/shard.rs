//! Shard Module
//!
//! One independent partition of the key space: the key-value map, the
//! recency index, and the TTL index, mutated together under a single mutex.

use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::Mutex;

use crate::engine::entry::{epoch_millis, Entry};
use crate::engine::recency::RecencyIndex;
use crate::engine::ttl_index::TtlIndex;
use crate::error::Result;

// == Lookup Outcome ==
/// Result of a shard read.
///
/// Expired entries are reported distinctly from plain misses so the caller
/// can settle eviction bookkeeping for the removed key; both are misses to
/// the outside world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The key was present and fresh.
    Hit(Bytes),
    /// The key was absent.
    Miss,
    /// The key was present but past its deadline; it has been removed.
    Expired,
}

impl Lookup {
    /// Collapses the outcome to the value, if any.
    pub fn value(self) -> Option<Bytes> {
        match self {
            Lookup::Hit(value) => Some(value),
            Lookup::Miss | Lookup::Expired => None,
        }
    }
}

// == Shard ==
/// A capacity-bounded slice of the cache.
///
/// Every public operation takes the shard mutex for its whole duration, so
/// the three structures can never be observed out of step: the recency index
/// tracks exactly the map's keys, and the TTL index tracks exactly the map's
/// keys that carry a deadline. No shard operation touches another shard.
#[derive(Debug)]
pub struct Shard {
    inner: Mutex<ShardInner>,
}

#[derive(Debug)]
struct ShardInner {
    /// Key-value storage
    map: HashMap<Bytes, Entry>,
    /// Access-order tracking, bounded by the shard capacity
    recency: RecencyIndex,
    /// Expiration deadlines for keys with a TTL
    ttl: TtlIndex,
}

impl Shard {
    // == Constructor ==
    /// Creates an empty shard holding at most `capacity` entries.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        Ok(Self {
            inner: Mutex::new(ShardInner {
                map: HashMap::new(),
                recency: RecencyIndex::new(capacity)?,
                ttl: TtlIndex::new(),
            }),
        })
    }

    // == Set ==
    /// Inserts or overwrites a key with no expiration.
    ///
    /// Any TTL previously attached to the key is dropped. Returns the key
    /// evicted to stay within capacity, if the write overflowed.
    pub fn set(&self, key: Bytes, value: Bytes) -> Option<Bytes> {
        let mut inner = self.inner.lock();

        inner.map.insert(key.clone(), Entry::new(value));
        inner.ttl.remove(&key);
        let overflow = inner.recency.touch(key);

        if overflow {
            inner.evict_one()
        } else {
            None
        }
    }

    // == Set With TTL ==
    /// Inserts or overwrites a key expiring `ttl_ms` milliseconds from now.
    ///
    /// `ttl_ms == 0` stores a non-expiring entry. Returns the evicted key on
    /// capacity overflow.
    pub fn set_with_ttl(&self, key: Bytes, value: Bytes, ttl_ms: u64) -> Option<Bytes> {
        let mut inner = self.inner.lock();

        let entry = Entry::with_ttl(value, ttl_ms);
        let expire_at = entry.expire_at();
        let has_ttl = entry.has_ttl();
        inner.map.insert(key.clone(), entry);

        if has_ttl {
            inner.ttl.upsert(key.clone(), expire_at);
        } else {
            inner.ttl.remove(&key);
        }

        let overflow = inner.recency.touch(key);

        if overflow {
            inner.evict_one()
        } else {
            None
        }
    }

    // == Get ==
    /// Looks up a key. Misses on absent and on expired entries.
    ///
    /// An expired entry is removed on the spot, so expiry is observable
    /// without waiting for a sweep. A hit refreshes the key's recency.
    pub fn get(&self, key: &Bytes) -> Lookup {
        let mut inner = self.inner.lock();
        let now = epoch_millis();

        let (value, expired) = match inner.map.get(key) {
            None => return Lookup::Miss,
            Some(entry) => (entry.value().clone(), entry.expired(now)),
        };

        if expired {
            inner.remove_internal(key);
            return Lookup::Expired;
        }

        inner.recency.touch(key.clone());
        Lookup::Hit(value)
    }

    // == Delete ==
    /// Removes a key. Returns true if the key was present.
    pub fn delete(&self, key: &[u8]) -> bool {
        self.inner.lock().remove_internal(key).is_some()
    }

    // == Cleanup Expired ==
    /// Removes every entry whose deadline is at or before `now`.
    ///
    /// Work is bounded by the number of keys already due. Returns the
    /// removed keys so the caller can update its bookkeeping.
    pub fn cleanup_expired(&self, now: u64) -> Vec<Bytes> {
        let mut inner = self.inner.lock();

        let expired = inner.ttl.collect_expired(now);
        for key in &expired {
            inner.remove_internal(key);
        }

        expired
    }

    // == Size ==
    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.inner.lock().map.len()
    }

    /// Returns true if the shard holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().map.is_empty()
    }

    /// Returns the number of entries currently tracked with a deadline.
    pub fn ttl_len(&self) -> usize {
        self.inner.lock().ttl.len()
    }

    // == Test Introspection ==
    /// Asserts the cross-index consistency invariants.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let inner = self.inner.lock();

        assert_eq!(
            inner.map.len(),
            inner.recency.len(),
            "map and recency index diverged"
        );
        assert!(
            inner.map.len() <= inner.recency.capacity(),
            "shard exceeded capacity"
        );

        let with_ttl = inner.map.values().filter(|e| e.has_ttl()).count();
        assert_eq!(with_ttl, inner.ttl.len(), "map and ttl index diverged");
    }
}

impl ShardInner {
    /// Erases a key from all three structures. Idempotent.
    fn remove_internal(&mut self, key: &[u8]) -> Option<Entry> {
        let removed = self.map.remove(key);
        self.recency.remove(key);
        self.ttl.remove(key);
        removed
    }

    /// Drops the least recently used entry. No-op on an empty shard.
    ///
    /// Every eviction removes exactly one entry and keeps all three
    /// structures aligned.
    fn evict_one(&mut self) -> Option<Bytes> {
        if self.map.is_empty() {
            return None;
        }

        let victim = self.recency.pop_least_recent()?;
        self.map.remove(&victim);
        self.ttl.remove(&victim);
        Some(victim)
    }
}
