//! KV Engine Module
//!
//! Single entry point over the shard set: validates writes, routes point
//! operations, and keeps the eviction coordinator informed.

use bytes::Bytes;

use crate::config::{Config, EvictionPolicyKind};
use crate::engine::entry::epoch_millis;
use crate::engine::router::ShardRouter;
use crate::engine::shard::Lookup;
use crate::engine::stats::{CacheStats, StatsSnapshot};
use crate::error::{CacheError, Result};
use crate::eviction::{EvictionCoordinator, EvictionPolicy, LruPolicy, MemoryTracker, NoEviction};

/// Estimated fixed cost of one entry beyond its key and value bytes: map
/// slot, recency node, and TTL bookkeeping.
const ENTRY_OVERHEAD_BYTES: u64 = 64;

// == KV Engine ==
/// The cache engine façade.
///
/// Composes the shard router, the eviction coordinator, and the statistics
/// counters. The façade itself holds no lock; each call it makes acquires
/// and releases its own lock, so a coordinator call never nests inside a
/// shard lock or vice versa.
pub struct KvEngine {
    router: ShardRouter,
    coordinator: EvictionCoordinator,
    stats: CacheStats,
    max_value_bytes: u64,
    enable_ttl: bool,
}

impl KvEngine {
    // == Constructor ==
    /// Builds an engine from a validated configuration.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the configuration fails validation.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        let router = ShardRouter::new(config.shard_count, config.entries_per_shard())?;
        let memory_tracker = MemoryTracker::new(config.max_memory_bytes)?;
        let policy: Box<dyn EvictionPolicy> = match config.eviction_policy {
            EvictionPolicyKind::None => Box::new(NoEviction),
            EvictionPolicyKind::Lru => Box::new(LruPolicy::new()),
        };

        Ok(Self {
            router,
            coordinator: EvictionCoordinator::new(memory_tracker, policy),
            stats: CacheStats::new(),
            max_value_bytes: config.max_value_bytes,
            enable_ttl: config.enable_ttl,
        })
    }

    // == Set ==
    /// Stores a key-value pair, optionally expiring after `ttl_ms`
    /// milliseconds (`ttl_ms == 0` never expires).
    ///
    /// # Errors
    /// - `ResourceExhausted` if the key or value exceeds the size bound.
    /// - `InvalidArgument` if a TTL is given while TTL support is disabled.
    pub fn set(&self, key: Bytes, value: Bytes, ttl_ms: Option<u64>) -> Result<()> {
        if key.len() as u64 > self.max_value_bytes {
            return Err(CacheError::ResourceExhausted(format!(
                "key of {} bytes exceeds the {} byte limit",
                key.len(),
                self.max_value_bytes
            )));
        }
        if value.len() as u64 > self.max_value_bytes {
            return Err(CacheError::ResourceExhausted(format!(
                "value of {} bytes exceeds the {} byte limit",
                value.len(),
                self.max_value_bytes
            )));
        }
        if ttl_ms.is_some() && !self.enable_ttl {
            return Err(CacheError::InvalidArgument(
                "TTL support is disabled".to_string(),
            ));
        }

        let delta = estimate_entry_size(&key, &value);
        let shard = self.router.shard_for(&key);

        let evicted = match ttl_ms {
            Some(ttl) => shard.set_with_ttl(key.clone(), value, ttl),
            None => shard.set(key.clone(), value),
        };

        self.coordinator.on_write(&key, delta);

        // A capacity overflow inside the shard already removed the victim;
        // settle the coordinator's books for it.
        if let Some(victim) = evicted {
            self.coordinator.on_delete(&victim);
            self.stats.record_eviction();
        }

        Ok(())
    }

    // == Get ==
    /// Returns the value for a key, or `None` on miss or expiry.
    pub fn get(&self, key: &Bytes) -> Option<Bytes> {
        match self.router.shard_for(key).get(key) {
            Lookup::Hit(value) => {
                self.coordinator.on_read(key);
                self.stats.record_hit();
                Some(value)
            }
            Lookup::Miss => {
                self.stats.record_miss();
                None
            }
            Lookup::Expired => {
                // The shard removed the entry lazily; release its memory.
                self.coordinator.on_delete(key);
                self.stats.record_expiration();
                self.stats.record_miss();
                None
            }
        }
    }

    // == Delete ==
    /// Removes a key. Returns true if the key was present.
    pub fn delete(&self, key: &Bytes) -> bool {
        let deleted = self.router.shard_for(key).delete(key);
        self.coordinator.on_delete(key);
        deleted
    }

    // == Process Expired ==
    /// Sweeps every shard for entries past their deadline.
    ///
    /// Invoked by the periodic sweeper task. Returns the number of entries
    /// removed.
    pub fn process_expired(&self) -> usize {
        let now = epoch_millis();
        let mut removed = 0;

        for shard in self.router.shards() {
            for key in shard.cleanup_expired(now) {
                self.coordinator.on_delete(&key);
                self.stats.record_expiration();
                removed += 1;
            }
        }

        removed
    }

    // == Process Evictions ==
    /// Evicts keys while memory usage exceeds the limit.
    ///
    /// Safe to call when under the limit (no-op). Returns the number of
    /// keys evicted.
    pub fn process_evictions(&self) -> usize {
        let victims = self.coordinator.collect_eviction_candidates();
        let count = victims.len();

        for key in victims {
            self.router.shard_for(&key).delete(&key);
            self.stats.record_eviction();
        }

        count
    }

    // == Introspection ==
    /// Returns the total number of stored entries.
    pub fn len(&self) -> usize {
        self.router.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.router.is_empty()
    }

    /// Returns the number of entries carrying an expiration deadline.
    pub fn expiring_len(&self) -> usize {
        self.router.shards().iter().map(|s| s.ttl_len()).sum()
    }

    /// Returns a snapshot of the performance counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Returns the current approximate memory usage in bytes.
    pub fn memory_usage(&self) -> u64 {
        self.coordinator.current_usage()
    }

    /// Returns the configured memory limit in bytes.
    pub fn memory_limit(&self) -> u64 {
        self.coordinator.max_limit()
    }

    #[cfg(test)]
    pub(crate) fn router(&self) -> &ShardRouter {
        &self.router
    }
}

/// Approximate bytes an entry occupies.
fn estimate_entry_size(key: &Bytes, value: &Bytes) -> u64 {
    key.len() as u64 + value.len() as u64 + ENTRY_OVERHEAD_BYTES
}
