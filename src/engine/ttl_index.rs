//! TTL Index Module
//!
//! Tracks expiration deadlines per key so the sweeper can collect due keys
//! in timestamp order without scanning the whole shard.

use std::collections::{BTreeMap, HashMap};

use bytes::Bytes;

// == TTL Index ==
/// Timestamp-ordered expiration tracking.
///
/// Two synchronized structures: an ordered map from deadline to the keys due
/// at that deadline (insertion order preserved within a bucket), and a
/// reverse map from key to its deadline. Only keys with a TTL are present.
/// The owning shard performs the actual deletion and provides the lock.
#[derive(Debug, Default)]
pub struct TtlIndex {
    /// expire_at -> keys due at that timestamp
    buckets: BTreeMap<u64, Vec<Bytes>>,
    /// key -> expire_at
    deadlines: HashMap<Bytes, u64>,
}

impl TtlIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    // == Upsert ==
    /// Adds or updates the deadline for a key.
    ///
    /// A key already tracked under another deadline is moved; the key is
    /// appended to its new bucket.
    pub fn upsert(&mut self, key: Bytes, expire_at: u64) {
        self.remove(&key);

        self.buckets.entry(expire_at).or_default().push(key.clone());
        self.deadlines.insert(key, expire_at);
    }

    // == Remove ==
    /// Stops tracking a key. No-op if the key is absent.
    pub fn remove(&mut self, key: &[u8]) {
        let Some(ts) = self.deadlines.remove(key) else {
            return;
        };

        if let Some(bucket) = self.buckets.get_mut(&ts) {
            // Buckets are expected small; a linear scan is fine here.
            if let Some(pos) = bucket.iter().position(|k| k.as_ref() == key) {
                bucket.remove(pos);
            }
            if bucket.is_empty() {
                self.buckets.remove(&ts);
            }
        }
    }

    // == Collect Expired ==
    /// Drains every bucket with a deadline at or before `now` and returns
    /// the keys in non-decreasing deadline order.
    ///
    /// The keys are removed from the index; the caller deletes them from
    /// the store.
    pub fn collect_expired(&mut self, now: u64) -> Vec<Bytes> {
        let mut expired = Vec::new();

        while let Some((&ts, _)) = self.buckets.first_key_value() {
            if ts > now {
                break;
            }
            if let Some((_, keys)) = self.buckets.pop_first() {
                for key in keys {
                    self.deadlines.remove(&key);
                    expired.push(key);
                }
            }
        }

        expired
    }

    // == Size ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    /// Returns true if no keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    // == Clear ==
    /// Drops all tracking state.
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.deadlines.clear();
    }
}
