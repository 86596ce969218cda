//! Shard Router Module
//!
//! Hash-based dispatch: every key maps to exactly one shard.

use std::collections::hash_map::RandomState;
use std::hash::BuildHasher;

use crate::engine::shard::Shard;
use crate::error::{CacheError, Result};

// == Shard Router ==
/// Owns the shard set and routes keys to their shard.
///
/// The shard count must be a power of two so selection is a single mask of
/// the key hash. The hash is seeded per process; routing is stable for the
/// process lifetime, which is all an in-memory cache needs.
#[derive(Debug)]
pub struct ShardRouter {
    shards: Vec<Shard>,
    mask: usize,
    hasher: RandomState,
}

impl ShardRouter {
    // == Constructor ==
    /// Creates `shard_count` shards of `shard_capacity` entries each.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `shard_count` is not a power of two or
    /// `shard_capacity` is zero.
    pub fn new(shard_count: usize, shard_capacity: usize) -> Result<Self> {
        if shard_count == 0 || !shard_count.is_power_of_two() {
            return Err(CacheError::InvalidArgument(format!(
                "shard count must be a power of two, got {shard_count}"
            )));
        }

        let shards = (0..shard_count)
            .map(|_| Shard::new(shard_capacity))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            shards,
            mask: shard_count - 1,
            hasher: RandomState::new(),
        })
    }

    // == Routing ==
    /// Returns the shard owning `key`.
    pub fn shard_for(&self, key: &[u8]) -> &Shard {
        &self.shards[self.shard_index(key)]
    }

    fn shard_index(&self, key: &[u8]) -> usize {
        (self.hasher.hash_one(key) as usize) & self.mask
    }

    // == Accessors ==
    /// Returns all shards, for whole-cache walks (sweeping, sizing).
    pub fn shards(&self) -> &[Shard] {
        &self.shards
    }

    /// Returns the number of shards.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Returns the total entry count across all shards.
    pub fn len(&self) -> usize {
        self.shards.iter().map(Shard::len).sum()
    }

    /// Returns true if every shard is empty.
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(Shard::is_empty)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_rejects_zero_shards() {
        let result = ShardRouter::new(0, 16);
        assert!(matches!(result, Err(CacheError::InvalidArgument(_))));
    }

    #[test]
    fn test_rejects_non_power_of_two() {
        for count in [3, 5, 6, 7, 12, 100] {
            assert!(
                ShardRouter::new(count, 16).is_err(),
                "count {count} should be rejected"
            );
        }
    }

    #[test]
    fn test_accepts_powers_of_two() {
        for count in [1, 2, 4, 8, 16, 64] {
            assert!(ShardRouter::new(count, 16).is_ok());
        }
    }

    #[test]
    fn test_routing_is_stable() {
        let router = ShardRouter::new(8, 16).unwrap();

        for key in [b"alpha".as_ref(), b"beta", b"gamma"] {
            let first = router.shard_index(key);
            for _ in 0..10 {
                assert_eq!(router.shard_index(key), first);
            }
        }
    }

    #[test]
    fn test_every_key_lands_in_exactly_one_shard() {
        let router = ShardRouter::new(4, 16).unwrap();

        // Insert a..z, one write each
        for c in b'a'..=b'z' {
            let key = Bytes::copy_from_slice(&[c]);
            router.shard_for(&key).set(key.clone(), Bytes::from_static(b"v"));
        }

        assert_eq!(router.len(), 26);
        for shard in router.shards() {
            assert!(shard.len() <= 16);
        }

        // Each key is readable through its owning shard and no other
        for c in b'a'..=b'z' {
            let key = Bytes::copy_from_slice(&[c]);
            let owner = router.shard_index(&key);
            for (i, shard) in router.shards().iter().enumerate() {
                let hit = shard.get(&key).value().is_some();
                assert_eq!(hit, i == owner);
            }
        }
    }
}
