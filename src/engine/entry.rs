//! Cache Entry Module
//!
//! Defines the record stored per key: the value plus creation and expiration
//! timestamps.

use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;

/// Expiration sentinel: an entry with `expire_at == 0` never expires.
const NO_EXPIRY: u64 = 0;

// == Cache Entry ==
/// A single stored value with TTL metadata.
///
/// Entries are replaced, never mutated in place: an overwrite constructs a
/// fresh Entry so `created_at` always reflects the most recent write. The
/// key is owned by the shard's map, not the entry.
#[derive(Debug, Clone)]
pub struct Entry {
    /// The stored value (opaque bytes)
    value: Bytes,
    /// Creation timestamp (Unix milliseconds)
    created_at: u64,
    /// Expiration timestamp (Unix milliseconds), 0 = never expires
    expire_at: u64,
}

impl Entry {
    // == Constructors ==
    /// Creates an entry without expiration.
    pub fn new(value: Bytes) -> Self {
        Self {
            value,
            created_at: epoch_millis(),
            expire_at: NO_EXPIRY,
        }
    }

    /// Creates an entry expiring `ttl_ms` milliseconds from now.
    ///
    /// `ttl_ms == 0` produces a non-expiring entry, same as [`Entry::new`].
    pub fn with_ttl(value: Bytes, ttl_ms: u64) -> Self {
        let now = epoch_millis();
        Self {
            value,
            created_at: now,
            expire_at: if ttl_ms == 0 { NO_EXPIRY } else { now + ttl_ms },
        }
    }

    // == Accessors ==
    /// Returns the stored value.
    pub fn value(&self) -> &Bytes {
        &self.value
    }

    /// Returns the expiration timestamp (0 if no TTL).
    pub fn expire_at(&self) -> u64 {
        self.expire_at
    }

    /// Returns the creation timestamp.
    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    /// Returns true if the entry has an expiration configured.
    pub fn has_ttl(&self) -> bool {
        self.expire_at != NO_EXPIRY
    }

    // == Expiry Tests ==
    /// Returns true if the entry is expired at `now`.
    ///
    /// Boundary condition: the entry is expired once `now >= expire_at`, so
    /// an entry whose TTL has fully elapsed is never served again.
    pub fn expired(&self, now: u64) -> bool {
        self.has_ttl() && now >= self.expire_at
    }

    /// Returns remaining TTL in milliseconds at `now`.
    ///
    /// Returns 0 when the entry has no TTL or has already expired.
    pub fn remaining_ttl(&self, now: u64) -> u64 {
        if !self.has_ttl() || now >= self.expire_at {
            return 0;
        }
        self.expire_at - now
    }
}

// == Clock ==
/// Returns the current Unix timestamp in milliseconds.
///
/// Wall-clock time is used because TTL deadlines are absolute timestamps
/// shared across shards and the sweeper.
pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before Unix epoch")
        .as_millis() as u64
}
