//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::engine::{epoch_millis, StatsSnapshot};

/// Response body for the GET operation (GET /get/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: String,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Response body for the SET operation (PUT /set)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
}

impl SetResponse {
    /// Creates a new SetResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
        }
    }
}

/// Response body for the DELETE operation (DELETE /del/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was deleted
    pub key: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of entries evicted (capacity or memory pressure)
    pub evictions: u64,
    /// Number of entries removed by TTL expiration
    pub expirations: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
    /// Entries currently carrying an expiration deadline
    pub expiring_entries: usize,
    /// Approximate memory in use, in bytes
    pub memory_bytes: u64,
    /// Configured memory limit, in bytes
    pub memory_limit_bytes: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from a counter snapshot and the engine's
    /// current sizes.
    pub fn new(
        snapshot: StatsSnapshot,
        total_entries: usize,
        expiring_entries: usize,
        memory_bytes: u64,
        memory_limit_bytes: u64,
    ) -> Self {
        Self {
            hits: snapshot.hits,
            misses: snapshot.misses,
            evictions: snapshot.evictions,
            expirations: snapshot.expirations,
            total_entries,
            expiring_entries,
            memory_bytes,
            memory_limit_bytes,
            hit_rate: snapshot.hit_rate(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status string
    pub status: String,
    /// Current server timestamp (Unix milliseconds)
    pub timestamp: u64,
}

impl HealthResponse {
    /// Creates a healthy response stamped with the current time.
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: epoch_millis(),
        }
    }
}
