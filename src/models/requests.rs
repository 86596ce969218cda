//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

/// Request body for the SET operation (PUT /set)
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: The value to store
/// - `ttl_ms`: Optional time-to-live in milliseconds; 0 or absent means the
///   entry never expires
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The value to store
    pub value: String,
    /// Optional TTL in milliseconds
    #[serde(default)]
    pub ttl_ms: Option<u64>,
}

impl SetRequest {
    /// Validates the request data.
    ///
    /// Returns an error message if validation fails, None if valid. Size
    /// bounds are enforced by the engine; this only rejects what is
    /// malformed at the protocol level.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        None
    }
}
