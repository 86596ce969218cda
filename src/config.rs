//! Configuration Module
//!
//! Loads server configuration from environment variables and validates it
//! once at startup.

use std::env;

use crate::error::{CacheError, Result};

// == Eviction Policy Selection ==
/// Which victim-selection policy the engine runs.
///
/// TTL expiration is not an eviction policy; it is separate expiration
/// logic and is controlled by `enable_ttl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionPolicyKind {
    /// Never evict; the memory limit is advisory.
    None,
    /// Evict the least recently used keys when over the memory limit.
    Lru,
}

impl EvictionPolicyKind {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "none" => Some(Self::None),
            "lru" => Some(Self::Lru),
            _ => None,
        }
    }
}

// == Config ==
/// Server configuration parameters.
///
/// All values can be set via environment variables; defaults are safe for
/// development machines. `validate` must be called once during bring-up
/// before any component is constructed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of independent shards; must be a power of two
    pub shard_count: usize,
    /// Total entry capacity, split evenly across shards
    pub max_entries: usize,
    /// Global memory limit in bytes across all shards
    pub max_memory_bytes: u64,
    /// Upper bound for a single value (and key) in bytes
    pub max_value_bytes: u64,
    /// HTTP listen port
    pub listen_port: u16,
    /// Maximum simultaneously served requests
    pub max_connections: usize,
    /// Tokio worker threads; 0 = auto-detect
    pub worker_threads: usize,
    /// Enables TTL support; when false, TTL arguments are rejected
    pub enable_ttl: bool,
    /// Interval in milliseconds for the TTL sweeper task
    pub ttl_sweep_interval_ms: u64,
    /// Exposes the /stats endpoint
    pub enable_metrics: bool,
    /// Victim-selection policy
    pub eviction_policy: EvictionPolicyKind,
}

impl Config {
    /// Creates a Config from environment variables.
    ///
    /// # Environment Variables
    /// - `SHARD_COUNT` - Number of shards (default: 16)
    /// - `MAX_ENTRIES` - Total entry capacity (default: 100000)
    /// - `MAX_MEMORY_BYTES` - Global memory limit (default: 256 MiB)
    /// - `MAX_VALUE_BYTES` - Per-value size bound (default: 8 MiB)
    /// - `LISTEN_PORT` - HTTP port (default: 8080)
    /// - `MAX_CONNECTIONS` - Concurrent request limit (default: 4096)
    /// - `WORKER_THREADS` - Tokio workers, 0 = auto (default: 0)
    /// - `ENABLE_TTL` - TTL support (default: true)
    /// - `TTL_SWEEP_INTERVAL_MS` - Sweeper cadence (default: 250)
    /// - `ENABLE_METRICS` - Expose /stats (default: true)
    /// - `EVICTION_POLICY` - "none" or "lru" (default: lru)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            shard_count: env_parse("SHARD_COUNT", defaults.shard_count),
            max_entries: env_parse("MAX_ENTRIES", defaults.max_entries),
            max_memory_bytes: env_parse("MAX_MEMORY_BYTES", defaults.max_memory_bytes),
            max_value_bytes: env_parse("MAX_VALUE_BYTES", defaults.max_value_bytes),
            listen_port: env_parse("LISTEN_PORT", defaults.listen_port),
            max_connections: env_parse("MAX_CONNECTIONS", defaults.max_connections),
            worker_threads: env_parse("WORKER_THREADS", defaults.worker_threads),
            enable_ttl: env_parse("ENABLE_TTL", defaults.enable_ttl),
            ttl_sweep_interval_ms: env_parse(
                "TTL_SWEEP_INTERVAL_MS",
                defaults.ttl_sweep_interval_ms,
            ),
            enable_metrics: env_parse("ENABLE_METRICS", defaults.enable_metrics),
            eviction_policy: env::var("EVICTION_POLICY")
                .ok()
                .and_then(|v| EvictionPolicyKind::parse(&v))
                .unwrap_or(defaults.eviction_policy),
        }
    }

    // == Validation ==
    /// Validates the configuration.
    ///
    /// Called once during startup before constructing components; a failure
    /// aborts bring-up.
    ///
    /// # Errors
    /// Returns `InvalidArgument` describing the first offending option.
    pub fn validate(&self) -> Result<()> {
        if self.shard_count == 0 {
            return Err(CacheError::InvalidArgument(
                "shard_count must be > 0".to_string(),
            ));
        }

        // Power-of-two shard counts allow routing by bit mask.
        if !self.shard_count.is_power_of_two() {
            return Err(CacheError::InvalidArgument(
                "shard_count must be a power of two (e.g. 16, 32, 64)".to_string(),
            ));
        }

        if self.max_entries == 0 {
            return Err(CacheError::InvalidArgument(
                "max_entries must be > 0".to_string(),
            ));
        }

        if self.max_memory_bytes == 0 {
            return Err(CacheError::InvalidArgument(
                "max_memory_bytes must be > 0".to_string(),
            ));
        }

        if self.max_value_bytes == 0 {
            return Err(CacheError::InvalidArgument(
                "max_value_bytes must be > 0".to_string(),
            ));
        }

        if self.max_value_bytes > self.max_memory_bytes {
            return Err(CacheError::InvalidArgument(
                "max_value_bytes must be <= max_memory_bytes".to_string(),
            ));
        }

        if self.listen_port == 0 {
            return Err(CacheError::InvalidArgument(
                "listen_port must be a valid port".to_string(),
            ));
        }

        if self.max_connections == 0 {
            return Err(CacheError::InvalidArgument(
                "max_connections must be > 0".to_string(),
            ));
        }

        // worker_threads == 0 means auto-detect; an explicit value must be
        // reasonable.
        if self.worker_threads > 1024 {
            return Err(CacheError::InvalidArgument(
                "worker_threads is too high; must be <= 1024".to_string(),
            ));
        }

        if self.enable_ttl && self.ttl_sweep_interval_ms == 0 {
            return Err(CacheError::InvalidArgument(
                "ttl_sweep_interval_ms must be > 0 when TTL is enabled".to_string(),
            ));
        }

        Ok(())
    }

    /// Returns the per-shard entry capacity: the total split evenly, never
    /// below one entry per shard.
    pub fn entries_per_shard(&self) -> usize {
        (self.max_entries / self.shard_count).max(1)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shard_count: 16,
            max_entries: 100_000,
            max_memory_bytes: 256 * 1024 * 1024,
            max_value_bytes: 8 * 1024 * 1024,
            listen_port: 8080,
            max_connections: 4096,
            worker_threads: 0,
            enable_ttl: true,
            ttl_sweep_interval_ms: 250,
            enable_metrics: true,
            eviction_policy: EvictionPolicyKind::Lru,
        }
    }
}

/// Parses an environment variable, falling back to `default` when unset or
/// unparseable.
fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
