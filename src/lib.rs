//! memshard - A sharded in-memory key-value cache server
//!
//! Provides a cache engine with per-shard LRU eviction, TTL expiration, and
//! global memory-pressure eviction, behind an HTTP API.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod eviction;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use engine::KvEngine;
pub use tasks::{spawn_eviction_task, spawn_sweep_task};
