//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - TTL sweeper: removes expired cache entries at configured intervals
//! - Eviction driver: evicts entries while memory usage is over the limit

mod evictor;
mod sweeper;

pub use evictor::spawn_eviction_task;
pub use sweeper::spawn_sweep_task;
