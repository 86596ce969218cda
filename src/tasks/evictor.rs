//! Eviction Driver Task
//!
//! Background task that evicts entries while memory usage is over the limit.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::engine::KvEngine;

/// Spawns a background task that drives eviction on a fixed cadence.
///
/// Each tick calls the engine's eviction pass, which is a no-op while usage
/// is within the memory limit. Callers abort the returned handle during
/// graceful shutdown.
///
/// Spawn this only when an eviction policy is configured; with the policy
/// disabled no victims are ever selected.
pub fn spawn_eviction_task(engine: Arc<KvEngine>, interval_ms: u64) -> JoinHandle<()> {
    let interval = Duration::from_millis(interval_ms);

    tokio::spawn(async move {
        info!("Starting eviction task with interval of {interval_ms} ms");

        loop {
            tokio::time::sleep(interval).await;

            let evicted = engine.process_evictions();

            if evicted > 0 {
                info!("Eviction pass: removed {evicted} entries");
            } else {
                debug!("Eviction pass: memory within limit");
            }
        }
    })
}
