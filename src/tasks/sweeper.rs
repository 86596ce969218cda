//! TTL Sweeper Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::engine::KvEngine;

/// Spawns a background task that sweeps expired entries on a fixed cadence.
///
/// The task loops forever, sleeping `interval_ms` between sweeps; each sweep
/// visits every shard once and removes only entries already due. Callers
/// abort the returned handle during graceful shutdown.
///
/// Spawn this only when TTL support is enabled; without TTLs there is
/// nothing to sweep.
pub fn spawn_sweep_task(engine: Arc<KvEngine>, interval_ms: u64) -> JoinHandle<()> {
    let interval = Duration::from_millis(interval_ms);

    tokio::spawn(async move {
        info!("Starting TTL sweep task with interval of {interval_ms} ms");

        loop {
            tokio::time::sleep(interval).await;

            let removed = engine.process_expired();

            if removed > 0 {
                info!("TTL sweep: removed {removed} expired entries");
            } else {
                debug!("TTL sweep: no expired entries found");
            }
        }
    })
}
