//! memshard - A sharded in-memory key-value cache server
//!
//! Provides a cache engine with per-shard LRU eviction, TTL expiration, and
//! global memory-pressure eviction, behind an HTTP API.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tokio::task::JoinHandle;
use tower::limit::GlobalConcurrencyLimitLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use memshard::api::{create_router, AppState};
use memshard::config::{Config, EvictionPolicyKind};
use memshard::tasks::{spawn_eviction_task, spawn_sweep_task};

/// Main entry point for the memshard cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables and validate it
/// 3. Build the Tokio runtime honoring `WORKER_THREADS`
/// 4. Create the cache engine with configured shards and limits
/// 5. Start the TTL sweeper and eviction driver tasks
/// 6. Start the HTTP server on the configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
fn main() {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "memshard=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load and validate configuration; a bad config aborts bring-up
    let config = Config::from_env();
    if let Err(err) = config.validate() {
        error!("Invalid configuration: {err}");
        std::process::exit(1);
    }

    // Build the runtime by hand so worker_threads takes effect (0 = auto)
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if config.worker_threads > 0 {
        builder.worker_threads(config.worker_threads);
    }
    let runtime = match builder.build() {
        Ok(runtime) => runtime,
        Err(err) => {
            error!("Failed to build runtime: {err}");
            std::process::exit(1);
        }
    };

    runtime.block_on(serve(config));
}

/// Brings up the engine, background tasks, and HTTP server.
async fn serve(config: Config) {
    info!("Starting memshard cache server");
    info!(
        "Configuration loaded: shard_count={}, max_entries={}, max_memory_bytes={}, \
         eviction_policy={:?}, port={}",
        config.shard_count,
        config.max_entries,
        config.max_memory_bytes,
        config.eviction_policy,
        config.listen_port
    );

    // Create application state with the cache engine
    let state = match AppState::from_config(&config) {
        Ok(state) => state,
        Err(err) => {
            error!("Failed to initialize cache engine: {err}");
            std::process::exit(1);
        }
    };
    info!("Cache engine initialized");

    // Start background maintenance tasks
    let mut task_handles = Vec::new();
    if config.enable_ttl {
        task_handles.push(spawn_sweep_task(
            Arc::clone(&state.engine),
            config.ttl_sweep_interval_ms,
        ));
        info!("TTL sweep task started");
    }
    if config.eviction_policy != EvictionPolicyKind::None {
        // The sweep cadence also paces eviction; guard against a zero
        // interval when TTL (and its validation) is disabled.
        let interval = config.ttl_sweep_interval_ms.max(1);
        task_handles.push(spawn_eviction_task(Arc::clone(&state.engine), interval));
        info!("Eviction task started");
    }

    // Create router with all endpoints and the global connection limit
    let app = create_router(state)
        .layer(GlobalConcurrencyLimitLayer::new(config.max_connections));

    // Bind to configured port
    let addr = SocketAddr::from(([0, 0, 0, 0], config.listen_port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind {addr}: {err}");
            std::process::exit(1);
        }
    };
    info!("Server listening on http://{addr}");

    // Start server with graceful shutdown
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(task_handles))
        .await
    {
        error!("Server error: {err}");
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the background tasks and allows graceful
/// shutdown.
async fn shutdown_signal(task_handles: Vec<JoinHandle<()>>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    // Abort the background tasks
    for handle in task_handles {
        handle.abort();
    }
    warn!("Background tasks aborted");
}
