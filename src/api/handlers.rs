//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use bytes::Bytes;

use crate::config::Config;
use crate::engine::KvEngine;
use crate::error::{CacheError, Result};
use crate::models::{
    DeleteResponse, GetResponse, HealthResponse, SetRequest, SetResponse, StatsResponse,
};

/// Application state shared across all handlers.
///
/// The engine is internally synchronized, so handlers share it through a
/// plain `Arc` without any outer lock.
#[derive(Clone)]
pub struct AppState {
    /// The cache engine
    pub engine: Arc<KvEngine>,
    /// Whether the /stats endpoint is mounted
    pub enable_metrics: bool,
}

impl AppState {
    /// Creates a new AppState around an engine.
    pub fn new(engine: KvEngine, enable_metrics: bool) -> Self {
        Self {
            engine: Arc::new(engine),
            enable_metrics,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the configuration is invalid.
    pub fn from_config(config: &Config) -> Result<Self> {
        let engine = KvEngine::new(config)?;
        Ok(Self::new(engine, config.enable_metrics))
    }
}

/// Handler for PUT /set
///
/// Stores a key-value pair in the cache with optional TTL.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    // Validate request shape before touching the engine
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidArgument(error_msg));
    }

    let key = Bytes::from(req.key.clone().into_bytes());
    let value = Bytes::from(req.value.into_bytes());
    state.engine.set(key, value, req.ttl_ms)?;

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /get/:key
///
/// Retrieves a value from the cache by key; 404 on miss or expired.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let lookup = Bytes::from(key.clone().into_bytes());

    match state.engine.get(&lookup) {
        Some(value) => {
            let value = String::from_utf8_lossy(&value).into_owned();
            Ok(Json(GetResponse::new(key, value)))
        }
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /del/:key
///
/// Deletes a key from the cache; 404 if it was not present.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let target = Bytes::from(key.clone().into_bytes());

    if state.engine.delete(&target) {
        Ok(Json(DeleteResponse::new(key)))
    } else {
        Err(CacheError::NotFound(key))
    }
}

/// Handler for GET /stats
///
/// Returns current cache statistics and memory usage.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let engine = &state.engine;

    Json(StatsResponse::new(
        engine.stats(),
        engine.len(),
        engine.expiring_len(),
        engine.memory_usage(),
        engine.memory_limit(),
    ))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
