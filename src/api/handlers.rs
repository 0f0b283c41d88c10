//! API Handlers
//!
//! HTTP request handlers exposing an embedded object cache.

use std::io::Write;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use crate::cache::ObjectCache;
use crate::error::{CacheError, Result};
use crate::models::{DeleteResponse, HealthResponse, OpenQuery, PutResponse, StatsResponse};

/// Application state shared across all handlers.
///
/// The cache handle is internally synchronized, so the state clones cheaply.
#[derive(Clone)]
pub struct AppState {
    pub cache: ObjectCache,
}

impl AppState {
    /// Creates a new AppState around the given cache.
    pub fn new(cache: ObjectCache) -> Self {
        Self { cache }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Starts the expiry janitor when the configured expiry is non-zero.
    pub fn from_config(config: &crate::config::Config) -> Result<Self> {
        Ok(Self::new(ObjectCache::from_config(config)?))
    }
}

/// Handler for PUT /objects/:key
///
/// Streams the request body into a write sink and commits it.
pub async fn put_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Bytes,
) -> Result<Json<PutResponse>> {
    let size = body.len();
    let mut sink = state.cache.create(key.clone());

    // An oversized body is refused here and reported by commit as CacheFull
    if let Err(e) = sink.write_all(&body) {
        debug!(key = %key, "Write refused: {}", e);
    }
    sink.commit().await?;

    Ok(Json(PutResponse::new(key, size)))
}

/// Handler for GET /objects/:key
///
/// Returns the raw object bytes. With `?since=<RFC 3339>`, an entry last
/// accessed before that time is invalidated and reported as not found.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<OpenQuery>,
) -> Result<Response> {
    let snapshot = match query.since {
        Some(since) => state.cache.open(&key, since).await?,
        None => state.cache.get(&key).await?,
    };

    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        snapshot.into_bytes(),
    )
        .into_response())
}

/// Handler for DELETE /objects/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if !state.cache.delete(&key).await {
        return Err(CacheError::NotFound(key));
    }

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats().await))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
