//! API Routes
//!
//! Maps object paths onto the cache handlers.

use axum::{
    routing::{get, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    delete_handler, get_handler, health_handler, put_handler, stats_handler, AppState,
};

/// Builds the object cache router.
///
/// `/objects/:key` carries PUT (store the raw body), GET (read, with an
/// optional `?since=<RFC 3339>` freshness reference) and DELETE. `/stats`
/// and `/health` are read-only.
///
/// Object bodies are opaque bytes, so the CORS layer lets browsers send any
/// content type and method. The trace layer emits one `tower_http` span per
/// request, filtered by `RUST_LOG` like the rest of the crate.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/objects/:key",
            put(put_handler).get(get_handler).delete(delete_handler),
        )
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
