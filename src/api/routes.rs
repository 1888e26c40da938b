//! API Routes
//!
//! Configures the Axum router with all cache server endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, create_cache_handler, delete_handler, destroy_cache_handler, get_all_handler,
    get_handler, health_handler, list_caches_handler, put_handler, replace_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /caches` - List cache names
/// - `PUT /caches/:name` - Create a cache
/// - `DELETE /caches/:name` - Destroy a cache
/// - `DELETE /caches/:name/entries` - Clear a cache
/// - `GET /caches/:name/entries/:key` - Retrieve a value
/// - `PUT /caches/:name/entries/:key` - Store a value
/// - `DELETE /caches/:name/entries/:key` - Delete a value
/// - `POST /caches/:name/entries/:key/replace` - Replace a value
/// - `POST /caches/:name/get-all` - Retrieve several values
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/caches", get(list_caches_handler))
        .route(
            "/caches/:name",
            put(create_cache_handler).delete(destroy_cache_handler),
        )
        .route("/caches/:name/entries", axum::routing::delete(clear_handler))
        .route(
            "/caches/:name/entries/:key",
            get(get_handler).put(put_handler).delete(delete_handler),
        )
        .route("/caches/:name/entries/:key/replace", post(replace_handler))
        .route("/caches/:name/get-all", post(get_all_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
