//! API Module
//!
//! HTTP handlers and routing for the cache server REST API.
//!
//! # Endpoints
//! - `GET /caches`, `PUT|DELETE /caches/:name` - Cache lifecycle
//! - `GET|PUT|DELETE /caches/:name/entries/:key` - Single entries
//! - `POST /caches/:name/entries/:key/replace` - Replace a value
//! - `POST /caches/:name/get-all` - Bulk lookup
//! - `DELETE /caches/:name/entries` - Clear a cache
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
