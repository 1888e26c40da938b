//! API Handlers
//!
//! HTTP request handlers exposing named string caches.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::debug;

use crate::cache::{Cache, CacheConfiguration, ExpiryPolicyKind};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::manager::CacheManager;
use crate::models::{
    validate_key, validate_value, CacheListResponse, CacheResponse, CreateCacheRequest,
    DeleteResponse, GetAllRequest, GetAllResponse, GetResponse, HealthResponse, PutEntryRequest,
    PutResponse, ReplaceRequest, ReplaceResponse,
};

/// Caches served over HTTP map strings to strings.
pub type StringCache = Cache<String, String>;

/// Application state shared across all handlers.
///
/// The manager does its own locking, so the state is cloned freely.
#[derive(Clone)]
pub struct AppState {
    /// Registry of named caches
    pub manager: CacheManager,
    /// Policy for caches created without one
    pub default_expiry: ExpiryPolicyKind,
}

impl AppState {
    /// Creates a new AppState around an existing manager.
    pub fn new(manager: CacheManager, default_expiry: ExpiryPolicyKind) -> Self {
        Self {
            manager,
            default_expiry,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Registers the configured default cache.
    pub fn from_config(config: &Config) -> Result<Self> {
        let state = Self::new(CacheManager::new(), config.default_expiry());
        state.create(&config.default_cache, CreateCacheRequest::default())?;
        Ok(state)
    }

    fn create(&self, name: &str, req: CreateCacheRequest) -> Result<Arc<StringCache>> {
        let expiry = req.expiry.unwrap_or(self.default_expiry);
        let configuration = CacheConfiguration::new()
            .with_store_by_value(req.store_by_value.unwrap_or(true))
            .with_expiry_policy_factory(expiry.factory());
        self.manager.create_cache(name, &configuration)
    }

    /// Looks up a cache, mapping an unknown name to `NotFound`.
    pub fn cache(&self, name: &str) -> Result<Arc<StringCache>> {
        self.manager
            .get_cache::<String, String>(name)?
            .ok_or_else(|| CacheError::NotFound(format!("cache '{}'", name)))
    }
}

fn check(result: Option<String>) -> Result<()> {
    match result {
        Some(msg) => Err(CacheError::InvalidArgument(msg)),
        None => Ok(()),
    }
}

/// Handler for PUT /caches/:name
pub async fn create_cache_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<CreateCacheRequest>,
) -> Result<Json<CacheResponse>> {
    check(validate_key("Cache name", &name))?;
    state.create(&name, req)?;

    Ok(Json(CacheResponse::created(name)))
}

/// Handler for DELETE /caches/:name
pub async fn destroy_cache_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<CacheResponse>> {
    // Surfaces NotFound for unknown names.
    state.cache(&name)?;
    state.manager.destroy_cache(&name)?;

    Ok(Json(CacheResponse::destroyed(name)))
}

/// Handler for GET /caches
pub async fn list_caches_handler(State(state): State<AppState>) -> Result<Json<CacheListResponse>> {
    let caches = state.manager.cache_names()?;
    Ok(Json(CacheListResponse { caches }))
}

/// Handler for GET /caches/:name/entries/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path((name, key)): Path<(String, String)>,
) -> Result<Json<GetResponse>> {
    let value = state
        .cache(&name)?
        .get(&key)?
        .ok_or_else(|| CacheError::NotFound(format!("key '{}'", key)))?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for PUT /caches/:name/entries/:key
///
/// Stores unconditionally, or only when absent if `if_absent` is set.
pub async fn put_handler(
    State(state): State<AppState>,
    Path((name, key)): Path<(String, String)>,
    Json(req): Json<PutEntryRequest>,
) -> Result<Json<PutResponse>> {
    check(validate_key("Key", &key))?;
    check(validate_value(&req.value))?;

    let cache = state.cache(&name)?;
    let stored = if req.if_absent {
        cache.put_if_absent(key.clone(), req.value)?
    } else {
        cache.put(key.clone(), req.value)?;
        true
    };
    debug!("PUT {}/{} stored={}", name, key, stored);

    Ok(Json(PutResponse::new(key, stored)))
}

/// Handler for DELETE /caches/:name/entries/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path((name, key)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>> {
    if !state.cache(&name)?.remove(&key)? {
        return Err(CacheError::NotFound(format!("key '{}'", key)));
    }

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for POST /caches/:name/entries/:key/replace
///
/// Compare-and-replace when `expected` is given, plain replace otherwise.
pub async fn replace_handler(
    State(state): State<AppState>,
    Path((name, key)): Path<(String, String)>,
    Json(req): Json<ReplaceRequest>,
) -> Result<Json<ReplaceResponse>> {
    check(validate_value(&req.value))?;

    let cache = state.cache(&name)?;
    let replaced = match req.expected {
        Some(expected) => cache.replace_if_equals(&key, &expected, req.value)?,
        None => cache.replace(&key, req.value)?,
    };

    Ok(Json(ReplaceResponse::new(key, replaced)))
}

/// Handler for POST /caches/:name/get-all
pub async fn get_all_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<GetAllRequest>,
) -> Result<Json<GetAllResponse>> {
    let found = state.cache(&name)?.get_all(&req.keys)?;
    Ok(Json(GetAllResponse::new(found)))
}

/// Handler for DELETE /caches/:name/entries
pub async fn clear_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<CacheResponse>> {
    state.cache(&name)?.clear()?;
    Ok(Json(CacheResponse::cleared(name)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
