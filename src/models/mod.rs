//! Request and Response models for the cache server API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{
    validate_key, validate_value, CreateCacheRequest, GetAllRequest, PutEntryRequest,
    ReplaceRequest, MAX_KEY_LENGTH, MAX_VALUE_SIZE,
};
pub use responses::{
    CacheListResponse, CacheResponse, DeleteResponse, GetAllResponse, GetResponse,
    HealthResponse, PutResponse, ReplaceResponse,
};
