//! Response DTOs for the object cache API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for storing an object (PUT /objects/:key)
#[derive(Debug, Clone, Serialize)]
pub struct PutResponse {
    /// Outcome message
    pub message: String,
    /// The key that was written
    pub key: String,
    /// Bytes stored; 0 means the empty write stored nothing
    pub size: usize,
}

impl PutResponse {
    /// Creates a new PutResponse
    pub fn new(key: impl Into<String>, size: usize) -> Self {
        let key = key.into();
        let message = if size == 0 {
            format!("Empty body for '{}', nothing stored", key)
        } else {
            format!("Object '{}' stored successfully", key)
        };
        Self { message, key, size }
    }
}

/// Response body for deleting an object (DELETE /objects/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was deleted
    pub key: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Object '{}' deleted successfully", key),
            key,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            stats,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
