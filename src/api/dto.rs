//! Data Transfer Objects
//!
//! Request and response types for the API endpoints that are not part of
//! the query model itself.

use serde::{Deserialize, Serialize};

// ============================================
// QUERY DTOs
// ============================================

/// `POST /queries` query-string parameters
#[derive(Debug, Default, Deserialize)]
pub struct QueriesParams {
    /// per_query or table
    #[serde(default)]
    pub format: Option<String>,
    /// asc or desc
    #[serde(default)]
    pub order: Option<String>,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status: healthy or unhealthy
    pub status: String,
    /// Store status
    pub influx: String,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}
