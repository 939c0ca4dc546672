//! InfluxDB error types
//!
//! Every store interaction ends in one of these classes; callers never see a
//! raw transport error.

use thiserror::Error;

/// Errors that can occur when talking to InfluxDB
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InfluxError {
    /// The transport could not reach the store
    #[error("communication with InfluxDB failed: {0}")]
    Connection(String),

    /// The store answered without a response envelope
    #[error("NULL response")]
    NullResponse,

    /// The store reported a missing database or measurement
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other error reported by the store
    #[error("InfluxDB error: {0}")]
    Store(String),

    /// A lookup request was rejected before reaching the store
    #[error(transparent)]
    Query(#[from] crate::query::QueryError),

    /// Client could not be constructed
    #[error("Invalid InfluxDB configuration: {0}")]
    Config(String),
}

/// Result type for InfluxDB operations
pub type InfluxResult<T> = Result<T, InfluxError>;
