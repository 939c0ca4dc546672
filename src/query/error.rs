//! Query error types
//!
//! Defines the error conditions of request validation and InfluxQL compilation.

use thiserror::Error;

/// Errors that can occur while validating or compiling requests
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A request element or lookup pair is malformed
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// An element could not be rendered as InfluxQL
    #[error("Compile error: {0}")]
    Compile(String),
}

/// A rejected element, with its position in the batch
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("element {index}: {reason}")]
pub struct ValidationError {
    pub index: usize,
    pub reason: InvalidReason,
}

/// Why an element was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidReason {
    #[error("measurement must not be empty")]
    EmptyMeasurement,

    #[error("invalid duration {0:?}")]
    InvalidDuration(String),

    #[error("invalid timestamp {0:?}")]
    InvalidTimestamp(String),

    #[error("limit must be at least 1")]
    LimitTooSmall,

    #[error("limit cannot be combined with groupTime")]
    LimitWithGroupTime,

    #[error("at least one column is required")]
    NoColumns,

    #[error("column name must not be empty")]
    EmptyColumnName,

    #[error("unknown group type {0:?}")]
    UnknownGroupType(String),

    #[error("group type on column {0:?} requires a time window")]
    GroupTypeWithoutTime(String),

    #[error("invalid math {0:?}")]
    InvalidMath(String),

    #[error("filter column must not be empty")]
    EmptyFilterColumn,

    #[error("unknown filter operator {0:?}")]
    UnknownOperator(String),

    #[error("filter on {0:?} has no value")]
    MissingFilterValue(String),

    #[error("invalid groupTime {0:?}")]
    InvalidGroupTime(String),
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
