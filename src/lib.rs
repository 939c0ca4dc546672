//! # Influx Broker
//!
//! HTTP query broker for InfluxDB 1.x. Clients post batches of declarative
//! request elements; the broker validates them, compiles them to InfluxQL,
//! runs them in one round trip and returns the rows either per query or
//! joined into one timestamp-aligned table.
//!
//! ## Modules
//!
//! - [`query`]: Request model, validation and InfluxQL compilation
//! - [`influx`]: Store client, response envelope, latest-value and tag lookups
//! - [`format`]: Per-query and table result shapes
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust
//! use influx_broker::query::*;
//!
//! let element = RequestElement::new("cpu", &["load"])
//!     .time(TimeSpec::Last("1h".to_string()))
//!     .limit(10);
//! validate_elements(std::slice::from_ref(&element)).unwrap();
//!
//! let query = compile_queries(&[element], Direction::Desc).unwrap();
//! assert_eq!(
//!     query,
//!     r#"SELECT "load" FROM "cpu" WHERE time > now() - 1h ORDER BY time DESC LIMIT 10"#
//! );
//! ```

pub mod api;
pub mod config;
pub mod format;
pub mod influx;
pub mod query;
pub mod value;

// Re-export top-level types for convenience
pub use value::Scalar;

pub use query::{
    compile_queries, validate_elements, Direction, QueryError, RequestElement, TimeSpec,
    ValidationError,
};

pub use influx::{InfluxClient, InfluxConfig, InfluxError, QueryBackend, QueryResponse};

pub use format::{format_response, Format, Formatted, ShapeError};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use config::{Config, ConfigError, LoggingConfig};
