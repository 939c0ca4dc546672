//! InfluxDB Integration
//!
//! Execution adapter between compiled InfluxQL and the store.
//!
//! ## Architecture
//!
//! - **Client**: `QueryBackend` trait and the reqwest-based `InfluxClient`
//! - **Response**: the `/query` JSON envelope
//! - **Latest**: batched latest-value lookups
//! - **Tags**: tag key/value listing
//!
//! ## Error classes
//!
//! 1. `Connection` - the transport could not reach InfluxDB
//! 2. `NullResponse` - no response envelope
//! 3. `NotFound` - database or measurement does not exist
//! 4. `Store` - anything else InfluxDB reported

mod client;
mod error;
mod latest;
mod response;
mod tags;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{decode_response, InfluxClient, InfluxConfig, QueryBackend};
pub use error::{InfluxError, InfluxResult};
pub use latest::{get_latest_value, get_latest_values, resolve_latest_values, TimeValuePair};
pub use response::{find_series, QueryResponse, Row, Series, StatementResult};
pub use tags::get_tags;
