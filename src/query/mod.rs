//! Query Layer
//!
//! Structured query requests and their translation to InfluxQL:
//!
//! - **Model**: request elements, columns, filters, time windows
//! - **Validate**: structural checks before anything is compiled
//! - **Compiler**: InfluxQL generation for range queries and latest values
//!
//! # Example
//!
//! ```rust
//! use influx_broker::query::{compile_queries, validate_elements, Direction, RequestElement, TimeSpec};
//!
//! let elements = vec![
//!     RequestElement::new("power", &["watts"]).time(TimeSpec::Last("1h".to_string())),
//! ];
//! validate_elements(&elements).unwrap();
//!
//! let query = compile_queries(&elements, Direction::Desc).unwrap();
//! assert_eq!(
//!     query,
//!     r#"SELECT "watts" FROM "power" WHERE time > now() - 1h ORDER BY time DESC"#
//! );
//! ```

mod compiler;
mod error;
mod model;
mod validate;

pub use compiler::{
    compile_latest_values, compile_queries, compile_statement, quote_ident, quote_literal,
    UniqueMeasurementColumnSet,
};
pub use error::{InvalidReason, QueryError, QueryResult, ValidationError};
pub use model::{
    AggregationFunc, Column, Direction, Filter, GroupType, MeasurementColumnPair, Operator,
    RequestElement, TimeSpec, TimeWindowDto,
};
pub use validate::{duration_valid, math_valid, validate_elements, validate_pairs};
