//! Result Shapers
//!
//! Turn the store's statement results into one of two response shapes.
//!
//! - `per_query`: `[[row, ...], ...]`, one entry per request element
//! - `table`: `[row, ...]`, all elements outer-joined on timestamp
//!
//! Rows are positional: index 0 is the timestamp, then the element's
//! columns in request order.

mod per_query;
mod table;

pub use per_query::format_per_query;
pub use table::format_table;

use crate::influx::{Row, StatementResult};
use crate::query::RequestElement;
use serde::Serialize;
use thiserror::Error;

/// Reshaping failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("statement {statement} returned {found} series, expected at most one")]
    MultipleSeries { statement: usize, found: usize },

    #[error("expected {expected} statement results, got {actual}")]
    StatementCount { expected: usize, actual: usize },

    #[error("statement {statement} returned an invalid timestamp '{value}'")]
    InvalidTimestamp { statement: usize, value: String },
}

/// Response shape selected by the `format` query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    PerQuery,
    Table,
}

impl Format {
    /// Unknown or missing values fall back to `PerQuery`
    pub fn from_param(param: Option<&str>) -> Self {
        match param.map(|p| p.trim().to_ascii_lowercase()).as_deref() {
            Some("table") => Format::Table,
            _ => Format::PerQuery,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::PerQuery => "per_query",
            Format::Table => "table",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A shaped response body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Formatted {
    PerQuery(Vec<Vec<Row>>),
    Table(Vec<Row>),
}

/// Shape the results for `elements` in the requested format
pub fn format_response(
    format: Format,
    elements: &[RequestElement],
    results: Vec<StatementResult>,
) -> Result<Formatted, ShapeError> {
    if results.len() != elements.len() {
        return Err(ShapeError::StatementCount {
            expected: elements.len(),
            actual: results.len(),
        });
    }

    let per_query = format_per_query(results)?;
    match format {
        Format::PerQuery => Ok(Formatted::PerQuery(per_query)),
        Format::Table => format_table(elements, per_query).map(Formatted::Table),
    }
}
