//! InfluxDB Response Envelope
//!
//! Mirrors the JSON returned by `GET /query`:
//!
//! ```json
//! {"results": [{"statement_id": 0, "series": [
//!     {"name": "m1", "columns": ["time", "c1"], "values": [["2000-01-01T00:00:00Z", 1]]}
//! ]}]}
//! ```

use crate::value::Scalar;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One raw result row: timestamp first, then one cell per column
pub type Row = Vec<Scalar>;

/// Top-level response of a (possibly multi-statement) query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// One result per statement, in statement order
    #[serde(default)]
    pub results: Vec<StatementResult>,
    /// Request-level error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResponse {
    /// Build a response from statement results
    pub fn new(results: Vec<StatementResult>) -> Self {
        Self {
            results,
            error: None,
        }
    }

    /// First error reported anywhere in the envelope
    pub fn error(&self) -> Option<&str> {
        self.error
            .as_deref()
            .or_else(|| self.results.iter().find_map(|r| r.error.as_deref()))
    }
}

/// Result of one statement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementResult {
    #[serde(default)]
    pub statement_id: usize,
    /// Absent when the statement matched nothing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<Vec<Series>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatementResult {
    pub fn new(statement_id: usize, series: Vec<Series>) -> Self {
        Self {
            statement_id,
            series: Some(series),
            error: None,
        }
    }

    /// A result without any series
    pub fn empty(statement_id: usize) -> Self {
        Self {
            statement_id,
            ..Default::default()
        }
    }

    /// Series of this result, empty when none matched
    pub fn series(&self) -> &[Series] {
        self.series.as_deref().unwrap_or_default()
    }
}

/// One named, time-ordered sequence of rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub values: Vec<Row>,
}

impl Series {
    pub fn new(name: impl Into<String>, columns: &[&str], values: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            tags: None,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            values,
        }
    }

    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Find a series by measurement name
pub fn find_series<'a>(series: &'a [Series], name: &str) -> Option<&'a Series> {
    series.iter().find(|s| s.name == name)
}
