//! Query Request Model
//!
//! Structured query descriptions as sent by callers. One [`RequestElement`]
//! compiles to one InfluxQL `SELECT` statement.
//!
//! # Example Request
//!
//! ```json
//! [{
//!     "measurement": "power",
//!     "time": { "last": "7d" },
//!     "columns": [{ "name": "watts", "groupType": "mean", "math": "/1000" }],
//!     "filters": [{ "column": "phase", "type": "=", "value": "L1" }],
//!     "groupTime": "1h"
//! }]
//! ```

use crate::value::Scalar;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One logical query against a single measurement
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestElement {
    /// Measurement to select from
    #[serde(default)]
    pub measurement: String,
    /// Optional time window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<TimeSpec>,
    /// Optional row limit, must be at least 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    /// Columns to select, in output order
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Conditions joined with AND
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
    /// Optional `GROUP BY time(..)` interval
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_time: Option<String>,
}

impl RequestElement {
    /// Create an element selecting plain columns from a measurement
    pub fn new(measurement: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            measurement: measurement.into(),
            columns: columns.iter().map(|c| Column::new(*c)).collect(),
            ..Default::default()
        }
    }

    /// Set the time window
    pub fn time(mut self, time: TimeSpec) -> Self {
        self.time = Some(time);
        self
    }

    /// Set the row limit
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Add a filter
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Set the group-by interval
    pub fn group_time(mut self, interval: impl Into<String>) -> Self {
        self.group_time = Some(interval.into());
        self
    }
}

/// Time window of a request element
///
/// On the wire this is `{"last": "1h"}` or `{"start": "..", "end": ".."}`;
/// any other combination fails to decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TimeWindowDto", into = "TimeWindowDto")]
pub enum TimeSpec {
    /// `time > now() - <duration>`
    Last(String),
    /// `time > start AND time < end`, both RFC 3339
    Range { start: String, end: String },
}

/// Wire form of [`TimeSpec`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeWindowDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

impl TryFrom<TimeWindowDto> for TimeSpec {
    type Error = String;

    fn try_from(dto: TimeWindowDto) -> Result<Self, Self::Error> {
        match (dto.last, dto.start, dto.end) {
            (Some(last), None, None) => Ok(Self::Last(last)),
            (None, Some(start), Some(end)) => Ok(Self::Range { start, end }),
            (Some(_), _, _) => Err("time.last cannot be combined with time.start/time.end".to_string()),
            _ => Err("time requires either last or both start and end".to_string()),
        }
    }
}

impl From<TimeSpec> for TimeWindowDto {
    fn from(time: TimeSpec) -> Self {
        match time {
            TimeSpec::Last(last) => Self {
                last: Some(last),
                ..Default::default()
            },
            TimeSpec::Range { start, end } => Self {
                last: None,
                start: Some(start),
                end: Some(end),
            },
        }
    }
}

/// A selected column
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Field name
    pub name: String,
    /// Aggregation tag such as `mean` or `difference-max`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_type: Option<String>,
    /// Arithmetic suffix such as `*1000`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub math: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_group_type(mut self, group_type: impl Into<String>) -> Self {
        self.group_type = Some(group_type.into());
        self
    }

    pub fn with_math(mut self, math: impl Into<String>) -> Self {
        self.math = Some(math.into());
        self
    }
}

/// Aggregation functions available for grouped columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationFunc {
    Mean,
    Sum,
    Count,
    Median,
    Min,
    Max,
    First,
    Last,
}

impl AggregationFunc {
    /// Parse the InfluxQL function name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "mean" => Some(Self::Mean),
            "sum" => Some(Self::Sum),
            "count" => Some(Self::Count),
            "median" => Some(Self::Median),
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            "first" => Some(Self::First),
            "last" => Some(Self::Last),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Sum => "sum",
            Self::Count => "count",
            Self::Median => "median",
            Self::Min => "min",
            Self::Max => "max",
            Self::First => "first",
            Self::Last => "last",
        }
    }
}

impl fmt::Display for AggregationFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed form of a column's `groupType`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupType {
    pub func: AggregationFunc,
    /// Wrap the aggregation in `difference(..)`
    pub difference: bool,
}

impl GroupType {
    /// Parse `mean`, `difference-mean`, ...
    pub fn parse(s: &str) -> Option<Self> {
        match s.strip_prefix("difference-") {
            Some(inner) => AggregationFunc::parse(inner).map(|func| Self {
                func,
                difference: true,
            }),
            None => AggregationFunc::parse(s).map(|func| Self {
                func,
                difference: false,
            }),
        }
    }
}

/// A filter condition in the WHERE clause
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Filter {
    /// Column to compare
    #[serde(default)]
    pub column: String,
    /// Arithmetic applied to the column before comparing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub math: Option<String>,
    /// Comparison operator, e.g. `>=`
    #[serde(rename = "type", default)]
    pub operator: String,
    /// Value to compare against, never null
    #[serde(default)]
    pub value: Scalar,
}

impl Filter {
    pub fn new(column: impl Into<String>, operator: Operator, value: impl Into<Scalar>) -> Self {
        Self {
            column: column.into(),
            math: None,
            operator: operator.as_str().to_string(),
            value: value.into(),
        }
    }

    pub fn with_math(mut self, math: impl Into<String>) -> Self {
        self.math = Some(math.into());
        self
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    /// `<>`
    Ne,
    /// `!=`
    NotEq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Operator {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "=" => Some(Self::Eq),
            "<>" => Some(Self::Ne),
            "!=" => Some(Self::NotEq),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Gte),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Lte),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::NotEq => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chronological order of ungrouped statements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    #[default]
    Desc,
}

impl Direction {
    /// Parse a query parameter, anything unknown falls back to descending
    pub fn from_param(s: Option<&str>) -> Self {
        match s.map(str::to_lowercase).as_deref() {
            Some("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A single latest-value lookup
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementColumnPair {
    pub measurement: String,
    pub column_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub math: Option<String>,
}

impl MeasurementColumnPair {
    pub fn new(measurement: impl Into<String>, column_name: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            column_name: column_name.into(),
            math: None,
        }
    }

    pub fn with_math(mut self, math: impl Into<String>) -> Self {
        self.math = Some(math.into());
        self
    }

    /// Math suffix, empty when none was requested
    pub fn math_suffix(&self) -> &str {
        self.math.as_deref().unwrap_or("")
    }

    /// Name of the result column carrying this pair's value
    pub fn result_column(&self) -> String {
        format!("{}{}", self.column_name, self.math_suffix())
    }
}
