//! InfluxQL Compiler
//!
//! Turns validated request elements into one multi-statement InfluxQL query,
//! and batches of latest-value pairs into one deduplicated statement.
//!
//! # Generated Statements
//!
//! ```text
//! SELECT mean("c1")*2, "c2" FROM "m1" WHERE "c3" > 5 AND time > now() - 1d GROUP BY time(1h)
//! SELECT "c1"+5 AS "c1+5", "c2" FROM "m1", "m2" ORDER BY time DESC LIMIT 1
//! ```

use crate::query::error::{QueryError, QueryResult};
use crate::query::model::{
    Column, Direction, Filter, GroupType, MeasurementColumnPair, Operator, RequestElement, TimeSpec,
};
use crate::value::Scalar;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

/// Compile every element into one statement, joined with `; `
///
/// Elements are expected to have passed [`validate_elements`](super::validate_elements);
/// durations and math suffixes are emitted verbatim.
pub fn compile_queries(elements: &[RequestElement], direction: Direction) -> QueryResult<String> {
    let statements = elements
        .iter()
        .map(|element| compile_statement(element, direction))
        .collect::<QueryResult<Vec<_>>>()?;
    Ok(statements.join("; "))
}

/// Compile a single element
pub fn compile_statement(element: &RequestElement, direction: Direction) -> QueryResult<String> {
    let select = element
        .columns
        .iter()
        .map(column_expression)
        .collect::<QueryResult<Vec<_>>>()?;

    let mut statement = format!(
        "SELECT {} FROM {}",
        select.join(", "),
        quote_ident(&element.measurement)
    );

    let mut conditions = element
        .filters
        .iter()
        .map(filter_condition)
        .collect::<QueryResult<Vec<_>>>()?;
    if let Some(time) = &element.time {
        conditions.push(time_condition(time));
    }
    if !conditions.is_empty() {
        let _ = write!(statement, " WHERE {}", conditions.join(" AND "));
    }

    match &element.group_time {
        Some(interval) => {
            let _ = write!(statement, " GROUP BY time({})", interval);
        }
        None => {
            let _ = write!(statement, " ORDER BY time {}", direction.keyword());
        }
    }

    if let Some(limit) = element.limit {
        let _ = write!(statement, " LIMIT {}", limit);
    }

    Ok(statement)
}

fn column_expression(column: &Column) -> QueryResult<String> {
    let field = quote_ident(&column.name);
    let mut expression = match &column.group_type {
        None => field,
        Some(tag) => {
            let group = GroupType::parse(tag)
                .ok_or_else(|| QueryError::Compile(format!("unknown group type {:?}", tag)))?;
            if group.difference {
                format!("difference({}({}))", group.func, field)
            } else {
                format!("{}({})", group.func, field)
            }
        }
    };
    if let Some(math) = &column.math {
        expression.push_str(math);
    }
    Ok(expression)
}

fn filter_condition(filter: &Filter) -> QueryResult<String> {
    let operator = Operator::parse(&filter.operator).ok_or_else(|| {
        QueryError::Compile(format!("unknown filter operator {:?}", filter.operator))
    })?;

    let mut condition = quote_ident(&filter.column);
    if let Some(math) = &filter.math {
        let _ = write!(condition, " {}", math);
    }

    let value = match &filter.value {
        Scalar::Null => {
            return Err(QueryError::Compile(format!(
                "filter on {:?} has no value",
                filter.column
            )))
        }
        Scalar::String(s) => quote_literal(s),
        other => other.to_string(),
    };
    let _ = write!(condition, " {} {}", operator, value);
    Ok(condition)
}

fn time_condition(time: &TimeSpec) -> String {
    match time {
        TimeSpec::Last(duration) => format!("time > now() - {}", duration),
        TimeSpec::Range { start, end } => format!(
            "time > {} AND time < {}",
            quote_literal(start),
            quote_literal(end)
        ),
    }
}

/// Double-quote an identifier
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Single-quote a string literal
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

// ============================================
// Latest values
// ============================================

/// Deduplicated view over a batch of latest-value pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniqueMeasurementColumnSet {
    /// Distinct measurement names
    pub measurements: BTreeSet<String>,
    /// Distinct column names, each with its distinct math suffixes (`""` = none)
    pub columns: BTreeMap<String, BTreeSet<String>>,
}

impl UniqueMeasurementColumnSet {
    /// Collapse pairs, dropping empty measurement and column names
    pub fn from_pairs(pairs: &[MeasurementColumnPair]) -> Self {
        let mut set = Self::default();
        for pair in pairs {
            if !pair.measurement.is_empty() {
                set.measurements.insert(pair.measurement.clone());
            }
            if !pair.column_name.is_empty() {
                set.columns
                    .entry(pair.column_name.clone())
                    .or_default()
                    .insert(pair.math_suffix().to_string());
            }
        }
        set
    }

    /// Nothing to select or nothing to select from
    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty() || self.columns.is_empty()
    }

    /// Number of distinct (column, math) terms
    pub fn term_count(&self) -> usize {
        self.columns.values().map(BTreeSet::len).sum()
    }
}

/// One statement selecting the newest row of every distinct measurement
///
/// Math variants are aliased to `column<math>` so each pair can find its
/// cell by name afterwards.
pub fn compile_latest_values(set: &UniqueMeasurementColumnSet) -> String {
    let mut terms = Vec::with_capacity(set.term_count());
    for (column, maths) in &set.columns {
        for math in maths {
            if math.is_empty() {
                terms.push(quote_ident(column));
            } else {
                terms.push(format!(
                    "{}{} AS {}",
                    quote_ident(column),
                    math,
                    quote_ident(&format!("{}{}", column, math))
                ));
            }
        }
    }
    let measurements: Vec<String> = set.measurements.iter().map(|m| quote_ident(m)).collect();

    format!(
        "SELECT {} FROM {} ORDER BY time DESC LIMIT 1",
        terms.join(", "),
        measurements.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::model::Column;

    #[test]
    fn test_plain_select() {
        let query = compile_queries(&[RequestElement::new("m1", &["c1"])], Direction::Desc).unwrap();
        assert_eq!(query, r#"SELECT "c1" FROM "m1" ORDER BY time DESC"#);
    }

    #[test]
    fn test_ascending_with_limit() {
        let element = RequestElement::new("m1", &["c1", "c2"]).limit(10);
        let query = compile_queries(&[element], Direction::Asc).unwrap();
        assert_eq!(query, r#"SELECT "c1", "c2" FROM "m1" ORDER BY time ASC LIMIT 10"#);
    }

    #[test]
    fn test_aggregation_and_math() {
        let mut element = RequestElement::new("m1", &[])
            .time(TimeSpec::Last("1d".to_string()))
            .group_time("1h");
        element.columns = vec![
            Column::new("c1").with_group_type("mean").with_math("*2"),
            Column::new("c2").with_group_type("difference-max"),
            Column::new("c3").with_math("/1000"),
        ];
        let query = compile_statement(&element, Direction::Desc).unwrap();
        assert_eq!(
            query,
            r#"SELECT mean("c1")*2, difference(max("c2")), "c3"/1000 FROM "m1" WHERE time > now() - 1d GROUP BY time(1h)"#
        );
    }

    #[test]
    fn test_filters_and_absolute_time() {
        let element = RequestElement::new("m1", &["c1"])
            .filter(Filter::new("c2", Operator::Gt, 5).with_math("*3"))
            .filter(Filter::new("tag", Operator::NotEq, "a'b"))
            .filter(Filter::new("on", Operator::Eq, true))
            .time(TimeSpec::Range {
                start: "2020-01-01T00:00:00Z".to_string(),
                end: "2020-01-02T00:00:00Z".to_string(),
            });
        let query = compile_statement(&element, Direction::Desc).unwrap();
        assert_eq!(
            query,
            r#"SELECT "c1" FROM "m1" WHERE "c2" *3 > 5 AND "tag" != 'a\'b' AND "on" = true AND time > '2020-01-01T00:00:00Z' AND time < '2020-01-02T00:00:00Z' ORDER BY time DESC"#
        );
    }

    #[test]
    fn test_multiple_statements() {
        let elements = vec![
            RequestElement::new("m1", &["c1"]).filter(Filter::new("c1", Operator::Lte, 1.5)),
            RequestElement::new("m2", &["c2"]).time(TimeSpec::Last("5m".to_string())),
        ];
        let query = compile_queries(&elements, Direction::Desc).unwrap();
        assert_eq!(
            query,
            r#"SELECT "c1" FROM "m1" WHERE "c1" <= 1.5 ORDER BY time DESC; SELECT "c2" FROM "m2" WHERE time > now() - 5m ORDER BY time DESC"#
        );
    }

    #[test]
    fn test_identifiers_are_escaped() {
        let query = compile_statement(&RequestElement::new(r#"m"1"#, &["c\\1"]), Direction::Desc).unwrap();
        assert_eq!(query, r#"SELECT "c\\1" FROM "m\"1" ORDER BY time DESC"#);
    }

    #[test]
    fn test_unvalidated_input_is_rejected() {
        let mut element = RequestElement::new("m1", &[]);
        element.columns.push(Column::new("c1").with_group_type("avg"));
        assert!(matches!(
            compile_statement(&element, Direction::Desc),
            Err(QueryError::Compile(_))
        ));

        let element = RequestElement::new("m1", &["c1"]).filter(Filter::new("c1", Operator::Eq, Scalar::Null));
        assert!(compile_statement(&element, Direction::Desc).is_err());
    }

    #[test]
    fn test_unique_set() {
        let pairs = vec![
            MeasurementColumnPair::new("m1", "c1"),
            MeasurementColumnPair::new("m2", "c1"),
            MeasurementColumnPair::new("m1", "c1").with_math("+5"),
            MeasurementColumnPair::new("m1", "c2"),
            MeasurementColumnPair::new("", ""),
        ];
        let set = UniqueMeasurementColumnSet::from_pairs(&pairs);
        assert_eq!(set.measurements.len(), 2);
        assert_eq!(set.columns.len(), 2);
        assert_eq!(set.columns["c1"].len(), 2);
        assert!(set.columns["c1"].contains(""));
        assert!(set.columns["c1"].contains("+5"));
        assert_eq!(set.term_count(), 3);
    }

    #[test]
    fn test_latest_values_query() {
        let pairs = vec![
            MeasurementColumnPair::new("m2", "c2"),
            MeasurementColumnPair::new("m1", "c1").with_math("-5"),
            MeasurementColumnPair::new("m1", "c1").with_math("+5"),
            MeasurementColumnPair::new("m1", "c1").with_math("+5"),
        ];
        let query = compile_latest_values(&UniqueMeasurementColumnSet::from_pairs(&pairs));
        assert_eq!(
            query,
            r#"SELECT "c1"+5 AS "c1+5", "c1"-5 AS "c1-5", "c2" FROM "m1", "m2" ORDER BY time DESC LIMIT 1"#
        );
    }

    #[test]
    fn test_empty_set() {
        let set = UniqueMeasurementColumnSet::default();
        assert!(set.is_empty());
        assert_eq!(set.term_count(), 0);
    }
}
