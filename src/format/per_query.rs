//! Per-query format
//!
//! One entry per statement: its single series' rows, or `[]` when nothing
//! matched.

use crate::format::ShapeError;
use crate::influx::{Row, StatementResult};

/// Unwrap each statement's single series
pub fn format_per_query(results: Vec<StatementResult>) -> Result<Vec<Vec<Row>>, ShapeError> {
    results
        .into_iter()
        .enumerate()
        .map(|(statement, result)| {
            let mut series = result.series.unwrap_or_default();
            match series.len() {
                0 => Ok(Vec::new()),
                1 => Ok(series.remove(0).values),
                found => Err(ShapeError::MultipleSeries { statement, found }),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::influx::Series;
    use crate::value::Scalar;

    #[test]
    fn test_rows_pass_through() {
        let rows: Vec<Row> = vec![
            vec!["2000-01-02T00:00:00Z".into(), 2.into()],
            vec!["2000-01-01T00:00:00Z".into(), Scalar::Null],
        ];
        let results = vec![
            StatementResult::new(0, vec![Series::new("m1", &["time", "c1"], rows.clone())]),
            StatementResult::empty(1),
            StatementResult::new(2, vec![]),
        ];
        let formatted = format_per_query(results).unwrap();
        assert_eq!(formatted, vec![rows, vec![], vec![]]);
    }

    #[test]
    fn test_multiple_series_rejected() {
        let results = vec![
            StatementResult::empty(0),
            StatementResult::new(
                1,
                vec![
                    Series::new("m1", &["time"], vec![]),
                    Series::new("m1", &["time"], vec![]),
                ],
            ),
        ];
        assert_eq!(
            format_per_query(results),
            Err(ShapeError::MultipleSeries {
                statement: 1,
                found: 2
            })
        );
    }
}
