//! Table format
//!
//! Outer join of N independently returned series on exact timestamp
//! equality. Each output row holds the timestamp at index 0 followed by
//! every element's columns at that element's base offset.
//!
//! ```text
//! series 0 (c1):      t3 a   t1 b
//! series 1 (c2, c3):  t2 x y t1 z w
//!
//! [t3, a, null, null]
//! [t2, null, x, y]
//! [t1, b, z, w]
//! ```

use crate::format::ShapeError;
use crate::influx::Row;
use crate::query::RequestElement;
use crate::value::Scalar;
use chrono::{DateTime, SecondsFormat, Utc};
use std::time::Instant;

/// A raw row with its parsed timestamp split off
struct TimedRow {
    at: DateTime<Utc>,
    cells: Vec<Scalar>,
}

/// Join per-query rows into one table sorted newest first
pub fn format_table(elements: &[RequestElement], data: Vec<Vec<Row>>) -> Result<Vec<Row>, ShapeError> {
    if elements.len() != data.len() {
        return Err(ShapeError::StatementCount {
            expected: elements.len(),
            actual: data.len(),
        });
    }
    let started = Instant::now();

    // Offset 0 is the timestamp
    let mut offsets = Vec::with_capacity(elements.len());
    let mut width = 1;
    for element in elements {
        offsets.push(width);
        width += element.columns.len();
    }

    let mut series = data
        .into_iter()
        .enumerate()
        .map(|(statement, rows)| parse_series(statement, rows))
        .collect::<Result<Vec<_>, _>>()?;

    let mut table: Vec<(DateTime<Utc>, Row)> = Vec::new();
    for index in 0..series.len() {
        let (head, later) = series.split_at_mut(index + 1);

        for row in head[index].drain(..) {
            let at = row.at;
            let mut out = vec![Scalar::Null; width];
            place(&mut out, offsets[index], elements[index].columns.len(), row.cells);

            // Lower-index series are already drained; only later ones can still match
            for (step, other) in later.iter_mut().enumerate() {
                let other_index = index + 1 + step;
                let position = other.partition_point(|candidate| candidate.at > at);
                if other.get(position).is_some_and(|candidate| candidate.at == at) {
                    // Order-preserving removal keeps the descending invariant
                    let matched = other.remove(position);
                    place(
                        &mut out,
                        offsets[other_index],
                        elements[other_index].columns.len(),
                        matched.cells,
                    );
                }
            }

            table.push((at, out));
        }
    }

    table.sort_by(|a, b| b.0.cmp(&a.0));

    let rows: Vec<Row> = table
        .into_iter()
        .map(|(at, mut row)| {
            row[0] = Scalar::String(render_timestamp(&at));
            row
        })
        .collect();

    let elapsed = started.elapsed();
    let values = rows.len() * (width - 1);
    tracing::debug!(
        rows = rows.len(),
        values,
        elapsed_us = elapsed.as_micros() as u64,
        nanos_per_value = (elapsed.as_nanos() / (values as u128 + 1)) as u64,
        "Reformatted as table"
    );

    Ok(rows)
}

/// Parse timestamps and sort newest first
fn parse_series(statement: usize, rows: Vec<Row>) -> Result<Vec<TimedRow>, ShapeError> {
    let mut parsed = rows
        .into_iter()
        .map(|row| {
            let mut cells = row.into_iter();
            let at = match cells.next() {
                Some(Scalar::String(text)) => DateTime::parse_from_rfc3339(&text)
                    .map(|t| t.with_timezone(&Utc))
                    .map_err(|_| ShapeError::InvalidTimestamp {
                        statement,
                        value: text,
                    })?,
                other => {
                    return Err(ShapeError::InvalidTimestamp {
                        statement,
                        value: other.map(|v| v.to_string()).unwrap_or_default(),
                    })
                }
            };
            Ok(TimedRow {
                at,
                cells: cells.collect(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    parsed.sort_by(|a, b| b.at.cmp(&a.at));
    Ok(parsed)
}

/// RFC 3339 in UTC with the fraction trimmed of trailing zeros, e.g. `..00.5Z`
fn render_timestamp(at: &DateTime<Utc>) -> String {
    let text = at.to_rfc3339_opts(SecondsFormat::Nanos, true);
    match text.strip_suffix('Z').and_then(|t| t.split_once('.')) {
        Some((seconds, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                format!("{}Z", seconds)
            } else {
                format!("{}.{}Z", seconds, fraction)
            }
        }
        None => text,
    }
}

/// Copy up to `count` cells into `out` starting at `base`; missing cells stay null
fn place(out: &mut [Scalar], base: usize, count: usize, cells: Vec<Scalar>) {
    for (i, cell) in cells.into_iter().take(count).enumerate() {
        out[base + i] = cell;
    }
}
