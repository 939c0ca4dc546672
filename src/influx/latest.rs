//! Latest Values
//!
//! Resolves batches of (measurement, column, math) lookups with a single
//! physical query, then maps the result back onto every requested pair.
//!
//! ## Partial misses
//!
//! - measurement missing from the result, or its newest row has no textual
//!   timestamp: time and value are both absent
//! - measurement present, column missing: time present, value absent

use crate::influx::client::QueryBackend;
use crate::influx::error::{InfluxError, InfluxResult};
use crate::influx::response::{find_series, Series};
use crate::query::{compile_latest_values, validate_pairs, MeasurementColumnPair, QueryError, UniqueMeasurementColumnSet};
use crate::value::Scalar;
use serde::Serialize;

/// Newest timestamp and value for one requested pair
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TimeValuePair {
    pub time: Option<String>,
    pub value: Option<Scalar>,
}

impl TimeValuePair {
    /// Neither timestamp nor value
    pub fn absent() -> Self {
        Self::default()
    }
}

/// Map a batch result back onto the caller's pairs, in input order
pub fn resolve_latest_values(pairs: &[MeasurementColumnPair], series: &[Series]) -> Vec<TimeValuePair> {
    pairs.iter().map(|pair| resolve_pair(pair, series)).collect()
}

fn resolve_pair(pair: &MeasurementColumnPair, series: &[Series]) -> TimeValuePair {
    let Some(found) = find_series(series, &pair.measurement) else {
        return TimeValuePair::absent();
    };
    // Empty series and rows without a textual timestamp count as missing
    let Some((row, time)) = found
        .values
        .first()
        .and_then(|row| Some((row, row.first()?.as_str()?.to_string())))
    else {
        return TimeValuePair::absent();
    };

    let value = found
        .column_index(&pair.result_column())
        .and_then(|index| row.get(index).cloned());

    TimeValuePair {
        time: Some(time),
        value,
    }
}

/// Newest value of every pair, one store round trip
pub async fn get_latest_values(
    backend: &dyn QueryBackend,
    db: &str,
    pairs: &[MeasurementColumnPair],
) -> InfluxResult<Vec<TimeValuePair>> {
    validate_pairs(pairs).map_err(QueryError::from)?;

    let set = UniqueMeasurementColumnSet::from_pairs(pairs);
    if set.is_empty() {
        return Ok(vec![TimeValuePair::absent(); pairs.len()]);
    }

    let query = compile_latest_values(&set);
    let response = backend.execute(db, &query).await?;
    let result = response.results.first().ok_or(InfluxError::NullResponse)?;

    let values = resolve_latest_values(pairs, result.series());
    tracing::debug!(
        pairs = pairs.len(),
        measurements = set.measurements.len(),
        terms = set.term_count(),
        "Resolved latest values"
    );
    Ok(values)
}

/// Newest value of a single pair
///
/// Unlike the batch form, a missing measurement is an error.
pub async fn get_latest_value(
    backend: &dyn QueryBackend,
    db: &str,
    pair: &MeasurementColumnPair,
) -> InfluxResult<TimeValuePair> {
    let mut values = get_latest_values(backend, db, std::slice::from_ref(pair)).await?;
    match values.pop() {
        Some(value) if value.time.is_some() => Ok(value),
        _ => Err(InfluxError::NullResponse),
    }
}
