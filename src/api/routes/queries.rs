//! Query Routes
//!
//! - POST /queries?format=per_query|table&order=asc|desc
//!
//! The body is a JSON array of request elements. The database is taken
//! from the configured selector header.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use std::sync::Arc;
use std::time::Instant;

use crate::api::dto::QueriesParams;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::format::{format_response, Format, Formatted};
use crate::query::{compile_queries, validate_elements, Direction, QueryError, RequestElement};

/// POST /queries
pub async fn execute_queries(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueriesParams>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Formatted>> {
    let started = Instant::now();
    let format = Format::from_param(params.format.as_deref());
    let direction = Direction::from_param(params.order.as_deref());

    let db = database(&headers, &state.config.user_header)?;

    let elements: Vec<RequestElement> = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("malformed request body: {}", e)))?;
    validate_elements(&elements).map_err(QueryError::from)?;

    if elements.is_empty() {
        return Ok(Json(empty(format)));
    }

    let query = compile_queries(&elements, direction)?;
    let response = state.backend.execute(&db, &query).await?;
    let formatted = format_response(format, &elements, response.results)?;

    tracing::debug!(
        db = %db,
        elements = elements.len(),
        format = %format,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Queries answered"
    );

    Ok(Json(formatted))
}

/// Non-blank value of the database selector header
fn database(headers: &HeaderMap, name: &str) -> ApiResult<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::MissingHeader(name.to_string()))
}

fn empty(format: Format) -> Formatted {
    match format {
        Format::PerQuery => Formatted::PerQuery(Vec::new()),
        Format::Table => Formatted::Table(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_database_header() {
        let mut headers = HeaderMap::new();
        assert!(matches!(
            database(&headers, "X-UserId"),
            Err(ApiError::MissingHeader(_))
        ));

        headers.insert("x-userid", HeaderValue::from_static("   "));
        assert!(database(&headers, "X-UserId").is_err());

        headers.insert("x-userid", HeaderValue::from_static(" telemetry "));
        assert_eq!(database(&headers, "X-UserId").unwrap(), "telemetry");
    }
}
