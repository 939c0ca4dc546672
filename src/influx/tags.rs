//! Tag listing

use crate::influx::client::QueryBackend;
use crate::influx::error::{InfluxError, InfluxResult};
use crate::query::quote_ident;
use std::collections::BTreeMap;

/// All tag keys of a measurement with their values
pub async fn get_tags(
    backend: &dyn QueryBackend,
    db: &str,
    measurement: &str,
) -> InfluxResult<BTreeMap<String, Vec<String>>> {
    let query = format!("SHOW TAG VALUES FROM {} WITH KEY =~ /.*/", quote_ident(measurement));
    let response = backend.execute(db, &query).await?;

    let mut tags: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let result = match response.results.as_slice() {
        [] => return Ok(tags),
        [result] => result,
        _ => return Err(unexpected("more than one result")),
    };
    let series = match result.series() {
        [] => return Ok(tags),
        [series] => series,
        _ => return Err(unexpected("more than one series")),
    };

    for row in &series.values {
        match row.as_slice() {
            [key, value] => match (key.as_str(), value.as_str()) {
                (Some(key), Some(value)) => tags.entry(key.to_string()).or_default().push(value.to_string()),
                _ => return Err(unexpected("tag key and value must be strings")),
            },
            _ => return Err(unexpected("not 2 values per row")),
        }
    }
    Ok(tags)
}

fn unexpected(detail: &str) -> InfluxError {
    InfluxError::Store(format!("unexpected response length ({})", detail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::influx::response::{QueryResponse, Series, StatementResult};
    use crate::influx::testing::StubBackend;

    #[tokio::test]
    async fn test_get_tags() {
        let backend = StubBackend::responding(QueryResponse::new(vec![StatementResult::new(
            0,
            vec![Series::new(
                "m1",
                &["key", "value"],
                vec![
                    vec!["host".into(), "a".into()],
                    vec!["host".into(), "b".into()],
                    vec!["region".into(), "eu".into()],
                ],
            )],
        )]));

        let tags = get_tags(&backend, "db", "m1").await.unwrap();
        assert_eq!(tags["host"], vec!["a", "b"]);
        assert_eq!(tags["region"], vec!["eu"]);
        assert_eq!(
            backend.executed()[0].1,
            r#"SHOW TAG VALUES FROM "m1" WITH KEY =~ /.*/"#
        );
    }

    #[tokio::test]
    async fn test_empty_result() {
        let backend = StubBackend::responding(QueryResponse::new(vec![StatementResult::empty(0)]));
        assert!(get_tags(&backend, "db", "m1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_row() {
        let backend = StubBackend::responding(QueryResponse::new(vec![StatementResult::new(
            0,
            vec![Series::new("m1", &["key", "value"], vec![vec!["host".into()]])],
        )]));
        assert!(matches!(
            get_tags(&backend, "db", "m1").await,
            Err(InfluxError::Store(_))
        ));
    }
}
