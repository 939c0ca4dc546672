//! In-memory backend for tests

use crate::influx::client::QueryBackend;
use crate::influx::error::{InfluxError, InfluxResult};
use crate::influx::response::QueryResponse;
use async_trait::async_trait;
use std::sync::Mutex;

/// Replays one canned outcome and records every executed query
pub struct StubBackend {
    outcome: InfluxResult<QueryResponse>,
    reachable: bool,
    executed: Mutex<Vec<(String, String)>>,
}

impl StubBackend {
    pub fn responding(response: QueryResponse) -> Self {
        Self {
            outcome: Ok(response),
            reachable: true,
            executed: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: InfluxError) -> Self {
        Self {
            outcome: Err(error),
            reachable: true,
            executed: Mutex::new(Vec::new()),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            outcome: Err(InfluxError::Connection("connection refused".to_string())),
            reachable: false,
            executed: Mutex::new(Vec::new()),
        }
    }

    /// (db, query) pairs in execution order
    pub fn executed(&self) -> Vec<(String, String)> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueryBackend for StubBackend {
    async fn execute(&self, db: &str, query: &str) -> InfluxResult<QueryResponse> {
        self.executed
            .lock()
            .unwrap()
            .push((db.to_string(), query.to_string()));
        self.outcome.clone()
    }

    async fn ping(&self) -> InfluxResult<()> {
        if self.reachable {
            Ok(())
        } else {
            Err(InfluxError::Connection("connection refused".to_string()))
        }
    }
}
