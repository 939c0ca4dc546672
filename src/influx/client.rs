//! InfluxDB REST Client
//!
//! HTTP client for the InfluxDB 1.x query API, plus the [`QueryBackend`]
//! trait the rest of the crate executes queries through.

use crate::influx::error::{InfluxError, InfluxResult};
use crate::influx::response::QueryResponse;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use std::time::{Duration, Instant};

/// Executes compiled InfluxQL against a database
#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Run `query` against database `db`
    async fn execute(&self, db: &str, query: &str) -> InfluxResult<QueryResponse>;

    /// Check that the store is reachable
    async fn ping(&self) -> InfluxResult<()>;
}

/// Configuration for the InfluxDB client
#[derive(Debug, Clone)]
pub struct InfluxConfig {
    /// Base URL, e.g. "http://localhost:8086"
    pub url: String,
    /// Basic auth user, if any
    pub username: Option<String>,
    /// Basic auth password
    pub password: Option<String>,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for InfluxConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8086".to_string(),
            username: None,
            password: None,
            request_timeout_ms: 30_000,
        }
    }
}

/// InfluxDB 1.x HTTP client
pub struct InfluxClient {
    client: Client,
    base_url: Url,
    config: InfluxConfig,
}

impl InfluxClient {
    /// Create a client; fails on an unparseable URL
    pub fn new(config: InfluxConfig) -> InfluxResult<Self> {
        let base_url = Url::parse(&config.url)
            .map_err(|e| InfluxError::Config(format!("invalid url {:?}: {}", config.url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(InfluxError::Config(format!("invalid url {:?}", config.url)));
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| InfluxError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    /// Get the current configuration
    pub fn config(&self) -> &InfluxConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    fn with_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.username {
            Some(user) => request.basic_auth(user, self.config.password.as_ref()),
            None => request,
        }
    }
}

#[async_trait]
impl QueryBackend for InfluxClient {
    async fn execute(&self, db: &str, query: &str) -> InfluxResult<QueryResponse> {
        let started = Instant::now();
        tracing::debug!(db = %db, query = %query, "Executing InfluxQL");

        let request = self
            .client
            .get(self.endpoint("query"))
            .query(&[("db", db), ("q", query)]);

        let response = self
            .with_auth(request)
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(transport_error)?;

        let result = decode_response(status, &body);
        tracing::debug!(
            db = %db,
            status = %status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            ok = result.is_ok(),
            "InfluxQL finished"
        );
        result
    }

    async fn ping(&self) -> InfluxResult<()> {
        let response = self
            .with_auth(self.client.get(self.endpoint("ping")))
            .send()
            .await
            .map_err(transport_error)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(InfluxError::Store(format!(
                "ping answered {}",
                response.status()
            )))
        }
    }
}

/// Classify a reqwest failure; every transport failure is a connection error
fn transport_error(e: reqwest::Error) -> InfluxError {
    tracing::warn!(error = %e, "InfluxDB transport failure");
    if e.is_timeout() {
        InfluxError::Connection(format!("timeout: {}", e))
    } else {
        InfluxError::Connection(e.to_string())
    }
}

/// Decode and classify a `/query` response body
pub fn decode_response(status: StatusCode, body: &[u8]) -> InfluxResult<QueryResponse> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(InfluxError::NullResponse);
    }

    let response: QueryResponse = match serde_json::from_slice::<Option<QueryResponse>>(body) {
        Ok(Some(response)) => response,
        Ok(None) => return Err(InfluxError::NullResponse),
        Err(e) => {
            let text = String::from_utf8_lossy(body);
            return Err(if status.is_success() {
                InfluxError::Store(format!("undecodable response: {}", e))
            } else {
                InfluxError::Store(format!("{}: {}", status, text.trim()))
            });
        }
    };

    if let Some(message) = response.error() {
        if message.contains("not found") {
            tracing::debug!(error = %message, "InfluxDB reported not found");
            return Err(InfluxError::NotFound(message.to_string()));
        }
        return Err(InfluxError::Store(message.to_string()));
    }

    if !status.is_success() {
        return Err(InfluxError::Store(format!("unexpected status {}", status)));
    }

    Ok(response)
}
