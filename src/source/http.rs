//! HTTP telemetry source.
//!
//! Queries the fleet backend's `/robots` collection. The same client also
//! supports a single-unit lookup through `/robots/{id}`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use fleetwatch::HttpSource;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = HttpSource::builder()
//!         .endpoint("http://localhost:8000")
//!         .build()?;
//!
//!     let unit = source.fetch_unit("robot_123").await?;
//!     println!("{} battery {}%", unit.id, unit.battery_pct);
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;

use super::{parse_batch, FetchError, TelemetrySource};
use crate::data::{normalize, Unit};

/// Default backend address.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000";

/// Source that polls the fleet backend over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    base: Url,
    description: String,
}

impl HttpSource {
    /// Create a new builder for configuring the source.
    pub fn builder() -> HttpSourceBuilder {
        HttpSourceBuilder::default()
    }

    /// Returns the base URL requests are made against.
    pub fn endpoint(&self) -> &Url {
        &self.base
    }

    /// Fetch and normalize a single unit by id.
    pub async fn fetch_unit(&self, id: &str) -> Result<Unit, FetchError> {
        let url = self.url(&["robots", id])?;
        let response = self.client.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(id.to_string()));
        }
        if !response.status().is_success() {
            return Err(FetchError::Http(format!(
                "endpoint returned status {}",
                response.status()
            )));
        }

        let body = response.bytes().await?;
        let value: Value =
            serde_json::from_slice(&body).map_err(|e| FetchError::Parse(e.to_string()))?;

        // The backend answers unknown ids with 200 and an error object.
        if value.get("error").is_some() {
            return Err(FetchError::NotFound(id.to_string()));
        }

        normalize(&value).map_err(|e| FetchError::Parse(e.to_string()))
    }

    fn url(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidEndpoint(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl TelemetrySource for HttpSource {
    async fn fetch(&self) -> Result<Vec<Value>, FetchError> {
        let url = self.url(&["robots"])?;
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Http(format!(
                "endpoint returned status {}",
                response.status()
            )));
        }

        let body = response.bytes().await?;
        parse_batch(&body)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Builder for [`HttpSource`].
#[derive(Debug, Default)]
pub struct HttpSourceBuilder {
    endpoint: Option<String>,
    timeout: Option<Duration>,
}

impl HttpSourceBuilder {
    /// Set the backend address (e.g., "http://localhost:8000").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the source.
    pub fn build(self) -> Result<HttpSource, FetchError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));
        let endpoint = self.endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let base = Url::parse(&endpoint)
            .map_err(|e| FetchError::InvalidEndpoint(format!("{endpoint}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(FetchError::InvalidEndpoint(endpoint));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(HttpSource {
            client,
            description: format!("http: {}", base),
            base,
        })
    }
}
