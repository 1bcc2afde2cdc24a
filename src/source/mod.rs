//! Retrieval of raw telemetry batches.
//!
//! This module provides a trait-based abstraction over where telemetry comes
//! from (the HTTP endpoint, a replay file, or a scripted source in tests).
//! Sources only fetch; turning records into units is left to
//! [`crate::data::normalize`] so that one bad record never fails a batch.

mod error;
mod file;
mod http;
mod wire;

pub use error::FetchError;
pub use file::FileSource;
pub use http::{HttpSource, HttpSourceBuilder, DEFAULT_ENDPOINT};
pub use wire::RawUnitRecord;

use std::fmt::Debug;

use async_trait::async_trait;
use serde_json::Value;

/// Trait for retrieving telemetry batches.
///
/// A successful fetch returns the top-level JSON array with each record
/// still untyped.
///
/// # Example
///
/// ```
/// use fleetwatch::{FileSource, TelemetrySource};
///
/// # tokio_test::block_on(async {
/// let source = FileSource::new("robots.json");
/// if let Ok(records) = source.fetch().await {
///     println!("Got {} records", records.len());
/// }
/// # });
/// ```
#[async_trait]
pub trait TelemetrySource: Send + Sync + Debug {
    /// Retrieve one batch of raw records.
    async fn fetch(&self) -> Result<Vec<Value>, FetchError>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI header.
    fn description(&self) -> &str;
}

/// Parse a response body as a top-level JSON array.
pub(crate) fn parse_batch(body: &[u8]) -> Result<Vec<Value>, FetchError> {
    serde_json::from_slice::<Vec<Value>>(body).map_err(|e| FetchError::Parse(e.to_string()))
}
