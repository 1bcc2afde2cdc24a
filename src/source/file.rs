//! File-based telemetry source.
//!
//! Reads a JSON array of robot records from disk on every fetch. Useful for
//! replaying captured endpoint responses without a live backend.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use super::{parse_batch, FetchError, TelemetrySource};

/// A source that reads telemetry batches from a JSON file.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self { path, description }
    }

    /// Returns the path being read.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TelemetrySource for FileSource {
    async fn fetch(&self) -> Result<Vec<Value>, FetchError> {
        let content = tokio::fs::read(&self.path).await?;
        parse_batch(&content)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample_json() -> &'static str {
        r#"[
            {
                "robot_id": "robot_1",
                "online_status": true,
                "battery_percentage": 85,
                "cpu_usage": 60,
                "ram_consumption": 2048,
                "last_updated": "2024-12-12T11:00:00",
                "location_coordinates": [34.0522, -118.2437]
            },
            { "robot_id": "broken" }
        ]"#
    }

    #[test]
    fn test_file_source_new() {
        let source = FileSource::new("/tmp/robots.json");
        assert_eq!(source.path(), Path::new("/tmp/robots.json"));
        assert_eq!(source.description(), "file: /tmp/robots.json");
    }

    #[tokio::test]
    async fn test_file_source_reads_records() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();

        let source = FileSource::new(file.path());
        let records = source.fetch().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["robot_id"], "robot_1");
    }

    #[tokio::test]
    async fn test_file_source_rereads_on_every_fetch() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[]").unwrap();
        let source = FileSource::new(file.path());
        assert!(source.fetch().await.unwrap().is_empty());

        std::fs::write(file.path(), sample_json()).unwrap();
        assert_eq!(source.fetch().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_file_source_missing_file() {
        let source = FileSource::new("/nonexistent/path/robots.json");
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Io(_)));
        assert!(err.to_string().contains("Read error"));
    }

    #[tokio::test]
    async fn test_file_source_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();

        let source = FileSource::new(file.path());
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
        assert!(err.to_string().contains("Failed to parse"));
    }
}
