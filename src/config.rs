//! Layered runtime settings.
//!
//! Settings are resolved from built-in defaults, then an optional TOML file,
//! then `FLEETWATCH_*` environment variables. Command-line flags are applied
//! on top by the binary before [`Settings::validate`] is called.
//!
//! ```toml
//! endpoint = "http://fleet.local:8000"
//! poll_interval_ms = 5000
//! page_size = 10
//!
//! [thresholds]
//! critical_below = 15
//! warning_below = 50
//! ```
//!
//! Nested keys use a double underscore in the environment, e.g.
//! `FLEETWATCH_THRESHOLDS__CRITICAL_BELOW=10`.

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::{BandThresholds, DEFAULT_PAGE_SIZE};
use crate::source::DEFAULT_ENDPOINT;

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "fleetwatch.toml";

const ENV_PREFIX: &str = "FLEETWATCH";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Runtime settings for the poller, source and view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub endpoint: String,
    pub poll_interval_ms: u64,
    pub request_timeout_ms: u64,
    pub page_size: usize,
    pub thresholds: BandThresholds,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            poll_interval_ms: 5000,
            request_timeout_ms: 10_000,
            page_size: DEFAULT_PAGE_SIZE,
            thresholds: BandThresholds::default(),
        }
    }
}

impl Settings {
    /// Load settings from `path` (or `fleetwatch.toml` if present) and the
    /// process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        Self::from_sources(path, Environment::default())
    }

    fn from_sources(path: Option<&Path>, env: Environment) -> Result<Self, SettingsError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false),
        };

        let settings: Settings = Config::builder()
            .add_source(file)
            .add_source(
                env.prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject values that would leave the poller or paginator unusable.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.page_size == 0 {
            return Err(SettingsError::Invalid(
                "page_size must be at least 1".into(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(SettingsError::Invalid(
                "poll_interval_ms must be at least 1".into(),
            ));
        }
        if self.request_timeout_ms == 0 {
            return Err(SettingsError::Invalid(
                "request_timeout_ms must be at least 1".into(),
            ));
        }
        let t = &self.thresholds;
        if t.critical_below > t.warning_below {
            return Err(SettingsError::Invalid(format!(
                "thresholds.critical_below ({}) exceeds thresholds.warning_below ({})",
                t.critical_below, t.warning_below
            )));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::default().source(Some(map))
    }

    fn toml_file(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "{content}").unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_sources(None, env(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.endpoint, "http://localhost:8000");
        assert_eq!(settings.poll_interval(), Duration::from_secs(5));
        assert_eq!(settings.page_size, 10);
        assert_eq!(settings.thresholds.critical_below, 15.0);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = toml_file(
            r#"
            endpoint = "http://fleet.local:9000"
            page_size = 25

            [thresholds]
            warning_below = 40
            "#,
        );
        let settings = Settings::from_sources(Some(file.path()), env(&[])).unwrap();
        assert_eq!(settings.endpoint, "http://fleet.local:9000");
        assert_eq!(settings.page_size, 25);
        assert_eq!(settings.poll_interval_ms, 5000);
        assert_eq!(settings.thresholds.warning_below, 40.0);
        assert_eq!(settings.thresholds.critical_below, 15.0);
    }

    #[test]
    fn test_env_overrides_file() {
        let file = toml_file("poll_interval_ms = 2000\n");
        let settings = Settings::from_sources(
            Some(file.path()),
            env(&[
                ("FLEETWATCH_POLL_INTERVAL_MS", "750"),
                ("FLEETWATCH_THRESHOLDS__CRITICAL_BELOW", "10"),
            ]),
        )
        .unwrap();
        assert_eq!(settings.poll_interval_ms, 750);
        assert_eq!(settings.thresholds.critical_below, 10.0);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = Settings::from_sources(Some(Path::new("/nonexistent/fleetwatch.toml")), env(&[]))
            .unwrap_err();
        assert!(matches!(err, SettingsError::Load(_)));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let file = toml_file("page_size = 0\n");
        let err = Settings::from_sources(Some(file.path()), env(&[])).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid(_)));
        assert!(err.to_string().contains("page_size"));
    }

    #[test]
    fn test_validate_interval_and_thresholds() {
        let mut settings = Settings {
            poll_interval_ms: 0,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());

        settings.poll_interval_ms = 1000;
        assert!(settings.validate().is_ok());

        settings.thresholds.critical_below = 60.0;
        assert!(settings.validate().is_err());
    }
}
