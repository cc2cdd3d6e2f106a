//! Logger configuration
//!
//! Everything `Logger::from_config` needs: threshold, format, metadata and
//! which sinks are enabled with their parameters. Deserializes from JSON or
//! TOML; missing keys take the defaults below.
//!
//! ```toml
//! level = "warn"
//! format = "json"
//! service_name = "billing"
//! environment = "prod"
//!
//! [file]
//! enabled = true
//! path = "/var/log/billing/app.log"
//! max_size_mb = 50
//!
//! [queue]
//! enabled = true
//! brokers = ["10.0.0.1:9092", "10.0.0.2:9092"]
//! topic = "logs"
//! ```

use super::error::{LoggerError, Result};
use super::formatter::OutputFormat;
use super::level_filter::Threshold;
use super::metadata::Metadata;
use super::timestamp::TimestampFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Which standard stream the console sink writes to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleStream {
    #[default]
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub enabled: bool,
    pub stream: ConsoleStream,
    /// Colour level names in plain output
    pub colors: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            stream: ConsoleStream::Stdout,
            colors: false,
        }
    }
}

/// Rotating file parameters; passed through to the file sink untouched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub enabled: bool,
    pub path: PathBuf,
    /// Rotate once the active file reaches this many megabytes
    pub max_size_mb: u64,
    /// Rotated files to keep; 0 keeps none
    pub max_backups: usize,
    /// Delete rotated files older than this many days; 0 disables age pruning
    pub max_age_days: u64,
    /// Gzip rotated files
    pub compress: bool,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: PathBuf::from("app.log"),
            max_size_mb: 10,
            max_backups: 5,
            max_age_days: 28,
            compress: true,
        }
    }
}

impl FileConfig {
    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_mb.saturating_mul(1024 * 1024)
    }

    pub fn max_age(&self) -> Option<Duration> {
        (self.max_age_days > 0)
            .then(|| Duration::from_secs(self.max_age_days.saturating_mul(24 * 3600)))
    }
}

/// Message queue producer parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    pub enabled: bool,
    /// `host:port` of each broker, tried in order
    pub brokers: Vec<String>,
    pub topic: String,
}

/// Full logger configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub level: Threshold,
    pub format: OutputFormat,
    pub timestamp_format: TimestampFormat,
    pub service_name: String,
    pub environment: String,
    pub console: ConsoleConfig,
    pub file: FileConfig,
    pub queue: QueueConfig,
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a config file, choosing the parser by extension (`.json` or `.toml`)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation(
                "reading logger config",
                format!("Failed to read '{}'", path.display()),
                e,
            )
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&text),
            Some("toml") => Self::from_toml_str(&text),
            other => Err(LoggerError::config(
                "LoggerConfig",
                format!("unsupported config extension {:?}", other),
            )),
        }
    }

    pub fn metadata(&self) -> Metadata {
        Metadata::new(self.service_name.clone(), self.environment.clone())
    }

    /// Check sink parameters before any sink is opened
    pub fn validate(&self) -> Result<()> {
        if self.file.enabled {
            if self.file.path.as_os_str().is_empty() {
                return Err(LoggerError::config("file", "path must not be empty"));
            }
            if self.file.max_size_mb == 0 {
                return Err(LoggerError::config("file", "max_size_mb must be positive"));
            }
        }

        if self.queue.enabled {
            if self.queue.brokers.is_empty() {
                return Err(LoggerError::config("queue", "at least one broker is required"));
            }
            if self.queue.topic.is_empty() {
                return Err(LoggerError::config("queue", "topic must not be empty"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoggerConfig::default();
        assert_eq!(config.level, Threshold::Info);
        assert_eq!(config.format, OutputFormat::Plain);
        assert!(config.console.enabled);
        assert!(!config.file.enabled);
        assert_eq!(config.file.path, PathBuf::from("app.log"));
        assert_eq!(config.file.max_size_bytes(), 10 * 1024 * 1024);
        assert_eq!(config.file.max_backups, 5);
        assert_eq!(config.file.max_age(), Some(Duration::from_secs(28 * 24 * 3600)));
        assert!(config.file.compress);
        assert!(!config.queue.enabled);
        config.validate().unwrap();
    }

    #[test]
    fn test_from_json() {
        let config = LoggerConfig::from_json_str(
            r#"{
                "level": "debug",
                "format": "json",
                "service_name": "api",
                "environment": "staging",
                "console": { "stream": "stderr" },
                "queue": { "enabled": true, "brokers": ["127.0.0.1:9092"], "topic": "logs" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.level, Threshold::Debug);
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.metadata(), Metadata::new("api", "staging"));
        assert_eq!(config.console.stream, ConsoleStream::Stderr);
        assert!(config.console.enabled);
        assert_eq!(config.queue.brokers, vec!["127.0.0.1:9092"]);
        config.validate().unwrap();
    }

    #[test]
    fn test_from_toml() {
        let config = LoggerConfig::from_toml_str(
            r#"
            level = "whatever"
            format = "structured"

            [file]
            enabled = true
            path = "logs/service.log"
            max_size_mb = 1
            max_age_days = 0
            compress = false
            "#,
        )
        .unwrap();

        assert_eq!(config.level, Threshold::Unrecognized("whatever".to_string()));
        assert_eq!(config.format, OutputFormat::Json);
        assert!(config.file.enabled);
        assert_eq!(config.file.max_backups, 5);
        assert_eq!(config.file.max_age(), None);
        assert!(!config.file.compress);
    }

    #[test]
    fn test_from_file_picks_parser() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logger.toml");
        std::fs::write(&path, "level = \"error\"\n").unwrap();
        assert_eq!(LoggerConfig::from_file(&path).unwrap().level, Threshold::Error);

        let path = dir.path().join("logger.yaml");
        std::fs::write(&path, "level: error\n").unwrap();
        assert!(matches!(
            LoggerConfig::from_file(&path),
            Err(LoggerError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_incomplete_queue() {
        let mut config = LoggerConfig::default();
        config.queue.enabled = true;
        config.queue.topic = "logs".to_string();
        assert!(config.validate().is_err());

        config.queue.brokers.push("localhost:9092".to_string());
        config.validate().unwrap();

        config.queue.topic.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_file_size() {
        let mut config = LoggerConfig::default();
        config.file.enabled = true;
        config.file.max_size_mb = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_huge_limits_saturate() {
        let config = LoggerConfig::from_json_str(&format!(
            r#"{{"file": {{"max_size_mb": {max}, "max_age_days": {max}}}}}"#,
            max = u64::MAX
        ))
        .unwrap();

        assert_eq!(config.file.max_size_bytes(), u64::MAX);
        assert_eq!(config.file.max_age(), Some(Duration::from_secs(u64::MAX)));
    }
}
