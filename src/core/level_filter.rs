//! Threshold-based level filtering
//!
//! The threshold is parsed from configuration text. Unknown text never fails:
//! it becomes [`Threshold::Unrecognized`], which lets every record through.

use super::log_level::LogLevel;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Configured minimum severity
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Threshold {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    /// Anything else, kept verbatim; emits everything
    Unrecognized(String),
}

impl Threshold {
    /// Parse a threshold name (`debug`, `info`, `warn`, `error`), case-insensitive
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "debug" => Threshold::Debug,
            "info" => Threshold::Info,
            "warn" => Threshold::Warn,
            "error" => Threshold::Error,
            _ => Threshold::Unrecognized(name.to_string()),
        }
    }

    /// Whether a record at `level` passes this threshold
    pub fn allows(&self, level: LogLevel) -> bool {
        match self {
            Threshold::Debug => true,
            Threshold::Info => level != LogLevel::Debug,
            Threshold::Warn => matches!(
                level,
                LogLevel::Warning | LogLevel::Error | LogLevel::Fatal
            ),
            Threshold::Error => matches!(level, LogLevel::Error | LogLevel::Fatal),
            Threshold::Unrecognized(_) => true,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Threshold::Debug => "debug",
            Threshold::Info => "info",
            Threshold::Warn => "warn",
            Threshold::Error => "error",
            Threshold::Unrecognized(raw) => raw,
        }
    }
}

/// Free-function form of [`Threshold::allows`] taking the raw threshold text
pub fn should_log(threshold: &str, level: LogLevel) -> bool {
    Threshold::parse(threshold).allows(level)
}

impl FromStr for Threshold {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Threshold::parse(s))
    }
}

impl From<String> for Threshold {
    fn from(s: String) -> Self {
        Threshold::parse(&s)
    }
}

impl From<&str> for Threshold {
    fn from(s: &str) -> Self {
        Threshold::parse(s)
    }
}

impl From<Threshold> for String {
    fn from(t: Threshold) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use LogLevel::*;

    fn emitted(threshold: &str) -> Vec<LogLevel> {
        LogLevel::ALL
            .into_iter()
            .filter(|level| should_log(threshold, *level))
            .collect()
    }

    #[test]
    fn test_threshold_table() {
        assert_eq!(emitted("debug"), vec![Debug, Info, Warning, Error, Fatal]);
        assert_eq!(emitted("info"), vec![Info, Warning, Error, Fatal]);
        assert_eq!(emitted("warn"), vec![Warning, Error, Fatal]);
        assert_eq!(emitted("error"), vec![Error, Fatal]);
    }

    #[test]
    fn test_unrecognized_threshold_fails_open() {
        for raw in ["", "verbose", "warning", "fatal", "trace"] {
            assert_eq!(emitted(raw), LogLevel::ALL.to_vec(), "threshold {:?}", raw);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Threshold::parse("DEBUG"), Threshold::Debug);
        assert_eq!(Threshold::parse("Warn"), Threshold::Warn);
        assert_eq!(
            Threshold::parse("Loud"),
            Threshold::Unrecognized("Loud".to_string())
        );
    }

    #[test]
    fn test_serde_roundtrip_keeps_raw_text() {
        let t: Threshold = serde_json::from_str("\"chatty\"").unwrap();
        assert_eq!(t, Threshold::Unrecognized("chatty".to_string()));
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"chatty\"");

        let t: Threshold = serde_json::from_str("\"ERROR\"").unwrap();
        assert_eq!(t, Threshold::Error);
    }
}
