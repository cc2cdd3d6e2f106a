//! Record rendering
//!
//! Provides the two wire formats:
//! - Plain: `INFO: 2025/01/08 10:30:45.123456 main.rs:42: Request processed`
//! - Json: `{"level":"INFO","message":"Request processed","timestamp":"2025-01-08T10:30:45Z"}`
//!
//! Every rendered record ends in exactly one `\n`.

use super::error::{LoggerError, Result};
use super::log_record::{LogRecord, RecordBody};
use super::timestamp::TimestampFormat;
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "console")]
use colored::Colorize;

/// Collapse a freeform message onto one line
///
/// One trailing `\n` is dropped first, then every remaining `\n` becomes a
/// single space.
pub fn sanitize_message(message: &str) -> String {
    let trimmed = message.strip_suffix('\n').unwrap_or(message);
    trimmed.replace('\n', " ")
}

/// Renders one record into the bytes handed to every sink
pub trait Formatter: Send + Sync {
    fn render(&self, record: &LogRecord) -> Result<Vec<u8>>;
    fn name(&self) -> &str;
}

/// Output format selector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OutputFormat {
    /// Human-readable line per record (default)
    #[default]
    Plain,

    /// One JSON object per line
    Json,
}

impl OutputFormat {
    /// `json` and `structured` select JSON; anything else is plain
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "json" | "structured" => OutputFormat::Json,
            _ => OutputFormat::Plain,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Plain => "plain",
            OutputFormat::Json => "json",
        }
    }

    /// Build the formatter for this format
    pub fn formatter(&self, timestamp_format: TimestampFormat) -> Box<dyn Formatter> {
        match self {
            OutputFormat::Plain => {
                Box::new(PlainFormatter::new().with_json(JsonFormatter::new(timestamp_format)))
            }
            OutputFormat::Json => Box::new(JsonFormatter::new(timestamp_format)),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(OutputFormat::parse(s))
    }
}

impl From<String> for OutputFormat {
    fn from(s: String) -> Self {
        OutputFormat::parse(&s)
    }
}

impl From<OutputFormat> for String {
    fn from(f: OutputFormat) -> Self {
        f.as_str().to_string()
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Newline-delimited JSON formatter
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter {
    timestamp_format: TimestampFormat,
}

impl JsonFormatter {
    pub fn new(timestamp_format: TimestampFormat) -> Self {
        Self { timestamp_format }
    }

    /// Build the JSON object for a record without serializing it
    pub fn to_object(&self, record: &LogRecord) -> Map<String, Value> {
        let timestamp = Value::String(self.timestamp_format.format(&record.timestamp));
        let level = Value::String(record.level.to_str().to_string());

        match &record.body {
            RecordBody::Message(message) => {
                let mut obj = Map::new();
                obj.insert("timestamp".to_string(), timestamp);
                obj.insert("level".to_string(), level);
                obj.insert(
                    "message".to_string(),
                    Value::String(sanitize_message(message)),
                );
                if !record.metadata.service_name.is_empty() {
                    obj.insert(
                        "service".to_string(),
                        Value::String(record.metadata.service_name.clone()),
                    );
                }
                if !record.metadata.environment.is_empty() {
                    obj.insert(
                        "environment".to_string(),
                        Value::String(record.metadata.environment.clone()),
                    );
                }
                obj
            }
            RecordBody::Fields(fields) => {
                // Injected keys are written after the caller's fields and win
                // on collision.
                let mut obj = fields.to_json_map();
                obj.insert(
                    "service".to_string(),
                    Value::String(record.metadata.service_name.clone()),
                );
                obj.insert(
                    "environment".to_string(),
                    Value::String(record.metadata.environment.clone()),
                );
                obj.insert("timestamp".to_string(), timestamp);
                obj.insert("level".to_string(), level);
                if let Some(ref trace) = record.trace {
                    obj.insert("trace_id".to_string(), Value::String(trace.trace_id.clone()));
                    if let Some(ref span_id) = trace.span_id {
                        obj.insert("span_id".to_string(), Value::String(span_id.clone()));
                    }
                }
                obj
            }
        }
    }
}

impl Formatter for JsonFormatter {
    fn render(&self, record: &LogRecord) -> Result<Vec<u8>> {
        let obj = self.to_object(record);
        let mut bytes = serde_json::to_vec(&Value::Object(obj))
            .map_err(|e| LoggerError::marshal(e.to_string()))?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    fn name(&self) -> &str {
        "json"
    }
}

/// Human-readable formatter
///
/// Structured records have no text form; they are rendered by the embedded
/// [`JsonFormatter`] even in plain mode.
#[derive(Debug, Clone)]
pub struct PlainFormatter {
    include_timestamp: bool,
    include_location: bool,
    use_colors: bool,
    json: JsonFormatter,
}

impl Default for PlainFormatter {
    fn default() -> Self {
        Self {
            include_timestamp: true,
            include_location: true,
            use_colors: false,
            json: JsonFormatter::default(),
        }
    }
}

impl PlainFormatter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to include the local date and time
    #[must_use]
    pub fn with_timestamp(mut self, include: bool) -> Self {
        self.include_timestamp = include;
        self
    }

    /// Set whether to include `file:line` of the call site
    #[must_use]
    pub fn with_location(mut self, include: bool) -> Self {
        self.include_location = include;
        self
    }

    /// Colour the level name with ANSI escapes
    #[cfg(feature = "console")]
    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Formatter used for structured records
    #[must_use]
    pub fn with_json(mut self, json: JsonFormatter) -> Self {
        self.json = json;
        self
    }

    fn level_label(&self, record: &LogRecord) -> String {
        #[cfg(feature = "console")]
        if self.use_colors {
            return record
                .level
                .to_str()
                .color(record.level.color_code())
                .to_string();
        }
        record.level.to_str().to_string()
    }

    fn format_line(&self, record: &LogRecord, message: &str) -> String {
        let mut line = format!("{}: ", self.level_label(record));

        if self.include_timestamp {
            let local = record.timestamp.with_timezone(&Local);
            line.push_str(&local.format("%Y/%m/%d %H:%M:%S%.6f ").to_string());
        }

        if self.include_location {
            if let Some(location) = record.location {
                line.push_str(&format!("{}:{}: ", location.short_file(), location.line));
            }
        }

        line.push_str(&sanitize_message(message));
        line.push('\n');
        line
    }
}

impl Formatter for PlainFormatter {
    fn render(&self, record: &LogRecord) -> Result<Vec<u8>> {
        match &record.body {
            RecordBody::Message(message) => Ok(self.format_line(record, message).into_bytes()),
            RecordBody::Fields(_) => self.json.render(record),
        }
    }

    fn name(&self) -> &str {
        "plain"
    }
}
