//! Log record structure
//!
//! A record is built, filtered, rendered and dispatched inside one logging
//! call. Nothing mutates it after it is handed to a formatter.

use super::log_context::LogContext;
use super::log_level::LogLevel;
use super::metadata::{Metadata, TraceContext};
use chrono::{DateTime, Utc};
use std::panic::Location;

/// Source position of the logging call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: &'static str,
    pub line: u32,
}

impl SourceLocation {
    /// Location of the outermost `#[track_caller]` frame
    #[track_caller]
    pub fn caller() -> Self {
        let loc: &'static Location<'static> = Location::caller();
        Self {
            file: loc.file(),
            line: loc.line(),
        }
    }

    /// File name without directories
    pub fn short_file(&self) -> &'static str {
        self.file
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.file)
    }
}

/// What the caller supplied
#[derive(Debug, Clone, PartialEq)]
pub enum RecordBody {
    /// Freeform text, already substituted if it came from format arguments
    Message(String),
    /// Field mapping rendered at the top level of the JSON object
    Fields(LogContext),
}

#[derive(Debug, Clone)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub body: RecordBody,
    pub metadata: Metadata,
    pub trace: Option<TraceContext>,
    pub location: Option<SourceLocation>,
}

impl LogRecord {
    /// Freeform record
    pub fn message(level: LogLevel, message: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            body: RecordBody::Message(message.into()),
            metadata,
            trace: None,
            location: None,
        }
    }

    /// Structured record
    pub fn fields(
        level: LogLevel,
        fields: LogContext,
        metadata: Metadata,
        trace: Option<TraceContext>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            body: RecordBody::Fields(fields),
            metadata,
            trace,
            location: None,
        }
    }

    #[must_use]
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Freeform message text, if this is a freeform record
    pub fn message_text(&self) -> Option<&str> {
        match &self.body {
            RecordBody::Message(m) => Some(m),
            RecordBody::Fields(_) => None,
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self.body, RecordBody::Fields(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_record() {
        let record = LogRecord::message(LogLevel::Info, "hello", Metadata::default());
        assert_eq!(record.message_text(), Some("hello"));
        assert!(!record.is_structured());
        assert!(record.trace.is_none());
    }

    #[test]
    fn test_fields_record_keeps_trace() {
        let record = LogRecord::fields(
            LogLevel::Warning,
            LogContext::new().with_field("event", "deploy"),
            Metadata::new("svc", "prod"),
            Some(TraceContext::new("xyz-123")),
        );
        assert!(record.is_structured());
        assert_eq!(record.message_text(), None);
        assert_eq!(record.trace.as_ref().map(|t| t.trace_id.as_str()), Some("xyz-123"));
    }

    #[test]
    fn test_caller_location() {
        let loc = SourceLocation::caller();
        assert_eq!(loc.short_file(), "log_record.rs");
        assert!(loc.line > 0);
    }

    #[test]
    fn test_short_file_strips_directories() {
        let loc = SourceLocation {
            file: "src/services/billing.rs",
            line: 7,
        };
        assert_eq!(loc.short_file(), "billing.rs");
    }
}
