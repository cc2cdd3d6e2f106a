//! Process metadata and trace correlation carried on every record

use serde::{Deserialize, Serialize};

/// Service identity merged into records
///
/// Set once when the logger is configured. Structured records always carry
/// both keys; freeform JSON records carry them only when non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub service_name: String,
    pub environment: String,
}

impl Metadata {
    pub fn new(service_name: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            environment: environment.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.service_name.is_empty() && self.environment.is_empty()
    }
}

/// Request-scoped trace identifiers passed to structured calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceContext {
    /// Trace ID for request correlation
    pub trace_id: String,

    /// Span ID for this operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,
}

impl TraceContext {
    pub fn new(trace_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            span_id: None,
        }
    }

    /// Set span ID
    #[must_use]
    pub fn with_span(mut self, span_id: impl Into<String>) -> Self {
        self.span_id = Some(span_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_empty() {
        assert!(Metadata::default().is_empty());
        assert!(!Metadata::new("billing", "").is_empty());
    }

    #[test]
    fn test_trace_context() {
        let trace = TraceContext::new("trace-abc").with_span("span-123");
        assert_eq!(trace.trace_id, "trace-abc");
        assert_eq!(trace.span_id.as_deref(), Some("span-123"));
    }
}
