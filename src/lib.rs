//! # Fanout Logger
//!
//! A synchronous structured logging facility that fans every record out to
//! several sinks at once.
//!
//! ## Features
//!
//! - **Two wire formats**: human-readable plain lines or newline-delimited JSON
//! - **Structured records**: field maps merged with service metadata and an
//!   optional trace id
//! - **Multiple sinks**: console, any `Write`, size-rotated files with gzip,
//!   and a TCP message-queue producer with broker failover
//! - **Failure isolation**: one failing sink never stops delivery to the rest
//!
//! ```
//! use fanout_logger::prelude::*;
//!
//! let memory = MemorySink::new();
//! let logger = Logger::builder()
//!     .format(OutputFormat::Json)
//!     .metadata(Metadata::new("checkout", "prod"))
//!     .sink(memory.clone())
//!     .build();
//!
//! logger.info_fields(
//!     LogContext::new().with_field("event", "order_placed").with_field("items", 3),
//!     Some(&TraceContext::new("4bf92f35")),
//! );
//!
//! assert!(memory.contents().contains("\"trace_id\":\"4bf92f35\""));
//! ```

pub mod core;
pub mod global;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        FieldValue, Formatter, LogContext, LogLevel, Logger, LoggerBuilder, LoggerConfig,
        LoggerError, LoggerMetrics, Metadata, MultiSink, OutputFormat, Result, Sink, Threshold,
        TimestampFormat, TraceContext,
    };
    pub use crate::sinks::{ConsoleSink, MemorySink, RotatingFileSink, WriterSink};
}

pub use crate::core::{
    sanitize_message, should_log, ConsoleConfig, ConsoleStream, FatalHook, FieldValue, FileConfig,
    Formatter, JsonFormatter, LogContext, LogLevel, LogRecord, Logger, LoggerBuilder,
    LoggerConfig, LoggerError, LoggerMetrics, Metadata, MultiSink, OutputFormat, PlainFormatter,
    QueueConfig, RecordBody, Result, Sink, SinkFailure, SourceLocation, Threshold,
    TimestampFormat, TraceContext, FATAL_EXIT_CODE,
};
pub use crate::sinks::{
    ConsoleSink, MemorySink, QueueProducer, QueueSink, RotatingFileSink, RotationPolicy,
    TcpProducer, WriterSink,
};
