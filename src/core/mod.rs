//! Core logger types and traits

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod formatter;
pub mod level_filter;
pub mod log_context;
pub mod log_level;
pub mod log_record;
pub mod logger;
pub mod metadata;
pub mod metrics;
pub mod sink;
pub mod timestamp;

pub use config::{ConsoleConfig, ConsoleStream, FileConfig, LoggerConfig, QueueConfig};
pub use dispatcher::MultiSink;
pub use error::{LoggerError, Result, SinkFailure};
pub use formatter::{sanitize_message, Formatter, JsonFormatter, OutputFormat, PlainFormatter};
pub use level_filter::{should_log, Threshold};
pub use log_context::{FieldValue, LogContext};
pub use log_level::LogLevel;
pub use log_record::{LogRecord, RecordBody, SourceLocation};
pub use logger::{FatalHook, Logger, LoggerBuilder, FATAL_EXIT_CODE};
pub use metadata::{Metadata, TraceContext};
pub use metrics::LoggerMetrics;
pub use sink::Sink;
pub use timestamp::TimestampFormat;
