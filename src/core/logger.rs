//! Main logger implementation

use super::config::LoggerConfig;
use super::dispatcher::MultiSink;
use super::error::{LoggerError, Result};
use super::formatter::{Formatter, JsonFormatter, OutputFormat, PlainFormatter};
use super::level_filter::Threshold;
use super::log_context::LogContext;
use super::log_level::LogLevel;
use super::log_record::{LogRecord, SourceLocation};
use super::metadata::{Metadata, TraceContext};
use super::metrics::LoggerMetrics;
use super::sink::Sink;
use super::timestamp::TimestampFormat;
use crate::sinks::{ConsoleSink, QueueSink, RotatingFileSink};
use parking_lot::RwLock;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Exit status used after a FATAL record
pub const FATAL_EXIT_CODE: i32 = 1;

/// Called with [`FATAL_EXIT_CODE`] once a FATAL record has been dispatched
pub type FatalHook = fn(i32) -> !;

/// Synchronous logger broadcasting every record to all of its sinks
///
/// Each call filters, renders and dispatches on the calling thread. Sink
/// failures never reach the caller: they are reported as an ERROR record to
/// the sinks that still work, or on stderr when none do.
///
/// # Example
///
/// ```
/// use fanout_logger::prelude::*;
///
/// let memory = MemorySink::new();
/// let logger = Logger::builder()
///     .threshold("debug")
///     .format(OutputFormat::Json)
///     .sink(memory.clone())
///     .build();
///
/// logger.info("service started");
/// logger.debugf(format_args!("listening on port {}", 8080));
///
/// let lines = memory.lines();
/// assert_eq!(lines.len(), 2);
/// assert!(lines[1].contains("listening on port 8080"));
/// ```
pub struct Logger {
    threshold: Threshold,
    formatter: Box<dyn Formatter>,
    sinks: MultiSink,
    metadata: RwLock<Metadata>,
    metrics: Arc<LoggerMetrics>,
    fatal_hook: FatalHook,
}

impl Logger {
    /// Build a logger with the sinks enabled in `config`
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or a sink cannot be
    /// opened
    pub fn from_config(config: &LoggerConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = Logger::builder()
            .threshold(config.level.clone())
            .format(config.format)
            .timestamp_format(config.timestamp_format)
            .metadata(config.metadata());

        #[cfg(feature = "console")]
        {
            builder = builder.colors(config.console.colors);
        }

        if config.console.enabled {
            builder = builder.sink(ConsoleSink::with_stream(config.console.stream));
        }
        if config.file.enabled {
            builder = builder.sink(RotatingFileSink::from_config(&config.file)?);
        }
        if config.queue.enabled {
            builder = builder.sink(QueueSink::from_config(&config.queue)?);
        }

        Ok(builder.build())
    }

    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Replace the service name and environment attached to every record
    pub fn set_metadata(&self, service_name: impl Into<String>, environment: impl Into<String>) {
        *self.metadata.write() = Metadata::new(service_name, environment);
    }

    pub fn metadata(&self) -> Metadata {
        self.metadata.read().clone()
    }

    pub fn threshold(&self) -> &Threshold {
        &self.threshold
    }

    /// Whether a record at `level` would be emitted
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.threshold.allows(level)
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// Names of the configured sinks in dispatch order
    pub fn sink_names(&self) -> Vec<String> {
        self.sinks.names()
    }

    pub fn flush(&self) -> Result<()> {
        self.sinks.flush_all()
    }

    // Freeform messages

    #[track_caller]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    #[track_caller]
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    #[track_caller]
    pub fn warning(&self, message: impl Into<String>) {
        self.log(LogLevel::Warning, message);
    }

    #[track_caller]
    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    /// Log at FATAL, flush every sink and terminate the process
    #[track_caller]
    pub fn fatal(&self, message: impl Into<String>) -> ! {
        self.emit_message(LogLevel::Fatal, message.into(), SourceLocation::caller());
        self.terminate()
    }

    // Format arguments, substituted only when the level passes

    #[track_caller]
    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.log_args(LogLevel::Debug, args);
    }

    #[track_caller]
    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.log_args(LogLevel::Info, args);
    }

    #[track_caller]
    pub fn warningf(&self, args: fmt::Arguments<'_>) {
        self.log_args(LogLevel::Warning, args);
    }

    #[track_caller]
    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.log_args(LogLevel::Error, args);
    }

    #[track_caller]
    pub fn fatalf(&self, args: fmt::Arguments<'_>) -> ! {
        self.emit_message(LogLevel::Fatal, args.to_string(), SourceLocation::caller());
        self.terminate()
    }

    // Structured records

    pub fn debug_fields(&self, fields: LogContext, trace: Option<&TraceContext>) {
        self.log_fields(LogLevel::Debug, fields, trace);
    }

    pub fn info_fields(&self, fields: LogContext, trace: Option<&TraceContext>) {
        self.log_fields(LogLevel::Info, fields, trace);
    }

    pub fn warning_fields(&self, fields: LogContext, trace: Option<&TraceContext>) {
        self.log_fields(LogLevel::Warning, fields, trace);
    }

    pub fn error_fields(&self, fields: LogContext, trace: Option<&TraceContext>) {
        self.log_fields(LogLevel::Error, fields, trace);
    }

    pub fn fatal_fields(&self, fields: LogContext, trace: Option<&TraceContext>) -> ! {
        self.emit_fields(LogLevel::Fatal, fields, trace);
        self.terminate()
    }

    /// Log a freeform message at `level`
    ///
    /// A FATAL level terminates the process after dispatch.
    #[track_caller]
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        if !self.passes(level) {
            return;
        }
        self.emit_message(level, message.into(), SourceLocation::caller());
        if level == LogLevel::Fatal {
            self.terminate();
        }
    }

    #[track_caller]
    pub fn log_args(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        if !self.passes(level) {
            return;
        }
        self.emit_message(level, args.to_string(), SourceLocation::caller());
        if level == LogLevel::Fatal {
            self.terminate();
        }
    }

    pub fn log_fields(&self, level: LogLevel, fields: LogContext, trace: Option<&TraceContext>) {
        if !self.passes(level) {
            return;
        }
        self.emit_fields(level, fields, trace);
        if level == LogLevel::Fatal {
            self.terminate();
        }
    }

    /// Log any serializable value as a structured record
    ///
    /// The value must serialize to a JSON object; anything else is reported
    /// as a marshalling failure and the record is dropped.
    pub fn log_serializable<T: Serialize + ?Sized>(
        &self,
        level: LogLevel,
        value: &T,
        trace: Option<&TraceContext>,
    ) {
        if !self.passes(level) {
            return;
        }

        match LogContext::from_serializable(value) {
            Ok(fields) => self.emit_fields(level, fields, trace),
            Err(e) => {
                self.metrics.record_marshal_failure();
                self.report_failure(&e, &[]);
            }
        }

        if level == LogLevel::Fatal {
            self.terminate();
        }
    }

    fn passes(&self, level: LogLevel) -> bool {
        if self.threshold.allows(level) {
            true
        } else {
            self.metrics.record_filtered();
            false
        }
    }

    fn emit_message(&self, level: LogLevel, message: String, location: SourceLocation) {
        let record = LogRecord::message(level, message, self.metadata()).with_location(location);
        self.dispatch(&record);
    }

    fn emit_fields(&self, level: LogLevel, fields: LogContext, trace: Option<&TraceContext>) {
        let record = LogRecord::fields(level, fields, self.metadata(), trace.cloned());
        self.dispatch(&record);
    }

    fn dispatch(&self, record: &LogRecord) {
        let bytes = match self.formatter.render(record) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.metrics.record_marshal_failure();
                self.report_failure(&e, &[]);
                return;
            }
        };

        self.metrics.record_written();
        if let Err(e) = self.sinks.write_all(&bytes) {
            self.metrics.record_sink_failure();
            self.report_failure(&e, &e.failed_sinks());
        }
    }

    /// Write an ERROR record describing `error` to every sink not in `failed`
    ///
    /// Failures while reporting go to stderr and are not reported again.
    fn report_failure(&self, error: &LoggerError, failed: &[usize]) {
        let description = match error {
            LoggerError::PartialWrite { .. } => format!("failed to write log record: {}", error),
            _ => format!("failed to build log record: {}", error),
        };

        if failed.len() >= self.sinks.len() {
            eprintln!("[LOGGER ERROR] {}", description);
            return;
        }

        let record = LogRecord::message(LogLevel::Error, description.clone(), self.metadata());
        let outcome = self
            .formatter
            .render(&record)
            .and_then(|bytes| self.sinks.write_skipping(&bytes, failed));

        if let Err(e) = outcome {
            eprintln!("[LOGGER ERROR] {} (while reporting: {})", description, e);
        }
    }

    fn terminate(&self) -> ! {
        if let Err(e) = self.sinks.flush_all() {
            eprintln!("[LOGGER ERROR] flush before exit failed: {}", e);
        }
        (self.fatal_hook)(FATAL_EXIT_CODE)
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if let Err(e) = self.sinks.flush_all() {
            eprintln!("[LOGGER ERROR] flush on drop failed: {}", e);
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("threshold", &self.threshold)
            .field("formatter", &self.formatter.name())
            .field("sinks", &self.sinks.names())
            .field("metadata", &*self.metadata.read())
            .finish()
    }
}

/// Builder for Logger
///
/// # Example
/// ```
/// use fanout_logger::prelude::*;
///
/// let logger = Logger::builder()
///     .threshold("warn")
///     .format(OutputFormat::Json)
///     .metadata(Metadata::new("billing", "prod"))
///     .sink(ConsoleSink::stderr())
///     .build();
///
/// assert!(!logger.is_enabled(LogLevel::Info));
/// ```
pub struct LoggerBuilder {
    threshold: Threshold,
    format: OutputFormat,
    timestamp_format: TimestampFormat,
    #[cfg(feature = "console")]
    use_colors: bool,
    formatter: Option<Box<dyn Formatter>>,
    metadata: Metadata,
    sinks: MultiSink,
    fatal_hook: FatalHook,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self {
            threshold: Threshold::default(),
            format: OutputFormat::default(),
            timestamp_format: TimestampFormat::default(),
            #[cfg(feature = "console")]
            use_colors: false,
            formatter: None,
            metadata: Metadata::default(),
            sinks: MultiSink::new(),
            fatal_hook: std::process::exit,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn threshold(mut self, threshold: impl Into<Threshold>) -> Self {
        self.threshold = threshold.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Colour level names in plain output
    #[cfg(feature = "console")]
    #[must_use = "builder methods return a new value"]
    pub fn colors(mut self, enabled: bool) -> Self {
        self.use_colors = enabled;
        self
    }

    /// Use a custom formatter instead of the one selected by `format`
    #[must_use = "builder methods return a new value"]
    pub fn formatter<F: Formatter + 'static>(mut self, formatter: F) -> Self {
        self.formatter = Some(Box::new(formatter));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Add a sink; records go to sinks in the order they were added
    #[must_use = "builder methods return a new value"]
    pub fn sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Replace the process exit used after FATAL records
    #[must_use = "builder methods return a new value"]
    pub fn fatal_hook(mut self, hook: FatalHook) -> Self {
        self.fatal_hook = hook;
        self
    }

    pub fn build(self) -> Logger {
        let formatter: Box<dyn Formatter> = match (self.formatter, self.format) {
            (Some(custom), _) => custom,
            (None, OutputFormat::Json) => Box::new(JsonFormatter::new(self.timestamp_format)),
            (None, OutputFormat::Plain) => {
                let plain =
                    PlainFormatter::new().with_json(JsonFormatter::new(self.timestamp_format));
                #[cfg(feature = "console")]
                let plain = plain.with_colors(self.use_colors);
                Box::new(plain)
            }
        };

        Logger {
            threshold: self.threshold,
            formatter,
            sinks: self.sinks,
            metadata: RwLock::new(self.metadata),
            metrics: Arc::new(LoggerMetrics::new()),
            fatal_hook: self.fatal_hook,
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
