//! Process-wide logger
//!
//! Free functions log through whichever logger was last installed. Until
//! [`init`] or [`install`] runs they are no-ops, except the FATAL ones,
//! which still terminate the process.
//!
//! Metadata given to [`set_metadata`] is process state of its own: it
//! outlives re-initialisation and is applied to every logger installed
//! afterwards.
//!
//! ```
//! use fanout_logger::{global, LoggerConfig};
//!
//! let mut config = LoggerConfig::default();
//! config.console.enabled = false;
//! global::init(&config).unwrap();
//!
//! global::set_metadata("checkout", "prod");
//! global::info("ready");
//! # global::reset();
//! ```

use crate::core::{
    LogContext, LogLevel, Logger, LoggerConfig, Metadata, Result, TraceContext,
    FATAL_EXIT_CODE,
};
use parking_lot::RwLock;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

static ACTIVE: RwLock<Option<Arc<Logger>>> = parking_lot::const_rwlock(None);
static METADATA: RwLock<Option<Metadata>> = parking_lot::const_rwlock(None);

/// Build a logger from `config` and make it the process-wide logger
///
/// On error the previously active logger (if any) stays in place.
pub fn init(config: &LoggerConfig) -> Result<()> {
    let logger = Logger::from_config(config)?;
    install(logger);
    Ok(())
}

/// Make `logger` the process-wide logger, returning the one it replaces
pub fn install(logger: Logger) -> Option<Arc<Logger>> {
    install_shared(Arc::new(logger))
}

/// Like [`install`], for a logger that is also held elsewhere
///
/// Metadata set through [`set_metadata`] replaces the logger's own.
pub fn install_shared(logger: Arc<Logger>) -> Option<Arc<Logger>> {
    let mut active = ACTIVE.write();
    if let Some(metadata) = METADATA.read().as_ref() {
        logger.set_metadata(metadata.service_name.clone(), metadata.environment.clone());
    }
    active.replace(logger)
}

/// Remove the process-wide logger, returning to the unconfigured state
///
/// Metadata set through [`set_metadata`] is kept.
pub fn reset() -> Option<Arc<Logger>> {
    ACTIVE.write().take()
}

/// Metadata set through [`set_metadata`], if any
pub fn metadata() -> Option<Metadata> {
    METADATA.read().clone()
}

/// Forget metadata set through [`set_metadata`]
///
/// Later installs keep the metadata their loggers were built with.
pub fn clear_metadata() -> Option<Metadata> {
    METADATA.write().take()
}

/// The active logger; the lock is released before the caller logs
pub fn logger() -> Option<Arc<Logger>> {
    ACTIVE.read().clone()
}

pub fn is_initialized() -> bool {
    ACTIVE.read().is_some()
}

/// Set the process-wide service name and environment
///
/// Applies to the active logger and to every logger installed later,
/// whether or not one is active now.
pub fn set_metadata(service_name: impl Into<String>, environment: impl Into<String>) {
    let metadata = Metadata::new(service_name, environment);
    let active = ACTIVE.read();
    if let Some(logger) = active.as_ref() {
        logger.set_metadata(metadata.service_name.clone(), metadata.environment.clone());
    }
    *METADATA.write() = Some(metadata);
}

pub fn flush() -> Result<()> {
    match logger() {
        Some(logger) => logger.flush(),
        None => Ok(()),
    }
}

fn exit_unconfigured(message: &str) -> ! {
    eprintln!("[LOGGER ERROR] fatal with no logger installed: {}", message);
    std::process::exit(FATAL_EXIT_CODE)
}

#[track_caller]
pub fn log(level: LogLevel, message: impl Into<String>) {
    if let Some(logger) = logger() {
        logger.log(level, message);
    }
}

#[track_caller]
pub fn debug(message: impl Into<String>) {
    if let Some(logger) = logger() {
        logger.debug(message);
    }
}

#[track_caller]
pub fn info(message: impl Into<String>) {
    if let Some(logger) = logger() {
        logger.info(message);
    }
}

#[track_caller]
pub fn warning(message: impl Into<String>) {
    if let Some(logger) = logger() {
        logger.warning(message);
    }
}

#[track_caller]
pub fn error(message: impl Into<String>) {
    if let Some(logger) = logger() {
        logger.error(message);
    }
}

#[track_caller]
pub fn fatal(message: impl Into<String>) -> ! {
    match logger() {
        Some(logger) => logger.fatal(message),
        None => exit_unconfigured(&message.into()),
    }
}

#[track_caller]
pub fn debugf(args: fmt::Arguments<'_>) {
    if let Some(logger) = logger() {
        logger.debugf(args);
    }
}

#[track_caller]
pub fn infof(args: fmt::Arguments<'_>) {
    if let Some(logger) = logger() {
        logger.infof(args);
    }
}

#[track_caller]
pub fn warningf(args: fmt::Arguments<'_>) {
    if let Some(logger) = logger() {
        logger.warningf(args);
    }
}

#[track_caller]
pub fn errorf(args: fmt::Arguments<'_>) {
    if let Some(logger) = logger() {
        logger.errorf(args);
    }
}

#[track_caller]
pub fn fatalf(args: fmt::Arguments<'_>) -> ! {
    match logger() {
        Some(logger) => logger.fatalf(args),
        None => exit_unconfigured(&args.to_string()),
    }
}

pub fn debug_fields(fields: LogContext, trace: Option<&TraceContext>) {
    if let Some(logger) = logger() {
        logger.debug_fields(fields, trace);
    }
}

pub fn info_fields(fields: LogContext, trace: Option<&TraceContext>) {
    if let Some(logger) = logger() {
        logger.info_fields(fields, trace);
    }
}

pub fn warning_fields(fields: LogContext, trace: Option<&TraceContext>) {
    if let Some(logger) = logger() {
        logger.warning_fields(fields, trace);
    }
}

pub fn error_fields(fields: LogContext, trace: Option<&TraceContext>) {
    if let Some(logger) = logger() {
        logger.error_fields(fields, trace);
    }
}

pub fn fatal_fields(fields: LogContext, trace: Option<&TraceContext>) -> ! {
    match logger() {
        Some(logger) => logger.fatal_fields(fields, trace),
        None => exit_unconfigured(&fields.to_string()),
    }
}

pub fn log_serializable<T: Serialize + ?Sized>(
    level: LogLevel,
    value: &T,
    trace: Option<&TraceContext>,
) {
    match logger() {
        Some(logger) => logger.log_serializable(level, value, trace),
        None if level == LogLevel::Fatal => exit_unconfigured("structured record"),
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::OutputFormat;
    use crate::sinks::MemorySink;
    use parking_lot::Mutex;

    // The slot is process-wide; tests touching it take turns
    static SERIAL: Mutex<()> = parking_lot::const_mutex(());

    fn memory_logger(memory: &MemorySink) -> Logger {
        Logger::builder()
            .threshold("debug")
            .format(OutputFormat::Json)
            .sink(memory.clone())
            .build()
    }

    #[test]
    fn test_unconfigured_calls_are_noops() {
        let _guard = SERIAL.lock();
        reset();
        clear_metadata();

        assert!(!is_initialized());
        info("nobody hears this");
        errorf(format_args!("or this {}", 1));
        warning_fields(LogContext::new().with_field("k", "v"), None);
        set_metadata("svc", "dev");
        flush().unwrap();

        clear_metadata();
    }

    #[test]
    fn test_install_and_log() {
        let _guard = SERIAL.lock();
        let memory = MemorySink::new();
        install(memory_logger(&memory));

        set_metadata("checkout", "staging");
        info("hello");
        debugf(format_args!("value {}", 7));
        info_fields(
            LogContext::new().with_field("event", "deploy"),
            Some(&TraceContext::new("xyz-123")),
        );

        let lines = memory.lines();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("\"service\":\"checkout\""));
        assert!(lines[1].contains("value 7"));
        assert!(lines[2].contains("\"trace_id\":\"xyz-123\""));

        reset();
        clear_metadata();
    }

    #[test]
    fn test_metadata_set_before_install_applies() {
        let _guard = SERIAL.lock();
        reset();
        set_metadata("checkout", "prod");

        let memory = MemorySink::new();
        install(memory_logger(&memory));
        info_fields(LogContext::new().with_field("event", "deploy"), None);

        let contents = memory.contents();
        assert!(contents.contains("\"service\":\"checkout\""));
        assert!(contents.contains("\"environment\":\"prod\""));

        reset();
        clear_metadata();
    }

    #[test]
    fn test_metadata_survives_reinit() {
        let _guard = SERIAL.lock();
        let first = MemorySink::new();
        let second = MemorySink::new();

        install(memory_logger(&first));
        set_metadata("billing", "staging");
        install(
            Logger::builder()
                .format(OutputFormat::Json)
                .metadata(Metadata::new("from-builder", "dev"))
                .sink(second.clone())
                .build(),
        );
        info("after reinit");

        assert!(second.contents().contains("\"service\":\"billing\""));
        assert_eq!(metadata(), Some(Metadata::new("billing", "staging")));

        reset();
        clear_metadata();
    }

    #[test]
    fn test_cleared_metadata_leaves_logger_own() {
        let _guard = SERIAL.lock();
        set_metadata("stale", "old");
        clear_metadata();

        let memory = MemorySink::new();
        install(
            Logger::builder()
                .format(OutputFormat::Json)
                .metadata(Metadata::new("own", "dev"))
                .sink(memory.clone())
                .build(),
        );
        info("own metadata");

        assert!(memory.contents().contains("\"service\":\"own\""));
        reset();
    }

    #[test]
    fn test_reinstall_swaps_logger() {
        let _guard = SERIAL.lock();
        let first = MemorySink::new();
        let second = MemorySink::new();

        install(memory_logger(&first));
        info("to first");
        let previous = install(memory_logger(&second));
        info("to second");

        assert!(previous.is_some());
        assert_eq!(first.lines().len(), 1);
        assert_eq!(second.lines().len(), 1);
        assert!(second.contents().contains("to second"));

        reset();
        assert!(!is_initialized());
    }

    #[test]
    fn test_init_failure_keeps_previous_logger() {
        let _guard = SERIAL.lock();
        let memory = MemorySink::new();
        install(memory_logger(&memory));

        let mut bad = LoggerConfig::default();
        bad.queue.enabled = true;
        assert!(init(&bad).is_err());

        info("still here");
        assert_eq!(memory.lines().len(), 1);

        reset();
    }
}
