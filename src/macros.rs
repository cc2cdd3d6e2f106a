//! Logging macros for ergonomic log message formatting.
//!
//! These macros provide a convenient interface for logging with automatic
//! string formatting, similar to `println!` and `format!`. Arguments are only
//! substituted when the level passes the logger's threshold.
//!
//! # Examples
//!
//! ```
//! use fanout_logger::prelude::*;
//! use fanout_logger::info;
//!
//! let memory = MemorySink::new();
//! let logger = Logger::builder().sink(memory.clone()).build();
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! assert_eq!(memory.lines().len(), 2);
//! ```

/// Log a message at an explicit level.
///
/// # Examples
///
/// ```
/// # use fanout_logger::prelude::*;
/// # let logger = Logger::builder().build();
/// use fanout_logger::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log_args($level, format_args!($($arg)+))
    };
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use fanout_logger::prelude::*;
/// # let logger = Logger::builder().threshold("debug").build();
/// use fanout_logger::debug;
/// debug!(logger, "Debug information");
/// debug!(logger, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $logger.debugf(format_args!($($arg)+))
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $logger.infof(format_args!($($arg)+))
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use fanout_logger::prelude::*;
/// # let logger = Logger::builder().build();
/// use fanout_logger::warning;
/// warning!(logger, "Memory usage at {}%", 85);
/// ```
#[macro_export]
macro_rules! warning {
    ($logger:expr, $($arg:tt)+) => {
        $logger.warningf(format_args!($($arg)+))
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $logger.errorf(format_args!($($arg)+))
    };
}

/// Log a fatal message, flush every sink and terminate the process.
///
/// Evaluates to `!`.
///
/// # Examples
///
/// ```no_run
/// # use fanout_logger::prelude::*;
/// # let logger = Logger::builder().build();
/// use fanout_logger::fatal;
/// fatal!(logger, "Cannot bind port {}", 8080);
/// ```
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatalf(format_args!($($arg)+))
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{Logger, LogLevel, OutputFormat};
    use crate::sinks::MemorySink;

    fn exit_by_panic(code: i32) -> ! {
        panic!("exit {}", code)
    }

    fn logger(memory: &MemorySink) -> Logger {
        Logger::builder()
            .threshold("debug")
            .format(OutputFormat::Json)
            .sink(memory.clone())
            .fatal_hook(exit_by_panic)
            .build()
    }

    #[test]
    fn test_level_macros() {
        let memory = MemorySink::new();
        let logger = logger(&memory);

        debug!(logger, "debug {}", 1);
        info!(logger, "info {}", 2);
        warning!(logger, "warning {}", 3);
        error!(logger, "error {}", 4);
        log!(logger, LogLevel::Info, "explicit {}", 5);

        let lines = memory.lines();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].contains("\"message\":\"debug 1\""));
        assert!(lines[2].contains("\"level\":\"WARNING\""));
        assert!(lines[4].contains("explicit 5"));
    }

    #[test]
    fn test_macro_with_no_arguments() {
        let memory = MemorySink::new();
        let logger = logger(&memory);

        info!(logger, "literal only");
        assert!(memory.contents().contains("literal only"));
    }

    #[test]
    fn test_fatal_macro() {
        let memory = MemorySink::new();
        let logger = logger(&memory);

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            fatal!(logger, "giving up after {} retries", 3);
        }));

        assert!(outcome.is_err());
        assert!(memory.contents().contains("giving up after 3 retries"));
    }
}
