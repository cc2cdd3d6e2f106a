//! Console sink implementation

use crate::core::{ConsoleStream, LoggerError, Result, Sink};
use std::io::{self, Write};

/// Writes records to stdout or stderr
///
/// The standard stream is locked for the duration of one record, so lines
/// from other writers in the process do not land in the middle of it.
pub struct ConsoleSink {
    stream: ConsoleStream,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::stdout()
    }

    pub fn stdout() -> Self {
        Self {
            stream: ConsoleStream::Stdout,
        }
    }

    pub fn stderr() -> Self {
        Self {
            stream: ConsoleStream::Stderr,
        }
    }

    pub fn with_stream(stream: ConsoleStream) -> Self {
        Self { stream }
    }

    pub fn stream(&self) -> ConsoleStream {
        self.stream
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ConsoleSink {
    fn write(&mut self, record: &[u8]) -> Result<usize> {
        let outcome = match self.stream {
            ConsoleStream::Stdout => io::stdout().lock().write_all(record),
            ConsoleStream::Stderr => io::stderr().lock().write_all(record),
        };

        outcome.map_err(|e| {
            LoggerError::io_operation("console write", format!("{:?}", self.stream), e)
        })?;
        Ok(record.len())
    }

    fn flush(&mut self) -> Result<()> {
        match self.stream {
            ConsoleStream::Stdout => io::stdout().flush()?,
            ConsoleStream::Stderr => io::stderr().flush()?,
        }
        Ok(())
    }

    fn name(&self) -> &str {
        match self.stream {
            ConsoleStream::Stdout => "stdout",
            ConsoleStream::Stderr => "stderr",
        }
    }
}
