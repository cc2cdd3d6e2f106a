//! Sink over any `std::io::Write`

use crate::core::{LoggerError, Result, Sink};
use std::io::Write;

/// Adapts an arbitrary writer (file, socket, pipe, `Vec<u8>`) into a sink
///
/// A record is handed to the writer with a single `write` call. If the
/// writer accepts fewer bytes than offered, the short count is reported
/// and the dispatcher treats it as a failure.
pub struct WriterSink<W: Write + Send> {
    inner: W,
    name: String,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(inner: W) -> Self {
        Self::named(inner, "writer")
    }

    pub fn named(inner: W, name: impl Into<String>) -> Self {
        Self {
            inner,
            name: name.into(),
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write + Send> Sink for WriterSink<W> {
    fn write(&mut self, record: &[u8]) -> Result<usize> {
        self.inner
            .write(record)
            .map_err(|e| LoggerError::writer(format!("{}: {}", self.name, e)))
    }

    fn flush(&mut self) -> Result<()> {
        self.inner
            .flush()
            .map_err(|e| LoggerError::writer(format!("{}: flush failed: {}", self.name, e)))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
