//! Fan-out of rendered records to every configured sink

use super::error::{LoggerError, Result, SinkFailure};
use super::sink::Sink;
use parking_lot::Mutex;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Composite sink that broadcasts each record to an ordered set of sinks
///
/// Every sink sits behind its own lock, so a record is written to one sink
/// as a single unit while other threads may be writing to a different sink.
/// A failing or panicking sink never stops delivery to the rest.
///
/// # Example
///
/// ```
/// use fanout_logger::{MemorySink, MultiSink};
///
/// let first = MemorySink::new();
/// let second = MemorySink::new();
/// let fanout = MultiSink::new()
///     .with_sink(first.clone())
///     .with_sink(second.clone());
///
/// fanout.write_all(b"hello\n").unwrap();
/// assert_eq!(first.contents(), "hello\n");
/// assert_eq!(second.contents(), "hello\n");
/// ```
#[derive(Default)]
pub struct MultiSink {
    sinks: Vec<Mutex<Box<dyn Sink>>>,
}

impl MultiSink {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn push(&mut self, sink: Box<dyn Sink>) {
        self.sinks.push(Mutex::new(sink));
    }

    #[must_use]
    pub fn with_sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.push(Box::new(sink));
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Names of the sinks in dispatch order
    pub fn names(&self) -> Vec<String> {
        self.sinks
            .iter()
            .map(|sink| sink.lock().name().to_string())
            .collect()
    }

    /// Write a record to every sink
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::PartialWrite`] naming each sink that failed;
    /// every other sink has still received the record.
    pub fn write_all(&self, record: &[u8]) -> Result<()> {
        self.write_skipping(record, &[])
    }

    /// Write a record to every sink whose index is not in `skip`
    pub fn write_skipping(&self, record: &[u8], skip: &[usize]) -> Result<()> {
        let mut failures = Vec::new();

        for (idx, slot) in self.sinks.iter().enumerate() {
            if skip.contains(&idx) {
                continue;
            }

            let mut sink = slot.lock();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| sink.write(record)));

            let message = match outcome {
                Ok(Ok(written)) if written == record.len() => continue,
                Ok(Ok(written)) => format!("short write: {} of {} bytes", written, record.len()),
                Ok(Err(e)) => e.to_string(),
                Err(panic_info) => format!("sink panicked: {}", panic_message(&*panic_info)),
            };

            failures.push(SinkFailure {
                index: idx,
                sink: sink.name().to_string(),
                message,
            });
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(LoggerError::PartialWrite {
                total: self.sinks.len(),
                failures,
            })
        }
    }

    /// Flush every sink, reporting the ones that failed
    pub fn flush_all(&self) -> Result<()> {
        let mut failures = Vec::new();

        for (idx, slot) in self.sinks.iter().enumerate() {
            let mut sink = slot.lock();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| sink.flush()));

            let message = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e.to_string(),
                Err(panic_info) => format!(
                    "sink panicked during flush: {}",
                    panic_message(&*panic_info)
                ),
            };

            failures.push(SinkFailure {
                index: idx,
                sink: sink.name().to_string(),
                message,
            });
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(LoggerError::PartialWrite {
                total: self.sinks.len(),
                failures,
            })
        }
    }
}

impl Sink for MultiSink {
    fn write(&mut self, record: &[u8]) -> Result<usize> {
        self.write_all(record)?;
        Ok(record.len())
    }

    fn flush(&mut self) -> Result<()> {
        self.flush_all()
    }

    fn name(&self) -> &str {
        "multi"
    }
}

fn panic_message(panic_info: &(dyn Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
