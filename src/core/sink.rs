//! Sink trait for log output destinations

use super::error::Result;

/// Destination for rendered records
///
/// `write` receives exactly one rendered record per call, terminated by a
/// newline, and must write it as one unit. Rotation, delivery and buffering
/// are the sink's own business.
pub trait Sink: Send {
    /// Write one record, returning the number of bytes accepted
    fn write(&mut self, record: &[u8]) -> Result<usize>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn write(&mut self, record: &[u8]) -> Result<usize> {
        (**self).write(record)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
