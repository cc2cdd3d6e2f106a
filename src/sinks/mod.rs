//! Sink implementations

pub mod console;
pub mod memory;
pub mod queue;
pub mod rotating_file;
pub mod writer;

pub use console::ConsoleSink;
pub use memory::MemorySink;
pub use queue::{encode_frame, QueueProducer, QueueSink, TcpProducer};
pub use rotating_file::{RotatingFileSink, RotationPolicy};
pub use writer::WriterSink;

pub use crate::core::Sink;
