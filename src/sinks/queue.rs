//! Message queue sink
//!
//! Publishes each record as one message on a topic. The transport sits
//! behind [`QueueProducer`]; [`TcpProducer`] is a minimal fire-and-forget
//! producer that length-prefixes messages over plain TCP.

use crate::core::config::QueueConfig;
use crate::core::{LoggerError, Result, Sink};
use std::io::Write;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Publishes messages to a topic
pub trait QueueProducer: Send {
    /// Deliver one message; returning `Ok` means the broker accepted the bytes
    fn send(&mut self, topic: &str, payload: &[u8]) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Frame a message as `u16 BE topic length | topic | u32 BE payload length | payload`
pub fn encode_frame(topic: &str, payload: &[u8]) -> Result<Vec<u8>> {
    let topic_len = u16::try_from(topic.len())
        .map_err(|_| LoggerError::queue(topic, "topic name longer than 65535 bytes"))?;
    let payload_len = u32::try_from(payload.len())
        .map_err(|_| LoggerError::queue(topic, "payload larger than 4 GiB"))?;

    let mut frame = Vec::with_capacity(2 + topic.len() + 4 + payload.len());
    frame.extend_from_slice(&topic_len.to_be_bytes());
    frame.extend_from_slice(topic.as_bytes());
    frame.extend_from_slice(&payload_len.to_be_bytes());
    frame.extend_from_slice(payload);
    Ok(frame)
}

/// TCP producer with broker failover
///
/// Connects lazily. Each send starts from the broker that last worked and
/// walks the list once; nothing is acknowledged by the broker.
pub struct TcpProducer {
    brokers: Vec<String>,
    current: usize,
    stream: Option<TcpStream>,
    timeout: Duration,
}

impl TcpProducer {
    pub fn new<I, S>(brokers: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let brokers: Vec<String> = brokers.into_iter().map(Into::into).collect();
        if brokers.is_empty() {
            return Err(LoggerError::config("queue", "at least one broker is required"));
        }

        Ok(Self {
            brokers,
            current: 0,
            stream: None,
            timeout: Duration::from_secs(5),
        })
    }

    /// Connect and write timeout per broker (default 5s)
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn brokers(&self) -> &[String] {
        &self.brokers
    }

    /// Broker the next send will try first
    pub fn current_broker(&self) -> &str {
        &self.brokers[self.current]
    }

    fn connect(&self, broker: &str) -> std::io::Result<TcpStream> {
        let mut last_err = None;
        for addr in broker.to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(stream) => {
                    stream.set_write_timeout(Some(self.timeout))?;
                    stream.set_nodelay(true)?;
                    return Ok(stream);
                }
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "broker resolved to no address")
        }))
    }
}

impl QueueProducer for TcpProducer {
    fn send(&mut self, topic: &str, payload: &[u8]) -> Result<()> {
        let frame = encode_frame(topic, payload)?;
        let mut errors = Vec::new();

        for attempt in 0..self.brokers.len() {
            let idx = (self.current + attempt) % self.brokers.len();

            let mut stream = match self.stream.take().filter(|_| attempt == 0) {
                Some(stream) => stream,
                None => match self.connect(&self.brokers[idx]) {
                    Ok(stream) => stream,
                    Err(e) => {
                        errors.push(format!("{}: {}", self.brokers[idx], e));
                        continue;
                    }
                },
            };

            match stream.write_all(&frame) {
                Ok(()) => {
                    self.current = idx;
                    self.stream = Some(stream);
                    return Ok(());
                }
                Err(e) => errors.push(format!("{}: {}", self.brokers[idx], e)),
            }
        }

        Err(LoggerError::queue(
            topic,
            format!("all brokers failed ({})", errors.join("; ")),
        ))
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut stream) = self.stream {
            stream.flush()?;
        }
        Ok(())
    }
}

/// Sink publishing every record to one topic
pub struct QueueSink<P: QueueProducer> {
    producer: P,
    topic: String,
}

impl<P: QueueProducer> QueueSink<P> {
    pub fn new(producer: P, topic: impl Into<String>) -> Self {
        Self {
            producer,
            topic: topic.into(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn producer(&self) -> &P {
        &self.producer
    }
}

impl QueueSink<TcpProducer> {
    /// TCP sink for the brokers and topic in `config`
    pub fn from_config(config: &QueueConfig) -> Result<Self> {
        if config.topic.is_empty() {
            return Err(LoggerError::config("queue", "topic must not be empty"));
        }
        Ok(Self::new(
            TcpProducer::new(config.brokers.iter().cloned())?,
            config.topic.clone(),
        ))
    }
}

impl<P: QueueProducer> Sink for QueueSink<P> {
    fn write(&mut self, record: &[u8]) -> Result<usize> {
        self.producer.send(&self.topic, record)?;
        Ok(record.len())
    }

    fn flush(&mut self) -> Result<()> {
        self.producer.flush()
    }

    fn name(&self) -> &str {
        "queue"
    }
}
