//! File and queue sinks example
//!
//! Builds a logger from a TOML config that writes JSON to a rotating file
//! and publishes every record to a local TCP "broker" that prints what it
//! receives.
//!
//! Run with: cargo run --example file_and_queue

use fanout_logger::prelude::*;
use std::io::Read;
use std::net::{TcpListener, TcpStream};
use std::thread;

fn read_frame(stream: &mut TcpStream) -> std::io::Result<(String, String)> {
    let mut len16 = [0u8; 2];
    stream.read_exact(&mut len16)?;
    let mut topic = vec![0u8; u16::from_be_bytes(len16) as usize];
    stream.read_exact(&mut topic)?;

    let mut len32 = [0u8; 4];
    stream.read_exact(&mut len32)?;
    let mut payload = vec![0u8; u32::from_be_bytes(len32) as usize];
    stream.read_exact(&mut payload)?;

    Ok((
        String::from_utf8_lossy(&topic).into_owned(),
        String::from_utf8_lossy(&payload).into_owned(),
    ))
}

fn main() -> Result<()> {
    println!("=== Fanout Logger - File and Queue Example ===\n");

    let broker = TcpListener::bind("127.0.0.1:0")?;
    let broker_addr = broker.local_addr()?;
    let consumer = thread::spawn(move || {
        if let Ok((mut stream, _)) = broker.accept() {
            while let Ok((topic, payload)) = read_frame(&mut stream) {
                print!("[broker] {} <- {}", topic, payload);
            }
        }
    });

    let dir = tempfile::tempdir()?;
    let log_path = dir.path().join("app.log");

    let config = LoggerConfig::from_toml_str(&format!(
        r#"
        level = "info"
        format = "json"
        service_name = "inventory"
        environment = "demo"

        [console]
        enabled = false

        [file]
        enabled = true
        path = "{}"
        max_size_mb = 1
        max_backups = 3

        [queue]
        enabled = true
        brokers = ["{}"]
        topic = "app-logs"
        "#,
        log_path.display().to_string().replace('\\', "\\\\"),
        broker_addr
    ))?;

    let logger = Logger::from_config(&config)?;
    println!("Sinks: {:?}\n", logger.sink_names());

    logger.info("inventory service started");
    logger.debug("not written: below threshold");
    logger.warning_fields(
        LogContext::new()
            .with_field("sku", "A-1042")
            .with_field("stock", 2),
        Some(&TraceContext::new("trace-7f3a")),
    );
    logger.flush()?;

    // Closing the logger closes the broker connection and ends the consumer
    drop(logger);
    let _ = consumer.join();

    println!("\nContents of {}:", log_path.display());
    print!("{}", std::fs::read_to_string(&log_path)?);

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
