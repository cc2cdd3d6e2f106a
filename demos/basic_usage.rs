//! Basic logger usage example
//!
//! Demonstrates console logging in both formats, thresholds, structured
//! records and the logging macros.
//!
//! Run with: cargo run --example basic_usage

use fanout_logger::prelude::*;
use fanout_logger::{info, warning};

fn main() -> Result<()> {
    println!("=== Fanout Logger - Basic Usage Example ===\n");

    // Plain text to stdout
    let logger = Logger::builder()
        .threshold("debug")
        .colors(true)
        .sink(ConsoleSink::stdout())
        .build();

    println!("1. Logging at different levels:");
    logger.debug("This is a debug message");
    logger.info("This is an info message");
    logger.warning("This is a warning message");
    logger.error("This is an error message");

    println!("\n2. Format arguments and macros:");
    logger.infof(format_args!("Listening on {}:{}", "0.0.0.0", 8080));
    info!(logger, "Loaded {} routes", 12);
    warning!(logger, "Cache hit ratio low: {:.1}%", 41.5);

    println!("\n3. Threshold 'warn' hides debug and info:");
    let quiet = Logger::builder()
        .threshold("warn")
        .sink(ConsoleSink::stdout())
        .build();
    quiet.debug("Debug message (hidden)");
    quiet.info("Info message (hidden)");
    quiet.warning("Warning message (visible)");

    println!("\n4. JSON output with metadata and structured fields:");
    let json = Logger::builder()
        .format(OutputFormat::Json)
        .metadata(Metadata::new("checkout", "dev"))
        .sink(ConsoleSink::stdout())
        .build();
    json.info("multi-line\nmessage collapsed onto one line");
    json.info_fields(
        LogContext::new()
            .with_field("event", "order_placed")
            .with_field("items", 3)
            .with_field("total", 59.90),
        Some(&TraceContext::new("4bf92f3577b34da6").with_span("00f067aa0ba902b7")),
    );

    json.flush()?;
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
