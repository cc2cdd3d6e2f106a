//! Criterion benchmarks for fanout_logger

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use fanout_logger::prelude::*;
use fanout_logger::{JsonFormatter, LogRecord, PlainFormatter};
use std::io;
use std::sync::Arc;

fn discarding_logger(threshold: &str, format: OutputFormat) -> Logger {
    Logger::builder()
        .threshold(threshold)
        .format(format)
        .metadata(Metadata::new("bench", "local"))
        .sink(WriterSink::new(io::sink()))
        .build()
}

// ============================================================================
// Logging Performance Benchmarks
// ============================================================================

fn bench_freeform_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("freeform_logging");
    group.throughput(Throughput::Elements(1));

    let plain = discarding_logger("debug", OutputFormat::Plain);
    let json = discarding_logger("debug", OutputFormat::Json);

    group.bench_function("plain_info", |b| {
        b.iter(|| {
            plain.info(black_box("Info message"));
        });
    });

    group.bench_function("json_info", |b| {
        b.iter(|| {
            json.info(black_box("Info message"));
        });
    });

    group.bench_function("json_infof", |b| {
        b.iter(|| {
            json.infof(format_args!("request {} took {}ms", black_box(42), black_box(17)));
        });
    });

    group.bench_function("json_multiline", |b| {
        b.iter(|| {
            json.error(black_box("first line\nsecond line\nthird line\n"));
        });
    });

    group.finish();
}

fn bench_structured_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("structured_logging");
    group.throughput(Throughput::Elements(1));

    let logger = discarding_logger("info", OutputFormat::Json);
    let trace = TraceContext::new("4bf92f3577b34da6a3ce929d0e0e4736");

    group.bench_function("three_fields", |b| {
        b.iter(|| {
            logger.info_fields(
                LogContext::new()
                    .with_field("event", "deploy")
                    .with_field("replicas", 3)
                    .with_field("healthy", true),
                None,
            );
        });
    });

    group.bench_function("three_fields_with_trace", |b| {
        b.iter(|| {
            logger.info_fields(
                LogContext::new()
                    .with_field("event", "deploy")
                    .with_field("replicas", 3)
                    .with_field("healthy", true),
                Some(&trace),
            );
        });
    });

    group.finish();
}

// ============================================================================
// Fan-out Benchmarks
// ============================================================================

fn bench_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("fanout");
    group.throughput(Throughput::Elements(1));

    for sinks in [1usize, 4, 16] {
        let mut builder = Logger::builder().format(OutputFormat::Json);
        for _ in 0..sinks {
            builder = builder.sink(WriterSink::new(io::sink()));
        }
        let logger = builder.build();

        group.bench_function(format!("sinks_{}", sinks), |b| {
            b.iter(|| {
                logger.info(black_box("Fan-out message"));
            });
        });
    }

    group.finish();
}

fn bench_concurrent_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_logging");

    let logger = Arc::new(discarding_logger("info", OutputFormat::Json));

    group.bench_function("multi_thread_4", |b| {
        let logger = Arc::clone(&logger);
        b.iter(|| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let logger = Arc::clone(&logger);
                    std::thread::spawn(move || {
                        for _ in 0..100 {
                            logger.info(black_box("Concurrent message"));
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }
        });
    });

    group.finish();
}

// ============================================================================
// Rendering Benchmarks
// ============================================================================

fn bench_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("rendering");
    group.throughput(Throughput::Elements(1));

    let record = LogRecord::message(LogLevel::Info, "Test message", Metadata::new("svc", "prod"));
    let structured = LogRecord::fields(
        LogLevel::Info,
        LogContext::new()
            .with_field("user_id", 12345)
            .with_field("action", "login"),
        Metadata::new("svc", "prod"),
        Some(TraceContext::new("xyz-123")),
    );

    let json = JsonFormatter::default();
    let plain = PlainFormatter::new();

    group.bench_function("json_freeform", |b| {
        b.iter(|| black_box(json.render(black_box(&record)).unwrap()));
    });

    group.bench_function("json_structured", |b| {
        b.iter(|| black_box(json.render(black_box(&structured)).unwrap()));
    });

    group.bench_function("plain_freeform", |b| {
        b.iter(|| black_box(plain.render(black_box(&record)).unwrap()));
    });

    group.finish();
}

// ============================================================================
// Filtering Benchmarks
// ============================================================================

fn bench_level_filtering(c: &mut Criterion) {
    let mut group = c.benchmark_group("level_filtering");
    group.throughput(Throughput::Elements(1));

    let logger = discarding_logger("warn", OutputFormat::Json);

    group.bench_function("below_threshold", |b| {
        b.iter(|| {
            logger.debug(black_box("This should be filtered"));
        });
    });

    group.bench_function("below_threshold_format_args", |b| {
        b.iter(|| {
            logger.debugf(format_args!("never rendered {}", black_box(7)));
        });
    });

    group.bench_function("above_threshold", |b| {
        b.iter(|| {
            logger.error(black_box("This should be logged"));
        });
    });

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(
    benches,
    bench_freeform_logging,
    bench_structured_logging,
    bench_fanout,
    bench_concurrent_logging,
    bench_rendering,
    bench_level_filtering
);

criterion_main!(benches);
