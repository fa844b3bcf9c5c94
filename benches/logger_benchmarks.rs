//! Criterion benchmarks for level_file_logger

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use level_file_logger::core::template::render_template;
use level_file_logger::prelude::*;
use level_file_logger::{print_log, printf_log};
use std::sync::Arc;

// ============================================================================
// Logger Creation Benchmarks
// ============================================================================

fn bench_logger_creation(c: &mut Criterion) {
    let mut group = c.benchmark_group("logger_creation");
    group.throughput(Throughput::Elements(1));

    group.bench_function("default", |b| {
        b.iter(|| {
            let logger = Logger::new();
            black_box(logger)
        });
    });

    group.bench_function("custom_levels", |b| {
        b.iter(|| {
            let logger = Logger::builder()
                .levels(["TRACE", "DEBUG", "INFO", "NOTICE", "WARN", "ERROR", "FATAL"])
                .log_to_levels(true)
                .build();
            black_box(logger)
        });
    });

    group.finish();
}

// ============================================================================
// Admission Benchmarks
// ============================================================================

fn bench_admission(c: &mut Criterion) {
    let mut group = c.benchmark_group("admission");
    group.throughput(Throughput::Elements(1));

    let logger = Logger::builder().min_level(2).build();

    group.bench_function("below_threshold", |b| {
        b.iter(|| {
            print_log!(logger, black_box("debug"), "filtered");
        });
    });

    group.bench_function("unknown_level", |b| {
        b.iter(|| {
            print_log!(logger, black_box("trace"), "filtered");
        });
    });

    group.bench_function("accepted_print", |b| {
        b.iter(|| {
            print_log!(logger, black_box("error"), "request failed: ", 500);
        });
    });

    group.bench_function("accepted_printf", |b| {
        b.iter(|| {
            printf_log!(logger, black_box("error"), "code=%d msg=%s", 500, "internal");
        });
    });

    let _ = logger.flush();
    group.finish();
}

// ============================================================================
// File Output Benchmarks
// ============================================================================

fn bench_file_output(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_output");
    group.throughput(Throughput::Elements(1));

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");

    let single = Logger::builder()
        .log_dir(temp_dir.path().join("single"))
        .file_prefix("bench")
        .min_level(1)
        .rotation(RotationPolicy::new().with_max_size(8 * 1024 * 1024))
        .build();

    group.bench_function("single_file", |b| {
        b.iter(|| {
            printf_log!(single, "info", "request %d served", black_box(42));
        });
    });
    let _ = single.flush();

    let fan_out = Logger::builder()
        .log_dir(temp_dir.path().join("fan_out"))
        .file_prefix("bench")
        .min_level(0)
        .log_to_levels(true)
        .rotation(RotationPolicy::new().with_max_size(8 * 1024 * 1024))
        .build();

    group.bench_function("fan_out_five_files", |b| {
        b.iter(|| {
            printf_log!(fan_out, "fatal", "request %d failed", black_box(42));
        });
    });
    let _ = fan_out.flush();

    group.finish();
}

// ============================================================================
// Concurrent Logging Benchmarks
// ============================================================================

fn bench_concurrent_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_logging");

    let logger = Arc::new(Logger::new());

    group.bench_function("multi_thread_4", |b| {
        b.iter(|| {
            let handles: Vec<_> = (0..4)
                .map(|id| {
                    let logger = Arc::clone(&logger);
                    std::thread::spawn(move || {
                        printf_log!(logger, "info", "worker %d", id);
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }
        });
    });

    let _ = logger.flush();
    group.finish();
}

// ============================================================================
// Rendering Benchmarks
// ============================================================================

fn bench_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("rendering");
    group.throughput(Throughput::Elements(1));

    group.bench_function("template_simple", |b| {
        b.iter(|| render_template(black_box("code=%d msg=%s"), &["400", "bad request"]));
    });

    group.bench_function("template_width_precision", |b| {
        b.iter(|| render_template(black_box("[%-8s] %08d %.3s"), &["id", "42", "truncated"]));
    });

    group.bench_function("template_extra_args", |b| {
        b.iter(|| render_template(black_box("no verbs"), &["a", "b", "c"]));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_logger_creation,
    bench_admission,
    bench_file_output,
    bench_concurrent_logging,
    bench_rendering
);
criterion_main!(benches);
