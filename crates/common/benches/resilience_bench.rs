//! Resilience benchmarks
//!
//! Benchmarks for the circuit registry hot paths (gate check, failure
//! recording, reset) and backoff calculations.
//!
//! Run with: `cargo bench --bench resilience_bench -p cleanops-common`

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use cleanops_common::resilience::{backoff_delay, BreakerSettings, CircuitRegistry};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

// ============================================================================
// Circuit Registry Benchmarks
// ============================================================================

fn bench_registry_gate(c: &mut Criterion) {
    let mut group = c.benchmark_group("circuit_registry_gate");
    let now = Instant::now();

    group.bench_function("is_open_unknown_key", |b| {
        let registry = CircuitRegistry::new();
        b.iter(|| black_box(registry.is_open(black_box("stripe"), now)));
    });

    group.bench_function("is_open_tripped_key", |b| {
        let registry = CircuitRegistry::new();
        let settings = BreakerSettings { threshold: 1, cooldown: Duration::from_secs(3_600) };
        registry.record_failure("stripe", &settings, now);
        registry.record_failure("stripe", &settings, now);
        b.iter(|| black_box(registry.is_open(black_box("stripe"), now)));
    });

    group.finish();
}

fn bench_registry_recording(c: &mut Criterion) {
    let mut group = c.benchmark_group("circuit_registry_recording");
    let now = Instant::now();
    let settings = BreakerSettings::default();

    group.bench_function("record_then_reset", |b| {
        let registry = CircuitRegistry::new();
        b.iter(|| {
            for _ in 0..3 {
                black_box(registry.record_failure("crm", &settings, now));
            }
            registry.reset("crm");
        });
    });

    for threads in [2usize, 4, 8] {
        group.bench_with_input(BenchmarkId::new("contended_record", threads), &threads, |b, &n| {
            b.iter(|| {
                let registry = Arc::new(CircuitRegistry::new());
                let settings = BreakerSettings { threshold: u32::MAX, cooldown: Duration::ZERO };
                let handles: Vec<_> = (0..n)
                    .map(|_| {
                        let registry = Arc::clone(&registry);
                        thread::spawn(move || {
                            for _ in 0..100 {
                                registry.record_failure("shared", &settings, now);
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    if handle.join().is_err() {
                        panic!("recording thread panicked");
                    }
                }
                black_box(registry.state("shared"));
            });
        });
    }

    group.finish();
}

// ============================================================================
// Backoff Benchmarks
// ============================================================================

fn bench_backoff_calculations(c: &mut Criterion) {
    let mut group = c.benchmark_group("backoff_calculations");
    let attempts = [0u32, 1, 5, 10, 40];

    group.bench_function("backoff_delay", |b| {
        b.iter(|| {
            for attempt in attempts {
                black_box(backoff_delay(Duration::from_millis(200), attempt));
            }
        });
    });

    group.finish();
}

criterion_group!(
    resilience,
    bench_registry_gate,
    bench_registry_recording,
    bench_backoff_calculations
);
criterion_main!(resilience);
