//! Performance benchmarks for the transaction registry.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use std::thread;
use transaction_registry::{RebuildPolicy, Registry, RegistryConfig};

fn populated(devices: usize) -> Registry {
    let registry = Registry::new();
    for device in 0..devices {
        registry
            .save("bench", &format!("device_{}", device), device as u64)
            .unwrap();
    }
    registry
}

/// Winning saves rebuild the whole snapshot, so cost grows with group size.
fn bench_winning_save(c: &mut Criterion) {
    let mut group = c.benchmark_group("winning_save");

    for devices in [10, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("devices", devices), &devices, |b, &n| {
            let registry = populated(n);
            let mut value = n as u64;
            b.iter(|| {
                value += 1;
                registry.save("bench", "device_0", black_box(value)).unwrap();
            });
        });
    }

    group.finish();
}

/// Stale saves never rebuild.
fn bench_stale_save(c: &mut Criterion) {
    let registry = populated(1000);
    registry.save("bench", "device_0", u64::MAX).unwrap();

    c.bench_function("stale_save", |b| {
        b.iter(|| registry.save("bench", "device_0", black_box(1)).unwrap());
    });
}

fn bench_find(c: &mut Criterion) {
    let mut group = c.benchmark_group("find");
    let registry = populated(10_000);

    for threshold in [0u64, 5_000, 9_990] {
        group.bench_with_input(
            BenchmarkId::new("threshold", threshold),
            &threshold,
            |b, &from| {
                b.iter(|| {
                    let range = registry.find("bench", black_box(from)).unwrap();
                    black_box(range.iter().count())
                });
            },
        );
    }

    group.finish();
}

/// Contended saves across threads, one device per value stripe.
fn bench_contended_save(c: &mut Criterion) {
    let mut group = c.benchmark_group("contended_save");
    group.sample_size(10);

    for policy in [RebuildPolicy::AbandonSuperseded, RebuildPolicy::AlwaysRebuild] {
        group.bench_function(format!("{:?}", policy), |b| {
            b.iter(|| {
                let registry = Arc::new(
                    Registry::with_config(RegistryConfig {
                        rebuild_policy: policy,
                        ..Default::default()
                    })
                    .unwrap(),
                );
                let handles: Vec<_> = (0..8u64)
                    .map(|t| {
                        let registry = Arc::clone(&registry);
                        thread::spawn(move || {
                            for n in 0..1_000u64 {
                                let id = format!("device_{}", n % 16);
                                registry.save("bench", &id, n * 8 + t).unwrap();
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.join().unwrap();
                }
                black_box(registry.find("bench", 0).unwrap().len())
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_winning_save,
    bench_stale_save,
    bench_find,
    bench_contended_save
);
criterion_main!(benches);
