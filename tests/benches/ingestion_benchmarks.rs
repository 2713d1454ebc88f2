//! # Block Ingestion Benchmarks
//!
//! | Path | Workload |
//! |------|----------|
//! | Linear extension | Pre-mined chain submitted in order |
//! | Orphan resolution | Chain submitted in reverse, genesis last |
//! | Dry run | Validation only, no state change |
//! | Orphan pool | Insert and sweep at capacity |

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use qc_block_ingestion::domain::{OrphanPool, OrphanPoolConfig};
use qc_block_ingestion::BehaviorFlags;
use qc_tests::fixtures::{chain, mine, TestNode, GENESIS_TIME};
use rand::Rng;
use std::time::Duration;

// ============================================================================
// PIPELINE
// ============================================================================

fn bench_linear_extension(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingestion-linear");
    group.measurement_time(Duration::from_secs(10));

    for len in [10usize, 100, 500] {
        let blocks = chain(len);
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::new("in_order", len), &blocks, |b, blocks| {
            b.iter_batched(
                TestNode::new,
                |node| {
                    for block in blocks {
                        black_box(node.submit(block).is_ok());
                    }
                    node
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_orphan_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingestion-orphans");

    for len in [10usize, 100] {
        let blocks = chain(len);
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::new("reverse_order", len), &blocks, |b, blocks| {
            b.iter_batched(
                TestNode::new,
                |node| {
                    for block in blocks.iter().rev() {
                        black_box(node.submit(block).is_ok());
                    }
                    node
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_dry_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingestion-dry-run");

    let blocks = chain(101);
    let node = TestNode::new();
    for block in &blocks[..100] {
        let _ = node.submit(block);
    }
    let candidate = &blocks[100];
    let flags = BehaviorFlags::NONE.with_dry_run();

    group.bench_function("extend_tip", |b| {
        b.iter(|| black_box(node.submit_with(candidate, flags).is_ok()))
    });

    group.finish();
}

// ============================================================================
// ORPHAN POOL
// ============================================================================

fn bench_orphan_pool(c: &mut Criterion) {
    let mut group = c.benchmark_group("orphan-pool");

    let mut rng = rand::thread_rng();
    let orphans: Vec<_> = (0..1_000u64)
        .map(|i| mine(rng.gen(), GENESIS_TIME + i, i))
        .collect();

    group.throughput(Throughput::Elements(orphans.len() as u64));
    group.bench_function("insert_at_capacity", |b| {
        b.iter_batched(
            || OrphanPool::new(OrphanPoolConfig::new(100, 3_600)),
            |mut pool| {
                for (i, block) in orphans.iter().enumerate() {
                    black_box(pool.insert(block.clone(), GENESIS_TIME + i as u64));
                }
                pool
            },
            BatchSize::SmallInput,
        )
    });

    group.bench_function("sweep_expired", |b| {
        b.iter_batched(
            || {
                let mut pool = OrphanPool::new(OrphanPoolConfig::new(1_000, 60));
                for block in &orphans {
                    pool.insert(block.clone(), GENESIS_TIME);
                }
                pool
            },
            |mut pool| black_box(pool.expire(GENESIS_TIME + 61).len()),
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_linear_extension,
    bench_orphan_resolution,
    bench_dry_run,
    bench_orphan_pool,
);

criterion_main!(benches);
