//! Search strategy benchmarks
//!
//! Run with: cargo bench
//!
//! Lookups run against a prepared snapshot, so the numbers reflect per-query
//! cost only; `prepare` measures the one-time index build per snapshot.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use lineseek::dataset::Dataset;
use lineseek::search::StrategyKind;

/// Lines shaped like the production dataset: `a;b;c;d;e;f;g;h;`
fn synthetic_lines(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            let x = i.wrapping_mul(2_654_435_761) % 1_000_003;
            format!("{};{};{};{};0;{};{};0;", x % 97, i % 13, x % 31, i % 29, x % 19, i % 7)
        })
        .collect()
}

fn bench_lookup(c: &mut Criterion) {
    for size in [10_000, 250_000] {
        let lines = synthetic_lines(size);
        let dataset = Dataset::from_lines(&lines);
        let hit = lines[size / 2].clone();
        let miss = "999;999;999;999;0;999;999;0;".to_string();

        let mut group = c.benchmark_group(format!("lookup_{}", size));
        for kind in StrategyKind::ALL {
            let strategy = kind.strategy();
            strategy.prepare(&dataset);

            group.bench_with_input(BenchmarkId::new(kind.to_string(), "hit"), &hit, |b, q| {
                b.iter(|| strategy.exists(black_box(q), &dataset))
            });
            group.bench_with_input(BenchmarkId::new(kind.to_string(), "miss"), &miss, |b, q| {
                b.iter(|| strategy.exists(black_box(q), &dataset))
            });
        }
        group.finish();
    }
}

fn bench_prepare(c: &mut Criterion) {
    let lines = synthetic_lines(250_000);

    let mut group = c.benchmark_group("prepare_250000");
    group.sample_size(10);
    for kind in [StrategyKind::Binary, StrategyKind::Set] {
        group.bench_function(kind.to_string(), |b| {
            b.iter_with_large_drop(|| {
                let dataset = Dataset::from_lines(&lines);
                kind.strategy().prepare(&dataset);
                dataset
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_lookup, bench_prepare);
criterion_main!(benches);
