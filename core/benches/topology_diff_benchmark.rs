/// Topology diff and patch benchmarks using Criterion
///
/// Run with: cargo bench --bench topology_diff_benchmark
///
/// Benchmarks cover:
/// - Diff of a telemetry-only tick against a committed fleet
/// - Full engine patch pass through the in-memory sink
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use heimdall_core::render::MemorySink;
use heimdall_core::{ConnectionKind, Device, RenderEngine, TopologySnapshot, TopologyStore};

fn make_fleet(count: usize, tick: u64) -> TopologySnapshot {
    let devices = (0..count)
        .map(|i| {
            let kind = ConnectionKind::ALL[i % 3];
            let cpu = ((i as u64 * 7 + tick) % 100) as f64;
            Device::new(format!("device-{}", i), kind, cpu, 50.0, vec!["ping".into()])
                .expect("valid device")
        })
        .collect();
    TopologySnapshot::new(devices)
}

fn bench_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("topology_diff");

    for count in [10, 100, 1_000].iter() {
        let mut store = TopologyStore::new();
        store.commit(make_fleet(*count, 0));
        let next = make_fleet(*count, 1);

        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter(|| black_box(store.diff(black_box(&next))));
        });
    }

    group.finish();
}

fn bench_patch(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_patch");

    for count in [10, 100, 1_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let mut engine = RenderEngine::new(MemorySink::new());
            engine.apply(make_fleet(count, 0));
            let mut tick = 0u64;
            b.iter(|| {
                tick += 1;
                let report = engine.apply(make_fleet(count, tick));
                engine.sink_mut().drain_ops();
                black_box(report)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_diff, bench_patch);
criterion_main!(benches);
