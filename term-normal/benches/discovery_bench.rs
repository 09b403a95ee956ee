use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use term_normal::core::{Normalizer, NormalizerConfig};
use term_normal::cover::minimal_cover;
use term_normal::discovery::{DiscoveryConfig, FdDiscovery};
use term_normal::test_fixtures::{chain, random_relation};

fn benchmark_discovery_width(c: &mut Criterion) {
    let mut group = c.benchmark_group("discovery_width");
    group.sample_size(20);

    let rows = 2_000;
    for width in [4, 6, 8, 10].iter() {
        let relation = random_relation(rows, *width, 6, 42);
        group.throughput(Throughput::Elements(rows as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("w{width}")),
            &relation,
            |b, relation| {
                let discovery = FdDiscovery::new(DiscoveryConfig::exact());
                b.iter(|| discovery.discover(std::hint::black_box(relation)).unwrap());
            },
        );
    }

    group.finish();
}

fn benchmark_discovery_workers(c: &mut Criterion) {
    let mut group = c.benchmark_group("discovery_workers");
    group.sample_size(20);

    let relation = random_relation(10_000, 8, 12, 7);
    for workers in [1, 2, 4].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("workers{workers}")),
            workers,
            |b, &workers| {
                let discovery = FdDiscovery::builder()
                    .error_tolerance(0.0)
                    .workers(workers)
                    .build();
                b.iter(|| discovery.discover(std::hint::black_box(&relation)).unwrap());
            },
        );
    }

    group.finish();
}

fn benchmark_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");

    for rows in [1_000, 10_000].iter() {
        let relation = chain(*rows, 50);
        group.throughput(Throughput::Elements(*rows as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("chain{rows}")),
            &relation,
            |b, relation| {
                let normalizer = Normalizer::new(
                    NormalizerConfig::default().with_discovery(DiscoveryConfig::exact()),
                );
                b.iter(|| normalizer.normalize(std::hint::black_box(relation)).unwrap());
            },
        );
    }

    group.finish();
}

fn benchmark_minimal_cover(c: &mut Criterion) {
    let relation = random_relation(500, 8, 3, 11);
    let discovered = FdDiscovery::new(DiscoveryConfig::exact())
        .discover(&relation)
        .unwrap()
        .dependencies;

    c.bench_function("minimal_cover_random8", |b| {
        b.iter(|| minimal_cover(std::hint::black_box(&discovered), relation.schema()))
    });
}

criterion_group!(
    benches,
    benchmark_discovery_width,
    benchmark_discovery_workers,
    benchmark_pipeline,
    benchmark_minimal_cover
);
criterion_main!(benches);
