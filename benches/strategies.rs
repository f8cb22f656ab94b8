//! Guillotine vs extreme point on identical inputs.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use load_it_now::model::{Container, Dimension, Item};
use load_it_now::optimizer::{PackingConfig, pack_with_config};
use load_it_now::spatial::PlacementStrategy;

fn strategy_benchmark(c: &mut Criterion) {
    let cases = [
        ("carton_50x30x40", (50.0, 30.0, 40.0), (10.0, 10.0, 5.0)),
        ("pallet_120x80x100", (120.0, 80.0, 100.0), (30.0, 20.0, 15.0)),
        ("odd_fit_97x61x43", (97.0, 61.0, 43.0), (12.0, 7.0, 9.0)),
    ];

    let mut group = c.benchmark_group("strategies");
    for (name, container_dims, item_dims) in cases {
        let container = Container::rectangular(container_dims).unwrap();
        let item = Item::new(0, Dimension::from_tuple(item_dims).unwrap());

        for strategy in [PlacementStrategy::Guillotine, PlacementStrategy::ExtremePoint] {
            let config = PackingConfig::builder().strategy(strategy).build();
            group.bench_with_input(BenchmarkId::new(strategy.code(), name), &config, |b, config| {
                b.iter(|| {
                    let result = pack_with_config(black_box(&container), black_box(&item), *config);
                    black_box(result)
                })
            });
        }
    }
    group.finish();
}

criterion_group!(benches, strategy_benchmark);
criterion_main!(benches);
