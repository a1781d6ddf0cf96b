use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use timetabler::{
    catalog::EventCatalog,
    evolution::{EvolutionLauncher, EvolutionOptions},
    rng::RandomNumberGenerator,
};

fn catalog() -> EventCatalog {
    let durations: Vec<usize> = (0..60).map(|i| 2 + (i * 5) % 11).collect();
    EventCatalog::from_durations(5, 5, 48, &durations).unwrap()
}

fn bench_generations(c: &mut Criterion) {
    let mut group = c.benchmark_group("evolution");
    group.sample_size(10);

    // Sequential below the threshold, rayon above it.
    for (name, threshold) in [("sequential", usize::MAX), ("parallel", 1)].iter() {
        for population in [20, 100].iter() {
            let options = EvolutionOptions::builder()
                .num_generations(10)
                .population_size(*population)
                .num_offspring(*population)
                .parallel_threshold(*threshold)
                .build();
            let launcher = EvolutionLauncher::new(catalog(), options).unwrap();

            group.bench_function(BenchmarkId::new(*name, population), |b| {
                b.iter(|| {
                    let mut rng = RandomNumberGenerator::from_seed(42);
                    launcher.evolve(&mut rng).unwrap()
                })
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_generations);
criterion_main!(benches);
