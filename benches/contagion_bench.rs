//! Criterion benchmarks for u-contagion.
//!
//! Uses synthetic contact graphs (random relations, a few infected seeds) to
//! measure epidemic simulation and the generation loop.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use u_contagion::epidemic::Population;
use u_contagion::ga::{Chromosome, Evolution, IsolationConfig, SeededPolicy};

// ===========================================================================
// Synthetic contact graph
// ===========================================================================

fn random_population(persons: usize, relations: usize, infected: usize, seed: u64) -> Population {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut pop = Population::new(persons);
    while pop.relations().len() < relations {
        let i = rng.random_range(0..persons);
        let j = rng.random_range(0..persons);
        pop.add_relation(i, j);
    }
    while pop.infected().len() < infected {
        pop.add_infected(rng.random_range(0..persons));
    }
    pop
}

fn bench_cost(c: &mut Criterion) {
    let mut group = c.benchmark_group("chromosome_cost");

    for (persons, relations, infected) in [(100usize, 300usize, 3usize), (1000, 3000, 30)] {
        let pop = random_population(persons, relations, infected, 42);
        let config = IsolationConfig::default().with_virality(3).with_seed(7);
        let chromosome = Chromosome::random(&pop, &mut SeededPolicy::new(config));
        group.bench_with_input(
            BenchmarkId::new(format!("n{}_m{}", persons, relations), persons),
            &(pop, chromosome),
            |b, (p, c)| b.iter(|| black_box(c.cost(black_box(p), 3))),
        );
    }
    group.finish();
}

fn bench_evolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("evolution");
    group.sample_size(10);

    for parallel in [false, true] {
        let pop = random_population(200, 600, 6, 42);
        let config = IsolationConfig::default()
            .with_virality(3)
            .with_seed(42)
            .with_max_generations(5)
            .with_parallel(parallel);
        group.bench_with_input(
            BenchmarkId::new("g5", if parallel { "parallel" } else { "sequential" }),
            &(pop, config),
            |b, (p, c)| {
                b.iter(|| {
                    let mut evolution = Evolution::new(p, SeededPolicy::new(c.clone()))
                        .expect("valid configuration");
                    black_box(evolution.run(|_| {}).expect("first run"))
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_cost, bench_evolution);
criterion_main!(benches);
