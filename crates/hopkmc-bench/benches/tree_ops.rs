//! Criterion benchmarks for event-tree construction and descent.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use hopkmc_bench::reference_profile;
use hopkmc_engine::Simulation;

fn bench_build_10k(c: &mut Criterion) {
    let (graph, config) = reference_profile(42);
    c.bench_function("build_10k_sites", |b| {
        b.iter(|| {
            let sim = Simulation::new(graph.clone(), config.clone()).unwrap();
            black_box(sim.events().len());
        });
    });
}

fn bench_select_10k(c: &mut Criterion) {
    let (graph, config) = reference_profile(42);
    let sim = Simulation::new(graph, config).unwrap();
    let total = sim.total_rate();
    let mut i = 0u64;
    c.bench_function("select_10k_sites", |b| {
        b.iter(|| {
            // Golden-ratio stride spreads targets over [0, total).
            i = i.wrapping_add(1);
            let v = (i as f64 * 0.618_033_988_749_895).fract() * total;
            black_box(sim.events().select(v));
        });
    });
}

fn bench_fresh_total_10k(c: &mut Criterion) {
    let (graph, config) = reference_profile(42);
    let sim = Simulation::new(graph, config).unwrap();
    c.bench_function("fresh_total_rate_10k_sites", |b| {
        b.iter(|| {
            let events = sim.events();
            black_box(events.fresh_rate(events.head()));
        });
    });
}

criterion_group!(benches, bench_build_10k, bench_select_10k, bench_fresh_total_10k);
criterion_main!(benches);
