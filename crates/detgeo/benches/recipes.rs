mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use detgeo::geometry::{ParamValue, ParameterSet};
use detgeo::registry::GeometryRegistry;
use detgeo::seeding::{event_rng, DEFAULT_SEED};
use rand::rngs::StdRng;
use rand::SeedableRng;

const DRAWS: usize = 10_000;
const FIBER_COUNTS: [i64; 4] = [1, 7, 16, 64];

fn recipes_construct_benches(c: &mut Criterion) {
    let registry = GeometryRegistry::with_builtin_recipes().expect("builtin recipes");
    let mut group = c.benchmark_group("recipes/construct");

    let names: Vec<&'static str> = registry.names().collect();
    for name in names {
        group.bench_with_input(BenchmarkId::from_parameter(name), &name, |b, name| {
            b.iter(|| {
                let mut geometry = registry.create(name).expect("registered recipe");
                geometry.configure(&ParameterSet::new()).expect("defaults are valid");
                black_box(geometry.construct().expect("construction succeeds").node_count())
            });
        });
    }

    group.finish();
}

fn recipes_fibre_vertex_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("recipes/optical_fibre/FIBER");
    group.throughput(common::elements_throughput(DRAWS));

    for &count in &FIBER_COUNTS {
        let params = ParameterSet::new()
            .with("geometry.optical_fibre.num_fibers", ParamValue::Integer(count));
        let geometry = common::constructed("OpticalFibre", &params);
        let mut rng = StdRng::seed_from_u64(0xF1B3 ^ count as u64);

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                for _ in 0..DRAWS {
                    black_box(geometry.generate_vertex("FIBER", &mut rng).expect("vertex"));
                }
            });
        });
    }

    group.finish();
}

fn recipes_event_stream_benches(c: &mut Criterion) {
    let params = ParameterSet::new()
        .with("geometry.black_box.membrane_hole", ParamValue::Flag(true));
    let geometry = common::constructed("BlackBox", &params);

    let mut group = c.benchmark_group("recipes/black_box/MEMBRANE_HOLE");
    group.throughput(common::elements_throughput(DRAWS));
    group.bench_function("event_rng_per_vertex", |b| {
        b.iter(|| {
            for event in 0..DRAWS as u64 {
                let mut rng = event_rng(DEFAULT_SEED, event);
                black_box(geometry.generate_vertex("MEMBRANE_HOLE", &mut rng).expect("vertex"));
            }
        });
    });
    group.finish();
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = recipes_construct_benches, recipes_fibre_vertex_benches, recipes_event_stream_benches
}
criterion_main!(benches);
