use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use hac_core::{AttractorTracker, HarmonicVector, VectorSpace, compose};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn random_space(size: usize, dim: usize, rng: &mut SmallRng) -> VectorSpace {
    let vectors = (0..size).map(|_| {
        let coords = (0..dim).map(|_| rng.random_range(-1.0..1.0)).collect();
        HarmonicVector::new(coords, rng.random_range(0.0..1.0)).unwrap()
    });
    VectorSpace::with_vectors(vectors).unwrap()
}

fn bench_compose(c: &mut Criterion) {
    let mut group = c.benchmark_group("compose");
    let mut rng = SmallRng::seed_from_u64(42);

    for &size in &[100usize, 1_000, 10_000] {
        let space = random_space(size, 64, &mut rng);
        let left = space.all()[0].clone();
        let right = space.all()[1].clone();
        group.bench_with_input(BenchmarkId::from_parameter(size), &space, |b, space| {
            b.iter(|| compose(black_box(&left), black_box(&right), space.all()))
        });
    }
    group.finish();
}

fn bench_identify(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(7);
    let space = random_space(1_000, 64, &mut rng);
    let mut tracker = AttractorTracker::new();
    for v in space.sample(5, &mut rng) {
        tracker.record(v);
    }

    c.bench_function("identify_1000", |b| {
        b.iter(|| black_box(&mut tracker).identify(black_box(&space)))
    });
}

criterion_group!(benches, bench_compose, bench_identify);
criterion_main!(benches);
