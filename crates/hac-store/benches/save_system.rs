use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use hac_core::{EngineConfig, HarmonicSystem, HarmonicVector};
use hac_store::Store;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn make_system(size: usize, dim: usize) -> HarmonicSystem {
    let mut rng = SmallRng::seed_from_u64(42);
    let mut system = HarmonicSystem::new(EngineConfig::default()).unwrap();
    for _ in 0..size {
        let coords = (0..dim).map(|_| rng.random_range(-1.0..1.0)).collect();
        let v = HarmonicVector::new(coords, rng.random_range(0.0..1.0)).unwrap();
        system.add_vector(v).unwrap();
    }
    for _ in 0..20 {
        let l = rng.random_range(0..size);
        let r = rng.random_range(0..size);
        system.compose_by_index(l, r).unwrap();
    }
    system
}

fn bench_save(c: &mut Criterion) {
    let mut group = c.benchmark_group("save_system");
    group.sample_size(20);

    for &size in &[100usize, 1_000] {
        let system = make_system(size, 64);
        let store = Store::open_in_memory().unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &system, |b, system| {
            b.iter(|| store.save_system(black_box(system)).unwrap())
        });
    }
    group.finish();
}

fn bench_load(c: &mut Criterion) {
    let system = make_system(1_000, 64);
    let store = Store::open_in_memory().unwrap();
    store.save_system(&system).unwrap();

    c.bench_function("load_system_1000", |b| {
        b.iter(|| store.load_system(EngineConfig::default()).unwrap())
    });
}

criterion_group!(benches, bench_save, bench_load);
criterion_main!(benches);
