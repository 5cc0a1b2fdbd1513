use std::collections::HashSet;

use hac_core::{
    ATTRACTOR_WINDOW, AttractorTracker, CompositionStream, HarmonicVector, VectorSpace, compose,
    resonance,
};
use proptest::prelude::*;

/// Coordinates spanning roughly 1e-150 to 1e150.
fn coord() -> impl Strategy<Value = f64> {
    (-1.0..1.0f64, -150i32..150).prop_map(|(m, e)| m * 10f64.powi(e))
}

fn coords(len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(coord(), len)
}

fn vector(len: usize) -> impl Strategy<Value = HarmonicVector> {
    (coords(len), -10.0..10.0f64).prop_map(|(v, tag)| HarmonicVector::new(v, tag).unwrap())
}

#[test]
fn add_twice_keeps_size() {
    proptest!(|(vs in prop::collection::vec(vector(4), 1..20))| {
        let mut space = VectorSpace::new();
        for v in &vs {
            space.add(v.clone()).unwrap();
        }
        let size = space.len();
        for v in &vs {
            prop_assert!(!space.add(v.clone()).unwrap());
        }
        prop_assert_eq!(space.len(), size);
    });
}

#[test]
fn self_resonance_is_one() {
    proptest!(|(v in vector(8))| {
        prop_assume!(v.magnitude() > 0.0);
        prop_assert!((resonance(&v, &v) - 1.0).abs() < 1e-9);
    });
}

#[test]
fn resonance_ignores_scale() {
    proptest!(|(v in vector(4), e in -100i32..100)| {
        prop_assume!(v.magnitude() > 0.0);
        let factor = 10f64.powi(e);
        let scaled: Vec<f64> = v.coordinates().iter().map(|c| c * factor).collect();
        let w = HarmonicVector::new(scaled, v.tag()).unwrap();
        prop_assert!((resonance(&v, &w) - 1.0).abs() < 1e-9);
    });
}

#[test]
fn zero_vector_resonance_is_zero() {
    proptest!(|(x in vector(6))| {
        let zero = HarmonicVector::new(vec![0.0; 6], 0.0).unwrap();
        prop_assert_eq!(resonance(&zero, &x), 0.0);
    });
}

#[test]
fn resonance_is_symmetric_and_bounded() {
    proptest!(|(a in vector(5), b in vector(5))| {
        let r = resonance(&a, &b);
        prop_assert!((-1.0..=1.0).contains(&r));
        prop_assert!((r - resonance(&b, &a)).abs() < 1e-12);
    });
}

#[test]
fn compose_returns_pool_member() {
    proptest!(|(pool in prop::collection::vec(vector(3), 1..30), l in vector(3), r in vector(3))| {
        let result = compose(&l, &r, &pool).unwrap();
        prop_assert!(pool.contains(&result));
    });
}

#[test]
fn stream_growth_is_at_most_one() {
    proptest!(|(pool in prop::collection::vec(vector(3), 1..30), l in vector(3), r in vector(3))| {
        let mut space = VectorSpace::with_vectors(pool).unwrap();
        let mut stream = CompositionStream::new();
        let before = space.len();
        let result = stream.stream(&mut space, &l, &r).unwrap();
        prop_assert!(result.is_some());
        prop_assert!(space.len() - before <= 1);
        prop_assert_eq!(stream.history().len(), 1);
    });
}

#[test]
fn identify_needs_window() {
    proptest!(|(points in prop::collection::vec(vector(2), 0..ATTRACTOR_WINDOW))| {
        let space = VectorSpace::with_vectors(points.clone()).unwrap();
        let mut tracker = AttractorTracker::new();
        for p in points {
            tracker.record(p);
        }
        prop_assert_eq!(tracker.identify(&space), None);
    });
}

#[test]
fn sample_is_distinct_subset() {
    proptest!(|(vs in prop::collection::vec(vector(2), 0..25), k in 0usize..30, seed in any::<u64>())| {
        use rand::SeedableRng;
        let space = VectorSpace::with_vectors(vs).unwrap();
        let mut rng = rand::rngs::SmallRng::seed_from_u64(seed);
        let picked = space.sample(k, &mut rng);
        prop_assert_eq!(picked.len(), k.min(space.len()));
        let unique: HashSet<&HarmonicVector> = picked.iter().collect();
        prop_assert_eq!(unique.len(), picked.len());
        prop_assert!(picked.iter().all(|v| space.contains(v)));
    });
}
