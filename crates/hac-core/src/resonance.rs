//! Pairwise affinity between harmonic vectors.

use crate::vector::HarmonicVector;

/// Largest absolute coordinate; 0.0 only for the zero vector.
fn max_abs(coords: &[f64]) -> f64 {
    coords.iter().fold(0.0_f64, |m, c| m.max(c.abs()))
}

/// Cosine similarity of the coordinates, `1 - cosine_distance(a, b)`.
///
/// Range: [-1, +1]. Anti-aligned vectors resonate negatively; the value is
/// not clamped to [0, 1]. Returns exactly 0.0 when either vector is the zero
/// vector or when the dimensions differ.
///
/// Each side is divided by its largest absolute coordinate first, so the
/// result does not depend on scale and neither underflows nor overflows.
pub fn resonance(a: &HarmonicVector, b: &HarmonicVector) -> f64 {
    if a.dimension() != b.dimension() {
        return 0.0;
    }
    let (sa, sb) = (max_abs(a.coordinates()), max_abs(b.coordinates()));
    if sa == 0.0 || sb == 0.0 {
        return 0.0;
    }
    let (mut dot, mut na, mut nb) = (0.0, 0.0, 0.0);
    for (x, y) in a.coordinates().iter().zip(b.coordinates()) {
        let (x, y) = (x / sa, y / sb);
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    // na and nb are at least 1: the largest coordinate scales to +-1
    (dot / (na.sqrt() * nb.sqrt())).clamp(-1.0, 1.0)
}

/// Phase misalignment: |a.tag - b.tag|.
pub fn tag_gap(a: &HarmonicVector, b: &HarmonicVector) -> f64 {
    (a.tag() - b.tag()).abs()
}
