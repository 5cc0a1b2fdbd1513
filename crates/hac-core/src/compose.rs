//! Composition: synthesize a vector for two operands by picking the
//! best-resonating member of a candidate pool.
//!
//! score(c) = resonance(c, left) * resonance(c, right) * exp(-tag_gap(left, right))
//!
//! The tag-gap factor depends only on the operands, so within one call it
//! scales every score uniformly and never changes which candidate wins. It
//! does change the reported scores.

use crate::resonance::{resonance, tag_gap};
use crate::vector::HarmonicVector;

/// A candidate together with its composition score.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoredCandidate {
    /// Position of the candidate in the pool it was scored from.
    pub index: usize,
    pub score: f64,
}

/// Composition score of a single candidate.
pub fn score(candidate: &HarmonicVector, left: &HarmonicVector, right: &HarmonicVector) -> f64 {
    resonance(candidate, left) * resonance(candidate, right) * (-tag_gap(left, right)).exp()
}

/// Score every usable candidate, best first. Ties keep pool order.
///
/// Candidates whose dimension differs from `left` are not usable and are
/// skipped.
pub fn rank(
    left: &HarmonicVector,
    right: &HarmonicVector,
    candidates: &[HarmonicVector],
) -> Vec<ScoredCandidate> {
    let mut scored: Vec<ScoredCandidate> = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| c.dimension() == left.dimension())
        .map(|(index, c)| ScoredCandidate {
            index,
            score: score(c, left, right),
        })
        .filter(|s| !s.score.is_nan())
        .collect();
    // Stable sort: equal scores stay in pool order
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}

/// Index and score of the best candidate. First seen wins on exact ties.
pub fn best_candidate(
    left: &HarmonicVector,
    right: &HarmonicVector,
    candidates: &[HarmonicVector],
) -> Option<ScoredCandidate> {
    let mut best: Option<ScoredCandidate> = None;
    for (index, c) in candidates.iter().enumerate() {
        if c.dimension() != left.dimension() {
            continue;
        }
        let s = score(c, left, right);
        if s.is_nan() {
            continue;
        }
        if best.as_ref().is_none_or(|b| s > b.score) {
            best = Some(ScoredCandidate { index, score: s });
        }
    }
    best
}

/// Compose `left` and `right` against `candidates`.
///
/// Returns `None` when the pool is empty or holds no candidate of the
/// operands' dimension. Pure: nothing is mutated.
pub fn compose(
    left: &HarmonicVector,
    right: &HarmonicVector,
    candidates: &[HarmonicVector],
) -> Option<HarmonicVector> {
    best_candidate(left, right, candidates).map(|best| candidates[best.index].clone())
}
