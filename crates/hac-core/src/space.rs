use std::collections::HashSet;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::vector::HarmonicVector;

/// Deduplicated, growable collection of harmonic vectors.
///
/// Members keep insertion order, which is the iteration order for every
/// scan over the space; "first candidate wins" rules in composition and
/// attractor search resolve against it. The dimensionality is fixed by
/// the first member.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<HarmonicVector>", into = "Vec<HarmonicVector>")]
pub struct VectorSpace {
    members: Vec<HarmonicVector>,
    index: HashSet<HarmonicVector>,
}

impl VectorSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a space from an initial collection. Duplicates collapse.
    pub fn with_vectors(vectors: impl IntoIterator<Item = HarmonicVector>) -> Result<Self> {
        let mut space = Self::new();
        for v in vectors {
            space.add(v)?;
        }
        Ok(space)
    }

    /// Insert `v` unless a structurally equal member exists.
    /// Returns whether the space grew.
    pub fn add(&mut self, v: HarmonicVector) -> Result<bool> {
        if let Some(expected) = self.dimension()
            && v.dimension() != expected
        {
            return Err(CoreError::DimensionMismatch {
                expected,
                actual: v.dimension(),
            });
        }
        if self.index.contains(&v) {
            return Ok(false);
        }
        self.index.insert(v.clone());
        self.members.push(v);
        Ok(true)
    }

    /// Snapshot of all members in insertion order.
    pub fn all(&self) -> &[HarmonicVector] {
        &self.members
    }

    pub fn get(&self, index: usize) -> Result<&HarmonicVector> {
        self.members.get(index).ok_or(CoreError::IndexOutOfRange {
            index,
            len: self.members.len(),
        })
    }

    /// `k` distinct members chosen without replacement. Asking for more than
    /// the space holds returns every member.
    pub fn sample(&self, k: usize, rng: &mut impl Rng) -> Vec<HarmonicVector> {
        if k > self.members.len() {
            tracing::warn!(
                "sample size {k} exceeds space size {}, returning all members",
                self.members.len()
            );
            return self.members.clone();
        }
        self.members.choose_multiple(rng, k).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, v: &HarmonicVector) -> bool {
        self.index.contains(v)
    }

    /// Dimensionality shared by all members, `None` while empty.
    pub fn dimension(&self) -> Option<usize> {
        self.members.first().map(HarmonicVector::dimension)
    }

    /// Destructive load: the member set becomes exactly `vectors` (deduplicated).
    /// On error the space is left untouched.
    pub fn replace(&mut self, vectors: impl IntoIterator<Item = HarmonicVector>) -> Result<()> {
        *self = Self::with_vectors(vectors)?;
        Ok(())
    }
}

impl TryFrom<Vec<HarmonicVector>> for VectorSpace {
    type Error = CoreError;

    fn try_from(vectors: Vec<HarmonicVector>) -> Result<Self> {
        Self::with_vectors(vectors)
    }
}

impl From<VectorSpace> for Vec<HarmonicVector> {
    fn from(space: VectorSpace) -> Self {
        space.members
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    fn hv(v: &[f64], tag: f64) -> HarmonicVector {
        HarmonicVector::new(v.to_vec(), tag).unwrap()
    }

    fn make_space(n: usize) -> VectorSpace {
        VectorSpace::with_vectors((0..n).map(|i| hv(&[i as f64, 1.0], 0.1 * i as f64))).unwrap()
    }

    #[test]
    fn test_add_dedups() {
        let mut space = VectorSpace::new();
        assert!(space.add(hv(&[1.0, 0.0], 0.1)).unwrap());
        assert!(!space.add(hv(&[1.0, 0.0], 0.1)).unwrap());
        assert_eq!(space.len(), 1);

        // Same coordinates, different tag is a distinct member
        assert!(space.add(hv(&[1.0, 0.0], 0.2)).unwrap());
        assert_eq!(space.len(), 2);
    }

    #[test]
    fn test_add_rejects_dimension_mismatch() {
        let mut space = make_space(2);
        let err = space.add(hv(&[1.0, 2.0, 3.0], 0.0)).unwrap_err();
        assert_eq!(
            err,
            CoreError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        );
        assert_eq!(space.len(), 2);
    }

    #[test]
    fn test_all_keeps_insertion_order() {
        let space = make_space(4);
        let firsts: Vec<f64> = space.all().iter().map(|v| v.coordinates()[0]).collect();
        assert_eq!(firsts, vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_contains_and_get() {
        let space = make_space(3);
        assert!(space.contains(&hv(&[2.0, 1.0], 0.2)));
        assert!(!space.contains(&hv(&[2.0, 1.0], 0.3)));
        assert_eq!(space.get(1).unwrap(), &hv(&[1.0, 1.0], 0.1));
        assert_eq!(
            space.get(3).unwrap_err(),
            CoreError::IndexOutOfRange { index: 3, len: 3 }
        );
    }

    #[test]
    fn test_sample_distinct() {
        let space = make_space(10);
        let picked = space.sample(4, &mut rng());
        assert_eq!(picked.len(), 4);
        let unique: HashSet<_> = picked.iter().collect();
        assert_eq!(unique.len(), 4);
        assert!(picked.iter().all(|v| space.contains(v)));
    }

    #[test]
    fn test_sample_oversize_returns_all() {
        let space = make_space(3);
        let picked = space.sample(10, &mut rng());
        assert_eq!(picked.len(), 3);
    }

    #[test]
    fn test_dimension() {
        assert_eq!(VectorSpace::new().dimension(), None);
        assert_eq!(make_space(1).dimension(), Some(2));
    }

    #[test]
    fn test_replace_is_destructive() {
        let mut space = make_space(5);
        space.replace(vec![hv(&[9.0], 0.0), hv(&[9.0], 0.0)]).unwrap();
        assert_eq!(space.len(), 1);
        assert_eq!(space.dimension(), Some(1));
    }

    #[test]
    fn test_failed_replace_leaves_space_unchanged() {
        let mut space = make_space(5);
        let result = space.replace(vec![hv(&[1.0], 0.0), hv(&[1.0, 2.0], 0.0)]);
        assert!(result.is_err());
        assert_eq!(space.len(), 5);
    }

    #[test]
    fn test_serde_roundtrip_rebuilds_index() {
        let space = make_space(3);
        let json = serde_json::to_string(&space).unwrap();
        let mut back: VectorSpace = serde_json::from_str(&json).unwrap();
        assert_eq!(back.all(), space.all());
        assert!(!back.add(hv(&[0.0, 1.0], 0.0)).unwrap());
    }
}
