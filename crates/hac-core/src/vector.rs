use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::serde_compat::VectorRecord;

/// Elementary value of the space: a coordinate vector with a scalar phase tag.
///
/// Immutable once built. Equality and hashing are structural, so two vectors
/// with identical coordinates and tag are the same set member regardless of
/// where they were constructed. Non-finite values are rejected at
/// construction, which keeps `Eq` lawful.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "VectorRecord", into = "VectorRecord")]
pub struct HarmonicVector {
    coordinates: Vec<f64>,
    tag: f64,
}

impl Eq for HarmonicVector {}

impl Hash for HarmonicVector {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.coordinates.len().hash(state);
        for &c in &self.coordinates {
            canonical_bits(c).hash(state);
        }
        canonical_bits(self.tag).hash(state);
    }
}

/// `0.0 == -0.0`, so both must hash alike.
fn canonical_bits(x: f64) -> u64 {
    if x == 0.0 { 0 } else { x.to_bits() }
}

impl HarmonicVector {
    pub fn new(coordinates: Vec<f64>, tag: f64) -> Result<Self> {
        if coordinates.is_empty() {
            return Err(CoreError::EmptyVector);
        }
        if let Some((index, &value)) = coordinates.iter().enumerate().find(|(_, c)| !c.is_finite())
        {
            return Err(CoreError::NonFinite { index, value });
        }
        if !tag.is_finite() {
            return Err(CoreError::NonFinite {
                index: coordinates.len(),
                value: tag,
            });
        }
        Ok(Self { coordinates, tag })
    }

    pub fn coordinates(&self) -> &[f64] {
        &self.coordinates
    }

    /// Scalar phase weight ("omega" on the wire).
    pub fn tag(&self) -> f64 {
        self.tag
    }

    pub fn dimension(&self) -> usize {
        self.coordinates.len()
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.coordinates
            .iter()
            .zip(&other.coordinates)
            .map(|(a, b)| a * b)
            .sum()
    }

    /// Euclidean norm of the coordinates, scaled by the largest component so
    /// tiny or huge coordinates do not underflow or overflow on the way.
    pub fn magnitude(&self) -> f64 {
        let max = self.coordinates.iter().fold(0.0_f64, |m, c| m.max(c.abs()));
        if max == 0.0 {
            return 0.0;
        }
        let sum: f64 = self.coordinates.iter().map(|c| (c / max) * (c / max)).sum();
        max * sum.sqrt()
    }

    pub fn into_parts(self) -> (Vec<f64>, f64) {
        (self.coordinates, self.tag)
    }
}

/// Stable string key, used for basin export.
impl fmt::Display for HarmonicVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HarmonicVector(v=[")?;
        for (i, c) in self.coordinates.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{c:?}")?;
        }
        write!(f, "], omega={:?})", self.tag)
    }
}

impl TryFrom<VectorRecord> for HarmonicVector {
    type Error = CoreError;

    fn try_from(record: VectorRecord) -> Result<Self> {
        Self::new(record.v, record.omega)
    }
}

impl From<HarmonicVector> for VectorRecord {
    fn from(vector: HarmonicVector) -> Self {
        let (v, omega) = vector.into_parts();
        VectorRecord { v, omega }
    }
}

impl From<&HarmonicVector> for VectorRecord {
    fn from(vector: &HarmonicVector) -> Self {
        VectorRecord {
            v: vector.coordinates.clone(),
            omega: vector.tag,
        }
    }
}
