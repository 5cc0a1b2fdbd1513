use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::constants::{ATTRACTOR_THRESHOLD, ATTRACTOR_WINDOW, TRAJECTORY_CAPACITY};
use crate::error::{CoreError, Result};
use crate::resonance::resonance;
use crate::serde_compat::VectorRecord;
use crate::space::VectorSpace;
use crate::vector::HarmonicVector;

/// An attractor and the trajectory points confirmed to fall in its basin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Basin {
    pub attractor: HarmonicVector,
    pub members: Vec<HarmonicVector>,
}

impl Basin {
    fn absorb(&mut self, point: &HarmonicVector) {
        if !self.members.contains(point) {
            self.members.push(point.clone());
        }
    }
}

/// Tracks a bounded trajectory and detects convergence toward a member of
/// the vector space.
///
/// An attractor is the first space member (insertion order) that resonates
/// at or above `threshold` with every one of the last `ATTRACTOR_WINDOW`
/// recorded points.
#[derive(Clone, Debug)]
pub struct AttractorTracker {
    trajectory: VecDeque<HarmonicVector>,
    capacity: usize,
    threshold: f64,
    basins: Vec<Basin>,
}

impl Default for AttractorTracker {
    fn default() -> Self {
        Self {
            trajectory: VecDeque::with_capacity(TRAJECTORY_CAPACITY),
            capacity: TRAJECTORY_CAPACITY,
            threshold: ATTRACTOR_THRESHOLD,
            basins: Vec::new(),
        }
    }
}

impl AttractorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Threshold must lie in (0, 1]; capacity must hold a full window.
    pub fn with_params(capacity: usize, threshold: f64) -> Result<Self> {
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(CoreError::InvalidConfig(format!(
                "attractor threshold must be in (0, 1], got {threshold}"
            )));
        }
        if capacity < ATTRACTOR_WINDOW {
            return Err(CoreError::InvalidConfig(format!(
                "trajectory capacity {capacity} is smaller than the attractor window {ATTRACTOR_WINDOW}"
            )));
        }
        Ok(Self {
            trajectory: VecDeque::with_capacity(capacity),
            capacity,
            threshold,
            basins: Vec::new(),
        })
    }

    /// Append a point, evicting the oldest beyond capacity.
    pub fn record(&mut self, v: HarmonicVector) {
        if self.trajectory.len() == self.capacity {
            self.trajectory.pop_front();
        }
        self.trajectory.push_back(v);
    }

    /// Look for an attractor among `space`'s members for the recent window.
    ///
    /// Returns `None` with fewer than `ATTRACTOR_WINDOW` recorded points or
    /// when no member qualifies. On success the window points join the
    /// attractor's basin (each at most once).
    pub fn identify(&mut self, space: &VectorSpace) -> Option<HarmonicVector> {
        if self.trajectory.len() < ATTRACTOR_WINDOW {
            tracing::debug!(
                "attractor search needs {ATTRACTOR_WINDOW} points, have {}",
                self.trajectory.len()
            );
            return None;
        }
        let window: Vec<&HarmonicVector> = self
            .trajectory
            .iter()
            .skip(self.trajectory.len() - ATTRACTOR_WINDOW)
            .collect();

        let attractor = space
            .all()
            .iter()
            .find(|c| window.iter().all(|p| resonance(p, c) >= self.threshold))?
            .clone();

        let pos = match self.basins.iter().position(|b| b.attractor == attractor) {
            Some(pos) => pos,
            None => {
                tracing::info!("new attractor basin: {attractor}");
                self.basins.push(Basin {
                    attractor: attractor.clone(),
                    members: Vec::new(),
                });
                self.basins.len() - 1
            }
        };
        for point in window {
            self.basins[pos].absorb(point);
        }
        Some(attractor)
    }

    /// Basins in creation order.
    pub fn basins(&self) -> &[Basin] {
        &self.basins
    }

    pub fn basin_for(&self, attractor: &HarmonicVector) -> Option<&Basin> {
        self.basins.iter().find(|b| &b.attractor == attractor)
    }

    /// Serializable snapshot keyed by the attractor's stable string form.
    pub fn basin_export(&self) -> BTreeMap<String, Vec<VectorRecord>> {
        self.basins
            .iter()
            .map(|b| {
                (
                    b.attractor.to_string(),
                    b.members.iter().map(VectorRecord::from).collect(),
                )
            })
            .collect()
    }

    /// Restore a basin wholesale (used when reloading persisted state).
    pub fn insert_basin(&mut self, basin: Basin) {
        match self
            .basins
            .iter_mut()
            .find(|b| b.attractor == basin.attractor)
        {
            Some(existing) => {
                for m in &basin.members {
                    existing.absorb(m);
                }
            }
            None => self.basins.push(basin),
        }
    }

    /// Recorded points, oldest first.
    pub fn trajectory(&self) -> &VecDeque<HarmonicVector> {
        &self.trajectory
    }

    pub fn clear_trajectory(&mut self) {
        self.trajectory.clear();
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
