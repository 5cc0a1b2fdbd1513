use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::compose::compose;
use crate::constants::LOG_CAPACITY;
use crate::error::{CoreError, Result};
use crate::space::VectorSpace;
use crate::time::now_unix_f64;
use crate::vector::HarmonicVector;

/// One successful (or recorded) composition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompositionLogEntry {
    #[serde(rename = "v1")]
    pub left: HarmonicVector,
    #[serde(rename = "v2")]
    pub right: HarmonicVector,
    #[serde(rename = "v3")]
    pub result: Option<HarmonicVector>,
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
}

/// Drives composition against a space, logging results in a bounded ring
/// buffer and feeding them back into the space.
#[derive(Clone, Debug)]
pub struct CompositionStream {
    log: VecDeque<CompositionLogEntry>,
    capacity: usize,
}

impl Default for CompositionStream {
    fn default() -> Self {
        Self::with_capacity(LOG_CAPACITY)
    }
}

impl CompositionStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero capacity is raised to 1.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            log: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Compose `left` and `right` against everything in `space`.
    ///
    /// An empty space, or a pool with nothing to pick, is a normal negative
    /// outcome: `Ok(None)`, with the log untouched. Operands that do not
    /// match the space's dimension are rejected.
    pub fn stream(
        &mut self,
        space: &mut VectorSpace,
        left: &HarmonicVector,
        right: &HarmonicVector,
    ) -> Result<Option<HarmonicVector>> {
        if left.dimension() != right.dimension() {
            return Err(CoreError::DimensionMismatch {
                expected: left.dimension(),
                actual: right.dimension(),
            });
        }
        let Some(expected) = space.dimension() else {
            tracing::warn!("composition skipped: vector space is empty");
            return Ok(None);
        };
        if left.dimension() != expected {
            return Err(CoreError::DimensionMismatch {
                expected,
                actual: left.dimension(),
            });
        }

        let Some(result) = compose(left, right, space.all()) else {
            tracing::warn!("composition produced no result for {left} and {right}");
            return Ok(None);
        };

        if space.add(result.clone())? {
            tracing::debug!("composition grew space to {}", space.len());
        }
        self.push(CompositionLogEntry {
            left: left.clone(),
            right: right.clone(),
            result: Some(result.clone()),
            timestamp: now_unix_f64(),
        });
        Ok(Some(result))
    }

    /// Append an entry, evicting the oldest once capacity is exceeded.
    pub fn push(&mut self, entry: CompositionLogEntry) {
        if self.log.len() == self.capacity {
            self.log.pop_front();
        }
        self.log.push_back(entry);
    }

    /// Log entries, oldest first.
    pub fn history(&self) -> &VecDeque<CompositionLogEntry> {
        &self.log
    }

    pub fn clear_history(&mut self) {
        self.log.clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
