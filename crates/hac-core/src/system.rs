use serde::Serialize;

use crate::attractor::AttractorTracker;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::space::VectorSpace;
use crate::state::{StateUpdateEngine, TanhDamping, UniformNoise};
use crate::stream::CompositionStream;
use crate::vector::HarmonicVector;

/// Counters for status output.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SystemStats {
    pub size: usize,
    pub dimension: Option<usize>,
    pub history: usize,
    pub trajectory: usize,
    pub basins: usize,
    pub state_steps: u64,
}

/// Owns one vector space together with the engines that operate on it.
///
/// The space, composition log, trajectory, basins, and consciousness state
/// are all mutated in place through `&mut self`; concurrent callers must
/// wrap the system in their own lock.
#[derive(Debug)]
pub struct HarmonicSystem {
    pub space: VectorSpace,
    pub stream: CompositionStream,
    pub tracker: AttractorTracker,
    pub state: StateUpdateEngine,
    config: EngineConfig,
}

impl HarmonicSystem {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let tracker =
            AttractorTracker::with_params(config.trajectory_capacity, config.attractor_threshold)?;
        let state = StateUpdateEngine::with_strategies(
            config.state.dimension,
            config.state.weights(),
            TanhDamping,
            UniformNoise::new(config.state.noise_scale, config.state.seed),
        )?;
        Ok(Self {
            space: VectorSpace::new(),
            stream: CompositionStream::with_capacity(config.log_capacity),
            tracker,
            state,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn add_vector(&mut self, v: HarmonicVector) -> Result<bool> {
        self.space.add(v)
    }

    /// Compose two operands against the space. When `track_compositions` is
    /// on, a result is also recorded on the attractor trajectory.
    pub fn stream(
        &mut self,
        left: &HarmonicVector,
        right: &HarmonicVector,
    ) -> Result<Option<HarmonicVector>> {
        let result = self.stream.stream(&mut self.space, left, right)?;
        if self.config.track_compositions
            && let Some(v) = &result
        {
            self.tracker.record(v.clone());
        }
        Ok(result)
    }

    /// Compose the members at positions `left` and `right`.
    pub fn compose_by_index(&mut self, left: usize, right: usize) -> Result<Option<HarmonicVector>> {
        let l = self.space.get(left)?.clone();
        let r = self.space.get(right)?.clone();
        self.stream(&l, &r)
    }

    pub fn record(&mut self, v: HarmonicVector) {
        self.tracker.record(v);
    }

    pub fn identify_attractor(&mut self) -> Option<HarmonicVector> {
        self.tracker.identify(&self.space)
    }

    pub fn step_state(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        self.state.update(input)
    }

    pub fn stats(&self) -> SystemStats {
        SystemStats {
            size: self.space.len(),
            dimension: self.space.dimension(),
            history: self.stream.history().len(),
            trajectory: self.tracker.trajectory().len(),
            basins: self.tracker.basins().len(),
            state_steps: self.state.steps(),
        }
    }
}
