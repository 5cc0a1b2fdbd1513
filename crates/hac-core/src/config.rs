use serde::{Deserialize, Serialize};

use crate::constants::{
    ALPHA, ATTRACTOR_THRESHOLD, ATTRACTOR_WINDOW, BETA, GAMMA, LOG_CAPACITY, NOISE_SCALE,
    STATE_DIMENSION, TRAJECTORY_CAPACITY,
};
use crate::error::{CoreError, Result};
use crate::state::StateWeights;

/// Tunables for a `HarmonicSystem`. Every field has a default, so a partial
/// TOML file is enough.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Composition log ring-buffer size.
    pub log_capacity: usize,
    /// Attractor trajectory ring-buffer size.
    pub trajectory_capacity: usize,
    /// Minimum resonance between an attractor and each window point.
    pub attractor_threshold: f64,
    /// Record every composition result on the attractor trajectory.
    pub track_compositions: bool,
    pub state: StateConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_capacity: LOG_CAPACITY,
            trajectory_capacity: TRAJECTORY_CAPACITY,
            attractor_threshold: ATTRACTOR_THRESHOLD,
            track_compositions: true,
            state: StateConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    pub dimension: usize,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    /// Half-width of the default uniform sensory noise.
    pub noise_scale: f64,
    /// Fixed noise seed for reproducible runs; OS entropy when absent.
    pub seed: Option<u64>,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            dimension: STATE_DIMENSION,
            alpha: ALPHA,
            beta: BETA,
            gamma: GAMMA,
            noise_scale: NOISE_SCALE,
            seed: None,
        }
    }
}

impl StateConfig {
    pub fn weights(&self) -> StateWeights {
        StateWeights {
            alpha: self.alpha,
            beta: self.beta,
            gamma: self.gamma,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.log_capacity == 0 {
            return Err(CoreError::InvalidConfig("log_capacity must be positive".into()));
        }
        if self.trajectory_capacity < ATTRACTOR_WINDOW {
            return Err(CoreError::InvalidConfig(format!(
                "trajectory_capacity must be at least {ATTRACTOR_WINDOW}"
            )));
        }
        if !(self.attractor_threshold > 0.0 && self.attractor_threshold <= 1.0) {
            return Err(CoreError::InvalidConfig(format!(
                "attractor_threshold must be in (0, 1], got {}",
                self.attractor_threshold
            )));
        }
        if self.state.dimension == 0 {
            return Err(CoreError::InvalidConfig("state.dimension must be positive".into()));
        }
        if !self.state.noise_scale.is_finite() || self.state.noise_scale < 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "state.noise_scale must be finite and non-negative, got {}",
                self.state.noise_scale
            )));
        }
        self.state.weights().validate()
    }
}
