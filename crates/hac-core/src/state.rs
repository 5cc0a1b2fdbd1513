//! Consciousness state: a running vector replaced each step by
//! `alpha * input + beta * memory(prev) + gamma * sensory(D)`.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::constants::{ALPHA, BETA, GAMMA, NOISE_SCALE, WEIGHT_SUM_TOLERANCE};
use crate::error::{CoreError, Result};

/// Transforms the previous state into the memory term.
pub trait MemoryTransform: Send {
    fn transform(&self, previous: &[f64]) -> Vec<f64>;
}

impl<F> MemoryTransform for F
where
    F: Fn(&[f64]) -> Vec<f64> + Send,
{
    fn transform(&self, previous: &[f64]) -> Vec<f64> {
        self(previous)
    }
}

/// Produces the sensory perturbation for a state of the given dimension.
pub trait SensorySource: Send {
    fn sample(&mut self, dimension: usize) -> Vec<f64>;
}

impl<F> SensorySource for F
where
    F: FnMut(usize) -> Vec<f64> + Send,
{
    fn sample(&mut self, dimension: usize) -> Vec<f64> {
        self(dimension)
    }
}

/// Bounded damping: elementwise tanh squashes the previous state into (-1, 1).
#[derive(Clone, Copy, Debug, Default)]
pub struct TanhDamping;

impl MemoryTransform for TanhDamping {
    fn transform(&self, previous: &[f64]) -> Vec<f64> {
        previous.iter().map(|x| x.tanh()).collect()
    }
}

/// Zero-mean uniform noise in [-scale, scale].
#[derive(Clone, Debug)]
pub struct UniformNoise {
    scale: f64,
    rng: SmallRng,
}

impl UniformNoise {
    /// Noise in `[-scale, scale]`. A non-finite scale falls back to 0
    /// (silent source).
    pub fn new(scale: f64, seed: Option<u64>) -> Self {
        let scale = if scale.is_finite() {
            scale.abs()
        } else {
            tracing::warn!("non-finite noise scale {scale}, using 0");
            0.0
        };
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Self { scale, rng }
    }
}

impl Default for UniformNoise {
    fn default() -> Self {
        Self::new(NOISE_SCALE, None)
    }
}

impl SensorySource for UniformNoise {
    fn sample(&mut self, dimension: usize) -> Vec<f64> {
        if self.scale == 0.0 {
            return vec![0.0; dimension];
        }
        (0..dimension)
            .map(|_| self.rng.random_range(-self.scale..=self.scale))
            .collect()
    }
}

/// Blend weights. Each must be finite and non-negative; the sum is expected
/// to be near 1 but is not enforced.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateWeights {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl Default for StateWeights {
    fn default() -> Self {
        Self {
            alpha: ALPHA,
            beta: BETA,
            gamma: GAMMA,
        }
    }
}

impl StateWeights {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("alpha", self.alpha), ("beta", self.beta), ("gamma", self.gamma)] {
            if !value.is_finite() || value < 0.0 {
                return Err(CoreError::InvalidWeight { name, value });
            }
        }
        Ok(())
    }

    pub fn sum(&self) -> f64 {
        self.alpha + self.beta + self.gamma
    }
}

/// Snapshot of the running state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConsciousnessState {
    pub vector: Vec<f64>,
    #[serde(default)]
    pub steps: u64,
}

/// Maintains the consciousness state and applies the weighted update.
pub struct StateUpdateEngine {
    state: Vec<f64>,
    weights: StateWeights,
    memory: Box<dyn MemoryTransform>,
    sensory: Box<dyn SensorySource>,
    steps: u64,
}

impl std::fmt::Debug for StateUpdateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateUpdateEngine")
            .field("state", &self.state)
            .field("weights", &self.weights)
            .field("steps", &self.steps)
            .finish_non_exhaustive()
    }
}

impl StateUpdateEngine {
    /// Engine with default strategies: `TanhDamping` and OS-seeded `UniformNoise`.
    pub fn new(dimension: usize, weights: StateWeights) -> Result<Self> {
        Self::with_strategies(dimension, weights, TanhDamping, UniformNoise::default())
    }

    pub fn with_strategies(
        dimension: usize,
        weights: StateWeights,
        memory: impl MemoryTransform + 'static,
        sensory: impl SensorySource + 'static,
    ) -> Result<Self> {
        if dimension == 0 {
            return Err(CoreError::EmptyVector);
        }
        weights.validate()?;
        let sum = weights.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            tracing::warn!("state weights sum to {sum:.3}, expected ≈1");
        }
        Ok(Self {
            state: vec![0.0; dimension],
            weights,
            memory: Box::new(memory),
            sensory: Box::new(sensory),
            steps: 0,
        })
    }

    /// Advance one step with `input`. The new state replaces the old one.
    ///
    /// Fails without touching the state when `input` or either strategy's
    /// output has the wrong length.
    pub fn update(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        let d = self.state.len();
        if input.len() != d {
            return Err(CoreError::DimensionMismatch {
                expected: d,
                actual: input.len(),
            });
        }
        let memory = self.memory.transform(&self.state);
        if memory.len() != d {
            return Err(CoreError::DimensionMismatch {
                expected: d,
                actual: memory.len(),
            });
        }
        let sensory = self.sensory.sample(d);
        if sensory.len() != d {
            return Err(CoreError::DimensionMismatch {
                expected: d,
                actual: sensory.len(),
            });
        }

        let StateWeights { alpha, beta, gamma } = self.weights;
        self.state = input
            .iter()
            .zip(&memory)
            .zip(&sensory)
            .map(|((x, m), s)| alpha * x + beta * m + gamma * s)
            .collect();
        self.steps += 1;
        Ok(self.state.clone())
    }

    pub fn state(&self) -> &[f64] {
        &self.state
    }

    pub fn snapshot(&self) -> ConsciousnessState {
        ConsciousnessState {
            vector: self.state.clone(),
            steps: self.steps,
        }
    }

    /// Reinstate a persisted snapshot. Its dimension must match the engine's.
    pub fn restore(&mut self, snapshot: ConsciousnessState) -> Result<()> {
        if snapshot.vector.len() != self.state.len() {
            return Err(CoreError::DimensionMismatch {
                expected: self.state.len(),
                actual: snapshot.vector.len(),
            });
        }
        self.state = snapshot.vector;
        self.steps = snapshot.steps;
        Ok(())
    }

    pub fn dimension(&self) -> usize {
        self.state.len()
    }

    pub fn weights(&self) -> StateWeights {
        self.weights
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Back to the all-zero state.
    pub fn reset(&mut self) {
        self.state.iter_mut().for_each(|x| *x = 0.0);
        self.steps = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quiet_engine(dim: usize, weights: StateWeights) -> StateUpdateEngine {
        StateUpdateEngine::with_strategies(dim, weights, TanhDamping, |d: usize| vec![0.0; d])
            .unwrap()
    }

    #[test]
    fn test_starts_at_zero() {
        let engine = StateUpdateEngine::new(4, StateWeights::default()).unwrap();
        assert_eq!(engine.state(), &[0.0; 4]);
        assert_eq!(engine.steps(), 0);
    }

    #[test]
    fn test_blend_arithmetic() {
        let weights = StateWeights { alpha: 0.5, beta: 0.25, gamma: 0.25 };
        let mut engine = StateUpdateEngine::with_strategies(
            2,
            weights,
            |prev: &[f64]| -> Vec<f64> { prev.iter().map(|x| x * 2.0).collect() },
            |d: usize| vec![1.0; d],
        )
        .unwrap();

        // prev = 0: 0.5*[2,4] + 0 + 0.25*[1,1]
        let s1 = engine.update(&[2.0, 4.0]).unwrap();
        assert_relative_eq!(s1[0], 1.25);
        assert_relative_eq!(s1[1], 2.25);

        // memory = 2*prev
        let s2 = engine.update(&[0.0, 0.0]).unwrap();
        assert_relative_eq!(s2[0], 0.25 * 2.5 + 0.25);
        assert_relative_eq!(s2[1], 0.25 * 4.5 + 0.25);
        assert_eq!(engine.steps(), 2);
    }

    #[test]
    fn test_tanh_memory_is_bounded() {
        let mut engine = quiet_engine(3, StateWeights { alpha: 0.0, beta: 1.0, gamma: 0.0 });
        engine.restore(ConsciousnessState { vector: vec![100.0, -100.0, 0.0], steps: 0 }).unwrap();
        let s = engine.update(&[0.0; 3]).unwrap();
        assert!(s.iter().all(|x| x.abs() <= 1.0));
        assert_relative_eq!(s[2], 0.0);
    }

    #[test]
    fn test_input_dimension_checked() {
        let mut engine = quiet_engine(3, StateWeights::default());
        let err = engine.update(&[1.0, 2.0]).unwrap_err();
        assert_eq!(err, CoreError::DimensionMismatch { expected: 3, actual: 2 });
        assert_eq!(engine.steps(), 0);
    }

    #[test]
    fn test_bad_strategy_output_leaves_state() {
        let mut engine = StateUpdateEngine::with_strategies(
            2,
            StateWeights::default(),
            |_: &[f64]| vec![1.0],
            |d: usize| vec![0.0; d],
        )
        .unwrap();
        assert!(engine.update(&[1.0, 1.0]).is_err());
        assert_eq!(engine.state(), &[0.0, 0.0]);

        let mut engine = StateUpdateEngine::with_strategies(
            2,
            StateWeights::default(),
            TanhDamping,
            |_: usize| vec![0.0; 5],
        )
        .unwrap();
        assert!(engine.update(&[1.0, 1.0]).is_err());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let err = StateUpdateEngine::new(2, StateWeights { alpha: -0.1, beta: 0.5, gamma: 0.6 })
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidWeight { name: "alpha", .. }));
    }

    #[test]
    fn test_off_unit_sum_is_accepted() {
        let engine = StateUpdateEngine::new(2, StateWeights { alpha: 1.0, beta: 1.0, gamma: 1.0 });
        assert!(engine.is_ok());
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(StateUpdateEngine::new(0, StateWeights::default()).is_err());
    }

    #[test]
    fn test_uniform_noise_bounded_and_seeded() {
        let mut a = UniformNoise::new(0.05, Some(7));
        let mut b = UniformNoise::new(0.05, Some(7));
        let sa = a.sample(64);
        assert_eq!(sa, b.sample(64));
        assert!(sa.iter().all(|x| x.abs() <= 0.05));
        assert_eq!(UniformNoise::new(0.0, Some(1)).sample(3), vec![0.0; 3]);
    }

    #[test]
    fn test_uniform_noise_non_finite_scale_is_silent() {
        for scale in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert_eq!(UniformNoise::new(scale, Some(3)).sample(4), vec![0.0; 4]);
        }
        let mut negative = UniformNoise::new(-0.5, Some(3));
        assert!(negative.sample(16).iter().all(|x| x.abs() <= 0.5));
    }

    #[test]
    fn test_reset_and_restore() {
        let mut engine = quiet_engine(2, StateWeights::default());
        engine.update(&[1.0, 1.0]).unwrap();
        engine.reset();
        assert_eq!(engine.state(), &[0.0, 0.0]);
        assert_eq!(engine.steps(), 0);
        assert!(engine.restore(ConsciousnessState { vector: vec![1.0], steps: 3 }).is_err());
    }
}
