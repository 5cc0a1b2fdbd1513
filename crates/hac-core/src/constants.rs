/// Composition log ring-buffer capacity
pub const LOG_CAPACITY: usize = 100;

/// Trajectory ring-buffer capacity
pub const TRAJECTORY_CAPACITY: usize = 50;

/// Number of most recent trajectory points an attractor must hold for
pub const ATTRACTOR_WINDOW: usize = 5;

/// Default resonance an attractor must reach against every window point
pub const ATTRACTOR_THRESHOLD: f64 = 0.9;

/// Default state blend: weight on the external input
pub const ALPHA: f64 = 0.6;

/// Default state blend: weight on the transformed previous state
pub const BETA: f64 = 0.3;

/// Default state blend: weight on the sensory perturbation
pub const GAMMA: f64 = 0.1;

/// Allowed deviation of alpha + beta + gamma from 1 before warning
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.05;

/// Default consciousness state dimensionality
pub const STATE_DIMENSION: usize = 8;

/// Half-width of the default zero-mean sensory noise
pub const NOISE_SCALE: f64 = 0.01;
