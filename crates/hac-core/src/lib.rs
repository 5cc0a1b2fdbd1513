//! Harmonic algebra core: an associative vector space with online
//! composition and attractor detection.
//!
//! A `VectorSpace` holds deduplicated `HarmonicVector`s. Composition picks
//! the member that best resonates with two operands and feeds it back; an
//! `AttractorTracker` watches the resulting trajectory for convergence. A
//! separate `StateUpdateEngine` keeps a running blended state.
//!
//! Zero I/O: a pure math engine with no opinions about transport or persistence.

pub mod attractor;
pub mod compose;
pub mod config;
pub mod constants;
pub mod error;
pub mod resonance;
pub mod serde_compat;
pub mod space;
pub mod state;
pub mod stream;
pub mod system;
pub mod time;
pub mod vector;

pub use attractor::{AttractorTracker, Basin};
pub use compose::{ScoredCandidate, best_candidate, compose, rank, score};
pub use config::{EngineConfig, StateConfig};
pub use constants::{ATTRACTOR_THRESHOLD, ATTRACTOR_WINDOW, LOG_CAPACITY, TRAJECTORY_CAPACITY};
pub use error::{CoreError, Result};
pub use resonance::{resonance, tag_gap};
pub use serde_compat::{CURRENT_VERSION, VectorRecord, WireExport, export_json, import_json};
pub use space::VectorSpace;
pub use state::{
    ConsciousnessState, MemoryTransform, SensorySource, StateUpdateEngine, StateWeights,
    TanhDamping, UniformNoise,
};
pub use stream::{CompositionLogEntry, CompositionStream};
pub use system::{HarmonicSystem, SystemStats};
pub use time::{now_unix_f64, unix_to_iso8601};
pub use vector::HarmonicVector;
