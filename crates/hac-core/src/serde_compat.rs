//! JSON wire format.
//!
//! A vector travels as `{ "v": [...], "omega": f }`. The full snapshot
//! bundles the space, composition log, trajectory, basins, and state.

use serde::{Deserialize, Serialize};

use crate::attractor::Basin;
use crate::config::EngineConfig;
use crate::state::ConsciousnessState;
use crate::stream::CompositionLogEntry;
use crate::system::HarmonicSystem;
use crate::vector::HarmonicVector;

pub const CURRENT_VERSION: &str = "1.0";

/// Plain record form of a `HarmonicVector`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub v: Vec<f64>,
    pub omega: f64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct WireExport {
    pub version: String,
    pub space: Vec<HarmonicVector>,
    #[serde(default)]
    pub history: Vec<CompositionLogEntry>,
    #[serde(default)]
    pub trajectory: Vec<HarmonicVector>,
    #[serde(default)]
    pub basins: Vec<Basin>,
    #[serde(default)]
    pub state: Option<ConsciousnessState>,
}

impl WireExport {
    pub fn from_system(system: &HarmonicSystem) -> Self {
        WireExport {
            version: CURRENT_VERSION.to_string(),
            space: system.space.all().to_vec(),
            history: system.stream.history().iter().cloned().collect(),
            trajectory: system.tracker.trajectory().iter().cloned().collect(),
            basins: system.tracker.basins().to_vec(),
            state: Some(system.state.snapshot()),
        }
    }

    /// Rebuild a system under `config`. Log and trajectory are truncated to
    /// the configured capacities (oldest dropped). A state snapshot whose
    /// dimension disagrees with the config is discarded.
    pub fn into_system(self, config: EngineConfig) -> crate::Result<HarmonicSystem> {
        let mut system = HarmonicSystem::new(config)?;
        system.space.replace(self.space)?;
        for entry in self.history {
            system.stream.push(entry);
        }
        for point in self.trajectory {
            system.tracker.record(point);
        }
        for basin in self.basins {
            system.tracker.insert_basin(basin);
        }
        if let Some(state) = self.state
            && let Err(e) = system.state.restore(state)
        {
            tracing::warn!("discarding persisted state: {e}");
        }
        Ok(system)
    }
}

/// Serialize the whole system as pretty JSON.
pub fn export_json(system: &HarmonicSystem) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&WireExport::from_system(system))
}

/// Parse a snapshot produced by `export_json`.
pub fn import_json(json: &str, config: EngineConfig) -> Result<HarmonicSystem, serde_json::Error> {
    let wire: WireExport = serde_json::from_str(json)?;
    wire.into_system(config)
        .map_err(<serde_json::Error as serde::de::Error>::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hv(v: &[f64], tag: f64) -> HarmonicVector {
        HarmonicVector::new(v.to_vec(), tag).unwrap()
    }

    fn make_system() -> HarmonicSystem {
        let mut system = HarmonicSystem::new(EngineConfig::default()).unwrap();
        system.add_vector(hv(&[1.0, 0.0], 0.1)).unwrap();
        system.add_vector(hv(&[0.0, 1.0], 0.2)).unwrap();
        system.add_vector(hv(&[1.0, 1.0], 0.0)).unwrap();
        system.compose_by_index(0, 1).unwrap();
        system.compose_by_index(0, 2).unwrap();
        system.step_state(&[0.5; 8]).unwrap();
        system
    }

    #[test]
    fn test_roundtrip_preserves_everything() {
        let original = make_system();
        let json = export_json(&original).unwrap();
        let restored = import_json(&json, EngineConfig::default()).unwrap();

        assert_eq!(restored.space.all(), original.space.all());
        assert_eq!(restored.stream.history(), original.stream.history());
        assert_eq!(restored.tracker.trajectory(), original.tracker.trajectory());
        assert_eq!(restored.state.snapshot(), original.state.snapshot());
    }

    #[test]
    fn test_wire_shape() {
        let json = export_json(&make_system()).unwrap();
        let wire: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(wire["version"], CURRENT_VERSION);
        assert_eq!(wire["space"][0]["v"], serde_json::json!([1.0, 0.0]));
        assert_eq!(wire["space"][0]["omega"], 0.1);
        assert!(wire["history"][0]["v3"].is_object());
        assert!(wire["state"]["vector"].is_array());
    }

    #[test]
    fn test_minimal_snapshot() {
        let json = r#"{ "version": "1.0", "space": [ { "v": [1.0, 2.0], "omega": 0.5 } ] }"#;
        let system = import_json(json, EngineConfig::default()).unwrap();
        assert_eq!(system.space.len(), 1);
        assert!(system.stream.history().is_empty());
    }

    #[test]
    fn test_mixed_dimensions_rejected() {
        let json = r#"{ "version": "1.0", "space": [
            { "v": [1.0, 2.0], "omega": 0.5 },
            { "v": [1.0], "omega": 0.5 }
        ] }"#;
        assert!(import_json(json, EngineConfig::default()).is_err());
    }

    #[test]
    fn test_state_dimension_change_is_dropped() {
        let original = make_system();
        let json = export_json(&original).unwrap();
        let mut config = EngineConfig::default();
        config.state.dimension = 3;
        let restored = import_json(&json, config).unwrap();
        assert_eq!(restored.state.state(), &[0.0; 3]);
        assert_eq!(restored.space.len(), 3);
    }
}
