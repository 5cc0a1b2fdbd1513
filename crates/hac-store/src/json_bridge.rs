use std::fs;
use std::path::Path;

use hac_core::{EngineConfig, HarmonicVector, VectorSpace, export_json, import_json};

use crate::error::{Result, StoreError};
use crate::store::Store;

impl Store {
    /// Import a full JSON snapshot file, replacing the stored system.
    pub fn import_json_file(&self, path: &Path, config: EngineConfig) -> Result<()> {
        let json = fs::read_to_string(path).map_err(|e| {
            StoreError::InvalidData(format!("failed to read {}: {e}", path.display()))
        })?;
        self.import_json_str(&json, config)
    }

    pub fn import_json_str(&self, json: &str, config: EngineConfig) -> Result<()> {
        let system = import_json(json, config)
            .map_err(|e| StoreError::InvalidData(format!("invalid JSON: {e}")))?;
        self.save_system(&system)
    }

    pub fn export_json_file(&self, path: &Path, config: EngineConfig) -> Result<()> {
        let json = self.export_json_string(config)?;
        fs::write(path, json).map_err(|e| {
            StoreError::InvalidData(format!("failed to write {}: {e}", path.display()))
        })
    }

    pub fn export_json_string(&self, config: EngineConfig) -> Result<String> {
        let system = self.load_system(config)?;
        export_json(&system)
            .map_err(|e| StoreError::InvalidData(format!("JSON export failed: {e}")))
    }
}

/// Space-only JSON files: an array of `{ "v": [...], "omega": f }`.
pub trait SpacePersistence {
    fn persist(&self, path: &Path) -> Result<()>;

    /// Replace the member set with the file contents. On failure the
    /// current members are kept.
    fn restore(&mut self, path: &Path) -> Result<()>;
}

impl SpacePersistence for VectorSpace {
    fn persist(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self.all()).map_err(|e| {
            tracing::error!("failed to serialize space: {e}");
            StoreError::InvalidData(format!("JSON export failed: {e}"))
        })?;
        fs::write(path, json).map_err(|e| {
            tracing::error!("failed to write {}: {e}", path.display());
            StoreError::Io(e)
        })?;
        tracing::info!("persisted {} vectors to {}", self.len(), path.display());
        Ok(())
    }

    fn restore(&mut self, path: &Path) -> Result<()> {
        let json = fs::read_to_string(path).map_err(|e| {
            tracing::error!("failed to read {}: {e}", path.display());
            StoreError::Io(e)
        })?;
        let vectors: Vec<HarmonicVector> = serde_json::from_str(&json).map_err(|e| {
            tracing::error!("invalid space file {}: {e}", path.display());
            StoreError::InvalidData(format!("invalid JSON: {e}"))
        })?;
        let restored = VectorSpace::with_vectors(vectors).map_err(|e| {
            tracing::error!("invalid space file {}: {e}", path.display());
            StoreError::Core(e)
        })?;
        *self = restored;
        tracing::info!("restored {} vectors from {}", self.len(), path.display());
        Ok(())
    }
}
