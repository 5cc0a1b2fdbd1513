use std::path::{Path, PathBuf};
use std::{env, fs};

use hac_core::EngineConfig;

use crate::error::{Result, StoreError};
use crate::store::Store;

pub const CONFIG_FILE: &str = "config.toml";

/// Default base directory for all hac storage.
pub fn default_base_dir() -> PathBuf {
    dirs_home().join(".harmonic-core")
}

fn dirs_home() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Keep space names usable as file stems.
fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('-').to_string();
    if cleaned.is_empty() {
        "default".to_string()
    } else {
        cleaned
    }
}

/// Directory holding `config.toml` and one database per named space.
#[derive(Clone, Debug)]
pub struct DataDir {
    base: PathBuf,
}

impl DataDir {
    /// Open the data directory, creating it as needed.
    /// `base_dir` overrides the default location (for testing).
    pub fn open(base_dir: Option<&Path>) -> Result<Self> {
        let base = base_dir.map(PathBuf::from).unwrap_or_else(default_base_dir);
        let spaces = base.join("spaces");
        fs::create_dir_all(&spaces).map_err(|e| {
            StoreError::InvalidData(format!("failed to create {}: {e}", spaces.display()))
        })?;
        Ok(Self { base })
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn db_path(&self, space: &str) -> PathBuf {
        self.base
            .join("spaces")
            .join(format!("{}.db", sanitize_name(space)))
    }

    pub fn open_store(&self, space: &str) -> Result<Store> {
        Store::open(&self.db_path(space))
    }

    /// Read `config.toml`. A missing file gives the defaults.
    pub fn load_config(&self) -> Result<EngineConfig> {
        let path = self.base.join(CONFIG_FILE);
        let config = match fs::read_to_string(&path) {
            Ok(content) => toml::from_str::<EngineConfig>(&content).map_err(|e| {
                StoreError::InvalidData(format!("invalid {}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => EngineConfig::default(),
            Err(e) => return Err(StoreError::Io(e)),
        };
        config.validate()?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }
}
