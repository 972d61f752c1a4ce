//! JSON configuration for the end-to-end detector.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use snapfen_board::LocatorParams;
use snapfen_classify::{HeuristicParams, ModelParams};
use snapfen_position::AssemblyParams;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Every tunable of the pipeline. Missing sections take their defaults, so
/// `{}` is a valid config.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectConfig {
    /// Learned classifier; the heuristic is used when unset or unloadable.
    pub model_path: Option<PathBuf>,
    pub locator: LocatorParams,
    pub heuristic: HeuristicParams,
    pub model: ModelParams,
    pub assembly: AssemblyParams,
}

impl DetectConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
