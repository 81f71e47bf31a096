//! Startup configuration and the persisted mute setting.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::level::LevelData;

/// Names a JSON file overriding `GameConfig` defaults.
pub const CONFIG_ENV_VAR: &str = "BRAWLER_CONFIG";
const SETTINGS_FILE: &str = ".brawler_settings.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("file {path} has invalid format: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Fixed RNG seed; fresh entropy when unset.
    pub seed: Option<u64>,
    pub frame_rate: u32,
    /// Level JSON to play instead of the built-in level.
    pub level_path: Option<PathBuf>,
    pub log_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            frame_rate: 30,
            level_path: None,
            log_path: PathBuf::from("brawler.log"),
        }
    }
}

impl GameConfig {
    /// Loads from the file named by `BRAWLER_CONFIG`, or defaults when the
    /// variable is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        read_json(path)
    }

    /// Milliseconds per rendered frame; a zero rate falls back to 1 fps.
    pub fn frame_ms(&self) -> u64 {
        1000 / u64::from(self.frame_rate.max(1))
    }

    pub fn level(&self) -> Result<LevelData, ConfigError> {
        match &self.level_path {
            Some(path) => read_json(path),
            None => Ok(LevelData::level_one()),
        }
    }
}

// ── Settings ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub muted: bool,
}

impl Settings {
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(SETTINGS_FILE)
    }

    /// A missing file yields defaults; a broken one is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        read_json(path)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, text).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
