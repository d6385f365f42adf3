use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use porteria_logging::{porteria_info, porteria_warn};
use serde::{Deserialize, Serialize};

use crate::persist::{write_atomically, PersistError};

/// Persisted settings. The file layout is `{"api_url": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api_url: String,
}

pub trait ConfigStore: Send + Sync {
    /// Returns the saved config, or the empty default when nothing usable is stored.
    fn load(&self) -> Config;
    fn save(&self, config: &Config) -> Result<(), PersistError>;
}

#[derive(Debug, Clone)]
pub struct JsonFileConfigStore {
    path: PathBuf,
}

impl JsonFileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for JsonFileConfigStore {
    fn load(&self) -> Config {
        let content = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Config::default(),
            Err(err) => {
                porteria_warn!("Failed to read config from {:?}: {}", self.path, err);
                return Config::default();
            }
        };
        match serde_json::from_str(&content) {
            Ok(config) => {
                porteria_info!("Loaded config from {:?}", self.path);
                config
            }
            Err(err) => {
                porteria_warn!("Failed to parse config from {:?}: {}", self.path, err);
                Config::default()
            }
        }
    }

    fn save(&self, config: &Config) -> Result<(), PersistError> {
        let content = serde_json::to_string_pretty(config)?;
        write_atomically(&self.path, content.as_bytes())?;
        porteria_info!("Saved config to {:?}", self.path);
        Ok(())
    }
}
