//! Repository configuration stored in `.gitlite/config.toml`.

use crate::blob_store::DEFAULT_MAX_BLOB_SIZE;
use crate::error::{GitliteError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Name of the config file inside the repository directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Repository configuration. Missing sections fall back to defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Branch and naming settings.
    #[serde(default)]
    pub core: CoreConfig,

    /// Object storage limits.
    #[serde(default)]
    pub storage: StorageConfig,

    /// `log` output formatting.
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from `repo_dir`, or defaults if the file is absent.
    pub fn load(repo_dir: &Path) -> Result<Self> {
        let path = repo_dir.join(CONFIG_FILE);
        if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| GitliteError::ConfigError(format!("failed to read config: {}", e)))?;
            toml::from_str(&content)
                .map_err(|e| GitliteError::ConfigError(format!("failed to parse config: {}", e)))
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration into `repo_dir`.
    pub fn save(&self, repo_dir: &Path) -> Result<()> {
        let path = repo_dir.join(CONFIG_FILE);
        let content = toml::to_string_pretty(self).map_err(|e| {
            GitliteError::ConfigError(format!("failed to serialize config: {}", e))
        })?;
        fs::write(&path, content)
            .map_err(|e| GitliteError::ConfigError(format!("failed to write config: {}", e)))?;
        Ok(())
    }
}

/// Core settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Branch created by `init` (default: "main").
    pub default_branch: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            default_branch: "main".to_string(),
        }
    }
}

/// Storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Largest file `add` will snapshot, in bytes (default: 100 MB).
    pub max_blob_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            max_blob_size: DEFAULT_MAX_BLOB_SIZE,
        }
    }
}

/// History display settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// strftime-style format for commit dates.
    pub date_format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            date_format: "%a %b %-d %H:%M:%S %Y %z".to_string(),
        }
    }
}
