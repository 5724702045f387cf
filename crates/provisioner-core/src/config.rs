//! Provisioner configuration
//!
//! Settings are read from a YAML file. The file is searched in this order:
//! 1. `PROVISIONER_CONFIG_PATH` environment variable
//! 2. `./provisioner.yaml`
//! 3. `~/.config/provisioner/config.yaml`
//!
//! Without any file the defaults apply.

use crate::error::{ProvisionerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_PATH_ENV: &str = "PROVISIONER_CONFIG_PATH";
const LOCAL_CONFIG_FILE: &str = "provisioner.yaml";
const DEFAULT_STATE_DIR: &str = ".provisioner";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisionerConfig {
    /// Directory holding the state file
    pub state_dir: PathBuf,

    /// Log filter used when `RUST_LOG` is not set (e.g. "info", "provisioner_core=debug")
    pub log_filter: Option<String>,
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            log_filter: None,
        }
    }
}

impl ProvisionerConfig {
    /// Load from the first config file found, or use the defaults
    pub fn load() -> Result<Self> {
        match find_config_file()? {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProvisionerError::ConfigError(format!("{}: {}", path.display(), e))
        })?;
        let config: ProvisionerConfig = serde_yaml::from_str(&content)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

/// Locate the configuration file
pub fn find_config_file() -> Result<Option<PathBuf>> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
        tracing::warn!(
            "{} points to missing file {}",
            CONFIG_PATH_ENV,
            path.display()
        );
    }

    let local = std::env::current_dir()?.join(LOCAL_CONFIG_FILE);
    if local.exists() {
        return Ok(Some(local));
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global = config_dir.join("provisioner").join("config.yaml");
        if global.exists() {
            return Ok(Some(global));
        }
    }

    Ok(None)
}
