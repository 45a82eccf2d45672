//! Global configuration model for the lifecycle engine.
//!
//! Every field has a documented default, so an empty JSON object (or no
//! configuration file at all) yields a working configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{AtomicError, Result};

/// Root configuration passed into the lifecycle engine at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtomicConfig {
    /// Path to the container engine client binary.
    pub docker_path: PathBuf,
    /// Command used when an image declares no `Cmd`.
    pub default_command: Vec<String>,
    /// In-container command run by `install` absent an install label.
    pub install_command: Vec<String>,
    /// In-container command run by `uninstall` absent an uninstall label.
    pub uninstall_command: Vec<String>,
    /// Where SPC containers see the host root filesystem.
    pub host_root: String,
    /// Host update tool invoked by `atomic host`.
    pub host_tool: String,
}

impl Default for AtomicConfig {
    fn default() -> Self {
        Self {
            docker_path: PathBuf::from(constants::DEFAULT_DOCKER_PATH),
            default_command: constants::DEFAULT_COMMAND
                .iter()
                .map(ToString::to_string)
                .collect(),
            install_command: vec![constants::DEFAULT_INSTALL_SCRIPT.to_string()],
            uninstall_command: vec![constants::DEFAULT_UNINSTALL_SCRIPT.to_string()],
            host_root: constants::DEFAULT_HOST_ROOT.to_string(),
            host_tool: constants::DEFAULT_HOST_TOOL.to_string(),
        }
    }
}

impl AtomicConfig {
    /// Loads a configuration from a JSON file, filling absent fields with
    /// their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AtomicError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Loads the configuration file if one is given, else returns defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a given file cannot be loaded.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}
