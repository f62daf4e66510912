// Project configuration for the CLI.
//
// `<root>/doctoc.toml`: driver settings at the top level plus a `[files]`
// table giving per-file metadata (e.g. the `doctoc` directive flag), keyed by
// path relative to the root.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use doctoc_common::pipeline::settings::Settings;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// File name looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "doctoc.toml";

/// Path to the project config file: `<root>/doctoc.toml`.
pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CliConfig {
    #[serde(flatten)]
    pub settings: Settings,
    /// Relative path → metadata for that file.
    pub files: BTreeMap<String, Map<String, Value>>,
}

impl CliConfig {
    /// Load `<root>/doctoc.toml`. A missing file yields defaults; a malformed
    /// one is an error.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        toml::from_str(&contents).map_err(ConfigError::Parse)
    }

    /// Save to a specific path (creates parent directories).
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        let contents = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, contents).map_err(ConfigError::Io)
    }

    /// Metadata configured for `relative`, or an empty map.
    pub fn metadata_for(&self, relative: &str) -> Map<String, Value> {
        self.files.get(relative).cloned().unwrap_or_default()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "config I/O error: {e}"),
            Self::Parse(e) => write!(f, "config parse error: {e}"),
            Self::Serialize(e) => write!(f, "config serialize error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
