// Driver settings: which files to process and which configurations exist.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::options::OptionsArg;

use super::strategy::DEFAULT_STRATEGY;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("flag must be a non-empty string")]
    EmptyFlag,

    #[error("tree_key must be a non-empty string")]
    EmptyTreeKey,

    #[error("default configuration [{0}] is not listed in plugins")]
    MissingDefault(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Glob selecting the files to look at.
    pub pattern: String,
    /// Metadata key holding the per-file directive.
    pub flag: String,
    /// Process every matched file with the default configuration.
    pub ignore_flag: bool,
    /// Metadata key the serialized tree is written to. May equal `flag`, in
    /// which case the directive is replaced by the tree.
    pub tree_key: String,
    /// Configuration used for files flagged `true`.
    pub default: String,
    /// Named configurations.
    pub plugins: BTreeMap<String, PluginConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pattern: "**".to_string(),
            flag: "doctoc".to_string(),
            ignore_flag: false,
            tree_key: "doctoc".to_string(),
            default: "default".to_string(),
            plugins: BTreeMap::from([(
                "default".to_string(),
                PluginConfig::Reference(DEFAULT_STRATEGY.to_string()),
            )]),
        }
    }
}

impl Settings {
    /// Trim the flag and check that the default configuration exists.
    pub fn validate(&mut self) -> Result<(), SettingsError> {
        self.flag = self.flag.trim().to_string();
        if self.flag.is_empty() {
            return Err(SettingsError::EmptyFlag);
        }
        if self.tree_key.trim().is_empty() {
            return Err(SettingsError::EmptyTreeKey);
        }
        if !self.plugins.contains_key(&self.default) {
            return Err(SettingsError::MissingDefault(self.default.clone()));
        }
        Ok(())
    }
}

/// One named configuration: a strategy reference, optionally with options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PluginConfig {
    Reference(String),
    Configured {
        plugin: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<OptionsArg>,
    },
}

impl PluginConfig {
    pub fn plugin(&self) -> &str {
        match self {
            Self::Reference(plugin) | Self::Configured { plugin, .. } => plugin,
        }
    }

    pub fn options(&self) -> Option<&OptionsArg> {
        match self {
            Self::Reference(_) => None,
            Self::Configured { options, .. } => options.as_ref(),
        }
    }
}
