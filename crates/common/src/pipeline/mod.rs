// Batch driver: run a configured strategy over every matching, flagged file
// and attach the resulting TOC tree to the file's metadata.
//
// Files are processed one at a time in key order. The first error stops the
// batch; the failing file is left exactly as it was.

pub mod flag;
pub mod pattern;
pub mod settings;
pub mod strategy;

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{debug, info};

use crate::options::OptionsError;
use crate::toc::tree::{build_tree, TreeError};
use crate::types::FileRecord;

use self::flag::{resolve_flag, FlagError, FlagValue};
use self::pattern::{FilePattern, PatternError};
use self::settings::{Settings, SettingsError};
use self::strategy::{StrategyError, StrategyRegistry, TocStrategy};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("doctoc: invalid settings: {0}")]
    InvalidSettings(#[from] SettingsError),

    #[error("doctoc: {0}")]
    Pattern(#[from] PatternError),

    #[error("doctoc: plugins[{config}].plugin: unknown identifier [{plugin}]")]
    UnknownPlugin { config: String, plugin: String },

    #[error("doctoc: plugins[{config}].options: {source}")]
    Options {
        config: String,
        #[source]
        source: OptionsError,
    },

    #[error(transparent)]
    Flag(#[from] FlagError),

    #[error("doctoc [{filename}]: file[{flag}] names unknown configuration [{config}]")]
    UnknownConfig { filename: String, flag: String, config: String },

    #[error("doctoc [{filename}]: invalid file options for plugins[{config}]: {source}")]
    FileOptions {
        filename: String,
        config: String,
        #[source]
        source: OptionsError,
    },

    #[error("doctoc [{filename}]: plugins[{config}] failed: {source}")]
    Strategy {
        filename: String,
        config: String,
        #[source]
        source: StrategyError,
    },

    #[error("doctoc [{filename}]: plugins[{config}] returned invalid headings: {source}")]
    InvalidHeadings {
        filename: String,
        config: String,
        #[source]
        source: TreeError,
    },

    #[error("doctoc [{filename}]: failed to serialize tree: {source}")]
    Serialize {
        filename: String,
        #[source]
        source: serde_json::Error,
    },
}

/// What happened to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Skipped,
    Processed { rewritten: bool },
}

/// Counters for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Files that got a tree attached.
    pub trees: usize,
    /// Files whose contents changed because ids were generated.
    pub rewritten: usize,
    /// Matched files that were not flagged for processing.
    pub skipped: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Skipped => self.skipped += 1,
            FileOutcome::Processed { rewritten } => {
                self.trees += 1;
                if rewritten {
                    self.rewritten += 1;
                }
            }
        }
    }
}

pub struct Doctoc {
    settings: Settings,
    pattern: FilePattern,
    configs: BTreeMap<String, Box<dyn TocStrategy>>,
}

impl Doctoc {
    /// Driver with only the built-in strategy available.
    pub fn new(settings: Settings) -> Result<Self, PipelineError> {
        Self::with_registry(settings, &StrategyRegistry::new())
    }

    /// Validate `settings` and create one strategy instance per configuration.
    pub fn with_registry(
        mut settings: Settings,
        registry: &StrategyRegistry,
    ) -> Result<Self, PipelineError> {
        settings.validate()?;
        let pattern = FilePattern::new(&settings.pattern)?;
        debug!(pattern = pattern.as_str(), "compiled file pattern");

        let mut configs = BTreeMap::new();
        for (name, config) in &settings.plugins {
            let mut strategy =
                registry.resolve(config.plugin()).ok_or_else(|| PipelineError::UnknownPlugin {
                    config: name.clone(),
                    plugin: config.plugin().to_string(),
                })?;
            if let Some(options) = config.options() {
                strategy
                    .apply_default_options(options)
                    .map_err(|source| PipelineError::Options { config: name.clone(), source })?;
            }
            debug!(config = %name, plugin = strategy.name(), "initialized strategy");
            configs.insert(name.clone(), strategy);
        }

        Ok(Self { settings, pattern, configs })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Process every file whose key matches the pattern.
    pub fn run(
        &mut self,
        files: &mut BTreeMap<String, FileRecord>,
    ) -> Result<RunSummary, PipelineError> {
        let mut summary = RunSummary::default();

        for (filename, file) in files.iter_mut() {
            if !self.pattern.matches(filename) {
                continue;
            }
            let outcome = self.process_file(filename, file)?;
            summary.record(outcome);
        }

        info!(
            trees = summary.trees,
            rewritten = summary.rewritten,
            skipped = summary.skipped,
            "doctoc run complete"
        );
        Ok(summary)
    }

    /// Process one file regardless of the pattern. On error `file` is untouched.
    pub fn process_file(
        &mut self,
        filename: &str,
        file: &mut FileRecord,
    ) -> Result<FileOutcome, PipelineError> {
        let (config, options) = match resolve_flag(filename, &file.metadata, &self.settings)? {
            FlagValue::Skip => {
                debug!(file = filename, "skipped");
                return Ok(FileOutcome::Skipped);
            }
            FlagValue::Default => (self.settings.default.clone(), None),
            FlagValue::Config { config, options } => (config, options),
        };

        let strategy =
            self.configs.get_mut(&config).ok_or_else(|| PipelineError::UnknownConfig {
                filename: filename.to_string(),
                flag: self.settings.flag.clone(),
                config: config.clone(),
            })?;

        if let Some(options) = &options {
            strategy.apply_file_options(filename, options).map_err(|source| {
                PipelineError::FileOptions {
                    filename: filename.to_string(),
                    config: config.clone(),
                    source,
                }
            })?;
        }

        let mut working = file.clone();
        let headings =
            strategy.run(filename, &mut working).map_err(|source| PipelineError::Strategy {
                filename: filename.to_string(),
                config: config.clone(),
                source,
            })?;
        let tree = build_tree(&headings).map_err(|source| PipelineError::InvalidHeadings {
            filename: filename.to_string(),
            config: config.clone(),
            source,
        })?;
        let value = serde_json::to_value(&tree)
            .map_err(|source| PipelineError::Serialize { filename: filename.to_string(), source })?;

        let rewritten = working.contents != file.contents;
        working.metadata.insert(self.settings.tree_key.clone(), value);
        *file = working;

        debug!(
            file = filename,
            config = %config,
            headings = headings.len(),
            rewritten,
            "attached toc tree"
        );
        Ok(FileOutcome::Processed { rewritten })
    }
}

impl std::fmt::Debug for Doctoc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Doctoc")
            .field("settings", &self.settings)
            .field("configs", &self.configs.keys().collect::<Vec<_>>())
            .finish()
    }
}
