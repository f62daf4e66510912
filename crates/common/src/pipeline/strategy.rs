// Heading extraction strategies and the registry that resolves them by name.

use thiserror::Error;
use tracing::debug;

use crate::options::{OptionsArg, OptionsError, TocOptions};
use crate::toc::extract::{extract, ExtractError};
use crate::toc::id::IdGenerator;
use crate::toc::reassemble::reassemble;
use crate::types::{FileRecord, Heading};

/// Name of the built-in strategy.
pub const DEFAULT_STRATEGY: &str = "doctoc-default";

#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("file contents are not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("{0}")]
    Custom(Box<dyn std::error::Error + Send + Sync>),
}

/// A heading extraction strategy.
///
/// `run` may rewrite `file.contents`; the returned headings are turned into a
/// tree by the caller, which also rejects headings with level 0.
pub trait TocStrategy: Send {
    fn name(&self) -> &str;

    /// Overlay configuration-level options onto the strategy's defaults.
    fn apply_default_options(&mut self, options: &OptionsArg) -> Result<(), OptionsError>;

    /// Options for the next `run` on `filename` only.
    fn apply_file_options(
        &mut self,
        filename: &str,
        options: &OptionsArg,
    ) -> Result<(), OptionsError>;

    fn run(
        &mut self,
        filename: &str,
        file: &mut FileRecord,
    ) -> Result<Vec<Heading>, StrategyError>;
}

/// The built-in strategy: regex heading extraction with generated ids.
#[derive(Debug, Clone, Default)]
pub struct DefaultStrategy {
    defaults: TocOptions,
    file_options: Option<(String, TocOptions)>,
}

impl DefaultStrategy {
    pub fn new(defaults: TocOptions) -> Self {
        Self { defaults, file_options: None }
    }

    pub fn defaults(&self) -> &TocOptions {
        &self.defaults
    }

    /// Options in effect for `filename`, consuming any pending file options.
    fn take_options(&mut self, filename: &str) -> TocOptions {
        match self.file_options.take() {
            Some((target, options)) if target == filename => options,
            _ => self.defaults.clone(),
        }
    }
}

impl TocStrategy for DefaultStrategy {
    fn name(&self) -> &str {
        DEFAULT_STRATEGY
    }

    fn apply_default_options(&mut self, options: &OptionsArg) -> Result<(), OptionsError> {
        self.defaults.combine(options)
    }

    fn apply_file_options(
        &mut self,
        filename: &str,
        options: &OptionsArg,
    ) -> Result<(), OptionsError> {
        let combined = self.defaults.combined(Some(options))?;
        self.file_options = Some((filename.to_string(), combined));
        Ok(())
    }

    fn run(
        &mut self,
        filename: &str,
        file: &mut FileRecord,
    ) -> Result<Vec<Heading>, StrategyError> {
        let options = self.take_options(filename);
        let content = std::str::from_utf8(&file.contents)?;

        let mut ids = IdGenerator::from_options(&options);
        let extraction = extract(content, &options, &mut ids)?;

        if extraction.new_ids > 0 {
            let rewritten = reassemble(&extraction.fragments);
            file.contents = rewritten.into_bytes();
        }
        debug!(
            file = filename,
            headings = extraction.headings.len(),
            new_ids = extraction.new_ids,
            "extracted headings"
        );
        Ok(extraction.headings)
    }
}

type Resolver = Box<dyn Fn(&str) -> Option<Box<dyn TocStrategy>> + Send + Sync>;

/// Maps strategy references to fresh strategy instances.
#[derive(Default)]
pub struct StrategyRegistry {
    resolver: Option<Resolver>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consult `resolver` for references that are not built in.
    pub fn with_resolver<F>(resolver: F) -> Self
    where
        F: Fn(&str) -> Option<Box<dyn TocStrategy>> + Send + Sync + 'static,
    {
        Self { resolver: Some(Box::new(resolver)) }
    }

    pub fn resolve(&self, reference: &str) -> Option<Box<dyn TocStrategy>> {
        if reference == DEFAULT_STRATEGY {
            return Some(Box::new(DefaultStrategy::default()));
        }
        self.resolver.as_ref().and_then(|resolver| resolver(reference))
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry").field("resolver", &self.resolver.is_some()).finish()
    }
}
