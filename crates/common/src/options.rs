// Options for heading selection and id generation.
//
// `TocOptions` is the fully resolved set; `OptionsArg` is a partial override as
// it appears in configuration (a range string like "h2-4" or a table of fields).

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::toc::slug::Slugifier;

/// Default prefix prepended to every generated id.
pub const DEFAULT_ID_PREFIX: &str = "doctoc-";

/// Default cap on the length of a generated base id, in characters.
pub const DEFAULT_ID_LENGTH_LIMIT: usize = 256;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionsError {
    #[error("{field}: {value} is not a heading level between 1 and 6")]
    InvalidLevel { field: &'static str, value: u8 },

    #[error("h_min, h_max: ({h_min} <= {h_max}) is not true")]
    InvertedRange { h_min: u8, h_max: u8 },

    #[error("{0:?} is an invalid range value (expected e.g. \"h1-6\")")]
    InvalidRange(String),

    #[error("id_length_limit must be at least 1")]
    ZeroLengthLimit,
}

/// Resolved options for one extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TocOptions {
    /// Lowest heading level that is selected (inclusive).
    pub h_min: u8,
    /// Highest heading level that is selected (inclusive).
    pub h_max: u8,
    /// Prepended to every generated id; may be empty.
    pub id_prefix: String,
    /// Generated base ids are truncated to this many characters.
    pub id_length_limit: usize,
    /// Also avoid ids declared anywhere in the document, not only generated ones.
    pub make_ids_unique: bool,
    /// Text → slug transform for generated ids.
    #[serde(skip)]
    pub slugifier: Slugifier,
}

impl Default for TocOptions {
    fn default() -> Self {
        Self {
            h_min: 1,
            h_max: 6,
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
            id_length_limit: DEFAULT_ID_LENGTH_LIMIT,
            make_ids_unique: false,
            slugifier: Slugifier::default(),
        }
    }
}

impl TocOptions {
    /// Whether a heading of `level` falls inside the selector range.
    pub fn selects(&self, level: u8) -> bool {
        (self.h_min..=self.h_max).contains(&level)
    }

    pub fn with_slugifier(mut self, slugifier: Slugifier) -> Self {
        self.slugifier = slugifier;
        self
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        check_level("h_min", self.h_min)?;
        check_level("h_max", self.h_max)?;
        if self.h_min > self.h_max {
            return Err(OptionsError::InvertedRange { h_min: self.h_min, h_max: self.h_max });
        }
        if self.id_length_limit == 0 {
            return Err(OptionsError::ZeroLengthLimit);
        }
        Ok(())
    }

    /// Overlay a partial override onto these options.
    ///
    /// The result is validated before anything is applied, so `self` is left
    /// untouched on error.
    pub fn combine(&mut self, arg: &OptionsArg) -> Result<(), OptionsError> {
        let patch = arg.to_patch()?;
        let mut next = self.clone();

        if let Some(h_min) = patch.h_min {
            next.h_min = h_min;
        }
        if let Some(h_max) = patch.h_max {
            next.h_max = h_max;
        }
        if let Some(range) = patch.h_range.as_deref() {
            let (h_min, h_max) = parse_range(range)?;
            next.h_min = h_min;
            next.h_max = h_max;
        }
        if let Some(prefix) = patch.id_prefix {
            next.id_prefix = prefix;
        }
        if let Some(limit) = patch.id_length_limit {
            next.id_length_limit = limit;
        }
        if let Some(unique) = patch.make_ids_unique {
            next.make_ids_unique = unique;
        }

        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Clone with an optional override applied.
    pub fn combined(&self, arg: Option<&OptionsArg>) -> Result<Self, OptionsError> {
        let mut options = self.clone();
        if let Some(arg) = arg {
            options.combine(arg)?;
        }
        Ok(options)
    }
}

/// A partial options override as written in configuration.
///
/// Either a bare range string (`"h2-4"`) or a table of optional fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionsArg {
    Range(String),
    Fields(OptionsPatch),
}

impl OptionsArg {
    fn to_patch(&self) -> Result<OptionsPatch, OptionsError> {
        match self {
            Self::Range(range) => {
                parse_range(range)?;
                Ok(OptionsPatch { h_range: Some(range.clone()), ..OptionsPatch::default() })
            }
            Self::Fields(patch) => Ok(patch.clone()),
        }
    }
}

impl From<OptionsPatch> for OptionsArg {
    fn from(patch: OptionsPatch) -> Self {
        Self::Fields(patch)
    }
}

/// Optional fields of [`TocOptions`]. `h_range` wins over `h_min`/`h_max`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptionsPatch {
    pub h_range: Option<String>,
    pub h_min: Option<u8>,
    pub h_max: Option<u8>,
    pub id_prefix: Option<String>,
    pub id_length_limit: Option<usize>,
    pub make_ids_unique: Option<bool>,
}

/// Parse a selector range such as `"h1-6"` (case-insensitive) into `(h_min, h_max)`.
pub fn parse_range(range: &str) -> Result<(u8, u8), OptionsError> {
    let captures =
        range_pattern().captures(range).ok_or_else(|| OptionsError::InvalidRange(range.into()))?;
    let bound = |index: usize| {
        captures
            .get(index)
            .and_then(|m| m.as_str().parse::<u8>().ok())
            .ok_or_else(|| OptionsError::InvalidRange(range.into()))
    };
    Ok((bound(1)?, bound(2)?))
}

fn range_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^h([1-6])-([1-6])$").expect("range pattern should compile")
    })
}

fn check_level(field: &'static str, value: u8) -> Result<(), OptionsError> {
    if (1..=6).contains(&value) {
        Ok(())
    } else {
        Err(OptionsError::InvalidLevel { field, value })
    }
}
