// Unique heading id generation.
//
// A slug alone yields the same value for the same text, so two "Returns"
// headings in one document would collide. The generator remembers every base
// it has issued and appends `-1`, `-2`, … on repeats. `reroll()` appends the
// next suffix to the last base, which lets callers step around ids that were
// declared by hand in the document.
//
// One generator is one uniqueness scope. Create one per document, or call
// `clear_cache()` between documents; sharing one across documents is only
// correct when cross-document uniqueness is actually wanted.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::options::TocOptions;
use crate::toc::slug::Slugifier;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdError {
    #[error("reroll requested before any id was generated in this scope")]
    NoPreviousId,
}

#[derive(Debug, Clone)]
pub struct IdGenerator {
    slugifier: Slugifier,
    prefix: String,
    length_limit: usize,
    /// base id → next numeric suffix to try
    suffixes: HashMap<String, u32>,
    /// every id handed out in this scope, suffixed or not
    issued: HashSet<String>,
    last_base: Option<String>,
}

impl IdGenerator {
    pub fn new(prefix: impl Into<String>, length_limit: usize, slugifier: Slugifier) -> Self {
        Self {
            slugifier,
            prefix: prefix.into(),
            length_limit,
            suffixes: HashMap::new(),
            issued: HashSet::new(),
            last_base: None,
        }
    }

    pub fn from_options(options: &TocOptions) -> Self {
        Self::new(options.id_prefix.clone(), options.id_length_limit, options.slugifier.clone())
    }

    /// Issue an id for `text`: `prefix + slug(text)`, truncated to the length
    /// limit, with a `-N` suffix if that base was issued before.
    pub fn next_id(&mut self, text: &str) -> String {
        let mut base = format!("{}{}", self.prefix, self.slugifier.apply(text));
        if base.chars().count() > self.length_limit {
            base = base.chars().take(self.length_limit).collect();
        }
        self.last_base = Some(base.clone());

        if !self.suffixes.contains_key(&base) {
            self.suffixes.insert(base.clone(), 1);
            // The bare base may already exist as another base's suffixed form.
            if self.issued.insert(base.clone()) {
                return base;
            }
        }

        self.next_suffixed(&base)
    }

    /// Issue another id for the most recent base (`base-N`).
    pub fn reroll(&mut self) -> Result<String, IdError> {
        let base = self.last_base.clone().ok_or(IdError::NoPreviousId)?;
        Ok(self.next_suffixed(&base))
    }

    /// Forget every issued id and the last base.
    pub fn clear_cache(&mut self) {
        self.suffixes.clear();
        self.issued.clear();
        self.last_base = None;
    }

    pub fn last_base(&self) -> Option<&str> {
        self.last_base.as_deref()
    }

    pub fn is_issued(&self, id: &str) -> bool {
        self.issued.contains(id)
    }

    fn next_suffixed(&mut self, base: &str) -> String {
        let counter = self.suffixes.entry(base.to_string()).or_insert(1);
        loop {
            let id = format!("{base}-{counter}");
            *counter += 1;
            if self.issued.insert(id.clone()) {
                return id;
            }
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::from_options(&TocOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(prefix: &str) -> IdGenerator {
        IdGenerator::new(prefix, 256, Slugifier::default())
    }

    #[test]
    fn first_issue_is_prefixed_slug() {
        let mut ids = generator("x-");
        assert_eq!(ids.next_id("Getting Started"), "x-getting-started");
    }

    #[test]
    fn repeated_text_gets_increasing_suffixes() {
        let mut ids = generator("doctoc-");
        assert_eq!(ids.next_id("Returns"), "doctoc-returns");
        assert_eq!(ids.next_id("Returns"), "doctoc-returns-1");
        assert_eq!(ids.next_id("Returns"), "doctoc-returns-2");
    }

    #[test]
    fn different_text_with_same_slug_is_disambiguated() {
        let mut ids = generator("");
        assert_eq!(ids.next_id("API"), "api");
        assert_eq!(ids.next_id("api!"), "api-1");
    }

    #[test]
    fn reroll_appends_next_suffix_to_last_base() {
        let mut ids = generator("x-");
        assert_eq!(ids.next_id("Intro"), "x-intro");
        assert_eq!(ids.reroll(), Ok("x-intro-1".to_string()));
        assert_eq!(ids.reroll(), Ok("x-intro-2".to_string()));
        assert_eq!(ids.next_id("Intro"), "x-intro-3");
    }

    #[test]
    fn reroll_before_any_id_fails() {
        let mut ids = generator("x-");
        assert_eq!(ids.reroll(), Err(IdError::NoPreviousId));
    }

    #[test]
    fn base_is_truncated_to_length_limit() {
        let mut ids = IdGenerator::new("doc-", 8, Slugifier::default());
        assert_eq!(ids.next_id("abcdefghij"), "doc-abcd");
        // Suffixes go after truncation.
        assert_eq!(ids.next_id("abcdefghij"), "doc-abcd-1");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let mut ids = IdGenerator::new("é", 2, Slugifier::new(|text: &str| text.to_string()));
        assert_eq!(ids.next_id("ßxyz"), "éß");
    }

    #[test]
    fn slug_matching_an_earlier_suffixed_id_is_not_reissued() {
        let mut ids = generator("");
        assert_eq!(ids.next_id("a"), "a");
        assert_eq!(ids.next_id("a"), "a-1");
        // "a 1" slugs to "a-1", which is already taken.
        assert_eq!(ids.next_id("a 1"), "a-1-1");
    }

    #[test]
    fn clear_cache_resets_scope() {
        let mut ids = generator("x-");
        ids.next_id("Intro");
        ids.clear_cache();
        assert_eq!(ids.last_base(), None);
        assert!(!ids.is_issued("x-intro"));
        assert_eq!(ids.reroll(), Err(IdError::NoPreviousId));
        assert_eq!(ids.next_id("Intro"), "x-intro");
    }

    #[test]
    fn empty_slug_still_yields_unique_ids() {
        let mut ids = generator("doctoc-");
        assert_eq!(ids.next_id("???"), "doctoc-");
        assert_eq!(ids.next_id("!!!"), "doctoc--1");
    }

    #[test]
    fn from_options_uses_configured_prefix_and_slugifier() {
        let options = TocOptions { id_prefix: "p-".into(), ..TocOptions::default() }
            .with_slugifier(Slugifier::new(|text: &str| text.len().to_string()));
        let mut ids = IdGenerator::from_options(&options);
        assert_eq!(ids.next_id("four"), "p-4");
    }
}
