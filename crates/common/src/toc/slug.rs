// Heading slug generation.
//
// Slugs: NFKD-decompose, drop combining marks, lowercase ASCII alphanumerics,
// turn every other character into a hyphen, collapse and trim hyphens.
// `Slugifier` wraps any text → slug function so callers can plug in their own.

use std::fmt;
use std::sync::Arc;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Convert heading text into an identifier-safe slug.
///
/// - Decomposes accented letters so `Über` becomes `uber`
/// - Lowercases ASCII letters
/// - Replaces anything that is not ASCII alphanumeric with hyphens
/// - Collapses consecutive hyphens and strips leading/trailing ones
///
/// Returns an empty string if nothing alphanumeric survives.
pub fn slugify(heading: &str) -> String {
    let raw: String = heading
        .nfkd()
        .filter(|ch| !is_combining_mark(*ch))
        .map(|ch| if ch.is_ascii_alphanumeric() { ch.to_ascii_lowercase() } else { '-' })
        .collect();

    raw.split('-').filter(|part| !part.is_empty()).collect::<Vec<_>>().join("-")
}

/// A pluggable text → slug transform. Defaults to [`slugify`].
#[derive(Clone)]
pub struct Slugifier(Arc<dyn Fn(&str) -> String + Send + Sync>);

impl Slugifier {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(func))
    }

    pub fn apply(&self, text: &str) -> String {
        (self.0)(text)
    }
}

impl Default for Slugifier {
    fn default() -> Self {
        Self::new(slugify)
    }
}

impl fmt::Debug for Slugifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Slugifier(..)")
    }
}
