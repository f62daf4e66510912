// Heading extraction: split HTML content into heading and other fragments.
//
// Only the restricted `<hN attrs>text</hN>` shape is recognized: N is 1-6, the
// closer names the same level (any case) and the text contains no `<`. Anything
// else, including nested markup inside a heading, passes through as opaque text.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use thiserror::Error;
use tracing::{trace, warn};

use crate::options::TocOptions;
use crate::toc::id::{IdError, IdGenerator};
use crate::types::Heading;

/// Capture groups per heading alternative: tag, attributes, title, closing tag.
const GROUPS_PER_LEVEL: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    /// The pattern paired an opener with a closer of another level. The
    /// compiled pattern makes this unreachable; hitting it is a bug.
    #[error("internal error: heading pattern paired <{open}> with </{close}> at byte {offset}")]
    MismatchedTags { open: String, close: String, offset: usize },

    #[error(transparent)]
    Id(#[from] IdError),
}

/// One recognized heading element, with everything needed to write it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingFragment {
    /// Opening tag name as written, e.g. "h2" or "H2".
    pub tag: String,
    /// Closing tag name as written.
    pub close_tag: String,
    pub level: u8,
    /// Raw attribute text of the opening tag, including its leading whitespace.
    pub attributes: String,
    pub title: String,
    /// Declared or generated id; `None` for ignored headings.
    pub id: Option<String>,
    /// The opening tag already declared an id.
    pub had_id: bool,
    /// Level outside the selector range.
    pub ignored: bool,
}

impl HeadingFragment {
    /// True when the id was generated here and must be injected on write-back.
    pub fn has_generated_id(&self) -> bool {
        !self.ignored && !self.had_id && self.id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Other(String),
    Heading(HeadingFragment),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Every fragment in document order, ignored headings included.
    pub fragments: Vec<Fragment>,
    /// Selected headings in document order.
    pub headings: Vec<Heading>,
    /// How many ids were generated.
    pub new_ids: usize,
}

/// Scan `content` for headings and assign ids to selected headings lacking one.
pub fn extract(
    content: &str,
    options: &TocOptions,
    ids: &mut IdGenerator,
) -> Result<Extraction, ExtractError> {
    let mut seen = if options.make_ids_unique { declared_ids(content) } else { HashSet::new() };
    let mut extraction = Extraction::default();
    let mut cursor = 0usize;

    for captures in heading_pattern().captures_iter(content) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        let Some(mut heading) = read_heading(&captures, whole.start())? else {
            continue;
        };

        if cursor < whole.start() {
            extraction.fragments.push(Fragment::Other(content[cursor..whole.start()].to_string()));
        }
        cursor = whole.end();

        if !options.selects(heading.level) {
            heading.ignored = true;
        } else if let Some(declared) = find_declared_id(&heading.attributes) {
            heading.had_id = true;
            heading.id = Some(declared.to_string());
        } else {
            let mut id = ids.next_id(&heading.title);
            while seen.contains(&id) {
                id = ids.reroll()?;
            }
            seen.insert(id.clone());
            trace!(id = %id, level = heading.level, "generated heading id");
            heading.id = Some(id);
            extraction.new_ids += 1;
        }

        if let Some(id) = heading.id.as_ref().filter(|_| !heading.ignored) {
            extraction.headings.push(Heading {
                tag: heading.tag.clone(),
                id: id.clone(),
                title: heading.title.clone(),
                level: heading.level,
            });
        }
        extraction.fragments.push(Fragment::Heading(heading));
    }

    if cursor < content.len() {
        extraction.fragments.push(Fragment::Other(content[cursor..].to_string()));
    }

    Ok(extraction)
}

/// Every `id='…'`/`id="…"` value declared anywhere in `content`.
pub fn declared_ids(content: &str) -> HashSet<String> {
    let mut ids = HashSet::new();
    for captures in id_pattern().captures_iter(content) {
        let Some(value) = captures.get(1).or_else(|| captures.get(2)) else {
            continue;
        };
        if !ids.insert(value.as_str().to_string()) {
            warn!(id = value.as_str(), "id is declared more than once in this document");
        }
    }
    ids
}

fn find_declared_id(attributes: &str) -> Option<&str> {
    let captures = id_pattern().captures(attributes)?;
    captures.get(1).or_else(|| captures.get(2)).map(|value| value.as_str())
}

fn read_heading(
    captures: &Captures<'_>,
    offset: usize,
) -> Result<Option<HeadingFragment>, ExtractError> {
    // Only the alternative that matched has its groups set.
    let first = (0..6)
        .map(|alternative| alternative * GROUPS_PER_LEVEL + 1)
        .find(|&group| captures.get(group).is_some());
    let Some(first) = first else {
        return Ok(None);
    };
    let group = |index: usize| captures.get(first + index).map_or("", |m| m.as_str());
    let (tag, attributes, title, close_tag) = (group(0), group(1), group(2), group(3));

    let mismatch = || ExtractError::MismatchedTags {
        open: tag.to_string(),
        close: close_tag.to_string(),
        offset,
    };
    let (Some(level), Some(close_level)) = (tag_level(tag), tag_level(close_tag)) else {
        return Err(mismatch());
    };
    if level != close_level {
        return Err(mismatch());
    }

    Ok(Some(HeadingFragment {
        tag: tag.to_string(),
        close_tag: close_tag.to_string(),
        level,
        attributes: attributes.to_string(),
        title: title.to_string(),
        id: None,
        had_id: false,
        ignored: false,
    }))
}

fn tag_level(tag: &str) -> Option<u8> {
    tag.get(1..).and_then(|digits| digits.parse::<u8>().ok())
}

fn heading_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // One alternative per level; the regex crate has no backreferences.
        let alternatives: Vec<String> =
            (1..=6).map(|level| format!(r"<(h{level})([^>]*)>([^<]*)</(h{level})>")).collect();
        Regex::new(&format!("(?i){}", alternatives.join("|")))
            .expect("heading pattern should compile")
    })
}

fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)(?:^|\s)id\s*=\s*(?:'([^']*)'|"([^"]*)")"#)
            .expect("id attribute pattern should compile")
    })
}
