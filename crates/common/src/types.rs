// Core domain types shared by the extractor, the tree builder and the pipeline.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A heading found in a document, in the shape handed to the tree builder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Heading {
    /// Tag name as written in the opening tag, e.g. "h3".
    pub tag: String,
    /// The declared id, or the one generated for this heading.
    pub id: String,
    /// Raw markup between the opening and closing tags.
    pub title: String,
    /// Heading level (1-6 for extracted headings).
    pub level: u8,
}

impl Heading {
    pub fn new(
        tag: impl Into<String>,
        id: impl Into<String>,
        title: impl Into<String>,
        level: u8,
    ) -> Self {
        Self { tag: tag.into(), id: id.into(), title: title.into(), level }
    }
}

/// A file flowing through the pipeline: raw contents plus free-form metadata.
///
/// Metadata carries the per-file directive flag on the way in and the
/// serialized TOC tree on the way out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileRecord {
    pub contents: Vec<u8>,
    pub metadata: Map<String, Value>,
}

impl FileRecord {
    pub fn new(contents: impl Into<Vec<u8>>) -> Self {
        Self { contents: contents.into(), metadata: Map::new() }
    }

    /// Builder-style metadata insertion.
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Contents as text, if they are valid UTF-8.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.contents).ok()
    }
}
