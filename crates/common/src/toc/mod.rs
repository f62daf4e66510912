// Table-of-contents generation for one document.
//
// extract → (reassemble if any id was generated) + build_tree → Toc

pub mod extract;
pub mod id;
pub mod reassemble;
pub mod slug;
pub mod tree;

use thiserror::Error;

use crate::options::TocOptions;
use crate::types::Heading;

use self::extract::{extract, ExtractError};
use self::id::IdGenerator;
use self::reassemble::reassemble;
use self::tree::{TocTree, TreeError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TocError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Result of processing one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toc {
    /// Selected headings in document order.
    pub headings: Vec<Heading>,
    pub tree: TocTree,
    /// Rewritten content; `None` when no id was generated and the input stands.
    pub contents: Option<String>,
}

impl Toc {
    pub fn new_ids(&self) -> bool {
        self.contents.is_some()
    }
}

/// Extract headings from `content`, assign missing ids and build the tree.
///
/// `ids` is the uniqueness scope; pass a fresh generator per document unless
/// ids must stay unique across documents.
pub fn generate(
    content: &str,
    options: &TocOptions,
    ids: &mut IdGenerator,
) -> Result<Toc, TocError> {
    let extraction = extract(content, options, ids)?;
    let contents = (extraction.new_ids > 0).then(|| reassemble(&extraction.fragments));
    let tree = TocTree::from_headings(&extraction.headings)?;
    Ok(Toc { headings: extraction.headings, tree, contents })
}
