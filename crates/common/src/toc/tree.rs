// TOC tree construction and finalization.
//
// Nodes live in an arena (`TocTree::nodes`) and refer to each other by index.
// `children` is the owning relation; `parent`, `next`, `previous` and
// `children_all` are derived links filled in by the builder and finalizer.
//
// Building: a synthetic root of level 0 precedes every heading. Each node Y is
// compared with the node X right before it. If X.level < Y.level, Y is X's
// child. Otherwise the parent is the first ancestor of X whose level is below
// Y's. The root's level is below every heading level, so the walk ends.

use std::collections::VecDeque;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::types::Heading;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("heading #{index} has invalid level {level} (levels start at 1)")]
    InvalidLevel { index: usize, level: u8 },
}

/// Index of a node in its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocNode {
    /// `None` only for the synthetic root.
    pub heading: Option<Heading>,
    /// Raw heading level after building; depth below the root after normalization.
    pub level: u8,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub next: Option<NodeId>,
    pub previous: Option<NodeId>,
    /// All descendants, depth-first in document order.
    pub children_all: Vec<NodeId>,
}

impl TocNode {
    fn new(heading: Option<Heading>, level: u8) -> Self {
        Self {
            heading,
            level,
            parent: None,
            children: Vec::new(),
            next: None,
            previous: None,
            children_all: Vec::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.heading.is_none()
    }

    pub fn tag(&self) -> Option<&str> {
        self.heading.as_ref().map(|heading| heading.tag.as_str())
    }

    pub fn id(&self) -> Option<&str> {
        self.heading.as_ref().map(|heading| heading.id.as_str())
    }

    pub fn title(&self) -> Option<&str> {
        self.heading.as_ref().map(|heading| heading.title.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocTree {
    nodes: Vec<TocNode>,
}

impl TocTree {
    /// Build, link and normalize a tree from headings in document order.
    pub fn from_headings(headings: &[Heading]) -> Result<Self, TreeError> {
        let mut tree = Self::build(headings)?;
        tree.finalize_links();
        tree.normalize_levels();
        Ok(tree)
    }

    /// Parent/child structure only, with raw levels and no sibling links.
    pub fn build(headings: &[Heading]) -> Result<Self, TreeError> {
        let mut nodes = Vec::with_capacity(headings.len() + 1);
        nodes.push(TocNode::new(None, 0));

        for (index, heading) in headings.iter().enumerate() {
            if heading.level == 0 {
                return Err(TreeError::InvalidLevel { index, level: heading.level });
            }
            nodes.push(TocNode::new(Some(heading.clone()), heading.level));
        }

        for current in 1..nodes.len() {
            let previous = current - 1;
            let level = nodes[current].level;

            let parent = if nodes[previous].level < level {
                previous
            } else {
                let mut candidate = nodes[previous].parent.unwrap_or(NodeId::ROOT).0;
                while nodes[candidate].level >= level {
                    candidate = nodes[candidate].parent.unwrap_or(NodeId::ROOT).0;
                }
                candidate
            };

            nodes[current].parent = Some(NodeId(parent));
            nodes[parent].children.push(NodeId(current));
        }

        Ok(Self { nodes })
    }

    /// Fill in `next`, `previous` and `children_all` on every node.
    ///
    /// Walks a breadth-first buffer backwards, so each node's children are
    /// finished before the node concatenates their `children_all`.
    pub fn finalize_links(&mut self) {
        let order = self.breadth_first();

        for node in &mut self.nodes {
            node.next = None;
            node.previous = None;
            node.children_all.clear();
        }

        for &id in order.iter().rev() {
            let children = self.nodes[id.0].children.clone();

            for pair in children.windows(2) {
                self.nodes[pair[0].0].next = Some(pair[1]);
                self.nodes[pair[1].0].previous = Some(pair[0]);
            }

            let mut all = Vec::new();
            for &child in &children {
                all.push(child);
                all.extend_from_slice(&self.nodes[child.0].children_all);
            }
            self.nodes[id.0].children_all = all;
        }
    }

    /// Rewrite levels so every child sits exactly one below its parent.
    pub fn normalize_levels(&mut self) {
        for id in self.breadth_first().into_iter().skip(1) {
            if let Some(parent) = self.nodes[id.0].parent {
                self.nodes[id.0].level = self.nodes[parent.0].level.saturating_add(1);
            }
        }
    }

    pub fn root(&self) -> &TocNode {
        &self.nodes[NodeId::ROOT.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&TocNode> {
        self.nodes.get(id.0)
    }

    /// Panics if `id` belongs to another tree.
    pub fn node(&self, id: NodeId) -> &TocNode {
        &self.nodes[id.0]
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Number of headings in the tree.
    pub fn heading_count(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &TocNode)> {
        self.nodes.iter().enumerate().map(|(index, node)| (NodeId(index), node))
    }

    /// Headings in document order.
    pub fn headings(&self) -> impl Iterator<Item = &Heading> {
        self.nodes.iter().filter_map(|node| node.heading.as_ref())
    }

    fn breadth_first(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut queue = VecDeque::from([NodeId::ROOT]);
        while let Some(id) = queue.pop_front() {
            order.push(id);
            queue.extend(self.nodes[id.0].children.iter().copied());
        }
        order
    }
}

/// Build a finalized tree from headings in document order.
pub fn build_tree(headings: &[Heading]) -> Result<TocTree, TreeError> {
    TocTree::from_headings(headings)
}

// Serialized as nested objects, root first:
// `{ level, index, tag?, id?, title?, parent, next, previous, children_all, children }`.
// `index` is the node's arena position (root 0, then headings in document
// order); the derived links refer to other nodes by that index, `null` if unset.
impl Serialize for TocTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        NestedNode { tree: self, id: NodeId::ROOT }.serialize(serializer)
    }
}

struct NestedNode<'a> {
    tree: &'a TocTree,
    id: NodeId,
}

impl Serialize for NestedNode<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let node = self.tree.node(self.id);
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("level", &node.level)?;
        map.serialize_entry("index", &self.id.0)?;
        if let Some(heading) = &node.heading {
            map.serialize_entry("tag", &heading.tag)?;
            map.serialize_entry("id", &heading.id)?;
            map.serialize_entry("title", &heading.title)?;
        }
        map.serialize_entry("parent", &node.parent.map(NodeId::index))?;
        map.serialize_entry("next", &node.next.map(NodeId::index))?;
        map.serialize_entry("previous", &node.previous.map(NodeId::index))?;
        let all: Vec<usize> = node.children_all.iter().map(|id| id.0).collect();
        map.serialize_entry("children_all", &all)?;
        let children = NestedChildren { tree: self.tree, children: &node.children };
        map.serialize_entry("children", &children)?;
        map.end()
    }
}

struct NestedChildren<'a> {
    tree: &'a TocTree,
    children: &'a [NodeId],
}

impl Serialize for NestedChildren<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.children.len()))?;
        for &id in self.children {
            seq.serialize_element(&NestedNode { tree: self.tree, id })?;
        }
        seq.end()
    }
}
