//! Display tree produced by materialization.
//!
//! Nodes are grouped by parent in source order and carry everything menu
//! rendering needs: the computed URI, sibling position and whether the
//! source has children for them.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};
use trailmap_registry::NodeId;

use crate::node::attribute_string;

/// A source node annotated by the materializer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MaterializedNode {
    /// Node identifier.
    pub id: NodeId,
    /// Parent identifier.
    pub parent: NodeId,
    /// Assigned permalink segment, `None` if assignment declined.
    pub permalink: Option<String>,
    /// Traversal position across the whole build (permalinked nodes only).
    pub index: Option<usize>,
    /// Position among the parent's children (permalinked nodes only).
    pub siblings: Option<usize>,
    /// Computed URI.
    ///
    /// A node without permalink keeps the last URI computed before it.
    pub uri: Option<String>,
    /// Trail of permalink segments up to and including this node.
    pub trail: Vec<String>,
    /// True if the source hierarchy has children for this node.
    pub has_child: bool,
    /// Source node fields.
    pub attributes: Map<String, Value>,
}

impl MaterializedNode {
    /// Attribute in string form.
    #[must_use]
    pub fn attr_string(&self, key: &str) -> Option<String> {
        self.attributes.get(key).map(attribute_string)
    }
}

/// Parent to ordered children mapping of materialized nodes.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DisplayTree {
    root: NodeId,
    children: HashMap<NodeId, Vec<MaterializedNode>>,
}

impl DisplayTree {
    pub(crate) fn new(root: NodeId) -> Self {
        Self {
            root,
            children: HashMap::new(),
        }
    }

    pub(crate) fn push(&mut self, node: MaterializedNode) {
        self.children
            .entry(node.parent.clone())
            .or_default()
            .push(node);
    }

    /// Parent the tree was built from.
    #[must_use]
    pub fn root(&self) -> &NodeId {
        &self.root
    }

    /// Children of `parent` in source order.
    #[must_use]
    pub fn children(&self, parent: &NodeId) -> &[MaterializedNode] {
        self.children.get(parent).map_or(&[][..], Vec::as_slice)
    }

    /// Identifiers of the children of `parent`.
    #[must_use]
    pub fn children_ids(&self, parent: &NodeId) -> Vec<NodeId> {
        self.children(parent).iter().map(|n| n.id.clone()).collect()
    }

    /// True if `id` has children in the tree.
    #[must_use]
    pub fn has_children(&self, id: &NodeId) -> bool {
        !self.children(id).is_empty()
    }

    /// Number of children of `parent`.
    #[must_use]
    pub fn count(&self, parent: &NodeId) -> usize {
        self.children(parent).len()
    }

    /// Total number of nodes.
    #[must_use]
    pub fn total(&self) -> usize {
        self.children.values().map(Vec::len).sum()
    }

    /// True if the tree has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Find a node by identifier.
    #[must_use]
    pub fn get(&self, id: &NodeId) -> Option<&MaterializedNode> {
        self.children
            .values()
            .flat_map(|nodes| nodes.iter())
            .find(|node| &node.id == id)
    }

    /// Children list at the end of the first-child chain below `parent`.
    ///
    /// Follows the first child at every level and returns the children of
    /// the deepest node that has any. Empty if `parent` has no children.
    #[must_use]
    pub fn last_child(&self, parent: &NodeId) -> &[MaterializedNode] {
        let mut current = self.children(parent);
        let mut guard = 0;
        while let Some(first) = current.first() {
            let next = self.children(&first.id);
            if next.is_empty() || guard > self.children.len() {
                break;
            }
            current = next;
            guard += 1;
        }
        current
    }
}
