//! Source hierarchy as supplied by the caller.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use trailmap_registry::NodeId;

/// Key selecting one hierarchy when several menus share a source.
pub type MenuId = NodeId;

fn default_parent() -> NodeId {
    NodeId::from(0)
}

/// A node of the source hierarchy.
///
/// Everything besides `id` and `parent` lands in `attributes` and is
/// available to permalink assignment, where filters and item emitters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceNode {
    /// Node identifier.
    pub id: NodeId,
    /// Parent identifier (`0` for top-level nodes).
    #[serde(default = "default_parent")]
    pub parent: NodeId,
    /// Free-form node fields.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl SourceNode {
    /// Create a node without attributes.
    #[must_use]
    pub fn new(id: impl Into<NodeId>, parent: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            parent: parent.into(),
            attributes: Map::new(),
        }
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn with_attr(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.to_owned(), value.into());
        self
    }

    /// Raw attribute value.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Attribute in string form (see [`attribute_string`]).
    #[must_use]
    pub fn attr_string(&self, key: &str) -> Option<String> {
        self.attr(key).map(attribute_string)
    }
}

/// String form of an attribute value used for comparisons.
///
/// Strings are taken verbatim, `null` and `false` are empty, `true` is `1`,
/// everything else uses its JSON representation (`3`, `[1,2]`).
#[must_use]
pub fn attribute_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null | Value::Bool(false) => String::new(),
        Value::Bool(true) => "1".to_owned(),
        other => other.to_string(),
    }
}

/// Parent-indexed source hierarchy.
///
/// Children keep the order in which they were inserted.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(from = "Vec<SourceNode>")]
pub struct Hierarchy {
    children: HashMap<NodeId, Vec<SourceNode>>,
    len: usize,
}

impl Hierarchy {
    /// Create an empty hierarchy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Group a flat list of nodes by parent, preserving order.
    pub fn from_nodes(nodes: impl IntoIterator<Item = SourceNode>) -> Self {
        nodes.into_iter().collect()
    }

    /// Append a node under its parent.
    pub fn insert(&mut self, node: SourceNode) {
        self.children
            .entry(node.parent.clone())
            .or_default()
            .push(node);
        self.len += 1;
    }

    /// Children of `parent` in insertion order.
    #[must_use]
    pub fn children(&self, parent: &NodeId) -> &[SourceNode] {
        self.children.get(parent).map_or(&[][..], Vec::as_slice)
    }

    /// True if `id` has an entry as a parent.
    #[must_use]
    pub fn has_children(&self, id: &NodeId) -> bool {
        self.children.get(id).is_some_and(|c| !c.is_empty())
    }

    /// Total number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if the hierarchy has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl FromIterator<SourceNode> for Hierarchy {
    fn from_iter<T: IntoIterator<Item = SourceNode>>(iter: T) -> Self {
        let mut hierarchy = Self::new();
        for node in iter {
            hierarchy.insert(node);
        }
        hierarchy
    }
}

impl From<Vec<SourceNode>> for Hierarchy {
    fn from(nodes: Vec<SourceNode>) -> Self {
        nodes.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_from_nodes_groups_by_parent_in_order() {
        let hierarchy = Hierarchy::from_nodes([
            SourceNode::new(1, 0),
            SourceNode::new(3, 1),
            SourceNode::new(2, 0),
        ]);

        let top: Vec<&str> = hierarchy
            .children(&NodeId::from(0))
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(top, vec!["1", "2"]);
        assert!(hierarchy.has_children(&NodeId::from(1)));
        assert!(!hierarchy.has_children(&NodeId::from(2)));
        assert_eq!(hierarchy.len(), 3);
    }

    #[test]
    fn test_children_of_unknown_parent_is_empty() {
        let hierarchy = Hierarchy::new();

        assert!(hierarchy.children(&NodeId::from(7)).is_empty());
        assert!(hierarchy.is_empty());
    }

    #[test]
    fn test_deserialize_flat_json() {
        let hierarchy: Hierarchy = serde_json::from_value(json!([
            {"id": 1, "title": "Home", "slug": "home"},
            {"id": 2, "parent": 1, "title": "About", "status": "draft"}
        ]))
        .unwrap();

        let child = &hierarchy.children(&NodeId::from(1))[0];
        assert_eq!(child.id, NodeId::from(2));
        assert_eq!(child.attr_string("status").as_deref(), Some("draft"));
        let home = &hierarchy.children(&NodeId::from(0))[0];
        assert_eq!(home.attr_string("slug").as_deref(), Some("home"));
    }

    #[test]
    fn test_attribute_string_forms() {
        assert_eq!(attribute_string(&json!("x")), "x");
        assert_eq!(attribute_string(&json!(3)), "3");
        assert_eq!(attribute_string(&json!(true)), "1");
        assert_eq!(attribute_string(&json!(false)), "");
        assert_eq!(attribute_string(&Value::Null), "");
    }
}
