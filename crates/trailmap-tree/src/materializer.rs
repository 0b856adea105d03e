//! Depth-first materialization of a source hierarchy.
//!
//! # Traversal
//!
//! Pre-order, children in source order. A [`BuildContext`] owned by a
//! single `build` call carries the running node counter, the permalink
//! trail stack and the last computed URI. At any recursion depth the stack
//! holds exactly the permalinks from the root to the node being visited.
//!
//! Nodes whose permalink assignment declines still appear in the display
//! tree but are not registered and contribute no trail segment.

use std::collections::{BTreeMap, HashSet};

use trailmap_registry::{NodeId, PathRegistry};

use crate::display::{DisplayTree, MaterializedNode};
use crate::node::{Hierarchy, MenuId, SourceNode};

/// Options controlling URI assembly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaterializeOptions {
    /// Parent whose children form the top level.
    pub root_parent: NodeId,
    /// Build `/a/b/c` URIs instead of `/c`.
    pub nested_uri: bool,
    /// Segments placed before every trail.
    pub uri_prepend: Vec<String>,
}

impl Default for MaterializeOptions {
    fn default() -> Self {
        Self {
            root_parent: NodeId::from(0),
            nested_uri: false,
            uri_prepend: Vec::new(),
        }
    }
}

/// Permalink assignment for a node.
///
/// Returning `None` keeps the node out of the registry (e.g. unpublished
/// pages). Implemented for any `FnMut(&SourceNode, &NodeId) -> Option<String>`
/// where the second argument is the parent.
pub trait AssignPermalink {
    /// Permalink segment for `node`, or `None` to skip registration.
    fn assign(&mut self, node: &SourceNode, parent: &NodeId) -> Option<String>;
}

impl<F> AssignPermalink for F
where
    F: FnMut(&SourceNode, &NodeId) -> Option<String>,
{
    fn assign(&mut self, node: &SourceNode, parent: &NodeId) -> Option<String> {
        self(node, parent)
    }
}

/// Assigns the string form of a node attribute as permalink.
///
/// Nodes without the attribute, or with an empty value, are skipped.
#[derive(Clone, Debug)]
pub struct SlugField {
    field: String,
}

impl SlugField {
    /// Use attribute `field` as permalink.
    #[must_use]
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

impl AssignPermalink for SlugField {
    fn assign(&mut self, node: &SourceNode, _parent: &NodeId) -> Option<String> {
        node.attr_string(&self.field).filter(|slug| !slug.is_empty())
    }
}

/// Result of a single-hierarchy build.
#[derive(Debug)]
pub struct Materialized {
    /// Display tree for rendering.
    pub tree: DisplayTree,
    /// Registry of every permalinked node.
    pub registry: PathRegistry<MaterializedNode>,
}

/// Result of a multi-menu build.
#[derive(Debug)]
pub struct MaterializedMenus {
    /// Display tree per menu, in menu key order.
    pub menus: BTreeMap<MenuId, DisplayTree>,
    /// Registry shared by all menus.
    pub registry: PathRegistry<MaterializedNode>,
}

/// Walks hierarchies and produces display trees and path registries.
///
/// Every build starts from a fresh registry and counter, so building the
/// same input twice yields equal results.
#[derive(Clone, Debug, Default)]
pub struct TreeMaterializer {
    options: MaterializeOptions,
}

impl TreeMaterializer {
    /// Create a materializer.
    #[must_use]
    pub fn new(options: MaterializeOptions) -> Self {
        Self { options }
    }

    /// Materializer options.
    #[must_use]
    pub fn options(&self) -> &MaterializeOptions {
        &self.options
    }

    /// Materialize one hierarchy.
    pub fn build<A: AssignPermalink>(&self, source: &Hierarchy, mut assign: A) -> Materialized {
        let mut registry = PathRegistry::new();
        let mut ctx = BuildContext::new(&self.options, &mut assign, &mut registry);
        let tree = ctx.materialize(source);

        tracing::debug!(
            nodes = ctx.count,
            registered = ctx.registry.len(),
            "Hierarchy materialized"
        );

        Materialized { tree, registry }
    }

    /// Materialize several menus sharing one registry.
    ///
    /// Menus are walked in key order; the node counter and last URI carry
    /// over from one menu to the next.
    pub fn build_menus<A: AssignPermalink>(
        &self,
        menus: &BTreeMap<MenuId, Hierarchy>,
        mut assign: A,
    ) -> MaterializedMenus {
        let mut registry = PathRegistry::new();
        let mut ctx = BuildContext::new(&self.options, &mut assign, &mut registry);
        let trees = menus
            .iter()
            .map(|(menu_id, source)| (menu_id.clone(), ctx.materialize(source)))
            .collect();

        tracing::debug!(
            menus = menus.len(),
            nodes = ctx.count,
            registered = ctx.registry.len(),
            "Menus materialized"
        );

        MaterializedMenus {
            menus: trees,
            registry,
        }
    }
}

/// State owned by one build pass.
struct BuildContext<'a, A> {
    options: &'a MaterializeOptions,
    assign: &'a mut A,
    registry: &'a mut PathRegistry<MaterializedNode>,
    count: usize,
    trail: Vec<String>,
    last_uri: Option<String>,
    visiting: HashSet<NodeId>,
}

impl<'a, A: AssignPermalink> BuildContext<'a, A> {
    fn new(
        options: &'a MaterializeOptions,
        assign: &'a mut A,
        registry: &'a mut PathRegistry<MaterializedNode>,
    ) -> Self {
        Self {
            options,
            assign,
            registry,
            count: 0,
            trail: Vec::new(),
            last_uri: None,
            visiting: HashSet::new(),
        }
    }

    fn materialize(&mut self, source: &Hierarchy) -> DisplayTree {
        let root = self.options.root_parent.clone();
        let mut tree = DisplayTree::new(root.clone());
        self.visiting.insert(root.clone());
        self.walk(source, &root, &mut tree);
        self.visiting.remove(&root);
        tree
    }

    fn walk(&mut self, source: &Hierarchy, parent: &NodeId, tree: &mut DisplayTree) {
        for (sibling, node) in source.children(parent).iter().enumerate() {
            let index = self.count;
            self.count += 1;

            let permalink = self.assign.assign(node, parent);
            let mut uri = None;
            if let Some(segment) = &permalink {
                self.trail.push(segment.clone());
                let computed = if self.options.nested_uri {
                    format!("/{}", self.full_trail().join("/"))
                } else {
                    format!("/{segment}")
                };
                self.last_uri = Some(computed.clone());
                uri = Some(computed);
            }

            // A node already on the current path is listed without descending.
            let in_cycle = self.visiting.contains(&node.id);
            let has_child = source.has_children(&node.id) && !in_cycle;
            if in_cycle && source.has_children(&node.id) {
                tracing::warn!(id = %node.id, "Cycle in hierarchy: node is its own ancestor");
            }
            let materialized = MaterializedNode {
                id: node.id.clone(),
                parent: parent.clone(),
                permalink: permalink.clone(),
                index: permalink.as_ref().map(|_| index),
                siblings: permalink.as_ref().map(|_| sibling),
                uri: self.last_uri.clone(),
                trail: self.full_trail(),
                has_child,
                attributes: node.attributes.clone(),
            };

            if let Some(uri) = uri {
                self.registry.add_with_uri(
                    materialized.trail.clone(),
                    uri,
                    node.id.clone(),
                    materialized.clone(),
                );
            }
            tree.push(materialized);

            if has_child {
                self.visiting.insert(node.id.clone());
                self.walk(source, &node.id, tree);
                self.visiting.remove(&node.id);
            }

            if permalink.is_some() {
                self.trail.pop();
            }
        }
    }

    fn full_trail(&self) -> Vec<String> {
        self.options
            .uri_prepend
            .iter()
            .chain(&self.trail)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    /// `{0: {1: a, 2: b}, 1: {3: c}}`
    fn sample() -> Hierarchy {
        Hierarchy::from_nodes([
            SourceNode::new(1, 0).with_attr("slug", "a"),
            SourceNode::new(2, 0).with_attr("slug", "b"),
            SourceNode::new(3, 1).with_attr("slug", "c"),
        ])
    }

    fn nested() -> TreeMaterializer {
        TreeMaterializer::new(MaterializeOptions {
            nested_uri: true,
            ..MaterializeOptions::default()
        })
    }

    fn uri(tree: &DisplayTree, id: u32) -> Option<&str> {
        tree.get(&NodeId::from(id))?.uri.as_deref()
    }

    #[test]
    fn test_nested_uris() {
        let built = nested().build(&sample(), SlugField::new("slug"));

        assert_eq!(uri(&built.tree, 1), Some("/a"));
        assert_eq!(uri(&built.tree, 3), Some("/a/c"));
        assert_eq!(uri(&built.tree, 2), Some("/b"));
    }

    #[test]
    fn test_flat_uris() {
        let built = TreeMaterializer::default().build(&sample(), SlugField::new("slug"));

        assert_eq!(uri(&built.tree, 3), Some("/c"));
        assert_eq!(built.registry.exists("c").unwrap().trail, vec!["a", "c"]);
    }

    #[test]
    fn test_registry_order_is_traversal_order() {
        let built = nested().build(&sample(), SlugField::new("slug"));
        let registry = &built.registry;

        assert_eq!(registry.index("a"), Some(0));
        assert_eq!(registry.index("c"), Some(1));
        assert_eq!(registry.index("b"), Some(2));
        assert_eq!(registry.after("a").unwrap().slug(), "c");
        assert_eq!(registry.get_path_by_id(&NodeId::from(3)), Some("/a/c"));
    }

    #[test]
    fn test_annotations() {
        let built = nested().build(&sample(), SlugField::new("slug"));
        let a = built.tree.get(&NodeId::from(1)).unwrap();
        let b = built.tree.get(&NodeId::from(2)).unwrap();
        let c = built.tree.get(&NodeId::from(3)).unwrap();

        assert!(a.has_child);
        assert!(!b.has_child);
        assert_eq!((a.index, a.siblings), (Some(0), Some(0)));
        assert_eq!((c.index, c.siblings), (Some(1), Some(0)));
        assert_eq!((b.index, b.siblings), (Some(2), Some(1)));
        assert_eq!(c.permalink.as_deref(), Some("c"));
    }

    #[test]
    fn test_assigner_receives_parent() {
        let mut seen = Vec::new();
        let assign = |node: &SourceNode, parent: &NodeId| {
            seen.push((node.id.to_string(), parent.to_string()));
            node.attr_string("slug")
        };

        TreeMaterializer::default().build(&sample(), assign);

        assert_eq!(
            seen,
            vec![
                ("1".to_owned(), "0".to_owned()),
                ("3".to_owned(), "1".to_owned()),
                ("2".to_owned(), "0".to_owned()),
            ]
        );
    }

    #[test]
    fn test_declined_permalink_stays_in_tree_only() {
        let assign = |node: &SourceNode, _: &NodeId| {
            (node.id != NodeId::from(2)).then(|| node.attr_string("slug")).flatten()
        };

        let built = nested().build(&sample(), assign);

        let b = built.tree.get(&NodeId::from(2)).unwrap();
        assert!(b.permalink.is_none());
        assert!(b.index.is_none());
        assert_eq!(b.uri.as_deref(), Some("/a/c"));
        assert!(built.registry.exists("b").is_none());
        assert_eq!(built.registry.len(), 2);
    }

    #[test]
    fn test_declined_parent_contributes_no_segment() {
        let assign = |node: &SourceNode, _: &NodeId| {
            (node.id != NodeId::from(1)).then(|| node.attr_string("slug")).flatten()
        };

        let built = nested().build(&sample(), assign);

        assert_eq!(built.registry.get_path("c"), Some("/c"));
        assert!(built.tree.get(&NodeId::from(1)).unwrap().uri.is_none());
    }

    #[test]
    fn test_uri_prepend() {
        let materializer = TreeMaterializer::new(MaterializeOptions {
            nested_uri: true,
            uri_prepend: vec!["en".to_owned()],
            ..MaterializeOptions::default()
        });

        let built = materializer.build(&sample(), SlugField::new("slug"));

        assert_eq!(built.registry.get_path("c"), Some("/en/a/c"));
        assert_eq!(built.registry.exists("c").unwrap().trail, vec!["en", "a", "c"]);
    }

    #[test]
    fn test_root_parent_selects_subtree() {
        let materializer = TreeMaterializer::new(MaterializeOptions {
            root_parent: NodeId::from(1),
            nested_uri: true,
            ..MaterializeOptions::default()
        });

        let built = materializer.build(&sample(), SlugField::new("slug"));

        assert_eq!(built.tree.total(), 1);
        assert_eq!(built.registry.get_path("c"), Some("/c"));
    }

    #[test]
    fn test_build_is_idempotent() {
        let materializer = nested();
        let source = sample();

        let first = materializer.build(&source, SlugField::new("slug"));
        let second = materializer.build(&source, SlugField::new("slug"));

        assert_eq!(first.tree, second.tree);
        assert_eq!(first.registry.records(), second.registry.records());
    }

    #[test]
    fn test_cycle_is_not_followed() {
        let source = Hierarchy::from_nodes([
            SourceNode::new(1, 0).with_attr("slug", "a"),
            SourceNode::new(2, 1).with_attr("slug", "b"),
            SourceNode::new(1, 2).with_attr("slug", "a2"),
        ]);

        let built = nested().build(&source, SlugField::new("slug"));

        assert_eq!(built.tree.total(), 3);
        assert_eq!(built.registry.get_path("a2"), Some("/a/b/a2"));
        let repeated = &built.tree.children(&NodeId::from(2))[0];
        assert_eq!(repeated.permalink.as_deref(), Some("a2"));
        assert!(!repeated.has_child);
        assert!(!built.registry.exists("a2").unwrap().payload.has_child);
        assert!(built.tree.children(&NodeId::from(0))[0].has_child);
    }

    #[test]
    fn test_build_menus_shares_registry_and_counter() {
        let mut menus = BTreeMap::new();
        menus.insert(NodeId::from(2), sample());
        menus.insert(
            NodeId::from(1),
            Hierarchy::from_nodes([SourceNode::new(10, 0).with_attr("slug", "top")]),
        );

        let built = nested().build_menus(&menus, SlugField::new("slug"));

        assert_eq!(built.menus.len(), 2);
        assert_eq!(built.registry.index("top"), Some(0));
        assert_eq!(built.registry.index("a"), Some(1));
        let a = built.menus[&NodeId::from(2)].get(&NodeId::from(1)).unwrap();
        assert_eq!(a.index, Some(1));
    }

    #[test]
    fn test_build_menus_orders_numeric_menu_ids() {
        let mut menus = BTreeMap::new();
        menus.insert(
            NodeId::from(10),
            Hierarchy::from_nodes([SourceNode::new(100, 0).with_attr("slug", "ten")]),
        );
        menus.insert(
            NodeId::from(2),
            Hierarchy::from_nodes([SourceNode::new(20, 0).with_attr("slug", "two")]),
        );

        let built = nested().build_menus(&menus, SlugField::new("slug"));

        let order: Vec<&str> = built.registry.records().iter().map(|r| r.slug()).collect();
        assert_eq!(order, vec!["two", "ten"]);
        assert_eq!(built.registry.first().map(|r| r.slug()), Some("two"));
    }
}
