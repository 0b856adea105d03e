//! Depth-first menu rendering.
//!
//! Mirrors the shape of the materializer walk but only reads the display
//! tree. Items are filtered, emitted through an [`ItemEmitter`] and nested
//! into lists created through [`Containers`].
//!
//! # Depth
//!
//! Top-level items have depth 1. A nested list for an item at depth `d` is
//! only created when `max_depth` is 0 or `d + 1 <= max_depth`, so no item
//! deeper than `max_depth` is ever emitted.

use std::collections::{BTreeMap, HashSet};

use trailmap_tree::{DisplayTree, MaterializedNode, MenuId, NodeId, attribute_string};

use crate::container::Containers;
use crate::error::RenderError;

/// Options controlling menu output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Deepest rendered level, 0 for unlimited.
    pub max_depth: usize,
    /// Hide top-level items without children.
    pub hide_empty: bool,
    /// Attribute values an item must have to be rendered.
    pub where_filter: BTreeMap<String, String>,
    /// Container kind for lists.
    pub list_kind: String,
    /// Container kind for items.
    pub item_kind: String,
    /// Class of the root list.
    pub class: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_depth: 0,
            hide_empty: false,
            where_filter: BTreeMap::new(),
            list_kind: "ul".to_owned(),
            item_kind: "li".to_owned(),
            class: "level-1 clearfix".to_owned(),
        }
    }
}

/// An item about to be emitted.
#[derive(Clone, Copy, Debug)]
pub struct Item<'a> {
    /// Materialized node.
    pub node: &'a MaterializedNode,
    /// True if this node is the currently resolved one.
    pub active: bool,
    /// Rendered depth, 1 for top-level items.
    pub depth: usize,
    /// Node identifier.
    pub id: &'a NodeId,
    /// Parent identifier.
    pub parent: &'a NodeId,
    /// True if a nested list will follow (false when cut by `max_depth`).
    pub has_children: bool,
    /// Container kind to create for the item.
    pub kind: &'a str,
}

/// Produces the container for each rendered item.
///
/// Implemented for closures `FnMut(&mut C, &Item) -> C::Handle`.
pub trait ItemEmitter<C: Containers> {
    /// Create the item container. The renderer nests it into the list.
    fn emit(&mut self, containers: &mut C, item: &Item<'_>) -> C::Handle;

    /// Called with a finished list: nested lists get their owning item,
    /// the root list gets `None` once the whole menu is done.
    fn close(&mut self, _containers: &mut C, _list: &C::Handle, _item: Option<&Item<'_>>) {}
}

impl<C, F> ItemEmitter<C> for F
where
    C: Containers,
    F: FnMut(&mut C, &Item<'_>) -> C::Handle,
{
    fn emit(&mut self, containers: &mut C, item: &Item<'_>) -> C::Handle {
        self(containers, item)
    }
}

/// Root list of a rendered menu.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedMenu<H> {
    /// Handle of the root list.
    pub root: H,
    /// Number of emitted items.
    pub count: usize,
}

/// Renders display trees into nested containers.
#[derive(Clone, Debug, Default)]
pub struct MenuRenderer {
    options: RenderOptions,
}

impl MenuRenderer {
    /// Create a renderer.
    #[must_use]
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Renderer options.
    #[must_use]
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render the children of `parent`.
    ///
    /// `active` is the identifier of the currently resolved node.
    pub fn render<C, E>(
        &self,
        tree: &DisplayTree,
        parent: &NodeId,
        active: Option<&NodeId>,
        containers: &mut C,
        emitter: &mut E,
    ) -> RenderedMenu<C::Handle>
    where
        C: Containers,
        E: ItemEmitter<C>,
    {
        let root = containers.create(&self.options.list_kind);
        containers.set_attribute(&root, "class", &self.options.class);

        let mut pass = RenderPass {
            options: &self.options,
            tree,
            root_parent: parent,
            active,
            containers,
            emitter,
            count: 0,
            visiting: HashSet::new(),
        };
        pass.visiting.insert(parent.clone());
        pass.render_level(parent, &root, 1);
        let count = pass.count;
        pass.emitter.close(pass.containers, &root, None);

        tracing::debug!(parent = %parent, items = count, "Menu rendered");

        RenderedMenu { root, count }
    }

    /// Render one menu out of a multi-menu build.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::NoMenuSelected` without a selection, and
    /// `UnknownMenu`/`EmptyMenu` when the selection has nothing to render.
    pub fn render_menu<C, E>(
        &self,
        menus: &BTreeMap<MenuId, DisplayTree>,
        selected: Option<&MenuId>,
        parent: &NodeId,
        active: Option<&NodeId>,
        containers: &mut C,
        emitter: &mut E,
    ) -> Result<RenderedMenu<C::Handle>, RenderError>
    where
        C: Containers,
        E: ItemEmitter<C>,
    {
        let selected = selected.ok_or(RenderError::NoMenuSelected)?;
        let tree = menus
            .get(selected)
            .ok_or_else(|| RenderError::UnknownMenu(selected.clone()))?;
        if tree.is_empty() {
            return Err(RenderError::EmptyMenu(selected.clone()));
        }
        Ok(self.render(tree, parent, active, containers, emitter))
    }
}

/// State owned by one render call.
struct RenderPass<'a, C, E> {
    options: &'a RenderOptions,
    tree: &'a DisplayTree,
    root_parent: &'a NodeId,
    active: Option<&'a NodeId>,
    containers: &'a mut C,
    emitter: &'a mut E,
    count: usize,
    visiting: HashSet<NodeId>,
}

impl<C: Containers, E: ItemEmitter<C>> RenderPass<'_, C, E> {
    fn render_level(&mut self, parent: &NodeId, list: &C::Handle, depth: usize) {
        let tree = self.tree;
        let options = self.options;
        for node in tree.children(parent) {
            if !self.matches_where(node) {
                continue;
            }

            let has_children = tree.has_children(&node.id) && !self.visiting.contains(&node.id);
            if options.hide_empty && parent == self.root_parent && !has_children {
                continue;
            }

            let within_depth = options.max_depth == 0 || depth < options.max_depth;
            let item = Item {
                node,
                active: self.active == Some(&node.id),
                depth,
                id: &node.id,
                parent,
                has_children: has_children && within_depth,
                kind: &options.item_kind,
            };

            let handle = self.emitter.emit(self.containers, &item);
            self.containers.nest(list, &handle);

            if item.has_children {
                let nested = self.containers.create(&options.list_kind);
                self.containers.set_attribute(
                    &nested,
                    "class",
                    &format!("level-{} clearfix", depth + 1),
                );
                self.containers.nest(&handle, &nested);

                self.visiting.insert(node.id.clone());
                self.render_level(&node.id, &nested, depth + 1);
                self.visiting.remove(&node.id);

                self.emitter.close(self.containers, &nested, Some(&item));
            }

            self.count += 1;
        }
    }

    /// Nodes lacking a filtered attribute (or holding `null`) pass; present
    /// values must match.
    fn matches_where(&self, node: &MaterializedNode) -> bool {
        self.options.where_filter.iter().all(|(key, required)| {
            node.attributes
                .get(key)
                .filter(|value| !value.is_null())
                .is_none_or(|value| attribute_string(value) == *required)
        })
    }
}
