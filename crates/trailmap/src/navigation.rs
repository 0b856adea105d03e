//! Navigation facade.
//!
//! [`Navigation`] owns a source hierarchy (or several menus sharing one
//! source) together with materialization and rendering options. A call to
//! [`Navigation::build`] replaces the display tree and path registry in
//! full; queries that need them fail with [`NavigationError::NotBuilt`]
//! until then.

use std::collections::BTreeMap;

use trailmap_config::Config;
use trailmap_menu::{
    Containers, HtmlDocument, ItemEmitter, LinkEmitter, MenuRenderer, RenderError, RenderOptions,
    RenderedMenu,
};
use trailmap_registry::{NodeId, PathRegistry, ResolutionOutcome};
use trailmap_tree::{
    AssignPermalink, DisplayTree, Hierarchy, MaterializeOptions, MaterializedNode, MenuId,
    SlugField, TreeMaterializer,
};

/// Source hierarchy handed to [`Navigation`].
#[derive(Clone, Debug)]
pub enum Source {
    /// One hierarchy, one menu.
    Single(Hierarchy),
    /// Independent menus keyed by menu identifier.
    Multiple(BTreeMap<MenuId, Hierarchy>),
}

/// Navigation error.
#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    /// Query issued before [`Navigation::build`].
    #[error("Navigation has not been built yet")]
    NotBuilt,
    /// Menu selection error.
    #[error(transparent)]
    Render(#[from] RenderError),
}

#[derive(Debug)]
enum Trees {
    Single(DisplayTree),
    Multiple(BTreeMap<MenuId, DisplayTree>),
}

#[derive(Debug)]
struct Built {
    trees: Trees,
    registry: PathRegistry<MaterializedNode>,
}

/// Builds, resolves and renders navigation for a content hierarchy.
#[derive(Debug)]
pub struct Navigation {
    source: Source,
    materialize: MaterializeOptions,
    render: RenderOptions,
    selected: Option<MenuId>,
    permalink_field: String,
    title_field: String,
    start_trail: Option<Vec<String>>,
    built: Option<Built>,
    rendered_count: usize,
}

impl Navigation {
    /// Create navigation for `source` with options taken from `config`.
    #[must_use]
    pub fn new(source: Source, config: &Config) -> Self {
        let materialize = MaterializeOptions {
            root_parent: NodeId::from(&config.tree.root_parent),
            nested_uri: config.tree.nested_uri,
            uri_prepend: config.tree.uri_prepend.clone(),
        };
        let render = RenderOptions {
            max_depth: config.menu.max_depth,
            hide_empty: config.menu.hide_empty,
            where_filter: config.menu.where_filter.clone(),
            list_kind: config.menu.list_tag.clone(),
            item_kind: config.menu.item_tag.clone(),
            class: config.root_class(),
        };

        Self {
            source,
            materialize,
            render,
            selected: config.menu.select.as_deref().map(NodeId::from),
            permalink_field: config.tree.permalink_field.clone(),
            title_field: config.menu.title_field.clone(),
            start_trail: config.resolve.start_trail.clone(),
            built: None,
            rendered_count: 0,
        }
    }

    /// Set the parent whose children form the top level.
    pub fn set_parent(&mut self, parent: impl Into<NodeId>) -> &mut Self {
        self.materialize.root_parent = parent.into();
        self
    }

    /// Build nested URIs (`/a/b/c`) instead of terminal ones (`/c`).
    pub fn nesting_uri(&mut self, nested: bool) -> &mut Self {
        self.materialize.nested_uri = nested;
        self
    }

    /// Segments placed before every URI trail.
    pub fn uri_prepend<I, S>(&mut self, segments: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.materialize.uri_prepend = segments.into_iter().map(Into::into).collect();
        self
    }

    /// Add where-filter entries (merged with existing ones).
    pub fn set_where<I, K, V>(&mut self, entries: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.render
            .where_filter
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Remove a where-filter entry.
    pub fn unset_where(&mut self, key: &str) -> &mut Self {
        self.render.where_filter.remove(key);
        self
    }

    /// Deepest rendered level, 0 for unlimited.
    pub fn set_level(&mut self, max_depth: usize) -> &mut Self {
        self.render.max_depth = max_depth;
        self
    }

    /// Hide top-level items without children.
    pub fn hide_empty(&mut self, hide: bool) -> &mut Self {
        self.render.hide_empty = hide;
        self
    }

    /// Select the menu to query and render in multi-menu mode.
    pub fn select(&mut self, menu: impl Into<MenuId>) -> &mut Self {
        self.selected = Some(menu.into());
        self
    }

    /// Add a class to the root list, or replace its classes.
    pub fn set_class(&mut self, class: &str, preserve: bool) -> &mut Self {
        if preserve {
            self.render.class = format!("{} {class}", self.render.class);
        } else {
            class.clone_into(&mut self.render.class);
        }
        self
    }

    /// Build using the configured permalink attribute.
    pub fn build(&mut self) -> &mut Self {
        let assign = SlugField::new(self.permalink_field.clone());
        self.build_with(assign)
    }

    /// Build with a custom permalink assignment.
    ///
    /// Replaces any previous build, including its resolution state.
    pub fn build_with<A: AssignPermalink>(&mut self, assign: A) -> &mut Self {
        let materializer = TreeMaterializer::new(self.materialize.clone());
        let (trees, mut registry) = match &self.source {
            Source::Single(hierarchy) => {
                let built = materializer.build(hierarchy, assign);
                (Trees::Single(built.tree), built.registry)
            }
            Source::Multiple(menus) => {
                let built = materializer.build_menus(menus, assign);
                (Trees::Multiple(built.menus), built.registry)
            }
        };
        registry.change_start_trail(self.start_trail.clone());

        tracing::debug!(registered = registry.len(), "Navigation built");

        self.built = Some(Built { trees, registry });
        self.rendered_count = 0;
        self
    }

    fn built(&self) -> Result<&Built, NavigationError> {
        self.built.as_ref().ok_or(NavigationError::NotBuilt)
    }

    /// Path registry of the last build.
    pub fn registry(&self) -> Result<&PathRegistry<MaterializedNode>, NavigationError> {
        Ok(&self.built()?.registry)
    }

    /// Mutable path registry of the last build.
    pub fn registry_mut(&mut self) -> Result<&mut PathRegistry<MaterializedNode>, NavigationError> {
        self.built
            .as_mut()
            .map(|built| &mut built.registry)
            .ok_or(NavigationError::NotBuilt)
    }

    /// Resolve a request trail against the registry.
    pub fn resolve<S: AsRef<str>>(
        &mut self,
        request: &[S],
    ) -> Result<ResolutionOutcome, NavigationError> {
        Ok(self.registry_mut()?.resolve(request))
    }

    /// Resolve the start page.
    pub fn resolve_start(&mut self) -> Result<ResolutionOutcome, NavigationError> {
        Ok(self.registry_mut()?.resolve_start())
    }

    /// Display tree of the single menu, or of the selected menu.
    ///
    /// # Errors
    ///
    /// Besides `NotBuilt`, multi-menu mode reports a missing or unknown
    /// selection.
    pub fn items(&self) -> Result<&DisplayTree, NavigationError> {
        match &self.built()?.trees {
            Trees::Single(tree) => Ok(tree),
            Trees::Multiple(menus) => {
                let selected = self.selected.as_ref().ok_or(RenderError::NoMenuSelected)?;
                menus
                    .get(selected)
                    .ok_or_else(|| RenderError::UnknownMenu(selected.clone()).into())
            }
        }
    }

    /// Children of `parent` in the current display tree.
    pub fn children(&self, parent: &NodeId) -> Result<&[MaterializedNode], NavigationError> {
        Ok(self.items()?.children(parent))
    }

    /// Identifiers of the children of `parent`.
    pub fn children_ids(&self, parent: &NodeId) -> Result<Vec<NodeId>, NavigationError> {
        Ok(self.items()?.children_ids(parent))
    }

    /// Children list at the end of the first-child chain below `parent`.
    pub fn last_child(&self, parent: &NodeId) -> Result<&[MaterializedNode], NavigationError> {
        Ok(self.items()?.last_child(parent))
    }

    /// Number of children of `parent`, 0 when nothing is built.
    #[must_use]
    pub fn count(&self, parent: &NodeId) -> usize {
        self.items().map_or(0, |tree| tree.count(parent))
    }

    /// Items emitted by the last render.
    #[must_use]
    pub fn rendered_count(&self) -> usize {
        self.rendered_count
    }

    /// Render the current menu through custom containers and emitter.
    ///
    /// The item matching the last resolved node is marked active.
    pub fn render<C, E>(
        &mut self,
        containers: &mut C,
        emitter: &mut E,
    ) -> Result<RenderedMenu<C::Handle>, NavigationError>
    where
        C: Containers,
        E: ItemEmitter<C>,
    {
        let built = self.built()?;
        let renderer = MenuRenderer::new(self.render.clone());
        let parent = &self.materialize.root_parent;
        let active = built.registry.active_id();

        let menu = match &built.trees {
            Trees::Single(tree) => renderer.render(tree, parent, active, containers, emitter),
            Trees::Multiple(menus) => renderer.render_menu(
                menus,
                self.selected.as_ref(),
                parent,
                active,
                containers,
                emitter,
            )?,
        };

        self.rendered_count = menu.count;
        Ok(menu)
    }

    /// Render the current menu as HTML links.
    pub fn render_html(&mut self) -> Result<String, NavigationError> {
        let mut doc = HtmlDocument::new();
        let mut emitter = LinkEmitter::new(self.title_field.clone());
        let menu = self.render(&mut doc, &mut emitter)?;
        Ok(doc.to_html(menu.root))
    }
}
