//! URI registry, path resolution and navigation menus for hierarchical
//! content.
//!
//! This crate provides:
//! - [`Navigation`]: builds a source hierarchy into a path registry and a
//!   display tree, resolves requests and renders menus
//! - Re-exports of the component crates for direct use
//!
//! # Quick Start
//!
//! ```
//! use trailmap::{Config, Hierarchy, Navigation, ResolutionOutcome, Source, SourceNode};
//!
//! let hierarchy = Hierarchy::from_nodes([
//!     SourceNode::new(1, 0).with_attr("slug", "guide").with_attr("title", "Guide"),
//!     SourceNode::new(2, 1).with_attr("slug", "setup").with_attr("title", "Setup"),
//! ]);
//!
//! let mut nav = Navigation::new(Source::Single(hierarchy), &Config::default());
//! nav.nesting_uri(true).build();
//!
//! assert_eq!(nav.resolve(&["guide", "setup"])?, ResolutionOutcome::Ok);
//! let html = nav.render_html()?;
//! assert!(html.contains(r#"<li class="active"><a href="/guide/setup">Setup</a></li>"#));
//! # Ok::<(), trailmap::NavigationError>(())
//! ```

mod navigation;

pub use navigation::{Navigation, NavigationError, Source};
pub use trailmap_config::{Config, ConfigError};
pub use trailmap_menu::{
    Containers, ElementId, HtmlDocument, Item, ItemEmitter, LinkEmitter, MenuRenderer,
    RenderError, RenderOptions, RenderedMenu,
};
pub use trailmap_registry::{
    ActiveData, NodeId, PathRecord, PathRegistry, Propagate, Resolution, ResolutionOutcome,
};
pub use trailmap_tree::{
    AssignPermalink, DisplayTree, Hierarchy, MaterializeOptions, MaterializedNode, MenuId,
    SlugField, SourceNode, TreeMaterializer,
};
