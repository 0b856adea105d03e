//! Hierarchy materialization for trailmap.
//!
//! Walks a parent-indexed [`Hierarchy`] depth-first, assigns each node a
//! permalink segment, builds its URI trail and registers it in a
//! [`PathRegistry`](trailmap_registry::PathRegistry). The walk also
//! produces a [`DisplayTree`] consumed by menu rendering.
//!
//! ```
//! use trailmap_tree::{Hierarchy, MaterializeOptions, SourceNode, TreeMaterializer, SlugField};
//!
//! let hierarchy: Hierarchy = [
//!     SourceNode::new(1, 0).with_attr("slug", "guide"),
//!     SourceNode::new(2, 1).with_attr("slug", "setup"),
//! ]
//! .into_iter()
//! .collect();
//!
//! let options = MaterializeOptions { nested_uri: true, ..MaterializeOptions::default() };
//! let built = TreeMaterializer::new(options).build(&hierarchy, SlugField::new("slug"));
//!
//! assert_eq!(built.registry.get_path("setup"), Some("/guide/setup"));
//! ```

mod display;
mod materializer;
mod node;

pub use display::{DisplayTree, MaterializedNode};
pub use materializer::{
    AssignPermalink, MaterializeOptions, Materialized, MaterializedMenus, SlugField,
    TreeMaterializer,
};
pub use node::{Hierarchy, MenuId, SourceNode, attribute_string};
pub use trailmap_registry::NodeId;
