//! Nested menu rendering for trailmap.
//!
//! [`MenuRenderer`] walks a [`DisplayTree`](trailmap_tree::DisplayTree)
//! and emits nested containers through the minimal [`Containers`]
//! capability. It never inspects markup; [`HtmlDocument`] is one
//! implementation of the capability.

mod container;
mod error;
mod html;
mod renderer;

pub use container::Containers;
pub use error::RenderError;
pub use html::{ElementId, HtmlDocument, LinkEmitter, escape_html};
pub use renderer::{Item, ItemEmitter, MenuRenderer, RenderOptions, RenderedMenu};
