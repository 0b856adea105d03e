//! Menu rendering errors.

use trailmap_tree::MenuId;

/// Configuration error reported by menu rendering.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Multi-menu rendering without a selected menu.
    #[error("No menu selected: select a menu before rendering multiple menus")]
    NoMenuSelected,
    /// Selected menu does not exist.
    #[error("Unknown menu: {0}")]
    UnknownMenu(MenuId),
    /// Selected menu exists but has no items.
    #[error("Menu {0} has no items")]
    EmptyMenu(MenuId),
}
