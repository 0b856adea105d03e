//! Container capability used by the renderer.

/// Minimal capability for building nested containers.
///
/// Handles are opaque to the renderer; it only creates them, sets
/// attributes and nests one inside another.
pub trait Containers {
    /// Opaque handle to a created container.
    type Handle: Clone;

    /// Create a detached container of the given kind (e.g. `ul`, `li`).
    fn create(&mut self, kind: &str) -> Self::Handle;

    /// Set (or replace) an attribute on a container.
    fn set_attribute(&mut self, handle: &Self::Handle, name: &str, value: &str);

    /// Append `child` to `parent`.
    fn nest(&mut self, parent: &Self::Handle, child: &Self::Handle);
}
