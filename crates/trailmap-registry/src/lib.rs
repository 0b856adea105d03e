//! Slug registry and request path resolution for trailmap.
//!
//! This crate provides:
//! - [`PathRegistry`]: every materialized node keyed by its slug, in
//!   traversal order, with identifier lookups and neighbor queries
//! - Request resolution producing a [`ResolutionOutcome`] (200/301/404)
//!
//! # Quick Start
//!
//! ```
//! use trailmap_registry::{PathRegistry, ResolutionOutcome};
//!
//! let mut registry = PathRegistry::new();
//! registry.add(["guide"], 1, "Guide");
//! registry.add(["guide", "setup"], 2, "Setup");
//!
//! assert_eq!(registry.resolve(&["guide", "setup"]), ResolutionOutcome::Ok);
//! assert_eq!(registry.resolve(&["setup"]), ResolutionOutcome::PermanentRedirect);
//! assert_eq!(registry.resolve(&["guide", "missing"]), ResolutionOutcome::NotFound);
//! ```

mod id;
mod registry;
mod resolve;

pub use id::NodeId;
pub use registry::{PathRecord, PathRegistry};
pub use resolve::{ActiveData, Propagate, Resolution, ResolutionOutcome};
