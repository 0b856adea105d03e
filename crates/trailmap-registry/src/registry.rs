//! Slug registry with insertion-ordered records.
//!
//! Records are stored in a flat `Vec<PathRecord>` in the order the source
//! hierarchy was traversed. Two indexes sit on top of it:
//! - slug to position, for O(1) slug lookups and ordinal neighbor queries
//! - identifier to slug, rebuilt on every [`PathRegistry::add`]
//!
//! Insertion order carries meaning: [`PathRegistry::before`] and
//! [`PathRegistry::after`] walk it, and the first record is the start page.

use std::collections::HashMap;

use serde::Serialize;

use crate::id::NodeId;
use crate::resolve::{ActiveData, Resolution};

/// A registered node: its canonical trail, URI, identifier and payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PathRecord<P> {
    /// Slugs from the root to this node, inclusive.
    pub trail: Vec<String>,
    /// Canonical URI with leading slash.
    pub uri: String,
    /// Identifier of the node in the source hierarchy.
    pub id: NodeId,
    /// Caller data attached at registration.
    pub payload: P,
}

impl<P> PathRecord<P> {
    /// Terminal slug of the trail (the registry key).
    #[must_use]
    pub fn slug(&self) -> &str {
        self.trail.last().map_or("", String::as_str)
    }
}

/// Registry of resolved paths keyed by slug.
///
/// Holds the records written during a tree build and the state of the most
/// recent resolution pass (see [`PathRegistry::resolve`]).
#[derive(Debug)]
pub struct PathRegistry<P> {
    records: Vec<PathRecord<P>>,
    slug_index: HashMap<String, usize>,
    id_index: HashMap<NodeId, String>,
    pub(crate) request: Option<Vec<String>>,
    pub(crate) start_trail: Option<Vec<String>>,
    pub(crate) resolution: Resolution,
    pub(crate) active: ActiveData<P>,
}

impl<P> Default for PathRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> PathRegistry<P> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            slug_index: HashMap::new(),
            id_index: HashMap::new(),
            request: None,
            start_trail: None,
            resolution: Resolution::default(),
            active: ActiveData::default(),
        }
    }

    /// Register a node under the last slug of `trail`.
    ///
    /// The canonical URI is the nested form of the trail
    /// (`/guide/setup`). Use [`PathRegistry::add_with_uri`] when the URI is
    /// computed elsewhere.
    pub fn add<I, S>(&mut self, trail: I, id: impl Into<NodeId>, payload: P)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let trail: Vec<String> = trail.into_iter().map(Into::into).collect();
        let uri = format!("/{}", trail.join("/"));
        self.add_with_uri(trail, uri, id, payload);
    }

    /// Register a node with an explicit canonical URI.
    ///
    /// An existing record with the same slug is overwritten in place and
    /// keeps its position. An empty trail has no key and is ignored.
    pub fn add_with_uri(
        &mut self,
        trail: Vec<String>,
        uri: String,
        id: impl Into<NodeId>,
        payload: P,
    ) {
        let id = id.into();
        let Some(slug) = trail.last().cloned() else {
            tracing::debug!(id = %id, "Skipping registration of empty trail");
            return;
        };

        let record = PathRecord {
            trail,
            uri,
            id: id.clone(),
            payload,
        };

        if let Some(&idx) = self.slug_index.get(&slug) {
            let previous = &self.records[idx];
            tracing::warn!(
                slug = %slug,
                previous_id = %previous.id,
                id = %id,
                "Slug collision: record overwritten"
            );
            if previous.id != id && self.id_index.get(&previous.id) == Some(&slug) {
                self.id_index.remove(&previous.id);
            }
            self.records[idx] = record;
        } else {
            self.slug_index.insert(slug.clone(), self.records.len());
            self.records.push(record);
        }

        if let Some(old_slug) = self.id_index.insert(id, slug.clone())
            && old_slug != slug
        {
            tracing::debug!(old = %old_slug, new = %slug, "Identifier re-registered");
        }
    }

    /// Get record by slug.
    #[must_use]
    pub fn exists(&self, slug: &str) -> Option<&PathRecord<P>> {
        self.slug_index.get(slug).map(|&i| &self.records[i])
    }

    /// Get record by slug. Same as [`PathRegistry::exists`].
    #[must_use]
    pub fn get_part(&self, slug: &str) -> Option<&PathRecord<P>> {
        self.exists(slug)
    }

    /// Record registered immediately before `slug`.
    #[must_use]
    pub fn before(&self, slug: &str) -> Option<&PathRecord<P>> {
        let idx = self.index(slug)?;
        idx.checked_sub(1).and_then(|i| self.records.get(i))
    }

    /// Record registered immediately after `slug`.
    #[must_use]
    pub fn after(&self, slug: &str) -> Option<&PathRecord<P>> {
        let idx = self.index(slug)?;
        self.records.get(idx + 1)
    }

    /// Look up several slugs, skipping misses.
    ///
    /// `on_each` is invoked for every hit, in input order.
    pub fn get_multiple_parts<I, S, F>(&self, slugs: I, mut on_each: F) -> Vec<&PathRecord<P>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: FnMut(&PathRecord<P>),
    {
        let mut found = Vec::new();
        for slug in slugs {
            if let Some(record) = self.exists(slug.as_ref()) {
                on_each(record);
                found.push(record);
            }
        }
        found
    }

    /// Slug registered for an identifier.
    #[must_use]
    pub fn get_slug_by_id(&self, id: &NodeId) -> Option<&str> {
        self.id_index.get(id).map(String::as_str)
    }

    /// Canonical URI of a slug.
    #[must_use]
    pub fn get_path(&self, slug: &str) -> Option<&str> {
        self.exists(slug).map(|record| record.uri.as_str())
    }

    /// Canonical URI registered for an identifier.
    #[must_use]
    pub fn get_path_by_id(&self, id: &NodeId) -> Option<&str> {
        self.get_path(self.get_slug_by_id(id)?)
    }

    /// Record registered for an identifier.
    #[must_use]
    pub fn get_data_by_id(&self, id: &NodeId) -> Option<&PathRecord<P>> {
        self.exists(self.get_slug_by_id(id)?)
    }

    /// Position of `slug` in insertion order.
    #[must_use]
    pub fn index(&self, slug: &str) -> Option<usize> {
        self.slug_index.get(slug).copied()
    }

    /// Records of every registered slug on the trail of `slug`, root first.
    ///
    /// Includes the record itself as the last item. Trail segments that are
    /// not registered (prepended segments) are skipped.
    #[must_use]
    pub fn breadcrumbs(&self, slug: &str) -> Vec<&PathRecord<P>> {
        let Some(record) = self.exists(slug) else {
            return Vec::new();
        };
        self.get_multiple_parts(&record.trail, |_| {})
    }

    /// Return the first `Some` produced by `search` over records in order.
    pub fn find<R>(&self, mut search: impl FnMut(&PathRecord<P>) -> Option<R>) -> Option<R> {
        self.records.iter().find_map(|record| search(record))
    }

    /// All records in insertion order.
    #[must_use]
    pub fn records(&self) -> &[PathRecord<P>] {
        &self.records
    }

    /// Shortcut for [`PathRegistry::records`].
    #[must_use]
    pub fn list(&self) -> &[PathRecord<P>] {
        self.records()
    }

    /// The start page record (first registered).
    #[must_use]
    pub fn first(&self) -> Option<&PathRecord<P>> {
        self.records.first()
    }

    /// Number of registered slugs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Remove all records and resolution state.
    ///
    /// The stored request and start trail are kept.
    pub fn clear(&mut self) {
        self.records.clear();
        self.slug_index.clear();
        self.id_index.clear();
        self.resolution = Resolution::default();
        self.active = ActiveData::default();
    }
}
