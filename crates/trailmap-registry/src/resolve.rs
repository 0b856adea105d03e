//! Request path resolution.
//!
//! A request is a sequence of slugs, shallowest first. Every slug that is
//! registered propagates its record; the deepest hit decides the active
//! path. The outcome is then:
//!
//! | Condition | Outcome |
//! |-----------|---------|
//! | nothing requested | start page, 200 |
//! | nothing resolved | start page check, usually 404 |
//! | last requested slug is not the last resolved slug | 404 |
//! | request equals the stored trail position by position | 200 |
//! | anything else | 301 |

use serde::Serialize;

use crate::id::NodeId;
use crate::registry::{PathRecord, PathRegistry};

/// Outcome of a resolution pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum ResolutionOutcome {
    /// Request matches a canonical trail exactly.
    #[default]
    Ok,
    /// Request names a registered node by a non-canonical trail.
    PermanentRedirect,
    /// Request names no registered node.
    NotFound,
}

impl ResolutionOutcome {
    /// HTTP status code for this outcome.
    #[must_use]
    pub const fn status_code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::PermanentRedirect => 301,
            Self::NotFound => 404,
        }
    }
}

/// Result of a resolution pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Decided outcome.
    pub outcome: ResolutionOutcome,
    /// Canonical trail of the deepest resolved record (empty when none).
    pub active_path: Vec<String>,
    /// True when the pass fell back to the start page.
    pub is_start: bool,
}

/// Strategy receiving every record hit during resolution.
///
/// [`ActiveData`] is the default; implement this to collect something else
/// (e.g. only identifiers) while keeping the same outcome rules.
pub trait Propagate<P> {
    /// Called once per resolved record, shallowest first.
    fn propagate(&mut self, record: &PathRecord<P>);
}

/// Payloads of resolved records keyed by identifier, in propagation order.
#[derive(Clone, Debug)]
pub struct ActiveData<P> {
    entries: Vec<(NodeId, P)>,
}

impl<P> Default for ActiveData<P> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<P> ActiveData<P> {
    /// Payload propagated for an identifier.
    #[must_use]
    pub fn get(&self, id: &NodeId) -> Option<&P> {
        self.entries
            .iter()
            .find(|(entry_id, _)| entry_id == id)
            .map(|(_, payload)| payload)
    }

    /// Deepest propagated entry.
    #[must_use]
    pub fn last(&self) -> Option<(&NodeId, &P)> {
        self.entries.last().map(|(id, payload)| (id, payload))
    }

    /// Entries in propagation order.
    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &P)> {
        self.entries.iter().map(|(id, payload)| (id, payload))
    }

    /// Number of propagated entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing was propagated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P: Clone> Propagate<P> for ActiveData<P> {
    fn propagate(&mut self, record: &PathRecord<P>) {
        if let Some(entry) = self.entries.iter_mut().find(|(id, _)| *id == record.id) {
            entry.1 = record.payload.clone();
        } else {
            self.entries.push((record.id.clone(), record.payload.clone()));
        }
    }
}

impl<P> PathRegistry<P> {
    /// Resolve a request with a custom propagation strategy.
    ///
    /// Pure with respect to the registry: the stored resolution state is
    /// not touched. `None` requests the start page.
    pub fn resolve_with<S, A>(&self, request: Option<&[S]>, propagate: &mut A) -> Resolution
    where
        S: AsRef<str>,
        A: Propagate<P>,
    {
        let mut resolution = Resolution::default();

        match request {
            Some(requested) if !requested.is_empty() => {
                let hits = self.get_multiple_parts(requested, |record| {
                    propagate.propagate(record);
                });
                // Deepest hit wins.
                let active_path = hits.last().map_or(&[][..], |record| record.trail.as_slice());
                resolution.active_path = active_path.to_vec();

                let last_requested = requested.last().map(AsRef::as_ref);
                match active_path.last() {
                    None => resolution.is_start = true,
                    Some(last_resolved) if Some(last_resolved.as_str()) != last_requested => {
                        resolution.outcome = ResolutionOutcome::NotFound;
                    }
                    Some(_) if !trail_matches(requested, active_path) => {
                        resolution.outcome = ResolutionOutcome::PermanentRedirect;
                    }
                    Some(_) => {}
                }
            }
            _ => resolution.is_start = true,
        }

        if resolution.is_start {
            let start_vars: Vec<&str> = match &self.start_trail {
                Some(trail) => trail.iter().map(String::as_str).collect(),
                None => request
                    .map(|r| r.iter().map(AsRef::as_ref).collect())
                    .unwrap_or_default(),
            };
            self.validate_start(&start_vars, &mut resolution, propagate);
        }

        tracing::debug!(
            status = resolution.outcome.status_code(),
            active_path = %resolution.active_path.join("/"),
            is_start = resolution.is_start,
            "Request resolved"
        );

        resolution
    }

    /// Propagate the start page if `vars` addresses it, otherwise 404.
    ///
    /// The start page is addressed by an empty trail or by its own slug.
    fn validate_start<A: Propagate<P>>(
        &self,
        vars: &[&str],
        resolution: &mut Resolution,
        propagate: &mut A,
    ) {
        let Some(home) = self.first() else {
            resolution.outcome = ResolutionOutcome::NotFound;
            return;
        };

        if vars.is_empty() || vars == [home.slug()] {
            propagate.propagate(home);
            resolution.active_path.clone_from(&home.trail);
            resolution.outcome = ResolutionOutcome::Ok;
        } else {
            resolution.outcome = ResolutionOutcome::NotFound;
        }
    }

    /// Last resolution result.
    #[must_use]
    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    /// Outcome of the last resolution.
    #[must_use]
    pub fn outcome(&self) -> ResolutionOutcome {
        self.resolution.outcome
    }

    /// HTTP status code of the last resolution.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.resolution.outcome.status_code()
    }

    /// True if the last resolution fell back to the start page.
    #[must_use]
    pub fn is_start(&self) -> bool {
        self.resolution.is_start
    }

    /// Canonical trail of the active node.
    #[must_use]
    pub fn active_path(&self) -> &[String] {
        &self.resolution.active_path
    }

    /// Active trail as a path string (`/a/c`, `/` for none).
    #[must_use]
    pub fn active_path_string(&self) -> String {
        format!("/{}", self.resolution.active_path.join("/"))
    }

    /// Payloads propagated during the last resolution.
    #[must_use]
    pub fn active_data(&self) -> &ActiveData<P> {
        &self.active
    }

    /// Identifier of the deepest propagated record.
    #[must_use]
    pub fn active_id(&self) -> Option<&NodeId> {
        self.active.last().map(|(id, _)| id)
    }

    /// Registry record of the active node.
    #[must_use]
    pub fn active_record(&self) -> Option<&PathRecord<P>> {
        self.exists(self.resolution.active_path.last()?)
    }

    /// Store the request used by [`PathRegistry::load`].
    pub fn set_request<I, S>(&mut self, trail: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.request = Some(trail.into_iter().map(Into::into).collect());
    }

    /// Override the trail checked against the start page.
    ///
    /// With `Some(vec![])`, requests that resolve nothing fall back to the
    /// start page with 200 instead of 404.
    pub fn change_start_trail(&mut self, trail: Option<Vec<String>>) {
        self.start_trail = trail;
    }
}

impl<P: Clone> PathRegistry<P> {
    /// Resolve a request and store the result.
    pub fn resolve<S: AsRef<str>>(&mut self, request: &[S]) -> ResolutionOutcome {
        let request: Vec<String> = request.iter().map(|s| s.as_ref().to_owned()).collect();
        self.run(Some(request))
    }

    /// Resolve the start page and store the result.
    pub fn resolve_start(&mut self) -> ResolutionOutcome {
        self.run(None)
    }

    /// Resolve the request stored with [`PathRegistry::set_request`].
    ///
    /// Without a stored request this resolves the start page.
    pub fn load(&mut self) -> ResolutionOutcome {
        let request = self.request.clone();
        self.run(request)
    }

    fn run(&mut self, request: Option<Vec<String>>) -> ResolutionOutcome {
        let mut active = ActiveData::default();
        let resolution = self.resolve_with(request.as_deref(), &mut active);
        let outcome = resolution.outcome;
        self.resolution = resolution;
        self.active = active;
        outcome
    }
}

/// Exact positional equality of the requested and stored trails.
fn trail_matches<S: AsRef<str>>(requested: &[S], stored: &[String]) -> bool {
    requested.len() == stored.len()
        && requested
            .iter()
            .zip(stored)
            .all(|(requested, stored)| requested.as_ref() == stored)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample() -> PathRegistry<&'static str> {
        let mut registry = PathRegistry::new();
        registry.add(["a"], 1, "A");
        registry.add(["a", "c"], 3, "C");
        registry.add(["b"], 2, "B");
        registry
    }

    #[test]
    fn test_exact_match_is_ok() {
        let mut registry = sample();

        let outcome = registry.resolve(&["a", "c"]);

        assert_eq!(outcome, ResolutionOutcome::Ok);
        assert_eq!(registry.status_code(), 200);
        assert_eq!(registry.active_path(), ["a", "c"]);
        assert_eq!(registry.active_path_string(), "/a/c");
        assert!(!registry.is_start());
    }

    #[test]
    fn test_every_registered_trail_resolves_ok() {
        let mut registry = sample();
        let trails: Vec<Vec<String>> = registry.records().iter().map(|r| r.trail.clone()).collect();

        for trail in trails {
            assert_eq!(registry.resolve(&trail), ResolutionOutcome::Ok, "{trail:?}");
            assert_eq!(registry.active_path(), trail.as_slice());
        }
    }

    #[test]
    fn test_unknown_last_segment_is_not_found() {
        let mut registry = sample();

        assert_eq!(registry.resolve(&["a", "x"]), ResolutionOutcome::NotFound);
        assert_eq!(registry.status_code(), 404);
    }

    #[test]
    fn test_trailing_segment_is_not_found() {
        let mut registry = sample();

        assert_eq!(registry.resolve(&["a", "c", "extra"]), ResolutionOutcome::NotFound);
    }

    #[test]
    fn test_wrong_order_is_redirect() {
        let mut registry = sample();

        let outcome = registry.resolve(&["c", "a"]);

        assert_eq!(outcome, ResolutionOutcome::PermanentRedirect);
        assert_eq!(registry.active_path(), ["a"]);
    }

    #[test]
    fn test_missing_ancestor_is_redirect() {
        let mut registry = sample();

        assert_eq!(registry.resolve(&["c"]), ResolutionOutcome::PermanentRedirect);
        assert_eq!(registry.status_code(), 301);
        assert_eq!(registry.active_path(), ["a", "c"]);
    }

    #[test]
    fn test_wrong_ancestor_is_redirect() {
        let mut registry = sample();

        assert_eq!(registry.resolve(&["b", "c"]), ResolutionOutcome::PermanentRedirect);
    }

    #[test]
    fn test_nothing_resolved_is_not_found() {
        let mut registry = sample();

        assert_eq!(registry.resolve(&["x"]), ResolutionOutcome::NotFound);
        assert!(registry.is_start());
        assert!(registry.active_data().is_empty());
    }

    #[test]
    fn test_empty_request_activates_start_page() {
        let mut registry = sample();

        assert_eq!(registry.resolve::<&str>(&[]), ResolutionOutcome::Ok);
        assert!(registry.is_start());
        assert_eq!(registry.active_path(), ["a"]);
        assert_eq!(registry.active_id(), Some(&NodeId::from(1)));
    }

    #[test]
    fn test_resolve_start_activates_first_record() {
        let mut registry = sample();

        assert_eq!(registry.resolve_start(), ResolutionOutcome::Ok);
        assert_eq!(registry.active_record().unwrap().slug(), "a");
    }

    #[test]
    fn test_start_on_empty_registry_is_not_found() {
        let mut registry: PathRegistry<()> = PathRegistry::new();

        assert_eq!(registry.resolve_start(), ResolutionOutcome::NotFound);
    }

    #[test]
    fn test_start_trail_override_falls_back_to_home() {
        let mut registry = sample();
        registry.change_start_trail(Some(Vec::new()));

        assert_eq!(registry.resolve(&["x"]), ResolutionOutcome::Ok);
        assert_eq!(registry.active_path(), ["a"]);
    }

    #[test]
    fn test_start_trail_naming_home_slug_is_ok() {
        let mut registry = sample();
        registry.change_start_trail(Some(vec!["a".to_owned()]));

        assert_eq!(registry.resolve_start(), ResolutionOutcome::Ok);
    }

    #[test]
    fn test_start_trail_naming_other_slug_is_not_found() {
        let mut registry = sample();
        registry.change_start_trail(Some(vec!["b".to_owned()]));

        assert_eq!(registry.resolve_start(), ResolutionOutcome::NotFound);
    }

    #[test]
    fn test_active_data_accumulates_hits() {
        let mut registry = sample();

        registry.resolve(&["a", "c"]);

        let data: Vec<(&NodeId, &&str)> = registry.active_data().iter().collect();
        assert_eq!(data, vec![(&NodeId::from(1), &"A"), (&NodeId::from(3), &"C")]);
        assert_eq!(registry.active_data().get(&NodeId::from(3)), Some(&"C"));
        assert_eq!(registry.active_id(), Some(&NodeId::from(3)));
    }

    #[test]
    fn test_resolve_clears_previous_state() {
        let mut registry = sample();
        registry.resolve(&["a", "c"]);

        registry.resolve(&["b"]);

        assert_eq!(registry.active_path(), ["b"]);
        assert_eq!(registry.active_data().len(), 1);
    }

    #[test]
    fn test_load_uses_stored_request() {
        let mut registry = sample();
        registry.set_request(["a", "c"]);

        assert_eq!(registry.load(), ResolutionOutcome::Ok);
        assert_eq!(registry.active_path(), ["a", "c"]);
    }

    #[test]
    fn test_load_without_request_resolves_start() {
        let mut registry = sample();

        assert_eq!(registry.load(), ResolutionOutcome::Ok);
        assert!(registry.is_start());
    }

    #[test]
    fn test_resolve_with_custom_strategy() {
        struct Ids(Vec<NodeId>);

        impl<P> Propagate<P> for Ids {
            fn propagate(&mut self, record: &PathRecord<P>) {
                self.0.push(record.id.clone());
            }
        }

        let registry = sample();
        let mut ids = Ids(Vec::new());

        let resolution = registry.resolve_with(Some(&["a", "c"][..]), &mut ids);

        assert_eq!(resolution.outcome, ResolutionOutcome::Ok);
        assert_eq!(ids.0, vec![NodeId::from(1), NodeId::from(3)]);
        assert_eq!(registry.outcome(), ResolutionOutcome::Ok);
        assert!(registry.active_data().is_empty());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ResolutionOutcome::Ok.status_code(), 200);
        assert_eq!(ResolutionOutcome::PermanentRedirect.status_code(), 301);
        assert_eq!(ResolutionOutcome::NotFound.status_code(), 404);
    }
}
