//! Environment variable expansion for `tree.uri_prepend` and `menu.class`.
//!
//! Supports `${VAR}` (unset is an error) and `${VAR:-default}`. Bare `$VAR`
//! is left alone.
//!
//! A prepend segment whose value came from a variable may expand to a path
//! (`${SITE_ROOT}` = `en/docs`); it is split into segments and empty segments
//! are dropped, so an unset `${SITE_ROOT:-}` removes the prefix. Literal
//! segments are kept as written and still go through validation.

use std::borrow::Cow;

use crate::ConfigError;

/// Variable marked unset by the lookup.
struct Unset;

/// Expands configuration values through a variable lookup.
pub(crate) struct Expander<F> {
    lookup: F,
}

impl<F: FnMut(&str) -> Option<String>> Expander<F> {
    pub(crate) fn new(lookup: F) -> Self {
        Self { lookup }
    }

    fn expand<'a>(&mut self, value: &'a str, field: &str) -> Result<Cow<'a, str>, ConfigError> {
        let lookup = &mut self.lookup;
        shellexpand::env_with_context(value, |var| lookup(var).map(Some).ok_or(Unset)).map_err(
            |e| ConfigError::EnvVar {
                field: field.to_owned(),
                message: format!("${{{}}} is not set and has no default", e.var_name),
            },
        )
    }

    /// Expand every prepend segment, splitting expanded paths.
    pub(crate) fn uri_prepend(&mut self, segments: &[String]) -> Result<Vec<String>, ConfigError> {
        let mut expanded = Vec::with_capacity(segments.len());
        for (i, segment) in segments.iter().enumerate() {
            if !segment.contains("${") {
                expanded.push(segment.clone());
                continue;
            }
            let value = self.expand(segment, &format!("tree.uri_prepend[{i}]"))?;
            expanded.extend(
                value
                    .split('/')
                    .filter(|part| !part.is_empty())
                    .map(str::to_owned),
            );
        }
        Ok(expanded)
    }

    /// Expand the root list class.
    ///
    /// Whitespace runs collapse to single spaces; a class that expands to
    /// nothing is treated as unset.
    pub(crate) fn class(&mut self, class: &str) -> Result<Option<String>, ConfigError> {
        let value = self.expand(class, "menu.class")?;
        let words: Vec<&str> = value.split_whitespace().collect();
        Ok((!words.is_empty()).then(|| words.join(" ")))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn expander(vars: &[(&str, &str)]) -> Expander<impl FnMut(&str) -> Option<String>> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Expander::new(move |var| vars.get(var).cloned())
    }

    fn segments(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn test_prepend_variable_expands() {
        let result = expander(&[("LOCALE", "de")])
            .uri_prepend(&segments(&["${LOCALE}", "docs"]))
            .unwrap();

        assert_eq!(result, vec!["de", "docs"]);
    }

    #[test]
    fn test_prepend_variable_path_is_split() {
        let result = expander(&[("SITE_ROOT", "/en/docs/")])
            .uri_prepend(&segments(&["${SITE_ROOT}"]))
            .unwrap();

        assert_eq!(result, vec!["en", "docs"]);
    }

    #[test]
    fn test_prepend_empty_default_removes_segment() {
        let result = expander(&[])
            .uri_prepend(&segments(&["${SITE_ROOT:-}", "news"]))
            .unwrap();

        assert_eq!(result, vec!["news"]);
    }

    #[test]
    fn test_prepend_literal_kept_as_written() {
        let result = expander(&[]).uri_prepend(&segments(&["en/us"])).unwrap();

        assert_eq!(result, vec!["en/us"]);
    }

    #[test]
    fn test_prepend_missing_variable_names_segment() {
        let err = expander(&[])
            .uri_prepend(&segments(&["en", "${MISSING}"]))
            .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::EnvVar { ref field, ref message }
                if field == "tree.uri_prepend[1]" && message.contains("${MISSING}")
        ));
    }

    #[test]
    fn test_class_default_and_whitespace() {
        let result = expander(&[("NAV_EXTRA", "  sticky   dark ")])
            .class("main ${NAV_EXTRA}")
            .unwrap();

        assert_eq!(result.as_deref(), Some("main sticky dark"));
    }

    #[test]
    fn test_class_expanding_to_nothing_is_unset() {
        let result = expander(&[]).class("${NAV_CLASS:-}").unwrap();

        assert_eq!(result, None);
    }

    #[test]
    fn test_class_missing_variable_errors() {
        let err = expander(&[]).class("${NAV_CLASS}").unwrap_err();

        assert!(err.to_string().contains("menu.class"));
    }
}
