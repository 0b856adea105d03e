//! Configuration management for trailmap.
//!
//! Parses `trailmap.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! ```toml
//! [tree]
//! root_parent = 0
//! nested_uri = true
//! uri_prepend = ["${SITE_LOCALE:-en}"]
//! permalink_field = "slug"
//!
//! [menu]
//! max_depth = 2
//! hide_empty = false
//! class = "main-nav"
//!
//! [menu.where]
//! status = "published"
//!
//! [resolve]
//! start_trail = []
//! ```
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `tree.uri_prepend`: a segment that expands to `a/b` becomes two
//!   segments, one that expands to nothing is dropped
//! - `menu.class`: an empty expansion unsets the class

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

use crate::expand::Expander;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "trailmap.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tree materialization configuration.
    pub tree: TreeConfig,
    /// Menu rendering configuration.
    pub menu: MenuConfig,
    /// Request resolution configuration.
    pub resolve: ResolveConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Tree materialization configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Parent whose children form the top level.
    #[serde(deserialize_with = "scalar")]
    pub root_parent: String,
    /// Build nested URIs (`/a/b/c`) instead of terminal ones (`/c`).
    pub nested_uri: bool,
    /// Segments placed before every URI trail.
    pub uri_prepend: Vec<String>,
    /// Node attribute used as permalink segment.
    pub permalink_field: String,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            root_parent: "0".to_owned(),
            nested_uri: false,
            uri_prepend: Vec::new(),
            permalink_field: "slug".to_owned(),
        }
    }
}

/// Menu rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    /// Deepest rendered level, 0 for unlimited.
    pub max_depth: usize,
    /// Hide top-level items without children.
    pub hide_empty: bool,
    /// Container kind for lists.
    pub list_tag: String,
    /// Container kind for items.
    pub item_tag: String,
    /// Extra class for the root list.
    pub class: Option<String>,
    /// Append `class` to the default root class instead of replacing it.
    pub preserve_class: bool,
    /// Selected menu when several menus share one source.
    #[serde(deserialize_with = "optional_scalar")]
    pub select: Option<String>,
    /// Node attribute used as link label.
    pub title_field: String,
    /// Attribute values an item must have to be rendered.
    #[serde(rename = "where", deserialize_with = "scalar_map")]
    pub where_filter: BTreeMap<String, String>,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            max_depth: 0,
            hide_empty: false,
            list_tag: "ul".to_owned(),
            item_tag: "li".to_owned(),
            class: None,
            preserve_class: true,
            select: None,
            title_field: "title".to_owned(),
            where_filter: BTreeMap::new(),
        }
    }
}

/// Request resolution configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Trail checked against the start page instead of the request.
    ///
    /// `[]` makes unresolvable requests fall back to the start page.
    pub start_trail: Option<Vec<String>>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`menu.class`").
        field: String,
        /// Error message (e.g., "${`SITE_LOCALE`} not set").
        message: String,
    },
}

/// Scalar TOML value accepted where a string is expected.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Str(String),
    Int(i64),
    Bool(bool),
    Float(f64),
}

impl From<Scalar> for String {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::Str(s) => s,
            Scalar::Int(n) => n.to_string(),
            Scalar::Bool(true) => "1".to_owned(),
            Scalar::Bool(false) => String::new(),
            Scalar::Float(f) => f.to_string(),
        }
    }
}

fn scalar<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Scalar::deserialize(deserializer).map(String::from)
}

fn optional_scalar<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(String::from))
}

fn scalar_map<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, String>, D::Error> {
    let raw = BTreeMap::<String, Scalar>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|(k, v)| (k, v.into())).collect())
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a container kind to be a plain alphanumeric tag name.
fn require_tag(value: &str, field: &str) -> Result<(), ConfigError> {
    require_non_empty(value, field)?;
    if !value.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::Validation(format!(
            "{field} must be alphanumeric, got {value:?}"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `trailmap.toml` in current directory and
    /// parents, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from a TOML string.
    ///
    /// Environment variables are expanded and the result validated.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.expand_env_vars()?;
        config.validate()?;
        Ok(config)
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Root list class after applying `menu.class` and `menu.preserve_class`.
    #[must_use]
    pub fn root_class(&self) -> String {
        const BASE: &str = "level-1 clearfix";
        match &self.menu.class {
            Some(class) if self.menu.preserve_class => format!("{BASE} {class}"),
            Some(class) => class.clone(),
            None => BASE.to_owned(),
        }
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_tree()?;
        self.validate_menu()?;
        Ok(())
    }

    fn validate_tree(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.tree.permalink_field, "tree.permalink_field")?;
        for segment in &self.tree.uri_prepend {
            require_non_empty(segment, "tree.uri_prepend")?;
            if segment.contains('/') {
                return Err(ConfigError::Validation(format!(
                    "tree.uri_prepend segment {segment:?} cannot contain '/'"
                )));
            }
        }
        Ok(())
    }

    fn validate_menu(&self) -> Result<(), ConfigError> {
        require_tag(&self.menu.list_tag, "menu.list_tag")?;
        require_tag(&self.menu.item_tag, "menu.item_tag")?;
        require_non_empty(&self.menu.title_field, "menu.title_field")?;
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.expand_with(|var| std::env::var(var).ok())
    }

    fn expand_with(
        &mut self,
        lookup: impl FnMut(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let mut expander = Expander::new(lookup);
        self.tree.uri_prepend = expander.uri_prepend(&self.tree.uri_prepend)?;
        if let Some(class) = self.menu.class.take() {
            self.menu.class = expander.class(&class)?;
        }
        Ok(())
    }
}
