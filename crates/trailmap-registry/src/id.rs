//! Node identifiers.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identifier of a node in a content hierarchy.
///
/// Source data uses both numeric and string keys, and every comparison the
/// resolver and renderer make is a string comparison, so identifiers are
/// stored in their string form. `NodeId::from(3)` and `NodeId::from("3")`
/// are equal.
///
/// Ordering follows integer keys: all-digit identifiers sort numerically
/// (`2` before `10`) and come before every other identifier, which sort as
/// strings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct NodeId(String);

impl NodeId {
    /// Create an identifier from anything string-like.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Digits of an all-digit identifier without leading zeros.
fn numeric_digits(id: &str) -> Option<&str> {
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(id.trim_start_matches('0'))
}

impl Ord for NodeId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (numeric_digits(&self.0), numeric_digits(&other.0)) {
            (Some(a), Some(b)) => a
                .len()
                .cmp(&b.len())
                .then_with(|| a.cmp(b))
                .then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for NodeId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&String> for NodeId {
    fn from(value: &String) -> Self {
        Self(value.clone())
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for NodeId {
                fn from(value: $ty) -> Self {
                    Self(value.to_string())
                }
            }
        )*
    };
}

impl_from_int!(u8, u16, u32, u64, usize, i32, i64);

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Str(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => Self::from(n),
            Raw::Str(s) => Self(s),
        })
    }
}
