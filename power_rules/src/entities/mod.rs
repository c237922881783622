//! Power definitions - the catalog entities every derived record hangs off.

mod tag_index;

pub use tag_index::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Opaque stable key of a power in the source catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PowerId(pub String);

impl PowerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PowerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A catalog power with its normalized tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Power {
    pub id: PowerId,
    pub name: String,
    /// Lowercase, trimmed tags.
    pub tags: BTreeSet<String>,
    /// Coarse classifier from a `kind:<value>` tag; empty when absent.
    pub kind: String,
}

impl Power {
    /// Create a power, normalizing the given tags and extracting its kind.
    pub fn new<I, S>(id: impl Into<String>, name: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tags = normalize_tags(tags);
        let kind = extract_kind(&tags).unwrap_or_default();
        Self {
            id: PowerId::new(id),
            name: name.into(),
            tags,
            kind,
        }
    }

    /// Check if the power carries any of the given tags.
    pub fn has_any(&self, options: &[&str]) -> bool {
        options.iter().any(|tag| self.tags.contains(*tag))
    }

    /// Check if the power carries a specific tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}
