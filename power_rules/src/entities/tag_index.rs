//! Tag index - per-power normalized tag sets and kind extraction.

use std::collections::{BTreeMap, BTreeSet};

use super::{Power, PowerId};

/// Prefix of the tag convention that carries a power's kind.
pub const KIND_PREFIX: &str = "kind:";

/// Trim and lowercase tags, dropping empty ones.
pub fn normalize_tags<I, S>(tags: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|tag| tag.as_ref().trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Split a comma-separated tag column into normalized tags.
pub fn split_tag_list(raw: &str) -> BTreeSet<String> {
    normalize_tags(raw.split(','))
}

/// Extract the kind from the first `kind:` tag in sorted order.
pub fn extract_kind(tags: &BTreeSet<String>) -> Option<String> {
    tags.iter()
        .find_map(|tag| tag.strip_prefix(KIND_PREFIX))
        .map(|kind| kind.trim().to_string())
        .filter(|kind| !kind.is_empty())
}

/// Catalog row as read from the entity table.
#[derive(Debug, Clone)]
pub struct CatalogRow {
    pub id: PowerId,
    pub name: String,
    /// Raw comma-separated tag column.
    pub inline_tags: Option<String>,
}

/// Index of normalized tags for every power in the catalog.
///
/// Tags from the tag-detail table win; the inline tag column is only used for
/// powers that have no detail rows. The kind prefers the inline column.
#[derive(Debug, Clone, Default)]
pub struct TagIndex {
    detail_tags: BTreeMap<PowerId, BTreeSet<String>>,
}

impl TagIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one tag-detail row.
    pub fn insert(&mut self, power_id: PowerId, tag: &str) {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() {
            return;
        }
        self.detail_tags.entry(power_id).or_default().insert(tag);
    }

    /// Detail tags for a power.
    pub fn tags_for(&self, power_id: &PowerId) -> Option<&BTreeSet<String>> {
        self.detail_tags.get(power_id)
    }

    /// Number of powers with at least one detail tag.
    pub fn len(&self) -> usize {
        self.detail_tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detail_tags.is_empty()
    }

    /// Resolve a catalog row into a power with tags and kind.
    pub fn resolve(&self, row: &CatalogRow) -> Power {
        let inline = row
            .inline_tags
            .as_deref()
            .map(split_tag_list)
            .unwrap_or_default();

        let tags = match self.detail_tags.get(&row.id) {
            Some(detail) => detail.clone(),
            None => inline.clone(),
        };

        let kind = extract_kind(&inline)
            .or_else(|| extract_kind(&tags))
            .unwrap_or_default();

        Power {
            id: row.id.clone(),
            name: row.name.clone(),
            tags,
            kind,
        }
    }

    /// Resolve every catalog row, preserving catalog order.
    pub fn resolve_all(&self, rows: &[CatalogRow]) -> Vec<Power> {
        rows.iter().map(|row| self.resolve(row)).collect()
    }
}

impl FromIterator<(PowerId, String)> for TagIndex {
    fn from_iter<T: IntoIterator<Item = (PowerId, String)>>(iter: T) -> Self {
        let mut index = TagIndex::new();
        for (power_id, tag) in iter {
            index.insert(power_id, &tag);
        }
        index
    }
}
