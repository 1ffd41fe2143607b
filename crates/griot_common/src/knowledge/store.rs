//! Read-only stores over the cultural dataset.
//!
//! [`KnowledgeBase`] groups records per category for the reasoning engine's
//! per-collection scans. [`RetrievalStore`] keeps the same records as one
//! flat ordered collection and returns all of them: ranking is delegated to
//! the generation-based semantic filter, not done here.

use super::items::{CulturalItem, ItemKind};

/// Records grouped per category, scan order fixed by [`ItemKind::all`]
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    groups: Vec<(ItemKind, Vec<CulturalItem>)>,
}

impl KnowledgeBase {
    pub fn from_items(items: Vec<CulturalItem>) -> Self {
        let mut groups: Vec<(ItemKind, Vec<CulturalItem>)> =
            ItemKind::all().iter().map(|k| (*k, Vec::new())).collect();
        for item in items {
            let kind = item.kind();
            if let Some((_, group)) = groups.iter_mut().find(|(k, _)| *k == kind) {
                group.push(item);
            }
        }
        Self { groups }
    }

    pub fn groups(&self) -> &[(ItemKind, Vec<CulturalItem>)] {
        &self.groups
    }

    pub fn group(&self, kind: ItemKind) -> &[CulturalItem] {
        self.groups
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, items)| items.as_slice())
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &CulturalItem> {
        self.groups.iter().flat_map(|(_, items)| items.iter())
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|(_, items)| items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Flat ordered record collection
#[derive(Debug, Clone, Default)]
pub struct RetrievalStore {
    docs: Vec<CulturalItem>,
}

impl RetrievalStore {
    pub fn from_items(docs: Vec<CulturalItem>) -> Self {
        Self { docs }
    }

    /// Every record in load order; no query-time filtering at this layer
    pub fn all(&self) -> &[CulturalItem] {
        &self.docs
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

/// Truncate prose to at most `max_chars` characters on a char boundary,
/// appending an ellipsis when shortened.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::dataset;

    #[test]
    fn knowledge_base_groups_by_kind() {
        let kb = KnowledgeBase::from_items(dataset::builtin());
        assert!(!kb.group(ItemKind::Festival).is_empty());
        assert!(!kb.group(ItemKind::Proverb).is_empty());
        assert_eq!(kb.len(), kb.iter().count());
        for item in kb.group(ItemKind::Festival) {
            assert_eq!(item.kind(), ItemKind::Festival);
        }
    }

    #[test]
    fn retrieval_store_returns_everything_in_order() {
        let items = dataset::builtin();
        let first = items[0].clone();
        let store = RetrievalStore::from_items(items);
        assert_eq!(store.all()[0], first);
        assert!(store.len() > 10);
    }

    #[test]
    fn excerpt_truncates_on_char_boundary() {
        assert_eq!(excerpt("short", 100), "short");
        let long = "a".repeat(150);
        let cut = excerpt(&long, 100);
        assert_eq!(cut.chars().count(), 103); // 100 chars + "..."
        assert!(cut.ends_with("..."));
        // Multi-byte input must not panic
        let accented = "é".repeat(120);
        assert!(excerpt(&accented, 100).ends_with("..."));
    }
}
