//! Rule-based reasoning over the knowledge base.
//!
//! Expands a query into related variants, matches significant tokens
//! against each record collection, and assigns fixed per-type confidences.
//! Results are memoized per raw query in a bounded LRU cache.

use crate::config::ReasoningConfig;
use griot_common::knowledge::{CulturalItem, ItemKind, KnowledgeBase};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Tokens too generic to drive matching
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "what", "who", "where", "when", "why", "how", "tell", "about",
    "are", "was", "were", "that", "this", "does", "did",
];

/// Keyword groups that trigger query expansion
const EXPANSIONS: &[(&[&str], &str)] = &[
    (&["festival", "celebration", "event"], "festival celebration"),
    (&["art", "craft", "tradition"], "art form tradition"),
    (&["language", "speak", "tongue"], "language culture"),
];

/// One inferred match: the record plus its fixed per-type confidence
#[derive(Debug, Clone, PartialEq)]
pub struct ReasoningResult {
    pub item: CulturalItem,
    pub confidence: f64,
}

/// Reasoning engine with a bounded per-query cache
///
/// Cache writes are not idempotent-safe under races, so multi-threaded
/// callers go through the internal mutex.
pub struct ReasoningEngine {
    kb: Arc<KnowledgeBase>,
    proverb_confidence: f64,
    item_confidence: f64,
    cache: Mutex<LruCache<String, Vec<ReasoningResult>>>,
}

impl ReasoningEngine {
    pub fn new(kb: Arc<KnowledgeBase>, cfg: &ReasoningConfig) -> Self {
        let capacity = NonZeroUsize::new(cfg.cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            kb,
            proverb_confidence: cfg.proverb_confidence,
            item_confidence: cfg.item_confidence,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Run expansion and matching for a query. Never fails: an unmatched
    /// query yields an empty list.
    pub fn query(&self, text: &str) -> Vec<ReasoningResult> {
        if let Ok(mut cache) = self.cache.lock() {
            if let Some(hit) = cache.get(text) {
                debug!("Reasoning cache hit: {}", text);
                return hit.clone();
            }
        }

        let variants = expand_query(text);
        let mut results = Vec::new();
        for variant in &variants {
            let tokens = significant_tokens(variant);
            if tokens.is_empty() {
                continue;
            }
            for (kind, items) in self.kb.groups() {
                for item in items {
                    let blob = item.search_blob();
                    if tokens.iter().any(|t| blob.contains(t.as_str())) {
                        results.push(ReasoningResult {
                            item: item.clone(),
                            confidence: self.confidence_for(*kind),
                        });
                    }
                }
            }
        }

        if let Ok(mut cache) = self.cache.lock() {
            cache.put(text.to_string(), results.clone());
        }
        results
    }

    /// Records sharing a culture with `item`, with a fixed link strength
    pub fn related_items(&self, item: &CulturalItem) -> Vec<(CulturalItem, f64)> {
        self.kb
            .iter()
            .filter(|other| {
                other.culture().eq_ignore_ascii_case(item.culture())
                    && other.dedup_key() != item.dedup_key()
            })
            .map(|other| (other.clone(), 0.8))
            .collect()
    }

    /// One-line human-readable reading of an inference
    pub fn explain(&self, result: &ReasoningResult) -> String {
        let item = &result.item;
        match item.kind() {
            ItemKind::Festival => format!(
                "{} is a festival celebrated by the {} people.",
                item.name(),
                item.culture()
            ),
            ItemKind::ArtForm => format!(
                "{} is an art form practised by the {} people.",
                item.name(),
                item.culture()
            ),
            ItemKind::Tradition => format!(
                "{} is a tradition of the {} people.",
                item.name(),
                item.culture()
            ),
            ItemKind::Language => format!(
                "{} is a language of the {} people.",
                item.name(),
                item.culture()
            ),
            ItemKind::Proverb => format!("A {} proverb: {}", item.culture(), item.summary()),
        }
    }

    fn confidence_for(&self, kind: ItemKind) -> f64 {
        match kind {
            ItemKind::Proverb => self.proverb_confidence,
            _ => self.item_confidence,
        }
    }
}

/// The original query plus a rewritten variant per matched keyword group
fn expand_query(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut variants = vec![text.to_string()];
    for (keywords, suffix) in EXPANSIONS {
        if keywords.iter().any(|kw| lower.contains(kw)) {
            variants.push(format!("{} {}", text, suffix));
        }
    }
    variants
}

/// Lower-cased tokens longer than two chars that are not stop words
fn significant_tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .filter(|t| t.len() > 2 && !STOP_WORDS.contains(&t.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use griot_common::dataset;

    fn engine() -> ReasoningEngine {
        let kb = Arc::new(KnowledgeBase::from_items(dataset::builtin()));
        ReasoningEngine::new(kb, &ReasoningConfig::default())
    }

    #[test]
    fn same_query_twice_is_identical() {
        let engine = engine();
        let first = engine.query("What is Sango Festival?");
        let second = engine.query("What is Sango Festival?");
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn empty_knowledge_base_yields_nothing() {
        let kb = Arc::new(KnowledgeBase::from_items(vec![]));
        let engine = ReasoningEngine::new(kb, &ReasoningConfig::default());
        assert!(engine.query("festivals of the Yoruba people").is_empty());
    }

    #[test]
    fn stop_word_only_query_yields_nothing() {
        let engine = engine();
        assert!(engine.query("what is the").is_empty());
    }

    #[test]
    fn proverbs_carry_lower_confidence() {
        let engine = engine();
        let results = engine.query("ubuntu proverb");
        let proverb = results
            .iter()
            .find(|r| r.item.kind() == ItemKind::Proverb)
            .expect("expected a proverb match");
        assert_eq!(proverb.confidence, 0.85);

        let festival = engine
            .query("sango")
            .into_iter()
            .find(|r| r.item.kind() == ItemKind::Festival)
            .expect("expected a festival match");
        assert_eq!(festival.confidence, 0.9);
    }

    #[test]
    fn expansion_adds_variants_for_keyword_groups() {
        let variants = expand_query("a festival with traditional art");
        // Base query + festival group + art/tradition group
        assert_eq!(variants.len(), 3);
        assert_eq!(variants[0], "a festival with traditional art");

        assert_eq!(expand_query("plain question").len(), 1);
    }

    #[test]
    fn significant_tokens_filter() {
        let tokens = significant_tokens("What is the Sango Festival?");
        assert_eq!(tokens, vec!["sango", "festival"]);
    }

    #[test]
    fn cache_is_bounded() {
        let kb = Arc::new(KnowledgeBase::from_items(dataset::builtin()));
        let cfg = ReasoningConfig {
            cache_capacity: 2,
            ..ReasoningConfig::default()
        };
        let engine = ReasoningEngine::new(kb, &cfg);
        engine.query("one");
        engine.query("two");
        engine.query("three");
        assert_eq!(engine.cache.lock().unwrap().len(), 2);
    }

    #[test]
    fn explain_names_item_and_culture() {
        let engine = engine();
        let result = engine
            .query("sango")
            .into_iter()
            .find(|r| r.item.kind() == ItemKind::Festival)
            .unwrap();
        let line = engine.explain(&result);
        assert_eq!(
            line,
            "Sango Festival is a festival celebrated by the Yoruba people."
        );
    }

    #[test]
    fn related_items_share_culture() {
        let engine = engine();
        let sango = dataset::builtin()
            .into_iter()
            .find(|i| i.name() == "Sango Festival")
            .unwrap();
        let related = engine.related_items(&sango);
        assert!(!related.is_empty());
        for (item, strength) in &related {
            assert!(item.culture().eq_ignore_ascii_case("Yoruba"));
            assert!(item.dedup_key() != sango.dedup_key());
            assert_eq!(*strength, 0.8);
        }
    }
}
