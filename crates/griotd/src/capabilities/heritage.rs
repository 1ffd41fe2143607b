//! Answer synthesis pipeline: retrieve, filter, reason, generate.
//!
//! The heritage capability retrieves every stored record, asks the
//! generation backend to semantically filter them, merges the survivors
//! with reasoning-engine inferences, and produces a grounded narrative
//! with a provenance list and an additive confidence score.

use super::Capability;
use crate::llm::{ContextEntry, ContextOrigin, GenerationClient};
use crate::reasoning::{ReasoningEngine, ReasoningResult};
use async_trait::async_trait;
use griot_common::knowledge::excerpt;
use griot_common::{AgentMessage, AgentResponse, RetrievalStore, SourceRef};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

pub const CAPABILITY_ID: &str = "heritage_keeper";

/// Answer shown when nothing at all could be gathered
const NO_CONTEXT_FALLBACK: &str = "I could not find cultural heritage records matching your \
question. Try asking about a specific festival, art form, tradition, language or proverb.";

/// Output of one pipeline run
#[derive(Debug, Clone)]
pub struct HeritageAnswer {
    pub text: String,
    pub sources: Vec<SourceRef>,
    pub reasoning: Vec<ReasoningResult>,
    pub confidence: f64,
    pub used_generation: bool,
    pub web_enriched: bool,
    /// Candidate count before semantic filtering
    pub retrieved: usize,
}

pub struct HeritageCapability {
    store: Arc<RetrievalStore>,
    reasoning: Arc<ReasoningEngine>,
    generation: Option<Arc<dyn GenerationClient>>,
    top_k: usize,
    max_tokens: u32,
}

impl HeritageCapability {
    pub fn new(
        store: Arc<RetrievalStore>,
        reasoning: Arc<ReasoningEngine>,
        generation: Option<Arc<dyn GenerationClient>>,
        top_k: usize,
    ) -> Self {
        Self {
            store,
            reasoning,
            generation,
            top_k: top_k.max(1),
            max_tokens: 512,
        }
    }

    /// Run the full pipeline. Every fallible step degrades instead of
    /// failing, so this always produces an answer.
    pub async fn answer(
        &self,
        query: &str,
        use_reasoning: bool,
        use_generation: bool,
        context: &Map<String, Value>,
    ) -> HeritageAnswer {
        // 1. Gather candidates: pre-fetched artifacts first, then the full
        //    store dump. Ranking comes from the semantic filter, not here.
        let mut candidates: Vec<ContextEntry> = artifact_entries(context);
        for item in self.store.all() {
            candidates.push(
                ContextEntry::new(
                    item.kind().as_str(),
                    item.name(),
                    item.summary(),
                    ContextOrigin::Retrieval,
                    1.0,
                )
                .with_culture(item.culture())
                .with_dedup_key(string_key(item.dedup_key())),
            );
        }
        let retrieved = candidates.len();

        // 2. Semantic filter
        let (mut entries, filter_generated) = self.semantic_filter(query, candidates).await;

        // 3. Reasoning inferences
        let reasoning = if use_reasoning {
            self.reasoning.query(query)
        } else {
            Vec::new()
        };
        for inference in &reasoning {
            let item = &inference.item;
            entries.push(
                ContextEntry::new(
                    item.kind().as_str(),
                    item.name(),
                    item.summary(),
                    ContextOrigin::Reasoning,
                    inference.confidence,
                )
                .with_culture(item.culture())
                .with_dedup_key(string_key(item.dedup_key())),
            );
        }

        // 4. Dedup by (kind, name-or-text) keeping first, then stable sort
        //    by score so store hits precede reasoning hits.
        let mut seen = HashSet::new();
        entries.retain(|entry| seen.insert(entry.dedup_key.clone()));
        entries.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        // 5. Web enrichment text gets top priority
        let web_enriched = match web_context_summary(context) {
            Some(summary) => {
                entries.insert(
                    0,
                    ContextEntry::new("web", "Wikipedia", summary, ContextOrigin::Enrichment, 1.0),
                );
                true
            }
            None => false,
        };

        // 6. Narrative
        let (text, used_generation) = match (&self.generation, use_generation) {
            (Some(generation), true) => {
                match generation.generate(query, &entries, 0.7, self.max_tokens).await {
                    Ok(reply) => (reply, true),
                    Err(e) => {
                        warn!("Generation failed, using templated answer: {}", e);
                        (self.fallback_answer(&entries), false)
                    }
                }
            }
            _ => (self.fallback_answer(&entries), false),
        };

        // 7. Additive confidence
        let mut confidence: f64 = 0.5;
        if retrieved > 0 {
            confidence += 0.2;
        }
        if !reasoning.is_empty() {
            confidence += 0.15;
        }
        if used_generation {
            confidence += 0.1;
        }
        if web_enriched {
            confidence += 0.05;
        }
        let confidence = confidence.min(1.0);

        let sources = entries
            .iter()
            .take(5)
            .map(|e| SourceRef::new(&e.name, e.origin.as_str()).with_score(e.score))
            .collect();

        debug!(
            "Heritage answer: retrieved={} kept={} inferences={} generated={}",
            retrieved,
            entries.len(),
            reasoning.len(),
            used_generation || filter_generated,
        );

        HeritageAnswer {
            text,
            sources,
            reasoning,
            confidence,
            used_generation,
            web_enriched,
            retrieved,
        }
    }

    /// Ask the generation backend to name the `top_k` most relevant
    /// candidates. An unusable reply or a backend failure degrades to the
    /// first `top_k` candidates in store order.
    async fn semantic_filter(
        &self,
        query: &str,
        candidates: Vec<ContextEntry>,
    ) -> (Vec<ContextEntry>, bool) {
        let Some(generation) = &self.generation else {
            return (first_k(candidates, self.top_k), false);
        };
        if candidates.is_empty() {
            return (candidates, false);
        }

        let listing = candidates
            .iter()
            .map(|c| format!("- {}: {}", c.name, excerpt(&c.text, 100)))
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = format!(
            "From the records below, pick the {} most relevant to the question.\n\
             Reply with exactly one record name per line and nothing else.\n\n\
             Question: {}\n\nRecords:\n{}",
            self.top_k, query, listing
        );

        let reply = match generation.generate(&prompt, &[], 0.2, 128).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Semantic filter failed, keeping store order: {}", e);
                return (first_k(candidates, self.top_k), false);
            }
        };

        let labels = parse_filter_reply(&reply);
        if labels.is_empty() {
            return (first_k(candidates, self.top_k), false);
        }

        let mut kept = Vec::new();
        let mut rest = Vec::new();
        for candidate in candidates {
            if labels.contains(&candidate.name.to_lowercase()) {
                kept.push(candidate);
            } else {
                rest.push(candidate);
            }
        }
        // Pad with store order until top_k
        for candidate in rest {
            if kept.len() >= self.top_k {
                break;
            }
            kept.push(candidate);
        }
        kept.truncate(self.top_k);
        (kept, true)
    }

    /// Deterministic templated answer from the top-scoring context entry
    fn fallback_answer(&self, entries: &[ContextEntry]) -> String {
        let Some(top) = entries.first() else {
            return NO_CONTEXT_FALLBACK.to_string();
        };

        let mut text = match &top.culture {
            Some(culture) => format!(
                "**{}** ({} {}): {}",
                top.name,
                culture,
                top.kind.replace('_', " "),
                top.text
            ),
            None => format!("**{}**: {}", top.name, top.text),
        };

        // Trailer explaining up to two related records
        if let Some(item) = self.store.all().iter().find(|i| i.name() == top.name) {
            let related: Vec<String> = self
                .reasoning
                .related_items(item)
                .into_iter()
                .take(2)
                .map(|(other, confidence)| {
                    self.reasoning.explain(&ReasoningResult {
                        item: other,
                        confidence,
                    })
                })
                .collect();
            if !related.is_empty() {
                text.push_str(&format!("\n\nRelated: {}", related.join(" ")));
            }
        }
        text
    }
}

#[async_trait]
impl Capability for HeritageCapability {
    fn id(&self) -> &'static str {
        CAPABILITY_ID
    }

    async fn invoke(&self, message: AgentMessage) -> AgentResponse {
        let answer = self
            .answer(&message.text, true, true, &message.context)
            .await;
        AgentResponse::ok(self.id(), answer.text, answer.confidence)
            .with_sources(answer.sources)
            .with_meta("retrieved_docs", Value::from(answer.retrieved))
            .with_meta(
                "reasoning_inferences",
                Value::from(answer.reasoning.len()),
            )
            .with_meta("used_generation", Value::from(answer.used_generation))
            .with_meta("web_enriched", Value::from(answer.web_enriched))
    }
}

/// Pre-fetched enrichment items supplied by the caller, tagged `artifact`
fn artifact_entries(context: &Map<String, Value>) -> Vec<ContextEntry> {
    let Some(artifacts) = context.get("enriched_artifacts").and_then(Value::as_array) else {
        return Vec::new();
    };
    artifacts
        .iter()
        .filter_map(|artifact| {
            let name = artifact.get("name")?.as_str()?;
            let text = artifact
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default();
            Some(ContextEntry::new(
                "artifact",
                name,
                text,
                ContextOrigin::Enrichment,
                1.0,
            ))
        })
        .collect()
}

/// Enrichment summary text, accepted either as a bare string or as an
/// object with a `summary` field
fn web_context_summary(context: &Map<String, Value>) -> Option<String> {
    let value = context.get("web_context")?;
    let text = match value {
        Value::String(s) => s.as_str(),
        Value::Object(map) => map.get("summary").and_then(Value::as_str)?,
        _ => return None,
    };
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Parse the filter reply into a set of lower-cased record names. The
/// contract is one name per line; list markers and numbering are tolerated.
fn parse_filter_reply(reply: &str) -> HashSet<String> {
    reply
        .lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(['-', '*', '•'])
                .trim_start_matches(|c: char| c.is_ascii_digit())
                .trim_start_matches(['.', ')', ':'])
                .trim()
                .trim_matches('"')
                .to_lowercase()
        })
        .filter(|label| !label.is_empty())
        .collect()
}

fn string_key(key: (griot_common::ItemKind, String)) -> (String, String) {
    (key.0.as_str().to_string(), key.1)
}

fn first_k(mut candidates: Vec<ContextEntry>, k: usize) -> Vec<ContextEntry> {
    candidates.truncate(k);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReasoningConfig;
    use crate::llm::FakeGenerationClient;
    use approx::assert_relative_eq;
    use griot_common::{dataset, KnowledgeBase};

    fn capability(generation: Option<Arc<dyn GenerationClient>>) -> HeritageCapability {
        let items = dataset::builtin();
        let kb = Arc::new(KnowledgeBase::from_items(items.clone()));
        let store = Arc::new(RetrievalStore::from_items(items));
        let reasoning = Arc::new(ReasoningEngine::new(kb, &ReasoningConfig::default()));
        HeritageCapability::new(store, reasoning, generation, 3)
    }

    #[test]
    fn parse_filter_reply_tolerates_list_markers() {
        let labels = parse_filter_reply("1. Sango Festival\n- Adire\n* \"Uli\"\n\n");
        assert!(labels.contains("sango festival"));
        assert!(labels.contains("adire"));
        assert!(labels.contains("uli"));
        assert_eq!(labels.len(), 3);
        assert!(parse_filter_reply("  \n\n").is_empty());
    }

    #[tokio::test]
    async fn generated_answer_scores_full_pipeline() {
        let generation = Arc::new(
            FakeGenerationClient::new()
                .push_reply("Sango Festival")
                .push_reply("The Sango Festival honours the Yoruba deity of thunder."),
        );
        let capability = capability(Some(generation));
        let answer = capability
            .answer("What is Sango Festival?", true, true, &Map::new())
            .await;

        // 0.5 base + 0.2 retrieval + 0.15 reasoning + 0.1 generation
        assert_relative_eq!(answer.confidence, 0.95);
        assert!(answer.used_generation);
        assert!(answer.text.contains("thunder"));
        assert_eq!(answer.sources[0].name, "Sango Festival");
        assert!(answer.sources.len() <= 5);
    }

    #[tokio::test]
    async fn generation_failure_degrades_to_template() {
        let capability = capability(Some(Arc::new(FakeGenerationClient::failing())));
        let answer = capability
            .answer("Tell me about Yoruba art", true, true, &Map::new())
            .await;

        assert!(!answer.used_generation);
        // Filter fell back to store order: first record is the first festival
        assert!(answer.text.starts_with("**Sango Festival**"));
        // Trailer explains related same-culture records
        assert!(answer.text.contains("Related:"));
        assert!(answer
            .text
            .contains("Adire is an art form practised by the Yoruba people."));
        // 0.5 base + 0.2 retrieval + 0.15 reasoning, no generation bonus
        assert_relative_eq!(answer.confidence, 0.85);
    }

    #[tokio::test]
    async fn empty_store_yields_no_context_fallback() {
        let kb = Arc::new(KnowledgeBase::from_items(vec![]));
        let store = Arc::new(RetrievalStore::from_items(vec![]));
        let reasoning = Arc::new(ReasoningEngine::new(kb, &ReasoningConfig::default()));
        let capability = HeritageCapability::new(store, reasoning, None, 3);

        let answer = capability.answer("anything", true, true, &Map::new()).await;
        assert_eq!(answer.text, NO_CONTEXT_FALLBACK);
        assert_relative_eq!(answer.confidence, 0.5);
        assert!(answer.sources.is_empty());
    }

    #[tokio::test]
    async fn web_context_is_prepended_and_scored() {
        let mut context = Map::new();
        context.insert(
            "web_context".to_string(),
            serde_json::json!({"summary": "Wikipedia summary of the festival."}),
        );
        let capability = capability(None);
        let answer = capability
            .answer("What is Sango Festival?", true, true, &context)
            .await;

        assert!(answer.web_enriched);
        assert_eq!(answer.sources[0].name, "Wikipedia");
        // 0.5 + 0.2 + 0.15 + 0.05 web bonus
        assert_relative_eq!(answer.confidence, 0.9);
    }

    #[tokio::test]
    async fn artifacts_rank_ahead_of_store_records() {
        let mut context = Map::new();
        context.insert(
            "enriched_artifacts".to_string(),
            serde_json::json!([{"name": "Museum Note", "text": "Curator commentary."}]),
        );
        let capability = capability(None);
        let answer = capability.answer("festival", true, true, &context).await;
        assert_eq!(answer.sources[0].name, "Museum Note");
        assert_eq!(answer.sources[0].kind, "enrichment");
    }

    #[tokio::test]
    async fn reasoning_duplicates_of_store_hits_are_dropped() {
        // Unusable filter reply: falls back to first 3 store records, and
        // reasoning matches Sango Festival again with a lower score.
        let generation = Arc::new(
            FakeGenerationClient::new()
                .push_reply("nothing matches")
                .push_reply("answer"),
        );
        let capability = capability(Some(generation));
        let answer = capability
            .answer("What is Sango Festival?", true, true, &Map::new())
            .await;

        let sango_sources: Vec<_> = answer
            .sources
            .iter()
            .filter(|s| s.name == "Sango Festival")
            .collect();
        assert_eq!(sango_sources.len(), 1);
        assert_eq!(sango_sources[0].score, Some(1.0));
    }
}
