//! Verification capability: trust scoring from weak signals.
//!
//! Combines a word-overlap consistency check between the synthesized
//! answer and secondary research text with presence and source-count
//! bonuses into a 0-100 score, then renders a verdict.

use super::Capability;
use crate::llm::GenerationClient;
use async_trait::async_trait;
use griot_common::{AgentMessage, AgentResponse, SourceRef, TaskType};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;

pub const CAPABILITY_ID: &str = "verifier";

/// Source names that count as independently verified
const VERIFIED_SOURCE_NAMES: &[&str] = &["Wikipedia", "UNESCO", "Academic"];

/// Agreement level between the answer and research text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyLevel {
    High,
    Medium,
    Low,
    /// One of the two texts was missing
    Partial,
    Unknown,
}

impl ConsistencyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsistencyLevel::High => "high",
            ConsistencyLevel::Medium => "medium",
            ConsistencyLevel::Low => "low",
            ConsistencyLevel::Partial => "partial",
            ConsistencyLevel::Unknown => "unknown",
        }
    }

    fn bonus(&self) -> u32 {
        match self {
            ConsistencyLevel::High => 30,
            ConsistencyLevel::Medium => 20,
            ConsistencyLevel::Low => 10,
            ConsistencyLevel::Partial => 5,
            ConsistencyLevel::Unknown => 0,
        }
    }
}

/// Outcome of a verification run
#[derive(Debug, Clone, Serialize)]
pub struct VerificationResult {
    pub summary: String,
    /// 0-100
    pub score: u32,
    /// score / 100
    pub confidence: f64,
    pub consistency: ConsistencyLevel,
    pub verified_sources: Vec<String>,
}

pub struct VerificationCapability {
    generation: Option<Arc<dyn GenerationClient>>,
}

impl VerificationCapability {
    pub fn new(generation: Option<Arc<dyn GenerationClient>>) -> Self {
        Self { generation }
    }

    pub async fn verify(
        &self,
        statement: &str,
        heritage_text: &str,
        research_text: &str,
        sources: &[SourceRef],
    ) -> VerificationResult {
        let consistency = consistency_level(heritage_text, research_text);

        let verified_sources: Vec<String> = sources
            .iter()
            .filter(|s| VERIFIED_SOURCE_NAMES.contains(&s.name.as_str()))
            .map(|s| s.name.clone())
            .collect();

        let mut score: u32 = 0;
        if !heritage_text.trim().is_empty() {
            score += 30;
        }
        if !research_text.trim().is_empty() {
            score += 20;
        }
        score += consistency.bonus();
        score += (5 * verified_sources.len() as u32).min(20);
        let score = score.min(100);

        let confidence = (f64::from(score) / 100.0).min(1.0);
        let summary = self.render_summary(statement, score).await;

        VerificationResult {
            summary,
            score,
            confidence,
            consistency,
            verified_sources,
        }
    }

    async fn render_summary(&self, statement: &str, score: u32) -> String {
        if let Some(generation) = &self.generation {
            let prompt = format!(
                "In 2-3 sentences, assess how trustworthy this statement is given a \
                 verification score of {}/100:\n\n{}",
                score, statement
            );
            match generation.generate(&prompt, &[], 0.3, 160).await {
                Ok(verdict) => return verdict,
                Err(e) => warn!("Verdict generation failed, using template: {}", e),
            }
        }
        template_summary(score)
    }
}

#[async_trait]
impl Capability for VerificationCapability {
    fn id(&self) -> &'static str {
        CAPABILITY_ID
    }

    async fn invoke(&self, message: AgentMessage) -> AgentResponse {
        debug_assert_eq!(message.task_type, TaskType::Verify);
        let heritage_text = message.context_str("heritage_text").unwrap_or("");
        let research_text = message.context_str("research_text").unwrap_or("");
        let sources: Vec<SourceRef> = message
            .context
            .get("sources")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default();

        let result = self
            .verify(&message.text, heritage_text, research_text, &sources)
            .await;

        AgentResponse::ok(self.id(), result.summary.clone(), result.confidence)
            .with_meta("score", Value::from(result.score))
            .with_meta(
                "consistency",
                Value::String(result.consistency.as_str().to_string()),
            )
            .with_meta(
                "verified_sources",
                Value::from(result.verified_sources.clone()),
            )
    }
}

/// Word-set overlap/union classification. Symmetric in its arguments.
pub fn consistency_level(a: &str, b: &str) -> ConsistencyLevel {
    let words_a = word_set(a);
    let words_b = word_set(b);
    if words_a.is_empty() || words_b.is_empty() {
        return ConsistencyLevel::Partial;
    }

    let overlap = words_a.intersection(&words_b).count();
    let union = words_a.union(&words_b).count();
    if union == 0 {
        return ConsistencyLevel::Unknown;
    }

    let ratio = overlap as f64 / union as f64;
    if ratio > 0.5 {
        ConsistencyLevel::High
    } else if ratio > 0.3 {
        ConsistencyLevel::Medium
    } else {
        ConsistencyLevel::Low
    }
}

fn word_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|w| w.to_string())
        .collect()
}

fn template_summary(score: u32) -> String {
    if score >= 80 {
        format!(
            "High confidence: the statement is well supported by available sources \
             (score {}/100).",
            score
        )
    } else if score >= 60 {
        format!(
            "Medium confidence: the statement is partially supported (score {}/100).",
            score
        )
    } else if score >= 40 {
        format!(
            "Low confidence: only limited support was found (score {}/100).",
            score
        )
    } else {
        format!(
            "Insufficient evidence to verify the statement (score {}/100).",
            score
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::FakeGenerationClient;

    fn sources(names: &[&str]) -> Vec<SourceRef> {
        names.iter().map(|n| SourceRef::new(*n, "web")).collect()
    }

    #[test]
    fn consistency_is_symmetric() {
        let a = "the sango festival honours the deity of thunder";
        let b = "sango is the yoruba deity of thunder and lightning";
        assert_eq!(consistency_level(a, b), consistency_level(b, a));
    }

    #[test]
    fn identical_texts_are_high() {
        let text = "adire is an indigo resist dyed textile";
        assert_eq!(consistency_level(text, text), ConsistencyLevel::High);
    }

    #[test]
    fn disjoint_texts_are_low() {
        assert_eq!(
            consistency_level("alpha beta gamma", "delta epsilon zeta"),
            ConsistencyLevel::Low
        );
    }

    #[test]
    fn missing_text_is_partial() {
        assert_eq!(consistency_level("", "some text"), ConsistencyLevel::Partial);
        assert_eq!(consistency_level("some text", ""), ConsistencyLevel::Partial);
        assert_eq!(consistency_level("", ""), ConsistencyLevel::Partial);
    }

    #[tokio::test]
    async fn empty_inputs_score_zero() {
        let capability = VerificationCapability::new(None);
        let result = capability.verify("statement", "", "", &[]).await;
        assert_eq!(result.score, 0);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.consistency, ConsistencyLevel::Partial);

        // Partial bonus only applies once a text is present
        let result = capability.verify("statement", "some answer", "", &[]).await;
        assert_eq!(result.score, 35); // 30 presence + 5 partial
    }

    #[tokio::test]
    async fn score_is_monotonic_in_source_count_up_to_cap() {
        let capability = VerificationCapability::new(None);
        let mut last = 0;
        for n in 0..=6 {
            let names: Vec<&str> = std::iter::repeat("Wikipedia").take(n).collect();
            let result = capability
                .verify("s", "answer text", "research text", &sources(&names))
                .await;
            assert!(result.score >= last);
            last = result.score;
        }
        // Source bonus caps at 20 points: 4 and 6 sources score the same
        let four = capability
            .verify("s", "answer text", "research text", &sources(&["Wikipedia"; 4]))
            .await;
        let six = capability
            .verify("s", "answer text", "research text", &sources(&["Wikipedia"; 6]))
            .await;
        assert_eq!(four.score, six.score);
    }

    #[tokio::test]
    async fn unverified_sources_do_not_count() {
        let capability = VerificationCapability::new(None);
        let result = capability
            .verify("s", "answer", "", &sources(&["Wikipedia", "UNESCO", "Some Blog"]))
            .await;
        assert_eq!(result.verified_sources, vec!["Wikipedia", "UNESCO"]);
        // 30 presence + 5 partial + 10 sources
        assert_eq!(result.score, 45);
    }

    #[tokio::test]
    async fn template_summary_thresholds() {
        assert!(template_summary(85).starts_with("High confidence"));
        assert!(template_summary(65).starts_with("Medium confidence"));
        assert!(template_summary(45).starts_with("Low confidence"));
        assert!(template_summary(20).starts_with("Insufficient evidence"));
    }

    #[tokio::test]
    async fn invoke_reports_producer_id_and_score() {
        let capability = VerificationCapability::new(None);
        let msg = AgentMessage::new("statement", "orchestrator", TaskType::Verify)
            .with_context("heritage_text", Value::String("answer text".to_string()));
        let resp = capability.invoke(msg).await;
        assert_eq!(resp.producer, capability.id());
        // 30 presence + 5 partial consistency
        assert_eq!(resp.metadata.get("score"), Some(&Value::from(35u32)));
    }

    #[tokio::test]
    async fn generation_verdict_with_fallback() {
        let generation = Arc::new(
            FakeGenerationClient::new().with_default_reply("The statement is broadly reliable."),
        );
        let capability = VerificationCapability::new(Some(generation));
        let result = capability.verify("s", "a b c", "a b c", &[]).await;
        assert_eq!(result.summary, "The statement is broadly reliable.");

        let failing = VerificationCapability::new(Some(Arc::new(FakeGenerationClient::failing())));
        let result = failing.verify("s", "a b c", "a b c", &[]).await;
        assert!(result.summary.contains("/100"));
    }
}
