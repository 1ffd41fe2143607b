//! Query planner and linear execution engine.
//!
//! One pass per query: HERITAGE (mandatory), then RESEARCH if planned,
//! then VERIFICATION and TRANSLATION (both need the heritage result), then
//! COMBINE. The engine never raises to its caller: internal errors become
//! a zero-confidence response.

use crate::capabilities::heritage::HeritageCapability;
use crate::capabilities::research::ResearchCapability;
use crate::capabilities::translation::TranslationCapability;
use crate::capabilities::verification::VerificationCapability;
use crate::capabilities::Capability;
use crate::config::Config;
use crate::enrichment::Enrichment;
use crate::llm::GenerationClient;
use crate::reasoning::ReasoningEngine;
use anyhow::Result;
use griot_common::{
    AgentMessage, AgentResponse, CulturalItem, KnowledgeBase, RetrievalStore, TaskType,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{info, warn};

pub const PRODUCER_ID: &str = "orchestrator";

/// Query keywords that trigger the research capability
const RESEARCH_KEYWORDS: &[&str] = &["more", "detail", "context", "wikipedia", "source"];

/// Query keywords that trigger the verification capability
const VERIFY_KEYWORDS: &[&str] = &["verify", "confirm", "accurate", "true", "fact"];

/// Which capabilities a query needs; derived once, immutable afterwards
#[derive(Debug, Clone, Serialize)]
pub struct QueryPlan {
    pub use_heritage: bool,
    pub use_research: bool,
    pub use_verification: bool,
    pub use_translation: bool,
    pub target_language: Option<String>,
}

/// The answer engine: planner plus the four capabilities
pub struct Engine {
    heritage: HeritageCapability,
    research: ResearchCapability,
    verification: VerificationCapability,
    translation: TranslationCapability,
    complex_word_limit: usize,
}

impl Engine {
    /// Build an engine over the builtin dataset
    pub fn new(
        config: &Config,
        generation: Option<Arc<dyn GenerationClient>>,
        enrichment: Arc<dyn Enrichment>,
    ) -> Self {
        Self::with_dataset(config, griot_common::dataset::builtin(), generation, enrichment)
    }

    pub fn with_dataset(
        config: &Config,
        items: Vec<CulturalItem>,
        generation: Option<Arc<dyn GenerationClient>>,
        enrichment: Arc<dyn Enrichment>,
    ) -> Self {
        let kb = Arc::new(KnowledgeBase::from_items(items.clone()));
        let store = Arc::new(RetrievalStore::from_items(items));
        let reasoning = Arc::new(ReasoningEngine::new(kb, &config.reasoning));

        Self {
            heritage: HeritageCapability::new(
                store,
                reasoning,
                generation.clone(),
                config.engine.retrieval_top_k,
            ),
            research: ResearchCapability::new(enrichment),
            verification: VerificationCapability::new(generation.clone()),
            translation: TranslationCapability::new(generation),
            complex_word_limit: config.engine.complex_word_limit,
        }
    }

    /// Derive a plan from keyword heuristics and query shape
    pub fn plan(&self, query: &str, context: &Map<String, Value>) -> QueryPlan {
        let lower = query.to_lowercase();
        let mut use_research = RESEARCH_KEYWORDS.iter().any(|kw| lower.contains(kw));
        let mut use_verification = VERIFY_KEYWORDS.iter().any(|kw| lower.contains(kw));

        // Complex queries get the full treatment
        let word_count = query.split_whitespace().count();
        if word_count > self.complex_word_limit || query.contains('?') {
            use_research = true;
            use_verification = true;
        }

        let target_language = context
            .get("language")
            .and_then(Value::as_str)
            .filter(|lang| *lang != "en")
            .map(str::to_string);

        QueryPlan {
            use_heritage: true,
            use_research,
            use_verification,
            use_translation: target_language.is_some(),
            target_language,
        }
    }

    /// Answer one query. Always returns a well-formed response.
    pub async fn answer(&self, query: &str, context: Map<String, Value>) -> AgentResponse {
        let plan = self.plan(query, &context);
        info!(
            "Plan for query: research={} verification={} translation={}",
            plan.use_research, plan.use_verification, plan.use_translation
        );
        match self.execute(query, &context, &plan).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Engine failure: {:#}", e);
                AgentResponse::error(PRODUCER_ID, format!("internal error: {}", e))
            }
        }
    }

    async fn execute(
        &self,
        query: &str,
        context: &Map<String, Value>,
        plan: &QueryPlan,
    ) -> Result<AgentResponse> {
        let heritage_msg = AgentMessage::new(query, PRODUCER_ID, TaskType::CulturalQuery)
            .with_context_map(context.clone());
        let heritage = self.heritage.invoke(heritage_msg).await;
        let heritage_ok = !heritage.is_error();

        let research = if plan.use_research {
            let msg = AgentMessage::new(query, PRODUCER_ID, TaskType::WikipediaSearch);
            Some(self.research.invoke(msg).await)
        } else {
            None
        };

        let verification = if plan.use_verification && heritage_ok {
            let research_text = research
                .as_ref()
                .filter(|r| !r.is_error())
                .map(|r| r.text.clone())
                .unwrap_or_default();
            let msg = AgentMessage::new(query, PRODUCER_ID, TaskType::Verify)
                .with_context("heritage_text", Value::String(heritage.text.clone()))
                .with_context("research_text", Value::String(research_text))
                .with_context("sources", serde_json::to_value(&heritage.sources)?);
            Some(self.verification.invoke(msg).await)
        } else {
            None
        };

        let translation = match (&plan.target_language, heritage_ok) {
            (Some(target), true) if plan.use_translation => {
                let msg =
                    AgentMessage::new(heritage.text.clone(), PRODUCER_ID, TaskType::Translate)
                        .with_context("source_lang", Value::String("en".to_string()))
                        .with_context("target_lang", Value::String(target.clone()));
                Some(self.translation.invoke(msg).await)
            }
            _ => None,
        };

        combine(plan, heritage, research, verification, translation)
    }
}

/// Merge capability outputs into the final response
fn combine(
    plan: &QueryPlan,
    heritage: AgentResponse,
    research: Option<AgentResponse>,
    verification: Option<AgentResponse>,
    translation: Option<AgentResponse>,
) -> Result<AgentResponse> {
    let mut text = match &translation {
        Some(t) if !t.is_error() => t.text.clone(),
        _ => heritage.text.clone(),
    };
    if let Some(r) = &research {
        if !r.is_error() && !r.text.is_empty() {
            text.push_str(&format!("\n\n**Additional Context**\n{}", r.text));
        }
    }
    if let Some(v) = &verification {
        if !v.is_error() && !v.text.is_empty() {
            text.push_str(&format!("\n\n**Verification**\n{}", v.text));
        }
    }

    let invoked: Vec<&AgentResponse> = std::iter::once(&heritage)
        .chain(research.iter())
        .chain(verification.iter())
        .chain(translation.iter())
        .collect();

    // Simple concatenation, no de-duplication
    let sources = invoked
        .iter()
        .flat_map(|r| r.sources.iter().cloned())
        .collect();

    let confidence = if invoked.is_empty() {
        0.5
    } else {
        invoked.iter().map(|r| r.confidence).sum::<f64>() / invoked.len() as f64
    };

    let capability_ids: Vec<Value> = invoked
        .iter()
        .map(|r| Value::String(r.producer.clone()))
        .collect();

    Ok(AgentResponse::ok(PRODUCER_ID, text, confidence)
        .with_sources(sources)
        .with_meta("capabilities", Value::Array(capability_ids))
        .with_meta("plan", serde_json::to_value(plan)?))
}
