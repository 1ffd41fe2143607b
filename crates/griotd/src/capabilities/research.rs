//! Research capability: secondary context from the enrichment provider.
//!
//! Wikipedia-search tasks fetch a topic summary; any other task runs a
//! related-page search. Network failures become error-marked responses.

use super::Capability;
use crate::enrichment::Enrichment;
use async_trait::async_trait;
use griot_common::knowledge::excerpt;
use griot_common::{AgentMessage, AgentResponse, SourceRef, TaskType};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

pub const CAPABILITY_ID: &str = "research_scout";

const RELATED_LIMIT: usize = 5;

pub struct ResearchCapability {
    enrichment: Arc<dyn Enrichment>,
}

impl ResearchCapability {
    pub fn new(enrichment: Arc<dyn Enrichment>) -> Self {
        Self { enrichment }
    }

    async fn wikipedia_summary(&self, topic: &str) -> AgentResponse {
        match self.enrichment.summary(topic).await {
            Ok(Some(summary)) => AgentResponse::ok(
                self.id(),
                format!("Wikipedia: {}", summary.summary),
                0.85,
            )
            .with_sources(vec![SourceRef::new("Wikipedia", "web")])
            .with_meta("url", Value::String(summary.url))
            .with_meta("title", Value::String(summary.title)),
            Ok(None) => AgentResponse::ok(self.id(), "No Wikipedia information found.", 0.3),
            Err(e) => {
                warn!("Wikipedia summary failed for '{}': {}", topic, e);
                AgentResponse::error(self.id(), format!("research failed: {}", e))
            }
        }
    }

    async fn related_search(&self, topic: &str) -> AgentResponse {
        match self.enrichment.related(topic, RELATED_LIMIT).await {
            Ok(pages) if !pages.is_empty() => {
                let listing = pages
                    .iter()
                    .enumerate()
                    .map(|(i, page)| {
                        format!("{}. {}: {}", i + 1, page.title, excerpt(&page.snippet, 100))
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                AgentResponse::ok(self.id(), listing, 0.7)
                    .with_sources(vec![SourceRef::new("Wikipedia", "web")])
            }
            Ok(_) => AgentResponse::ok(self.id(), "No related results found.", 0.4),
            Err(e) => {
                warn!("Related search failed for '{}': {}", topic, e);
                AgentResponse::error(self.id(), format!("research failed: {}", e))
            }
        }
    }
}

#[async_trait]
impl Capability for ResearchCapability {
    fn id(&self) -> &'static str {
        CAPABILITY_ID
    }

    async fn invoke(&self, message: AgentMessage) -> AgentResponse {
        match message.task_type {
            TaskType::WikipediaSearch => self.wikipedia_summary(&message.text).await,
            _ => self.related_search(&message.text).await,
        }
    }
}
