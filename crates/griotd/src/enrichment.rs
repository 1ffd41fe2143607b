//! Wikipedia enrichment client.
//!
//! Treated as an opaque provider behind the [`Enrichment`] trait: a topic
//! summary lookup and a related-page search. Production talks to the
//! MediaWiki API; tests use [`FakeEnrichment`].

use crate::config::EnrichmentConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use griot_common::knowledge::excerpt;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Enrichment errors
#[derive(Debug, thiserror::Error)]
pub enum EnrichmentError {
    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Wikipedia article summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikiSummary {
    pub title: String,
    pub summary: String,
    pub url: String,
}

/// A related-search hit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedPage {
    pub title: String,
    pub snippet: String,
}

/// External research provider
#[async_trait]
pub trait Enrichment: Send + Sync {
    /// Summary for a topic, `None` when no article exists
    async fn summary(&self, topic: &str) -> Result<Option<WikiSummary>, EnrichmentError>;

    /// Related pages for a topic
    async fn related(&self, topic: &str, limit: usize)
        -> Result<Vec<RelatedPage>, EnrichmentError>;
}

/// MediaWiki API client
pub struct WikipediaClient {
    http: reqwest::Client,
    api_url: String,
    summary_max_chars: usize,
}

impl WikipediaClient {
    pub fn from_config(cfg: &EnrichmentConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .user_agent(concat!("griotd/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            api_url: cfg.api_url.clone(),
            summary_max_chars: cfg.summary_max_chars,
        })
    }

    async fn get_json(&self, params: &[(&str, &str)]) -> Result<serde_json::Value, EnrichmentError> {
        let response = self
            .http
            .get(&self.api_url)
            .query(params)
            .send()
            .await
            .map_err(|e| EnrichmentError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EnrichmentError::Network(format!(
                "HTTP {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| EnrichmentError::Parse(e.to_string()))
    }
}

#[async_trait]
impl Enrichment for WikipediaClient {
    async fn summary(&self, topic: &str) -> Result<Option<WikiSummary>, EnrichmentError> {
        debug!("Wikipedia summary lookup: {}", topic);
        let reply = self
            .get_json(&[
                ("action", "query"),
                ("format", "json"),
                ("prop", "extracts"),
                ("exintro", "true"),
                ("explaintext", "true"),
                ("redirects", "1"),
                ("titles", topic),
            ])
            .await?;

        let pages = reply["query"]["pages"]
            .as_object()
            .ok_or_else(|| EnrichmentError::Parse("missing query.pages".into()))?;

        // The API keys pages by numeric id; a "-1" key means no article
        let Some(page) = pages.values().next() else {
            return Ok(None);
        };
        if page.get("missing").is_some() || page["pageid"].is_null() {
            return Ok(None);
        }

        let title = page["title"].as_str().unwrap_or(topic).to_string();
        let extract = page["extract"].as_str().unwrap_or("").trim();
        if extract.is_empty() {
            return Ok(None);
        }

        Ok(Some(WikiSummary {
            url: format!("https://en.wikipedia.org/wiki/{}", title.replace(' ', "_")),
            summary: excerpt(extract, self.summary_max_chars),
            title,
        }))
    }

    async fn related(
        &self,
        topic: &str,
        limit: usize,
    ) -> Result<Vec<RelatedPage>, EnrichmentError> {
        debug!("Wikipedia related search: {}", topic);
        let limit_str = limit.to_string();
        let reply = self
            .get_json(&[
                ("action", "query"),
                ("format", "json"),
                ("list", "search"),
                ("srsearch", topic),
                ("srlimit", limit_str.as_str()),
            ])
            .await?;

        let hits = reply["query"]["search"]
            .as_array()
            .ok_or_else(|| EnrichmentError::Parse("missing query.search".into()))?;

        Ok(hits
            .iter()
            .filter_map(|hit| {
                let title = hit["title"].as_str()?;
                let snippet = strip_tags(hit["snippet"].as_str().unwrap_or(""));
                Some(RelatedPage {
                    title: title.to_string(),
                    snippet,
                })
            })
            .collect())
    }
}

/// Drop HTML tags from search snippets (the API highlights matches)
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// Canned enrichment provider for tests
#[derive(Default)]
pub struct FakeEnrichment {
    summary: Option<WikiSummary>,
    related: Vec<RelatedPage>,
    fail: bool,
}

impl FakeEnrichment {
    /// Provider that finds nothing
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_summary(title: &str, summary: &str) -> Self {
        Self {
            summary: Some(WikiSummary {
                title: title.to_string(),
                summary: summary.to_string(),
                url: format!("https://en.wikipedia.org/wiki/{}", title.replace(' ', "_")),
            }),
            ..Self::default()
        }
    }

    pub fn with_related(mut self, pages: Vec<RelatedPage>) -> Self {
        self.related = pages;
        self
    }

    /// Every call returns a network error
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl Enrichment for FakeEnrichment {
    async fn summary(&self, _topic: &str) -> Result<Option<WikiSummary>, EnrichmentError> {
        if self.fail {
            return Err(EnrichmentError::Network("connection refused".to_string()));
        }
        Ok(self.summary.clone())
    }

    async fn related(
        &self,
        _topic: &str,
        limit: usize,
    ) -> Result<Vec<RelatedPage>, EnrichmentError> {
        if self.fail {
            return Err(EnrichmentError::Network("connection refused".to_string()));
        }
        Ok(self.related.iter().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_tags_removes_highlight_spans() {
        let html = r#"The <span class="searchmatch">Sango</span> festival is held in Oyo."#;
        assert_eq!(strip_tags(html), "The Sango festival is held in Oyo.");
        assert_eq!(strip_tags("no tags"), "no tags");
    }

    #[tokio::test]
    async fn fake_enrichment_serves_canned_summary() {
        let fake = FakeEnrichment::with_summary("Adire", "Adire is a resist-dyed cloth.");
        let summary = fake.summary("Adire").await.unwrap().unwrap();
        assert_eq!(summary.title, "Adire");
        assert!(summary.url.ends_with("/Adire"));

        let empty = FakeEnrichment::empty();
        assert!(empty.summary("Anything").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn fake_enrichment_failure_and_limit() {
        let failing = FakeEnrichment::failing();
        assert!(failing.summary("x").await.is_err());

        let fake = FakeEnrichment::empty().with_related(vec![
            RelatedPage {
                title: "A".into(),
                snippet: "a".into(),
            },
            RelatedPage {
                title: "B".into(),
                snippet: "b".into(),
            },
        ]);
        assert_eq!(fake.related("x", 1).await.unwrap().len(), 1);
    }
}
