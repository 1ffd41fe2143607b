//! Generation client for grounded answer synthesis.
//!
//! The engine talks to an OpenAI-compatible chat endpoint through the
//! [`GenerationClient`] trait. Production uses [`CloudGenerationClient`];
//! tests use [`FakeGenerationClient`] with queued replies so no network
//! calls are needed.

use crate::config::GenerationConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

/// System prompt that constrains generation to the supplied context
const GROUNDED_SYSTEM_PROMPT: &str = "You are a knowledgeable cultural heritage guide. \
Answer using only the supplied context. If the context does not cover the question, \
say so briefly instead of inventing facts. Keep answers concise and respectful.";

/// Environment variable that overrides the configured API key
pub const API_KEY_ENV: &str = "GRIOT_API_KEY";

/// Where a context entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextOrigin {
    Retrieval,
    Reasoning,
    Enrichment,
}

impl ContextOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextOrigin::Retrieval => "knowledge_base",
            ContextOrigin::Reasoning => "reasoning",
            ContextOrigin::Enrichment => "enrichment",
        }
    }
}

/// One grounded-context entry handed to the generation backend
#[derive(Debug, Clone, Serialize)]
pub struct ContextEntry {
    /// Record category tag ("festival", "artifact", "web", ...)
    pub kind: String,
    pub name: String,
    pub text: String,
    pub culture: Option<String>,
    pub score: f64,
    pub origin: ContextOrigin,
    /// Identity for de-duplication: (kind, name-or-text)
    pub dedup_key: (String, String),
}

impl ContextEntry {
    pub fn new(
        kind: impl Into<String>,
        name: impl Into<String>,
        text: impl Into<String>,
        origin: ContextOrigin,
        score: f64,
    ) -> Self {
        let kind = kind.into();
        let name = name.into();
        let dedup_key = (kind.clone(), name.to_lowercase());
        Self {
            kind,
            name,
            text: text.into(),
            culture: None,
            score,
            origin,
            dedup_key,
        }
    }

    pub fn with_culture(mut self, culture: impl Into<String>) -> Self {
        self.culture = Some(culture.into());
        self
    }

    pub fn with_dedup_key(mut self, key: (String, String)) -> Self {
        self.dedup_key = key;
        self
    }
}

/// Render context entries as the numbered listing the backend is prompted with
pub fn format_context(entries: &[ContextEntry]) -> String {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let mut line = format!(
                "{}. [{}] {}: {}",
                i + 1,
                entry.kind.to_uppercase(),
                entry.name,
                entry.text
            );
            if let Some(culture) = &entry.culture {
                line.push_str(&format!(" (Culture: {})", culture));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Generation backend errors
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("generation backend not configured")]
    NotConfigured,

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected reply shape: {0}")]
    Parse(String),
}

/// Text-generation call: given a prompt and grounded context, return text
/// or fail. Failures are handled by the caller's fallback path.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        context: &[ContextEntry],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, GenerationError>;

    /// Whether the backend has credentials and can be called at all
    fn is_configured(&self) -> bool {
        true
    }
}

/// OpenAI-compatible chat-completions client
pub struct CloudGenerationClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl CloudGenerationClient {
    pub fn from_config(cfg: &GenerationConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| cfg.api_key.clone());

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl GenerationClient for CloudGenerationClient {
    async fn generate(
        &self,
        prompt: &str,
        context: &[ContextEntry],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, GenerationError> {
        let api_key = self.api_key.as_ref().ok_or(GenerationError::NotConfigured)?;

        let user_message = if context.is_empty() {
            prompt.to_string()
        } else {
            format!(
                "Context:\n{}\n\nQuestion: {}",
                format_context(context),
                prompt
            )
        };

        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": GROUNDED_SYSTEM_PROMPT},
                {"role": "user", "content": user_message},
            ],
            "temperature": temperature,
            "max_tokens": max_tokens,
        });

        debug!("Generation request: model={} ctx={}", self.model, context.len());

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GenerationError::Network(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let reply: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GenerationError::Parse(e.to_string()))?;

        reply["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| GenerationError::Parse("missing choices[0].message.content".into()))
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Deterministic generation client for tests
///
/// Replies are served from a FIFO queue, then from a default reply. A fake
/// can also be configured to fail every call or report itself unconfigured.
pub struct FakeGenerationClient {
    replies: Mutex<VecDeque<String>>,
    default_reply: String,
    fail: bool,
    configured: bool,
    prompts: Mutex<Vec<String>>,
}

impl FakeGenerationClient {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            default_reply: "This answer is grounded in the supplied context.".to_string(),
            fail: false,
            configured: true,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Queue a reply; queued replies are consumed in order before the default
    pub fn push_reply(self, reply: impl Into<String>) -> Self {
        self.replies.lock().unwrap().push_back(reply.into());
        self
    }

    pub fn with_default_reply(mut self, reply: impl Into<String>) -> Self {
        self.default_reply = reply.into();
        self
    }

    /// Every call returns a network error
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Backend reports itself unavailable
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

impl Default for FakeGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationClient for FakeGenerationClient {
    async fn generate(
        &self,
        prompt: &str,
        _context: &[ContextEntry],
        _temperature: f32,
        _max_tokens: u32,
    ) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if !self.configured {
            return Err(GenerationError::NotConfigured);
        }
        if self.fail {
            return Err(GenerationError::Network("connection refused".to_string()));
        }
        let queued = self.replies.lock().unwrap().pop_front();
        Ok(queued.unwrap_or_else(|| self.default_reply.clone()))
    }

    fn is_configured(&self) -> bool {
        self.configured
    }
}
