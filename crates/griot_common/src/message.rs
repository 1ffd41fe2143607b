//! Message envelope exchanged between the orchestrator and capabilities.
//!
//! Every capability invocation receives an [`AgentMessage`] and returns an
//! [`AgentResponse`]. Capabilities never raise to their caller: failures are
//! converted into a zero-confidence response with an `error` metadata marker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Kind of work a message asks a capability to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// Answer a cultural-heritage question
    CulturalQuery,
    /// Fetch a Wikipedia summary for a topic
    WikipediaSearch,
    /// Cross-check a statement against gathered evidence
    Verify,
    /// Translate text between supported languages
    Translate,
    /// Free-form user query (routed by the planner)
    UserQuery,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::CulturalQuery => "cultural_query",
            TaskType::WikipediaSearch => "wikipedia_search",
            TaskType::Verify => "verify",
            TaskType::Translate => "translate",
            TaskType::UserQuery => "user_query",
        }
    }
}

/// A single capability invocation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentMessage {
    pub id: Uuid,
    /// Primary payload (query text, statement to verify, text to translate)
    pub text: String,
    /// Identifier of the component that created the message
    pub sender: String,
    pub task_type: TaskType,
    /// Open key-value bag with task-specific inputs
    #[serde(default)]
    pub context: Map<String, Value>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub created_at: DateTime<Utc>,
}

impl AgentMessage {
    pub fn new(text: impl Into<String>, sender: impl Into<String>, task_type: TaskType) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            sender: sender.into(),
            task_type,
            context: Map::new(),
            metadata: Map::new(),
            created_at: Utc::now(),
        }
    }

    /// Attach a context entry
    pub fn with_context(mut self, key: impl Into<String>, value: Value) -> Self {
        self.context.insert(key.into(), value);
        self
    }

    /// Replace the full context bag
    pub fn with_context_map(mut self, context: Map<String, Value>) -> Self {
        self.context = context;
        self
    }

    /// Look up a string context entry
    pub fn context_str(&self, key: &str) -> Option<&str> {
        self.context.get(key).and_then(Value::as_str)
    }
}

/// Provenance record for one source that contributed to an answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub name: String,
    /// Source category (e.g. "knowledge_base", "reasoning", "web")
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl SourceRef {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            score: None,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }
}

/// Result of a capability invocation
///
/// Invariant: `confidence` stays within `[0, 1]` and `text` is always
/// present, even for failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    pub text: String,
    /// Capability id that produced the response
    pub producer: String,
    pub confidence: f64,
    /// Ordered provenance list
    pub sources: Vec<SourceRef>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub created_at: DateTime<Utc>,
}

impl AgentResponse {
    pub fn ok(producer: impl Into<String>, text: impl Into<String>, confidence: f64) -> Self {
        Self {
            text: text.into(),
            producer: producer.into(),
            confidence: confidence.clamp(0.0, 1.0),
            sources: Vec::new(),
            metadata: Map::new(),
            created_at: Utc::now(),
        }
    }

    /// Build a failure response: confidence 0.0, `error` marker in metadata
    pub fn error(producer: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut metadata = Map::new();
        metadata.insert("error".to_string(), Value::String(message.clone()));
        Self {
            text: message,
            producer: producer.into(),
            confidence: 0.0,
            sources: Vec::new(),
            metadata,
            created_at: Utc::now(),
        }
    }

    pub fn with_sources(mut self, sources: Vec<SourceRef>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn is_error(&self) -> bool {
        self.metadata.contains_key("error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_response_is_zero_confidence() {
        let resp = AgentResponse::error("translator", "unsupported language code: xx");
        assert_eq!(resp.confidence, 0.0);
        assert!(resp.is_error());
        assert_eq!(
            resp.metadata.get("error").and_then(Value::as_str),
            Some("unsupported language code: xx")
        );
        assert!(!resp.text.is_empty());
    }

    #[test]
    fn ok_response_clamps_confidence() {
        let resp = AgentResponse::ok("heritage_keeper", "answer", 1.3);
        assert_eq!(resp.confidence, 1.0);
        assert!(!resp.is_error());
    }

    #[test]
    fn message_context_round_trip() {
        let msg = AgentMessage::new("What is Adire?", "orchestrator", TaskType::CulturalQuery)
            .with_context("language", Value::String("fr".to_string()));
        assert_eq!(msg.context_str("language"), Some("fr"));
        assert_eq!(msg.context_str("missing"), None);
        assert_eq!(msg.task_type.as_str(), "cultural_query");
    }

    #[test]
    fn source_ref_serializes_without_empty_score() {
        let source = SourceRef::new("Sango Festival", "knowledge_base");
        let json = serde_json::to_value(&source).unwrap();
        assert!(json.get("score").is_none());

        let scored = source.with_score(0.9);
        let json = serde_json::to_value(&scored).unwrap();
        assert_eq!(json.get("score").and_then(Value::as_f64), Some(0.9));
    }
}
