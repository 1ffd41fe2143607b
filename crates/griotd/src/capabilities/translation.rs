//! Translation capability over a fixed supported-language table.

use super::Capability;
use crate::llm::GenerationClient;
use async_trait::async_trait;
use griot_common::{AgentMessage, AgentResponse, TaskType};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

pub const CAPABILITY_ID: &str = "translator";

/// The 8 supported language codes and display names
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("fr", "French"),
    ("sw", "Swahili"),
    ("ha", "Hausa"),
    ("yo", "Yoruba"),
    ("ig", "Igbo"),
    ("zu", "Zulu"),
    ("am", "Amharic"),
];

/// Display name for a supported code
pub fn language_name(code: &str) -> Option<&'static str> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Crude marker-word heuristic; defaults to English
pub fn detect_language(text: &str) -> &'static str {
    const MARKERS: &[(&str, &[&str])] = &[
        ("fr", &["bonjour", "merci", "qu'est-ce", " le ", " la ", " est "]),
        ("sw", &["jambo", "asante", "habari", "karibu"]),
        ("ha", &["sannu", "nagode", "yaya"]),
        ("yo", &["bawo", "kaaro", "jowo"]),
        ("ig", &["kedu", "ndewo", "biko"]),
        ("zu", &["sawubona", "ngiyabonga", "yebo"]),
        ("am", &["selam", "amesegenallo"]),
    ];
    let lower = format!(" {} ", text.to_lowercase());
    for (code, markers) in MARKERS {
        if markers.iter().any(|m| lower.contains(m)) {
            return code;
        }
    }
    "en"
}

pub struct TranslationCapability {
    generation: Option<Arc<dyn GenerationClient>>,
}

impl TranslationCapability {
    pub fn new(generation: Option<Arc<dyn GenerationClient>>) -> Self {
        Self { generation }
    }

    pub async fn translate(&self, text: &str, source: &str, target: &str) -> AgentResponse {
        let Some(source_name) = language_name(source) else {
            return AgentResponse::error(
                self.id(),
                format!("unsupported language code: {}", source),
            );
        };
        let Some(target_name) = language_name(target) else {
            return AgentResponse::error(
                self.id(),
                format!("unsupported language code: {}", target),
            );
        };

        if source == target {
            return AgentResponse::ok(self.id(), text, 1.0)
                .with_meta("skipped", Value::Bool(true))
                .with_meta("language", Value::String(source.to_string()));
        }

        if let Some(generation) = &self.generation {
            let prompt = format!(
                "Translate the following text from {} to {}. \
                 Reply with the translation only.\n\n{}",
                source_name, target_name, text
            );
            match generation.generate(&prompt, &[], 0.3, 512).await {
                Ok(translated) => {
                    return AgentResponse::ok(self.id(), translated, 0.85)
                        .with_meta("source_lang", Value::String(source.to_string()))
                        .with_meta("target_lang", Value::String(target.to_string()));
                }
                Err(e) => warn!("Translation generation failed: {}", e),
            }
        }

        // No backend available: bracketed placeholder at reduced confidence
        AgentResponse::ok(self.id(), format!("[Translation unavailable: {}]", text), 0.3)
            .with_meta("target_lang", Value::String(target.to_string()))
    }
}

#[async_trait]
impl Capability for TranslationCapability {
    fn id(&self) -> &'static str {
        CAPABILITY_ID
    }

    async fn invoke(&self, message: AgentMessage) -> AgentResponse {
        debug_assert_eq!(message.task_type, TaskType::Translate);
        let source = message
            .context_str("source_lang")
            .map(str::to_string)
            .unwrap_or_else(|| detect_language(&message.text).to_string());
        let Some(target) = message.context_str("target_lang").map(str::to_string) else {
            return AgentResponse::error(self.id(), "missing target_lang in context");
        };
        self.translate(&message.text, &source, &target).await
    }
}
