//! Configuration management for griotd.
//!
//! Loads settings from /etc/griot/config.toml or uses defaults. Heuristic
//! constants (per-type reasoning confidences, planner complexity limit)
//! are kept here as tunable defaults rather than hard-coded.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::{info, warn};

/// Config file path
pub const CONFIG_PATH: &str = "/etc/griot/config.toml";

/// Fallback config file path
pub const FALLBACK_CONFIG_PATH: &str = "/var/lib/griot/config.toml";

/// Text-generation backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// OpenAI-compatible API base URL
    #[serde(default = "default_generation_base_url")]
    pub base_url: String,

    /// Chat model identifier
    #[serde(default = "default_generation_model")]
    pub model: String,

    /// API key; the GRIOT_API_KEY environment variable takes precedence
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_generation_timeout")]
    pub request_timeout_secs: u64,

    /// Completion token cap
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_generation_base_url() -> String {
    "https://inference.asicloud.cudos.org/v1".to_string()
}

fn default_generation_model() -> String {
    "qwen/qwen3-32b".to_string()
}

fn default_generation_timeout() -> u64 {
    30
}

fn default_max_tokens() -> u32 {
    512
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_generation_base_url(),
            model: default_generation_model(),
            api_key: None,
            request_timeout_secs: default_generation_timeout(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Wikipedia enrichment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// MediaWiki API endpoint
    #[serde(default = "default_enrichment_api_url")]
    pub api_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_enrichment_timeout")]
    pub request_timeout_secs: u64,

    /// Summary extract cap in characters
    #[serde(default = "default_summary_max_chars")]
    pub summary_max_chars: usize,
}

fn default_enrichment_api_url() -> String {
    "https://en.wikipedia.org/w/api.php".to_string()
}

fn default_enrichment_timeout() -> u64 {
    10
}

fn default_summary_max_chars() -> usize {
    500
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            api_url: default_enrichment_api_url(),
            request_timeout_secs: default_enrichment_timeout(),
            summary_max_chars: default_summary_max_chars(),
        }
    }
}

/// Reasoning engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningConfig {
    /// Confidence assigned to proverb matches
    #[serde(default = "default_proverb_confidence")]
    pub proverb_confidence: f64,

    /// Confidence assigned to every other record type
    #[serde(default = "default_item_confidence")]
    pub item_confidence: f64,

    /// Bounded query-cache capacity
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

fn default_proverb_confidence() -> f64 {
    0.85
}

fn default_item_confidence() -> f64 {
    0.9
}

fn default_cache_capacity() -> usize {
    256
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            proverb_confidence: default_proverb_confidence(),
            item_confidence: default_item_confidence(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

/// Orchestrator and pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Queries longer than this many words force research + verification
    #[serde(default = "default_complex_word_limit")]
    pub complex_word_limit: usize,

    /// Candidate count kept by the semantic filter
    #[serde(default = "default_retrieval_top_k")]
    pub retrieval_top_k: usize,

    /// Optional JSON dataset replacing the builtin records
    #[serde(default)]
    pub dataset_path: Option<String>,
}

fn default_complex_word_limit() -> usize {
    15
}

fn default_retrieval_top_k() -> usize {
    3
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            complex_word_limit: default_complex_word_limit(),
            retrieval_top_k: default_retrieval_top_k(),
            dataset_path: None,
        }
    }
}

/// Full daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    #[serde(default)]
    pub reasoning: ReasoningConfig,

    #[serde(default)]
    pub engine: EngineConfig,
}

impl Config {
    /// Load config from file, or return defaults
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_PATH)
            .or_else(|_| Self::load_from_path(FALLBACK_CONFIG_PATH))
            .unwrap_or_else(|e| {
                warn!("Config not found, using defaults: {}", e);
                Config::default()
            })
    }

    /// Load config from specific path
    pub fn load_from_path(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!("Loaded config from {}", path);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.generation.model, "qwen/qwen3-32b");
        assert_eq!(config.reasoning.proverb_confidence, 0.85);
        assert_eq!(config.reasoning.item_confidence, 0.9);
        assert_eq!(config.engine.complex_word_limit, 15);
        assert_eq!(config.engine.retrieval_top_k, 3);
    }

    #[test]
    fn test_parse_partial_toml() {
        let toml_str = r#"
[generation]
model = "custom-model"
request_timeout_secs = 5

[engine]
retrieval_top_k = 5
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.generation.model, "custom-model");
        assert_eq!(config.generation.request_timeout_secs, 5);
        assert_eq!(config.engine.retrieval_top_k, 5);
        // Defaults fill the gaps
        assert_eq!(config.engine.complex_word_limit, 15);
        assert_eq!(config.reasoning.cache_capacity, 256);
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[reasoning]\ncache_capacity = 16").unwrap();
        let config = Config::load_from_path(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.reasoning.cache_capacity, 16);
    }
}
