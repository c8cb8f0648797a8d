//! Engine and service configuration

use serde::{Deserialize, Serialize};

/// Retrieval and answering knobs for a [`ChatEngine`](crate::chat::ChatEngine).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of documents handed to the answer prompt
    pub top_k: usize,
    /// Number of paraphrases requested per question
    pub reformulations: usize,
    /// Sampling temperature for paraphrase generation; answers always use 0.7
    pub reformulation_temperature: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            reformulations: 3,
            reformulation_temperature: 0.7,
        }
    }
}

/// Connection settings for an OpenAI-compatible chat completions service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    pub base_url: String,
    pub model: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Per-request timeout; the only timeout the engine has
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama3-70b-8192".to_string(),
            api_key: None,
            timeout_secs: 60,
        }
    }
}
