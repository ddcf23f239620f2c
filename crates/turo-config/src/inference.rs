use std::env;

use serde::{Deserialize, Serialize};

fn default_enabled() -> bool {
    true
}

fn default_model() -> String {
    "mistralai/Mixtral-8x7B-Instruct-v0.1".to_string()
}

fn default_api_url() -> String {
    "https://api-inference.huggingface.co/models".to_string()
}

fn default_max_new_tokens() -> u32 {
    100
}

fn default_temperature() -> f32 {
    0.5
}

fn default_top_p() -> f32 {
    0.7
}

fn default_timeout_seconds() -> u64 {
    30
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct InferenceConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    /// Defensive request timeout, not part of the streaming contract
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl InferenceConfig {
    pub fn new() -> Self {
        let api_key = env::var("HF_API_KEY").unwrap_or_default();

        let timeout_seconds = env::var("TURO_EXPLAIN_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_timeout_seconds);

        InferenceConfig {
            api_key,
            timeout_seconds,
            ..Self::default()
        }
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            model: default_model(),
            api_url: default_api_url(),
            api_key: String::new(),
            max_new_tokens: default_max_new_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}
