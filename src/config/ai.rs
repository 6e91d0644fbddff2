// src/config/ai.rs
use serde::Deserialize;
use std::env;

fn default_timeout_secs() -> u64 {
    30
}
fn default_description_chars() -> usize {
    500
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    #[serde(default)]
    pub enabled: bool,
    /// "gemini" | "openai" (case-insensitive)
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Empty means the provider's default model.
    #[serde(default)]
    pub model: String,
    /// "ENV" means: read from GEMINI_API_KEY / OPENAI_API_KEY (by provider)
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// How much of the job description goes into a prompt.
    #[serde(default = "default_description_chars")]
    pub description_chars: usize,
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_api_key() -> String {
    "ENV".to_string()
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_provider(),
            model: String::new(),
            api_key: default_api_key(),
            timeout_secs: default_timeout_secs(),
            description_chars: default_description_chars(),
        }
    }
}

impl AiConfig {
    pub fn provider_normalized(&self) -> String {
        self.provider.trim().to_lowercase()
    }

    /// Resolve the API key, honoring the "ENV" indirection.
    pub fn resolve_api_key(&self) -> anyhow::Result<String> {
        if !self.api_key.trim().eq_ignore_ascii_case("env") {
            return Ok(self.api_key.trim().to_string());
        }
        let var = match self.provider_normalized().as_str() {
            "gemini" => "GEMINI_API_KEY",
            "openai" => "OPENAI_API_KEY",
            other => anyhow::bail!("Unsupported provider in config: {other}"),
        };
        env::var(var).map_err(|_| anyhow::anyhow!("Missing {var} env var"))
    }
}
