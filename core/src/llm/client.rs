use super::{Generation, TextGenerator, Usage};
use crate::config::ProviderConfig;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::json;
use std::env;

/// Chat-completions client for any OpenAI-compatible endpoint; both the
/// primary and the secondary provider are instances of this with different
/// base URLs and models.
pub struct LlmClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    api_url: String,
    provider: String,
}

impl LlmClient {
    pub fn new(base_url: &str, model: &str, api_key: String) -> Self {
        let endpoint = if base_url.ends_with("/chat/completions") {
            base_url.to_string()
        } else {
            format!("{}/chat/completions", base_url.trim_end_matches('/'))
        };

        Self {
            client: reqwest::Client::new(),
            api_key,
            model: model.to_string(),
            api_url: endpoint,
            provider: model.to_string(),
        }
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let api_key = match &config.api_key_env {
            Some(var) => env::var(var)
                .map_err(|_| anyhow!("{} environment variable not set", var))?,
            // Local endpoints (Ollama-style) take any key.
            None => "dummy".to_string(),
        };

        Ok(Self::new(&config.base_url, &config.model, api_key))
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    fn name(&self) -> &str {
        &self.provider
    }

    async fn generate(&self, messages: Vec<serde_json::Value>) -> Result<Generation> {
        let res = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": self.model,
                "messages": messages,
                "temperature": 0.0 // Deterministic for legal analysis
            }))
            .send()
            .await?
            .json::<serde_json::Value>()
            .await?;

        let choices = res
            .get("choices")
            .ok_or_else(|| anyhow!("Invalid response from {}: {:?}", self.provider, res))?;
        let choice = choices
            .get(0)
            .ok_or_else(|| anyhow!("No choices in response"))?;
        let message = choice
            .get("message")
            .ok_or_else(|| anyhow!("No message in choice"))?;
        let content = message
            .get("content")
            .ok_or_else(|| anyhow!("No content in message"))?;

        let usage = res.get("usage").map_or(Usage::default(), |u| Usage {
            input_tokens: u.get("prompt_tokens").and_then(|v| v.as_u64()).unwrap_or(0),
            output_tokens: u
                .get("completion_tokens")
                .and_then(|v| v.as_u64())
                .unwrap_or(0),
        });

        Ok(Generation {
            text: content.as_str().unwrap_or_default().trim().to_string(),
            usage,
        })
    }
}
