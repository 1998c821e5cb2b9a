use crate::config::ProvidersConfig;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub mod client;
pub mod fallback;

pub use client::LlmClient;
pub use fallback::FallbackGenerator;

#[derive(Debug, Clone, Copy, Default)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[derive(Debug, Clone)]
pub struct Generation {
    pub text: String,
    pub usage: Usage,
}

/// One round-trip to a text-generation provider. Implementations must be
/// side-effect free on failure so a caller can retry against another
/// provider.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, messages: Vec<serde_json::Value>) -> Result<Generation>;
}

/// Wires up the configured primary provider, wrapped with the secondary as
/// fallback when one is configured and its key is present. A missing
/// secondary key downgrades to no-fallback rather than failing startup.
pub fn build_generator(config: &ProvidersConfig) -> Result<Arc<dyn TextGenerator>> {
    let primary: Arc<dyn TextGenerator> = Arc::new(LlmClient::from_config(&config.primary)?);

    let secondary: Option<Arc<dyn TextGenerator>> = match &config.secondary {
        Some(cfg) => match LlmClient::from_config(cfg) {
            Ok(client) => Some(Arc::new(client)),
            Err(err) => {
                tracing::warn!(error = %err, "secondary provider unavailable, continuing without fallback");
                None
            }
        },
        None => None,
    };

    Ok(Arc::new(FallbackGenerator::new(primary, secondary)))
}
