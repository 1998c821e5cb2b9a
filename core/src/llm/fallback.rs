use super::{Generation, TextGenerator};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Tries the primary provider and, on any provider-level failure, retries
/// once against the secondary. With no secondary configured the original
/// error propagates and the request fails; no partial result is returned.
pub struct FallbackGenerator {
    primary: Arc<dyn TextGenerator>,
    secondary: Option<Arc<dyn TextGenerator>>,
}

impl FallbackGenerator {
    pub fn new(primary: Arc<dyn TextGenerator>, secondary: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait]
impl TextGenerator for FallbackGenerator {
    fn name(&self) -> &str {
        self.primary.name()
    }

    async fn generate(&self, messages: Vec<serde_json::Value>) -> Result<Generation> {
        match self.primary.generate(messages.clone()).await {
            Ok(generation) => Ok(generation),
            Err(err) => match &self.secondary {
                Some(secondary) => {
                    tracing::warn!(
                        primary = self.primary.name(),
                        secondary = secondary.name(),
                        error = %err,
                        "primary provider failed, switching to secondary"
                    );
                    secondary.generate(messages).await
                }
                None => Err(err),
            },
        }
    }
}
