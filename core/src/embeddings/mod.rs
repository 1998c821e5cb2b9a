use crate::config::{EmbeddingBackend, EmbeddingsConfig};
use anyhow::Result;
use std::sync::Arc;

pub trait Embedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

pub mod external;
pub mod hashed;
pub mod ollama;

pub use external::ExternalEmbedder;
pub use hashed::HashedEmbedder;
pub use ollama::OllamaEmbedder;

pub fn build_embedder(config: &EmbeddingsConfig) -> Result<Arc<dyn Embedder + Send + Sync>> {
    let model = Some(config.model_name.clone());
    let embedder: Arc<dyn Embedder + Send + Sync> = match config.backend {
        EmbeddingBackend::External => Arc::new(ExternalEmbedder::new(model)?),
        EmbeddingBackend::Ollama => {
            // Prefer the external service when a key is present, as the
            // config default cannot know the environment.
            if std::env::var("OPENAI_API_KEY").is_ok() {
                Arc::new(ExternalEmbedder::new(None)?)
            } else {
                Arc::new(OllamaEmbedder::new(model)?)
            }
        }
        EmbeddingBackend::Hashed => Arc::new(HashedEmbedder::default()),
    };
    Ok(embedder)
}
