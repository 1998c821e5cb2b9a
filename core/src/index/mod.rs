use crate::config::IndexConfig;
use crate::models::{Chunk, ChunkMetadata, LawCategory, LawGroup, RawHit};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub mod vector;

pub use vector::VectorIndex;

/// Conjunction/negation predicate over chunk metadata, applied at query
/// time. `All(vec![])` matches everything.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataFilter {
    Category(LawCategory),
    Group(LawGroup),
    MainProvision(bool),
    Not(Box<MetadataFilter>),
    All(Vec<MetadataFilter>),
}

impl MetadataFilter {
    pub fn any() -> Self {
        MetadataFilter::All(Vec::new())
    }

    pub fn matches(&self, metadata: &ChunkMetadata) -> bool {
        match self {
            MetadataFilter::Category(c) => metadata.category == *c,
            MetadataFilter::Group(g) => metadata.law_group == *g,
            MetadataFilter::MainProvision(m) => metadata.is_main_provision == *m,
            MetadataFilter::Not(inner) => !inner.matches(metadata),
            MetadataFilter::All(filters) => filters.iter().all(|f| f.matches(metadata)),
        }
    }
}

/// The nearest-neighbor store the retrieval layer runs against. Rebuilds
/// replace the whole collection; readers never observe a half-swapped one.
#[async_trait]
pub trait EvidenceIndex: Send + Sync {
    async fn rebuild(&self, chunks: Vec<Chunk>) -> Result<()>;

    /// Up to `top_k` chunks most similar to `text`, best-first, restricted
    /// to chunks whose metadata satisfies `filter`.
    async fn query(&self, text: &str, top_k: usize, filter: &MetadataFilter) -> Result<Vec<RawHit>>;

    async fn count(&self) -> Result<usize>;
}

/// Populates the index from the docs tree unless it already holds chunks.
/// The skip is a cost guard and can preserve a stale collection, so it is
/// explicit and overridable via `force`.
pub async fn ensure_index(
    index: &Arc<dyn EvidenceIndex>,
    config: &IndexConfig,
    force: bool,
) -> Result<usize> {
    let existing = index.count().await?;
    if existing > 0 && !force {
        tracing::info!(count = existing, "index already populated, skipping rebuild");
        return Ok(existing);
    }

    let chunks = crate::chunking::build_corpus(config)?;
    let total = chunks.len();
    index.rebuild(chunks).await?;
    tracing::info!(count = total, "index rebuilt");
    Ok(total)
}
