use super::{EvidenceIndex, MetadataFilter};
use crate::embeddings::Embedder;
use crate::models::{Chunk, ChunkMetadata, RawHit};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

const EMBED_BATCH_SIZE: usize = 64;

struct Row {
    content: String,
    metadata: ChunkMetadata,
    embedding: Vec<f32>,
}

/// In-process nearest-neighbor store. Rows live behind a snapshot handle:
/// `rebuild` assembles the full replacement collection first and swaps the
/// handle in one step, so concurrent queries read either the old or the new
/// collection in its entirety.
pub struct VectorIndex {
    embedder: Arc<dyn Embedder + Send + Sync>,
    rows: RwLock<Arc<Vec<Row>>>,
}

impl VectorIndex {
    pub fn new(embedder: Arc<dyn Embedder + Send + Sync>) -> Self {
        Self {
            embedder,
            rows: RwLock::new(Arc::new(Vec::new())),
        }
    }
}

#[async_trait]
impl EvidenceIndex for VectorIndex {
    async fn rebuild(&self, chunks: Vec<Chunk>) -> Result<()> {
        let mut rows = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(EMBED_BATCH_SIZE) {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let embeddings = self.embedder.embed(&texts)?;
            for (chunk, embedding) in batch.iter().zip(embeddings) {
                rows.push(Row {
                    content: chunk.content.clone(),
                    metadata: chunk.metadata.clone(),
                    embedding,
                });
            }
            tracing::debug!(indexed = rows.len(), "embedding batch complete");
        }

        *self.rows.write().await = Arc::new(rows);
        Ok(())
    }

    async fn query(&self, text: &str, top_k: usize, filter: &MetadataFilter) -> Result<Vec<RawHit>> {
        let snapshot = self.rows.read().await.clone();
        if snapshot.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self
            .embedder
            .embed(&[text.to_string()])?
            .pop()
            .unwrap_or_default();

        let mut hits: Vec<RawHit> = snapshot
            .iter()
            .filter(|row| filter.matches(&row.metadata))
            .map(|row| RawHit {
                content: row.content.clone(),
                metadata: row.metadata.clone(),
                similarity: cosine_similarity(&query_embedding, &row.embedding),
            })
            .collect();

        hits.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(top_k);

        tracing::debug!(query = text, hits = hits.len(), "vector query");
        Ok(hits)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.rows.read().await.len())
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
