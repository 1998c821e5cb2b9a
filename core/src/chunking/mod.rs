use crate::config::IndexConfig;
use crate::models::{Chunk, LawCategory};
use crate::scanner::{scan_docs, ScannedDocument};
use anyhow::Result;
use sha2::{Digest, Sha256};
use std::path::Path;

pub mod classify;
pub mod markdown;
pub mod pages;
pub mod statute;

pub use markdown::MarkdownChunker;
pub use pages::PageChunker;
pub use statute::StatuteChunker;

/// Everything a chunker needs to know about the document it is splitting,
/// beyond the text itself.
#[derive(Debug, Clone)]
pub struct SourceInfo<'a> {
    pub path: &'a Path,
    pub category: LawCategory,
}

pub trait Chunker {
    fn chunk(&self, content: &str, source: &SourceInfo<'_>) -> Result<Vec<Chunk>>;
}

/// Stable chunk id: first 16 hex chars of SHA-256 over path and content.
pub fn chunk_id(path: &Path, content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    hasher.update(content.as_bytes());
    let hash = hex::encode(hasher.finalize());
    hash[..16].to_string()
}

pub fn chunk_document(
    doc: &ScannedDocument,
    content: &str,
    config: &IndexConfig,
) -> Result<Vec<Chunk>> {
    let source = SourceInfo {
        path: &doc.path,
        category: doc.category,
    };
    match doc.source_type {
        crate::models::SourceType::StructuredLaw => StatuteChunker.chunk(content, &source),
        crate::models::SourceType::Markdown => MarkdownChunker.chunk(content, &source),
        crate::models::SourceType::Pdf => {
            PageChunker::new(config.min_page_chars).chunk(content, &source)
        }
    }
}

/// Chunks every document under the configured docs tree. A malformed
/// document never aborts the batch: it is logged and skipped.
pub fn build_corpus(config: &IndexConfig) -> Result<Vec<Chunk>> {
    let docs = scan_docs(&config.docs_dir);
    tracing::info!(count = docs.len(), root = %config.docs_dir.display(), "scanning source documents");

    let mut chunks = Vec::new();
    for doc in &docs {
        let content = match std::fs::read(&doc.path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(err) => {
                tracing::warn!(path = %doc.path.display(), error = %err, "failed to read document, skipping");
                continue;
            }
        };
        match chunk_document(doc, &content, config) {
            Ok(mut doc_chunks) => {
                tracing::debug!(path = %doc.path.display(), chunks = doc_chunks.len(), "chunked document");
                chunks.append(&mut doc_chunks);
            }
            Err(err) => {
                tracing::warn!(path = %doc.path.display(), error = %err, "failed to chunk document, skipping");
            }
        }
    }

    tracing::info!(total = chunks.len(), "corpus built");
    Ok(chunks)
}
