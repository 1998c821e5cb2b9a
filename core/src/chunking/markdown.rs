use super::{chunk_id, classify, Chunker, SourceInfo};
use crate::models::{Chunk, ChunkMetadata, SourceType};
use anyhow::Result;

/// Splits freeform markdown on top-level heading boundaries. Each block,
/// heading included, becomes one chunk; blocks that are empty after
/// trimming are dropped.
pub struct MarkdownChunker;

impl Chunker for MarkdownChunker {
    fn chunk(&self, content: &str, source: &SourceInfo<'_>) -> Result<Vec<Chunk>> {
        let doc_title = source
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let law_group = classify::law_group_for_title(&doc_title);

        let mut blocks: Vec<Vec<&str>> = Vec::new();
        for line in content.lines() {
            let starts_block = line.starts_with("# ") || blocks.is_empty();
            if starts_block {
                blocks.push(Vec::new());
            }
            if let Some(block) = blocks.last_mut() {
                block.push(line);
            }
        }

        let mut chunks = Vec::new();
        for block in blocks {
            let text = block.join("\n");
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            let heading = block
                .first()
                .and_then(|l| l.strip_prefix("# "))
                .map(str::trim)
                .unwrap_or("")
                .to_string();

            chunks.push(Chunk {
                id: chunk_id(source.path, text),
                content: text.to_string(),
                metadata: ChunkMetadata {
                    title: doc_title.clone(),
                    category: source.category,
                    law_group,
                    section: heading,
                    is_main_provision: false,
                    source_type: SourceType::Markdown,
                    path: source.path.to_path_buf(),
                },
            });
        }

        Ok(chunks)
    }
}
