use super::{chunk_id, classify, Chunker, SourceInfo};
use crate::models::{Chunk, ChunkMetadata, SourceType};
use anyhow::Result;

/// Chunks page-oriented text (PDF extraction output, one form feed between
/// pages) into one chunk per page. Pages below the minimum length are
/// dropped as extraction noise.
pub struct PageChunker {
    min_page_chars: usize,
}

impl PageChunker {
    pub fn new(min_page_chars: usize) -> Self {
        Self { min_page_chars }
    }
}

impl Chunker for PageChunker {
    fn chunk(&self, content: &str, source: &SourceInfo<'_>) -> Result<Vec<Chunk>> {
        let doc_title = source
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let law_group = classify::law_group_for_title(&doc_title);

        let mut chunks = Vec::new();
        for (page_no, page) in content.split('\u{000C}').enumerate() {
            let text = page.trim();
            if text.chars().count() < self.min_page_chars {
                continue;
            }
            let section = format!("p.{}", page_no + 1);
            let enriched = format!("{} {}\n{}", doc_title, section, text);

            chunks.push(Chunk {
                id: chunk_id(source.path, &enriched),
                content: enriched,
                metadata: ChunkMetadata {
                    title: doc_title.clone(),
                    category: source.category,
                    law_group,
                    section,
                    is_main_provision: false,
                    source_type: SourceType::Pdf,
                    path: source.path.to_path_buf(),
                },
            });
        }

        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LawCategory;
    use std::path::Path;

    fn source(path: &Path) -> SourceInfo<'_> {
        SourceInfo {
            path,
            category: LawCategory::Standard,
        }
    }

    #[test]
    fn one_chunk_per_page_with_numbering() {
        let long_a = "広告表現の適正化に関する運用基準。".repeat(5);
        let long_b = "医薬品等の広告に該当するか否かの判断基準。".repeat(5);
        let text = format!("{}\u{000C}{}", long_a, long_b);
        let path = Path::new("04_standards/kijun.txt");

        let chunks = PageChunker::new(50).chunk(&text, &source(path)).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].metadata.section, "p.1");
        assert_eq!(chunks[1].metadata.section, "p.2");
    }

    #[test]
    fn short_pages_are_dropped_as_noise() {
        let long = "本文のじゅうぶんに長いページ内容がここに続いています。".repeat(3);
        let text = format!("{}\u{000C}ノイズ\u{000C}  \u{000C}{}", long, long);
        let path = Path::new("04_standards/kijun.txt");

        let chunks = PageChunker::new(50).chunk(&text, &source(path)).unwrap();
        // Pages 2 and 3 fall below the threshold; page numbering still
        // reflects the original positions.
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].metadata.section, "p.1");
        assert_eq!(chunks[1].metadata.section, "p.4");
    }
}
