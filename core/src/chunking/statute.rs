use super::{chunk_id, classify, Chunker, SourceInfo};
use crate::models::{Chunk, ChunkMetadata, SourceType};
use anyhow::{anyhow, Result};
use quick_xml::events::Event;
use quick_xml::Reader;

/// Splits statute XML into one chunk per article. Articles are taken from
/// both the main provisions and the supplementary provisions, tagged so the
/// retrieval filters can tell them apart.
pub struct StatuteChunker;

#[derive(Debug, Default)]
struct RawArticle {
    title: String,
    caption: String,
    body: String,
    is_main: bool,
}

impl Chunker for StatuteChunker {
    fn chunk(&self, content: &str, source: &SourceInfo<'_>) -> Result<Vec<Chunk>> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<String> = Vec::new();
        let mut law_title = String::new();
        let mut current: Option<RawArticle> = None;
        let mut articles: Vec<RawArticle> = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    if name == "Article" {
                        let in_suppl = stack.iter().any(|t| t == "SupplProvision");
                        current = Some(RawArticle {
                            is_main: !in_suppl,
                            ..Default::default()
                        });
                    }
                    stack.push(name);
                }
                Ok(Event::End(e)) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    if name == "Article" {
                        if let Some(article) = current.take() {
                            articles.push(article);
                        }
                    }
                    stack.pop();
                }
                Ok(Event::Text(t)) => {
                    let text = t.unescape()?;
                    let text = text.trim();
                    if text.is_empty() {
                        continue;
                    }
                    match stack.last().map(String::as_str) {
                        Some("LawTitle") => law_title.push_str(text),
                        Some("ArticleTitle") => {
                            if let Some(article) = current.as_mut() {
                                article.title.push_str(text);
                            }
                        }
                        Some("ArticleCaption") => {
                            if let Some(article) = current.as_mut() {
                                article.caption.push_str(text);
                            }
                        }
                        Some("ParagraphNum") => {
                            if let Some(article) = current.as_mut() {
                                article.body.push_str(text);
                                article.body.push(' ');
                            }
                        }
                        Some("ItemTitle") => {
                            if let Some(article) = current.as_mut() {
                                article.body.push_str("  ");
                                article.body.push_str(text);
                                article.body.push(' ');
                            }
                        }
                        Some("Sentence") => {
                            if let Some(article) = current.as_mut() {
                                article.body.push_str(text);
                                article.body.push('\n');
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(anyhow!(
                        "XML parse error at byte {}: {}",
                        reader.buffer_position(),
                        e
                    ))
                }
                _ => {}
            }
        }

        if law_title.is_empty() {
            law_title = source
                .path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
        }

        let law_group = classify::law_group_for_title(&law_title);
        let mut chunks = Vec::new();
        for article in articles {
            let body = article.body.trim();
            if body.is_empty() {
                continue;
            }
            let section = article.title.trim().to_string();
            // Embedding-friendly prefix: law title and section label ahead
            // of the article text itself.
            let header = format!("{} {} {}", law_title, section, article.caption.trim());
            let content = format!("{}\n{}", header.trim_end(), body);

            chunks.push(Chunk {
                id: chunk_id(source.path, &content),
                metadata: ChunkMetadata {
                    title: law_title.clone(),
                    category: source.category,
                    law_group,
                    section,
                    is_main_provision: article.is_main,
                    source_type: SourceType::StructuredLaw,
                    path: source.path.to_path_buf(),
                },
                content,
            });
        }

        Ok(chunks)
    }
}
