use anyhow::Result;
use clap::{Parser, Subcommand};
use legalcheck_core::chunking::build_corpus;
use legalcheck_core::config::Config;
use legalcheck_core::embeddings::build_embedder;
use legalcheck_core::index::{ensure_index, EvidenceIndex, MetadataFilter, VectorIndex};
use legalcheck_core::llm::build_generator;
use legalcheck_core::models::{CheckOptions, CheckRequest, LawCategory};
use legalcheck_core::pipeline::CheckWorkflow;
use legalcheck_core::scanner::scan_docs;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "legalcheck")]
#[command(about = "Legal compliance checker for marketing copy", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Chunk the source documents and build the evidence index
    Index {
        /// Docs directory (overrides config)
        #[arg(long)]
        docs: Option<PathBuf>,

        /// Rebuild even if the index is already populated
        #[arg(long)]
        full: bool,
    },
    /// Run a compliance check over a piece of text
    Check {
        /// The text to check
        text: String,

        /// Product category hint
        #[arg(long)]
        category: Option<String>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Query the evidence index directly (debugging aid)
    Search {
        /// The query string
        query: String,

        /// Number of results
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Restrict to statute main provisions
        #[arg(long)]
        statute: bool,
    },
    /// Show corpus and config summary
    Status {
        /// Docs directory (overrides config)
        #[arg(long)]
        docs: Option<PathBuf>,
    },
}

fn load_config(path: Option<&Path>, docs_override: Option<PathBuf>) -> Result<Config> {
    let mut config = Config::load_from(path)?;
    if let Some(docs) = docs_override {
        config.index.docs_dir = docs;
    }
    Ok(config)
}

pub async fn handle_index(
    config_path: Option<&Path>,
    docs: Option<PathBuf>,
    full: bool,
) -> Result<()> {
    let config = load_config(config_path, docs)?;

    let chunks = build_corpus(&config.index)?;
    let mut per_category: HashMap<LawCategory, usize> = HashMap::new();
    for chunk in &chunks {
        *per_category.entry(chunk.metadata.category).or_insert(0) += 1;
    }
    println!("Chunked {} units from {}", chunks.len(), config.index.docs_dir.display());
    let mut categories: Vec<_> = per_category.into_iter().collect();
    categories.sort_by_key(|(c, _)| c.to_string());
    for (category, count) in categories {
        println!("  {:12} {}", category.to_string(), count);
    }

    let embedder = build_embedder(&config.embeddings)?;
    let index: Arc<dyn EvidenceIndex> = Arc::new(VectorIndex::new(embedder));
    let existing = index.count().await?;
    if existing > 0 && !full {
        println!(
            "Index already holds {} chunks, skipping rebuild (use --full to force)",
            existing
        );
    } else {
        index.rebuild(chunks).await?;
        println!("Indexed {} chunks", index.count().await?);
    }

    Ok(())
}

pub async fn handle_search(
    config_path: Option<&Path>,
    query: String,
    top: usize,
    statute: bool,
) -> Result<()> {
    let config = load_config(config_path, None)?;

    let embedder = build_embedder(&config.embeddings)?;
    let index: Arc<dyn EvidenceIndex> = Arc::new(VectorIndex::new(embedder));
    ensure_index(&index, &config.index, false).await?;

    let filter = if statute {
        MetadataFilter::All(vec![
            MetadataFilter::Category(LawCategory::Statute),
            MetadataFilter::MainProvision(true),
        ])
    } else {
        MetadataFilter::any()
    };

    let hits = index.query(&query, top, &filter).await?;
    if hits.is_empty() {
        println!("No results.");
        return Ok(());
    }
    for (i, hit) in hits.iter().enumerate() {
        println!(
            "{:2}. [{:.3}] {} - {} ({})",
            i + 1,
            hit.similarity,
            hit.metadata.title,
            hit.metadata.section,
            hit.metadata.category
        );
    }

    Ok(())
}

pub async fn handle_check(
    config_path: Option<&Path>,
    text: String,
    category: Option<String>,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path, None)?;

    let embedder = build_embedder(&config.embeddings)?;
    let index: Arc<dyn EvidenceIndex> = Arc::new(VectorIndex::new(embedder));
    // The index lives in-process, so a check always starts by populating it.
    ensure_index(&index, &config.index, false).await?;

    let generator = build_generator(&config.providers)?;
    let workflow = CheckWorkflow::new(index, generator, config.retrieval.clone());

    let mut request = CheckRequest::from_text(text);
    if category.is_some() {
        request.options = Some(CheckOptions {
            category,
            ..CheckOptions::default()
        });
    }

    let report = workflow.run(&request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let result = &report.result;
        println!(
            "compliant: {} (confidence {:.2})",
            result.compliant, result.confidence_score
        );
        for violation in &result.violations {
            println!("\n[{}] {}", violation.severity, violation.law);
            println!("{}", violation.details);
        }
        if !result.recommendations.is_empty() {
            println!("\nRecommendations:");
            for (i, rec) in result.recommendations.iter().enumerate() {
                if rec.revised_text.is_empty() {
                    println!("  {}. {}", i + 1, rec.reason);
                } else {
                    println!("  {}. {} ({})", i + 1, rec.revised_text, rec.reason);
                }
            }
        }
        println!(
            "\n{} evidence documents, {} LLM calls, {} ms",
            result.analysis_log.retrieval_debug.retrieved_doc_count,
            report.usage.calls,
            report.processing_time_ms
        );
    }

    Ok(())
}

pub fn handle_status(config_path: Option<&Path>, docs: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path, docs)?;

    let documents = scan_docs(&config.index.docs_dir);
    println!("docs dir: {}", config.index.docs_dir.display());
    println!("documents: {}", documents.len());
    println!(
        "retrieval: top_k={} quota={}",
        config.retrieval.slot_top_k, config.retrieval.per_slot_quota
    );
    println!(
        "providers: primary={} secondary={}",
        config.providers.primary.model,
        config
            .providers
            .secondary
            .as_ref()
            .map(|p| p.model.as_str())
            .unwrap_or("none")
    );

    Ok(())
}
