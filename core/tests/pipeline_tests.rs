use anyhow::{anyhow, Result};
use async_trait::async_trait;
use legalcheck_core::chunking::chunk_id;
use legalcheck_core::config::RetrievalConfig;
use legalcheck_core::embeddings::HashedEmbedder;
use legalcheck_core::index::{EvidenceIndex, VectorIndex};
use legalcheck_core::llm::{FallbackGenerator, Generation, TextGenerator, Usage};
use legalcheck_core::models::{
    CheckRequest, Chunk, ChunkMetadata, LawCategory, LawGroup, SourceType,
};
use legalcheck_core::pipeline::CheckWorkflow;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

struct ScriptedGenerator {
    label: String,
    responses: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    fn new(label: &str, responses: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            label: label.to_string(),
            responses: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        &self.label
    }

    async fn generate(&self, _messages: Vec<serde_json::Value>) -> Result<Generation> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow!("script exhausted"))?;
        Ok(Generation {
            text: next,
            usage: Usage {
                input_tokens: 120,
                output_tokens: 40,
            },
        })
    }
}

struct FailingGenerator {
    calls: AtomicUsize,
}

impl FailingGenerator {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for FailingGenerator {
    fn name(&self) -> &str {
        "failing"
    }

    async fn generate(&self, _messages: Vec<serde_json::Value>) -> Result<Generation> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(anyhow!("provider quota exhausted"))
    }
}

fn chunk(
    content: &str,
    title: &str,
    category: LawCategory,
    group: LawGroup,
    section: &str,
    main: bool,
) -> Chunk {
    Chunk {
        id: chunk_id(Path::new("corpus.xml"), content),
        content: content.to_string(),
        metadata: ChunkMetadata {
            title: title.to_string(),
            category,
            law_group: group,
            section: section.to_string(),
            is_main_provision: main,
            source_type: SourceType::StructuredLaw,
            path: PathBuf::from("corpus.xml"),
        },
    }
}

fn sample_corpus() -> Vec<Chunk> {
    vec![
        chunk(
            "何人も、医薬品等の名称、製造方法、効能、効果又は性能に関して、虚偽又は誇大な記事を広告し、記述し、又は流布してはならない。",
            "医薬品、医療機器等の品質、有効性及び安全性の確保等に関する法律",
            LawCategory::Statute,
            LawGroup::Pharmaceutical,
            "第六十六条",
            true,
        ),
        chunk(
            "事業者は、自己の供給する商品の品質について、実際のものよりも著しく優良であると示す表示をしてはならない。",
            "不当景品類及び不当表示防止法",
            LawCategory::Statute,
            LawGroup::Advertising,
            "第五条",
            true,
        ),
        chunk(
            "医薬品等適正広告基準 効能効果等についての表現は承認の範囲を超えてはならない。",
            "医薬品等適正広告基準",
            LawCategory::Standard,
            LawGroup::Other,
            "基準3",
            false,
        ),
    ]
}

async fn populated_index() -> Arc<dyn EvidenceIndex> {
    let index: Arc<dyn EvidenceIndex> =
        Arc::new(VectorIndex::new(Arc::new(HashedEmbedder::default())));
    index.rebuild(sample_corpus()).await.unwrap();
    index
}

const PLAN_JSON: &str = r#"{"pharmaceutical_query": "薬機法 第六十六条 誇大広告 効能効果", "advertising_query": "景品表示法 第五条 優良誤認", "guideline_query": "医薬品等適正広告基準 効能効果の範囲"}"#;

#[tokio::test]
async fn risky_claim_is_flagged_with_statute_evidence() {
    let index = populated_index().await;
    let generator = ScriptedGenerator::new(
        "primary",
        &[
            PLAN_JSON,
            "Issue: 「病気が治る」という表現。Rule: 薬機法第66条の誇大広告禁止。Application: 効能を保証している。Conclusion: 違反のおそれが高い。",
            "1. 提案表現1: 健やかな毎日をサポート - 効能を断定しないため",
        ],
    );
    let workflow = CheckWorkflow::new(index, generator.clone(), RetrievalConfig::default());

    let request = CheckRequest::from_text("この薬を飲めば病気が治る！医師も推奨しています。");
    let report = workflow.run(&request).await.unwrap();

    assert_eq!(report.status, "success");
    assert!(!report.result.compliant);
    assert!(report.result.confidence_score >= 0.9);

    let debug = &report.result.analysis_log.retrieval_debug;
    assert!(debug.retrieved_doc_count > 0);
    assert!(debug
        .retrieved_doc_titles
        .iter()
        .any(|t| t.contains("第六十六条")));
    assert!(!debug.fallback_queries_used);

    assert_eq!(report.result.analysis_log.steps.len(), 3);
    assert_eq!(report.usage.calls, 3);
    assert_eq!(generator.calls(), 3);
    assert_eq!(report.result.recommendations.len(), 1);
    assert_eq!(
        report.result.recommendations[0].revised_text,
        "健やかな毎日をサポート"
    );
}

#[tokio::test]
async fn clean_input_passes_without_fallback() {
    let index = populated_index().await;
    let primary = ScriptedGenerator::new(
        "primary",
        &[
            PLAN_JSON,
            "Issue: 特になし。Rule: 該当条文なし。Application: 事実の範囲内の表現である。Conclusion: 適合。",
            "1. 提案表現1: このままで良い表現です - 効能等に触れていないため",
        ],
    );
    let secondary = ScriptedGenerator::new("secondary", &[]);
    let generator = Arc::new(FallbackGenerator::new(
        primary.clone(),
        Some(secondary.clone()),
    ));
    let workflow = CheckWorkflow::new(index, generator, RetrievalConfig::default());

    let request = CheckRequest::from_text("このお茶はおいしく、毎日の水分補給にぴったりです。");
    let report = workflow.run(&request).await.unwrap();

    assert!(report.result.compliant);
    assert_eq!(secondary.calls(), 0);
    assert_eq!(primary.calls(), 3);
    assert_eq!(report.result.analysis_log.steps.len(), 3);
    assert!(report.usage.output_tokens > 0);
}

#[tokio::test]
async fn malformed_planner_output_falls_back_to_templates() {
    let index = populated_index().await;
    let generator = ScriptedGenerator::new(
        "primary",
        &[
            "ごめんなさい、JSONは作れません。",
            "Conclusion: 違反のおそれ。",
            "1. 提案表現1: 穏当な表現 - 安全のため",
        ],
    );
    let workflow = CheckWorkflow::new(index, generator, RetrievalConfig::default());

    let request = CheckRequest::from_text("医薬品の効能に触れる広告コピー。");
    let report = workflow.run(&request).await.unwrap();

    let debug = &report.result.analysis_log.retrieval_debug;
    assert!(debug.fallback_queries_used);
    assert!(debug.retrieved_doc_count > 0);
    assert!(debug
        .generated_queries
        .iter()
        .any(|(slot, query)| slot == "pharmaceutical" && query.contains("薬機法")));
}

#[tokio::test]
async fn secondary_provider_rescues_primary_failure() {
    let index = populated_index().await;
    let primary = FailingGenerator::new();
    let secondary = ScriptedGenerator::new(
        "secondary",
        &[
            PLAN_JSON,
            "Conclusion: 適合。問題となる表現はない。",
            "1. 提案表現1: そのままで良い - 問題がないため",
        ],
    );
    let generator = Arc::new(FallbackGenerator::new(
        primary.clone(),
        Some(secondary.clone()),
    ));
    let workflow = CheckWorkflow::new(index, generator, RetrievalConfig::default());

    let request = CheckRequest::from_text("ただのお知らせ文です。");
    let report = workflow.run(&request).await.unwrap();

    assert!(report.result.compliant);
    assert_eq!(primary.calls(), 3);
    assert_eq!(secondary.calls(), 3);
}

#[tokio::test]
async fn request_fails_when_no_secondary_is_configured() {
    let index = populated_index().await;
    let primary = FailingGenerator::new();
    let generator = Arc::new(FallbackGenerator::new(primary.clone(), None));
    let workflow = CheckWorkflow::new(index, generator, RetrievalConfig::default());

    let request = CheckRequest::from_text("ただのお知らせ文です。");
    let result = workflow.run(&request).await;

    assert!(result.is_err());
    assert_eq!(primary.calls(), 1);
}

#[tokio::test]
async fn sparse_evidence_does_not_fail_the_pipeline() {
    let index: Arc<dyn EvidenceIndex> =
        Arc::new(VectorIndex::new(Arc::new(HashedEmbedder::default())));
    index.rebuild(Vec::new()).await.unwrap();

    let generator = ScriptedGenerator::new(
        "primary",
        &[
            PLAN_JSON,
            "Conclusion: 判断材料が乏しい。",
            "1. 提案表現1: 慎重な表現に - 念のため",
        ],
    );
    let workflow = CheckWorkflow::new(index, generator, RetrievalConfig::default());

    let request = CheckRequest::from_text("判定対象のテキスト。");
    let report = workflow.run(&request).await.unwrap();

    assert_eq!(report.result.analysis_log.retrieval_debug.retrieved_doc_count, 0);
    // No decisive signal anywhere: flagged by the conservative default.
    assert!(!report.result.compliant);
    assert!((report.result.confidence_score - 0.5).abs() < 1e-6);
}
