use crate::config::RetrievalConfig;
use crate::index::EvidenceIndex;
use crate::llm::TextGenerator;
use crate::models::{
    AnalysisLog, AnalysisStep, CheckReport, CheckRequest, CheckResult, Recommendation,
    RetrievalDebug, ScoredHit, SlotName, UsageTotals, ViolationDetail,
};
use crate::planner::QueryPlanner;
use crate::ranking::{merge_slots, RankConfig};
use crate::retriever::SlotRetriever;
use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

pub mod prompts;
pub mod verdict;

pub use verdict::{evaluate as evaluate_verdict, Verdict, VerdictSignals};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Retrieve,
    Analyze,
    Recommend,
    Done,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Retrieve => "retrieve",
            Stage::Analyze => "analyze",
            Stage::Recommend => "recommend",
            Stage::Done => "done",
        };
        write!(f, "{}", name)
    }
}

/// Output of the retrieve stage. Each stage consumes the previous stage's
/// state by value and produces the next one, so there is no aliasing and
/// no stage can run twice on the same request.
struct Retrieved {
    input_text: String,
    evidence: Vec<ScoredHit>,
    debug: RetrievalDebug,
    usage: UsageTotals,
    steps: Vec<AnalysisStep>,
}

/// Output of the analyze stage.
struct Analyzed {
    input_text: String,
    debug: RetrievalDebug,
    usage: UsageTotals,
    steps: Vec<AnalysisStep>,
    analysis: String,
}

/// The fixed three-stage compliance pipeline. All collaborators are
/// injected; the workflow owns no ambient state and one instance can serve
/// concurrent requests.
pub struct CheckWorkflow {
    index: Arc<dyn EvidenceIndex>,
    generator: Arc<dyn TextGenerator>,
    retrieval: RetrievalConfig,
}

impl CheckWorkflow {
    pub fn new(
        index: Arc<dyn EvidenceIndex>,
        generator: Arc<dyn TextGenerator>,
        retrieval: RetrievalConfig,
    ) -> Self {
        Self {
            index,
            generator,
            retrieval,
        }
    }

    pub async fn run(&self, request: &CheckRequest) -> Result<CheckReport> {
        let started = Instant::now();
        let retrieved = self.retrieve(request).await?;
        let analyzed = self.analyze(retrieved).await?;
        let report = self.recommend(analyzed, started).await?;
        tracing::info!(stage = %Stage::Done, compliant = report.result.compliant, "pipeline complete");
        Ok(report)
    }

    async fn retrieve(&self, request: &CheckRequest) -> Result<Retrieved> {
        tracing::info!(stage = %Stage::Retrieve, "stage start");
        let input_text = request.content.data.clone();
        let mut usage = UsageTotals::default();

        let planner = QueryPlanner::new(self.generator.clone());
        let plan = planner.plan(&input_text).await?;
        usage.add(plan.usage.input_tokens, plan.usage.output_tokens);

        let retriever = SlotRetriever::new(self.index.clone(), self.retrieval.slot_top_k);
        let slot_hits = retriever.retrieve(&plan.queries).await?;

        let rank_config = RankConfig {
            per_slot_quota: self.retrieval.per_slot_quota,
            ..RankConfig::default()
        };
        let evidence = merge_slots(&slot_hits, &rank_config);

        let debug = RetrievalDebug {
            generated_queries: SlotName::ORDER
                .iter()
                .map(|s| (s.to_string(), plan.queries.get(*s).to_string()))
                .collect(),
            fallback_queries_used: plan.fallback_used,
            retrieved_doc_count: evidence.len(),
            retrieved_doc_titles: evidence
                .iter()
                .map(|h| format!("{} - {}", h.metadata.title, h.metadata.section))
                .collect(),
        };
        tracing::info!(evidence = evidence.len(), fallback = plan.fallback_used, "retrieval merged");

        let steps = vec![AnalysisStep {
            step: Stage::Retrieve.to_string(),
            input: input_text.clone(),
            output: format!("{} evidence documents", evidence.len()),
            tool_used: "evidence-index".to_string(),
        }];

        Ok(Retrieved {
            input_text,
            evidence,
            debug,
            usage,
            steps,
        })
    }

    async fn analyze(&self, state: Retrieved) -> Result<Analyzed> {
        tracing::info!(stage = %Stage::Analyze, "stage start");
        let Retrieved {
            input_text,
            evidence,
            debug,
            mut usage,
            mut steps,
        } = state;

        let docs_context = build_docs_context(&evidence);
        let user = prompts::ANALYSIS_USER_TEMPLATE
            .replace("{input_text}", &input_text)
            .replace("{docs_context}", &docs_context);
        let messages = vec![
            json!({"role": "system", "content": prompts::ANALYSIS_SYSTEM_PROMPT}),
            json!({"role": "user", "content": user}),
        ];

        let generation = self.generator.generate(messages).await?;
        usage.add(generation.usage.input_tokens, generation.usage.output_tokens);
        steps.push(AnalysisStep {
            step: Stage::Analyze.to_string(),
            input: input_text.clone(),
            output: "IRAC analysis produced".to_string(),
            tool_used: self.generator.name().to_string(),
        });

        Ok(Analyzed {
            input_text,
            debug,
            usage,
            steps,
            analysis: generation.text,
        })
    }

    async fn recommend(&self, state: Analyzed, started: Instant) -> Result<CheckReport> {
        tracing::info!(stage = %Stage::Recommend, "stage start");
        let Analyzed {
            input_text,
            debug,
            mut usage,
            mut steps,
            analysis,
        } = state;

        let user = prompts::RECOMMEND_USER_TEMPLATE
            .replace("{input_text}", &input_text)
            .replace("{analysis_result}", &analysis);
        let messages = vec![
            json!({"role": "system", "content": prompts::RECOMMEND_SYSTEM_PROMPT}),
            json!({"role": "user", "content": user}),
        ];

        let generation = self.generator.generate(messages).await?;
        usage.add(generation.usage.input_tokens, generation.usage.output_tokens);
        steps.push(AnalysisStep {
            step: Stage::Recommend.to_string(),
            input: input_text.clone(),
            output: "alternative phrasings produced".to_string(),
            tool_used: self.generator.name().to_string(),
        });

        let combined = format!("{}\n{}", analysis, generation.text);
        let verdict = verdict::evaluate(&input_text, &combined);

        let violations = vec![ViolationDetail {
            law: "景品表示法 / 薬機法".to_string(),
            violation_section: "AI分析".to_string(),
            details: analysis,
            severity: if verdict.compliant { "low" } else { "high" }.to_string(),
            evidence: debug.retrieved_doc_titles.clone(),
        }];
        let recommendations = parse_recommendations(&input_text, &generation.text);

        Ok(CheckReport {
            status: "success".to_string(),
            result: CheckResult {
                compliant: verdict.compliant,
                confidence_score: verdict.confidence,
                violations,
                recommendations,
                analysis_log: AnalysisLog {
                    steps,
                    retrieval_debug: debug,
                },
            },
            usage,
            processing_time_ms: started.elapsed().as_millis() as u64,
        })
    }
}

/// Evidence context for the analyze stage: every hit under a title/section
/// header, full article text included.
fn build_docs_context(evidence: &[ScoredHit]) -> String {
    let mut context = String::new();
    for (i, hit) in evidence.iter().enumerate() {
        context.push_str(&format!(
            "Document {} ({} {}):\n{}\n\n",
            i + 1,
            hit.metadata.title,
            hit.metadata.section,
            hit.content
        ));
    }
    context
}

static NUMBERED_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d+\s*[.．、)）]\s*(.+)$").expect("numbered line pattern"));

/// Pulls the numbered proposals out of the recommendation text. Lines look
/// like `1. 提案表現1: [表現] - [理由]`; anything unparseable falls back to
/// one entry carrying the raw text.
fn parse_recommendations(original_text: &str, text: &str) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();
    for line in text.lines() {
        let Some(captures) = NUMBERED_LINE.captures(line) else {
            continue;
        };
        let rest = captures.get(1).map_or("", |m| m.as_str());
        let (proposal, reason) = match rest.split_once(" - ") {
            Some((p, r)) => (p.trim(), r.trim()),
            None => (rest.trim(), ""),
        };
        let proposal = proposal
            .split_once(':')
            .or_else(|| proposal.split_once('：'))
            .map(|(label, value)| {
                if label.contains("提案") || label.to_lowercase().contains("proposal") {
                    value.trim()
                } else {
                    proposal
                }
            })
            .unwrap_or(proposal);

        recommendations.push(Recommendation {
            original_text: original_text.to_string(),
            revised_text: proposal.to_string(),
            reason: reason.to_string(),
        });
    }

    if recommendations.is_empty() && !text.trim().is_empty() {
        recommendations.push(Recommendation {
            original_text: original_text.to_string(),
            revised_text: String::new(),
            reason: text.trim().to_string(),
        });
    }
    recommendations
}
