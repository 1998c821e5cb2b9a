use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum LawCategory {
    Statute,
    OkExample,
    NgExample,
    Standard,
    Unknown,
}

impl std::fmt::Display for LawCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LawCategory::Statute => "statute",
            LawCategory::OkExample => "ok-example",
            LawCategory::NgExample => "ng-example",
            LawCategory::Standard => "standard",
            LawCategory::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LawGroup {
    Pharmaceutical,
    Advertising,
    Other,
}

impl std::fmt::Display for LawGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LawGroup::Pharmaceutical => "pharmaceutical",
            LawGroup::Advertising => "advertising",
            LawGroup::Other => "other",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SourceType {
    StructuredLaw,
    Markdown,
    Pdf,
}

impl SourceType {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "xml" => Some(SourceType::StructuredLaw),
            "md" | "markdown" => Some(SourceType::Markdown),
            // PDF text arrives pre-extracted as form-feed separated pages.
            "txt" => Some(SourceType::Pdf),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkMetadata {
    pub title: String,
    pub category: LawCategory,
    pub law_group: LawGroup,
    pub section: String,
    pub is_main_provision: bool,
    pub source_type: SourceType,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub content: String,
    pub metadata: ChunkMetadata,
}

/// The fixed retrieval slots, in processing order. The order doubles as the
/// dedup tie-break: a hit kept by an earlier slot wins over the same content
/// surfacing in a later one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SlotName {
    Pharmaceutical,
    Advertising,
    Guideline,
}

impl SlotName {
    pub const ORDER: [SlotName; 3] = [
        SlotName::Pharmaceutical,
        SlotName::Advertising,
        SlotName::Guideline,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SlotName::Pharmaceutical => "pharmaceutical",
            SlotName::Advertising => "advertising",
            SlotName::Guideline => "guideline",
        }
    }
}

impl std::fmt::Display for SlotName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One generated search query per slot. This is also the strict output
/// contract for the query-generation call: exactly these keys, all
/// non-empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SlotQueries {
    pub pharmaceutical_query: String,
    pub advertising_query: String,
    pub guideline_query: String,
}

impl SlotQueries {
    pub fn get(&self, slot: SlotName) -> &str {
        match slot {
            SlotName::Pharmaceutical => &self.pharmaceutical_query,
            SlotName::Advertising => &self.advertising_query,
            SlotName::Guideline => &self.guideline_query,
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.pharmaceutical_query.trim().is_empty()
            && !self.advertising_query.trim().is_empty()
            && !self.guideline_query.trim().is_empty()
    }
}

/// A raw similarity hit as returned by the evidence index, best-first.
#[derive(Debug, Clone)]
pub struct RawHit {
    pub content: String,
    pub metadata: ChunkMetadata,
    pub similarity: f32,
}

/// An evidence candidate after re-ranking. `score` is the derived rank
/// score (decay base times boost factors), not the raw similarity.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredHit {
    pub content: String,
    pub metadata: ChunkMetadata,
    pub score: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentData {
    #[serde(rename = "type")]
    pub content_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckOptions {
    #[serde(default)]
    pub target_laws: Option<Vec<String>>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub product_specifications: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRequest {
    pub content: ContentData,
    #[serde(default)]
    pub options: Option<CheckOptions>,
}

impl CheckRequest {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            content: ContentData {
                content_type: "text".to_string(),
                data: text.into(),
            },
            options: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolationDetail {
    pub law: String,
    pub violation_section: String,
    pub details: String,
    pub severity: String,
    pub evidence: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub original_text: String,
    pub revised_text: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisStep {
    pub step: String,
    pub input: String,
    pub output: String,
    pub tool_used: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrievalDebug {
    pub generated_queries: Vec<(String, String)>,
    pub fallback_queries_used: bool,
    pub retrieved_doc_count: usize,
    pub retrieved_doc_titles: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisLog {
    pub steps: Vec<AnalysisStep>,
    pub retrieval_debug: RetrievalDebug,
}

/// Token accounting accumulated across every text-generation call in a
/// pipeline run. Observability only, never used for control flow.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct UsageTotals {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub calls: u32,
}

impl UsageTotals {
    pub fn add(&mut self, input_tokens: u64, output_tokens: u64) {
        self.input_tokens += input_tokens;
        self.output_tokens += output_tokens;
        self.calls += 1;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub compliant: bool,
    pub confidence_score: f32,
    pub violations: Vec<ViolationDetail>,
    pub recommendations: Vec<Recommendation>,
    pub analysis_log: AnalysisLog,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    pub status: String,
    pub result: CheckResult,
    pub usage: UsageTotals,
    pub processing_time_ms: u64,
}
