use crate::llm::{TextGenerator, Usage};
use crate::models::SlotQueries;
use anyhow::Result;
use serde_json::json;
use std::sync::Arc;

const PLAN_PROMPT: &str = r#"You are a legal search expert.
Based on the following input text, generate THREE distinct search queries to retrieve relevant legal provisions.

1. Pharmaceutical Query: Focus on the Pharmaceutical and Medical Device Act (PMD Act). Use specific legal terms and article numbers.
2. Advertising Query: Focus on the Act against Unjustifiable Premiums and Misleading Representations. Use specific legal terms and article numbers.
3. Guideline Query: Focus on administrative guidelines, interpretation standards and advertising criteria. Use terms related to practical application.

Input Text:
"{input}"

Instructions:
1. Identify specific claims in the text that might violate the law.
2. CRITICAL: Generate queries PRIMARILY IN JAPANESE.
3. Return the result in the following JSON format ONLY:
   {
       "pharmaceutical_query": "...",
       "advertising_query": "...",
       "guideline_query": "..."
   }

Example Output:
{
    "pharmaceutical_query": "薬機法 第66条 誇大広告 未承認医薬品 効能効果",
    "advertising_query": "景品表示法 第5条 優良誤認 不当表示",
    "guideline_query": "医薬品等適正広告基準 効能効果の範囲 ガイドライン"
}
"#;

/// How much of the input text the deterministic fallback queries carry.
const FALLBACK_SNIPPET_CHARS: usize = 100;

#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub queries: SlotQueries,
    pub fallback_used: bool,
    pub usage: Usage,
}

/// Turns the input text into one query per retrieval slot via a single
/// text-generation call with a strict JSON contract. Malformed output never
/// fails the request: retrieval proceeds with deterministic template
/// queries instead.
pub struct QueryPlanner {
    generator: Arc<dyn TextGenerator>,
}

impl QueryPlanner {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn plan(&self, input_text: &str) -> Result<PlanOutcome> {
        let prompt = PLAN_PROMPT.replace("{input}", input_text);
        let messages = vec![json!({"role": "user", "content": prompt})];

        let generation = self.generator.generate(messages).await?;
        match parse_slot_queries(&generation.text) {
            Some(queries) => Ok(PlanOutcome {
                queries,
                fallback_used: false,
                usage: generation.usage,
            }),
            None => {
                tracing::warn!("query generation output malformed, using template queries");
                Ok(PlanOutcome {
                    queries: fallback_queries(input_text),
                    fallback_used: true,
                    usage: generation.usage,
                })
            }
        }
    }
}

/// Parses the planner contract: a JSON object with exactly the three slot
/// keys, all non-empty. Code-fence wrappers are tolerated; anything else
/// malformed rejects the whole response.
pub fn parse_slot_queries(raw: &str) -> Option<SlotQueries> {
    let stripped = strip_code_fences(raw);
    let queries: SlotQueries = serde_json::from_str(stripped.trim()).ok()?;
    if queries.is_complete() {
        Some(queries)
    } else {
        None
    }
}

/// Slot-specific fixed prefixes plus a truncated slice of the input text.
/// Lower quality than refined queries, but retrieval always has something
/// to run with.
pub fn fallback_queries(input_text: &str) -> SlotQueries {
    let snippet = truncate_chars(input_text, FALLBACK_SNIPPET_CHARS);
    SlotQueries {
        pharmaceutical_query: format!("薬機法 誇大広告 効能効果 医薬品 {}", snippet),
        advertising_query: format!("景品表示法 優良誤認 不当表示 {}", snippet),
        guideline_query: format!("医薬品等適正広告基準 ガイドライン 運用基準 {}", snippet),
    }
}

fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    for fence in ["```json", "```"] {
        if let Some(rest) = trimmed.strip_prefix(fence) {
            if let Some(end) = rest.find("```") {
                return rest[..end].trim();
            }
            return rest.trim();
        }
    }
    trimmed
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
