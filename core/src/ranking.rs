use crate::chunking::classify;
use crate::models::{LawCategory, RawHit, ScoredHit};
use crate::retriever::SlotHits;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct RankConfig {
    pub per_slot_quota: usize,
    /// Base score lost per position in a slot's raw result list.
    pub rank_decay: f32,
    /// Statute text that is not a subordinate instrument.
    pub primary_statute_boost: f32,
    /// The hit's section label appears verbatim in the slot query.
    pub section_match_boost: f32,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            per_slot_quota: 4,
            rank_decay: 0.1,
            primary_statute_boost: 1.5,
            section_match_boost: 1.3,
        }
    }
}

/// Scores one slot's raw hits: rank-decay base score times the boost
/// factors. Boosts are multiplicative and commutative, so their order does
/// not matter.
pub fn score_slot_hits(query: &str, hits: &[RawHit], config: &RankConfig) -> Vec<ScoredHit> {
    hits.iter()
        .enumerate()
        .map(|(rank, hit)| {
            let base = 1.0 - (rank as f32) * config.rank_decay;
            let mut score = base;

            if hit.metadata.category == LawCategory::Statute
                && !classify::is_subordinate_instrument(&hit.metadata.title)
            {
                score *= config.primary_statute_boost;
            }

            let section = hit.metadata.section.as_str();
            if section.chars().count() > 1 && query.contains(section) {
                score *= config.section_match_boost;
            }

            ScoredHit {
                content: hit.content.clone(),
                metadata: hit.metadata.clone(),
                score,
            }
        })
        .collect()
}

/// Merges the per-slot hit lists into the final evidence set:
/// dedup across slots by exact content (first slot wins), then per slot
/// sort by score and keep the quota, then concatenate in slot order.
/// The concatenation is the final order (no global re-sort), so every
/// slot keeps representation even when one dominates on raw similarity.
pub fn merge_slots(slot_hits: &[SlotHits], config: &RankConfig) -> Vec<ScoredHit> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut kept_per_slot: Vec<Vec<ScoredHit>> = Vec::with_capacity(slot_hits.len());

    for slot in slot_hits {
        let scored = score_slot_hits(&slot.query, &slot.hits, config);
        let surviving: Vec<ScoredHit> = scored
            .into_iter()
            .filter(|hit| seen.insert(hit.content.clone()))
            .collect();
        kept_per_slot.push(surviving);
    }

    let mut evidence = Vec::new();
    for mut survivors in kept_per_slot {
        survivors.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        survivors.truncate(config.per_slot_quota);
        evidence.extend(survivors);
    }
    evidence
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChunkMetadata, LawGroup, SlotName, SourceType};
    use std::path::PathBuf;

    fn hit(content: &str, title: &str, category: LawCategory, section: &str) -> RawHit {
        RawHit {
            content: content.to_string(),
            metadata: ChunkMetadata {
                title: title.to_string(),
                category,
                law_group: LawGroup::Pharmaceutical,
                section: section.to_string(),
                is_main_provision: true,
                source_type: SourceType::StructuredLaw,
                path: PathBuf::from("law.xml"),
            },
            similarity: 0.9,
        }
    }

    fn slot(name: SlotName, query: &str, hits: Vec<RawHit>) -> SlotHits {
        SlotHits {
            slot: name,
            query: query.to_string(),
            hits,
        }
    }

    #[test]
    fn base_score_decays_by_rank() {
        let hits = vec![
            hit("a", "ガイドライン", LawCategory::Standard, "p.1"),
            hit("b", "ガイドライン", LawCategory::Standard, "p.2"),
            hit("c", "ガイドライン", LawCategory::Standard, "p.3"),
        ];
        let scored = score_slot_hits("query", &hits, &RankConfig::default());
        assert!((scored[0].score - 1.0).abs() < 1e-6);
        assert!((scored[1].score - 0.9).abs() < 1e-6);
        assert!((scored[2].score - 0.8).abs() < 1e-6);
    }

    #[test]
    fn primary_statute_outranks_subordinate_at_same_rank() {
        let primary = vec![hit("a", "薬機法", LawCategory::Statute, "第六十六条")];
        let subordinate = vec![hit("b", "薬機法施行規則", LawCategory::Statute, "第六十六条")];
        let config = RankConfig::default();

        let p = score_slot_hits("q", &primary, &config);
        let s = score_slot_hits("q", &subordinate, &config);
        assert!(p[0].score > s[0].score);
        assert!((p[0].score - 1.5).abs() < 1e-6);
        assert!((s[0].score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn section_match_boost_requires_query_mention() {
        let hits = vec![hit("a", "ガイドライン", LawCategory::Standard, "第六十六条")];
        let config = RankConfig::default();

        let named = score_slot_hits("薬機法 第六十六条 誇大広告", &hits, &config);
        let unnamed = score_slot_hits("薬機法 誇大広告", &hits, &config);
        assert!((named[0].score - 1.3).abs() < 1e-6);
        assert!((unnamed[0].score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn single_char_sections_never_boost() {
        let hits = vec![hit("a", "ガイドライン", LawCategory::Standard, "一")];
        let scored = score_slot_hits("一 something", &hits, &RankConfig::default());
        assert!((scored[0].score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn boosts_stack_multiplicatively() {
        let hits = vec![hit("a", "薬機法", LawCategory::Statute, "第六十六条")];
        let scored = score_slot_hits("第六十六条", &hits, &RankConfig::default());
        assert!((scored[0].score - 1.5 * 1.3).abs() < 1e-6);
    }

    #[test]
    fn merge_caps_to_quota_per_slot() {
        let many: Vec<RawHit> = (0..10)
            .map(|i| hit(&format!("content-{}", i), "薬機法", LawCategory::Statute, "第一条"))
            .collect();
        let slots = vec![
            slot(SlotName::Pharmaceutical, "q1", many.clone()),
            slot(SlotName::Advertising, "q2", vec![]),
            slot(
                SlotName::Guideline,
                "q3",
                (0..10)
                    .map(|i| hit(&format!("guide-{}", i), "基準", LawCategory::Standard, "p.1"))
                    .collect(),
            ),
        ];
        let config = RankConfig::default();
        let merged = merge_slots(&slots, &config);

        assert!(merged.len() <= config.per_slot_quota * slots.len());
        assert_eq!(merged.len(), 8); // 4 statute + 0 + 4 guideline

        let unique: HashSet<&str> = merged.iter().map(|h| h.content.as_str()).collect();
        assert_eq!(unique.len(), merged.len());
    }

    #[test]
    fn duplicate_content_kept_by_earliest_slot() {
        let shared = hit("同一条文", "薬機法", LawCategory::Statute, "第一条");
        let slots = vec![
            slot(SlotName::Pharmaceutical, "q1", vec![shared.clone()]),
            slot(SlotName::Advertising, "q2", vec![shared.clone()]),
            slot(SlotName::Guideline, "q3", vec![]),
        ];
        let merged = merge_slots(&slots, &RankConfig::default());
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn slot_order_is_preserved_without_global_resort() {
        // A low-scoring statute hit must still precede a high-scoring
        // guideline hit because its slot comes first.
        let statute: Vec<RawHit> = (0..5)
            .map(|i| hit(&format!("s-{}", i), "薬機法施行規則", LawCategory::Statute, "第一条"))
            .collect();
        let guide = vec![hit("g-0", "基準", LawCategory::Standard, "p.1")];
        let slots = vec![
            slot(SlotName::Pharmaceutical, "q1", statute),
            slot(SlotName::Advertising, "q2", vec![]),
            slot(SlotName::Guideline, "q3", guide),
        ];
        let merged = merge_slots(&slots, &RankConfig::default());
        assert_eq!(merged.last().map(|h| h.content.as_str()), Some("g-0"));
    }

    #[test]
    fn empty_slots_contribute_nothing() {
        let slots = vec![
            slot(SlotName::Pharmaceutical, "q1", vec![]),
            slot(SlotName::Advertising, "q2", vec![]),
            slot(SlotName::Guideline, "q3", vec![]),
        ];
        assert!(merge_slots(&slots, &RankConfig::default()).is_empty());
    }
}
