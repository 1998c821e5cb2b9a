use crate::index::{EvidenceIndex, MetadataFilter};
use crate::models::{LawCategory, LawGroup, RawHit, SlotName, SlotQueries};
use anyhow::Result;
use std::sync::Arc;

/// One slot's retrieval intent: where to search and under which filter.
#[derive(Debug, Clone)]
pub struct SlotSpec {
    pub name: SlotName,
    pub filter: MetadataFilter,
}

/// The fixed slot table, in processing order. The statute slots search main
/// provisions of their law group only; the guideline slot covers everything
/// that is not statute text (standards, examples, scanned guidance).
pub fn slot_specs() -> Vec<SlotSpec> {
    vec![
        SlotSpec {
            name: SlotName::Pharmaceutical,
            filter: MetadataFilter::All(vec![
                MetadataFilter::Category(LawCategory::Statute),
                MetadataFilter::Group(LawGroup::Pharmaceutical),
                MetadataFilter::MainProvision(true),
            ]),
        },
        SlotSpec {
            name: SlotName::Advertising,
            filter: MetadataFilter::All(vec![
                MetadataFilter::Category(LawCategory::Statute),
                MetadataFilter::Group(LawGroup::Advertising),
                MetadataFilter::MainProvision(true),
            ]),
        },
        SlotSpec {
            name: SlotName::Guideline,
            filter: MetadataFilter::Not(Box::new(MetadataFilter::Category(LawCategory::Statute))),
        },
    ]
}

/// A slot's raw search result, carrying the query that produced it so the
/// ranking pass can check for section mentions.
#[derive(Debug, Clone)]
pub struct SlotHits {
    pub slot: SlotName,
    pub query: String,
    pub hits: Vec<RawHit>,
}

pub struct SlotRetriever {
    index: Arc<dyn EvidenceIndex>,
    slot_top_k: usize,
}

impl SlotRetriever {
    pub fn new(index: Arc<dyn EvidenceIndex>, slot_top_k: usize) -> Self {
        Self { index, slot_top_k }
    }

    /// Runs one filtered similarity search per slot. Slots are independent:
    /// each search sees only its own query and filter.
    pub async fn retrieve(&self, queries: &SlotQueries) -> Result<Vec<SlotHits>> {
        let mut results = Vec::with_capacity(SlotName::ORDER.len());
        for spec in slot_specs() {
            let query = queries.get(spec.name).to_string();
            let hits = self
                .index
                .query(&query, self.slot_top_k, &spec.filter)
                .await?;
            tracing::debug!(slot = %spec.name, hits = hits.len(), "slot search complete");
            results.push(SlotHits {
                slot: spec.name,
                query,
                hits,
            });
        }
        Ok(results)
    }
}
