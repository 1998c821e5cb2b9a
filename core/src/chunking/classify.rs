//! Keyword-table classifiers. Classification policy lives here so it can
//! evolve without touching retrieval or ranking.

use crate::models::{LawCategory, LawGroup};
use once_cell::sync::Lazy;

/// Title keywords mapping a law to the pharmaceutical group. Approximate by
/// design: a title matching none of the tables classifies as `Other`.
static PHARMACEUTICAL_KEYWORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "医薬品",
        "医療機器",
        "薬機",
        "薬事",
        "pharmaceutical",
        "medical device",
    ]
});

static ADVERTISING_KEYWORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "景品表示",
        "不当表示",
        "景品類",
        "premiums",
        "representations",
        "misleading",
    ]
});

/// Title keywords marking a subordinate instrument (an enforcement order or
/// ministerial rule issued under a statute, as opposed to the statute itself).
static SUBORDINATE_KEYWORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "施行令",
        "施行規則",
        "省令",
        "告示",
        "enforcement order",
        "enforcement rule",
        "ministerial ordinance",
    ]
});

pub fn law_group_for_title(title: &str) -> LawGroup {
    let lowered = title.to_lowercase();
    if PHARMACEUTICAL_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        LawGroup::Pharmaceutical
    } else if ADVERTISING_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        LawGroup::Advertising
    } else {
        LawGroup::Other
    }
}

/// True for implementing regulations that should rank below the statute
/// text they derive from.
pub fn is_subordinate_instrument(title: &str) -> bool {
    let lowered = title.to_lowercase();
    SUBORDINATE_KEYWORDS.iter().any(|k| lowered.contains(k))
}

/// Infers the category from the top-level directory a document lives in,
/// e.g. `01_statute/` or `03_ng_examples/`.
pub fn category_for_dir(dir_name: &str) -> LawCategory {
    let lowered = dir_name.to_lowercase();
    if lowered.contains("statute") || lowered.contains("条文") {
        LawCategory::Statute
    } else if lowered.contains("standard") || lowered.contains("guideline") || lowered.contains("基準") {
        LawCategory::Standard
    } else if lowered.contains("ok_") || lowered.contains("ok-") || lowered == "ok" {
        LawCategory::OkExample
    } else if lowered.contains("ng_") || lowered.contains("ng-") || lowered == "ng" {
        LawCategory::NgExample
    } else {
        LawCategory::Unknown
    }
}
