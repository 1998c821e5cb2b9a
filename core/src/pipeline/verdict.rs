//! Compliance verdict rules. The verdict is derived from explicit,
//! inspectable signals rather than a bare marker-substring test, and when
//! the signals are absent or contradictory the content is flagged, never
//! silently passed.

use once_cell::sync::Lazy;
use serde::Serialize;

/// Expressions in the *input* text that are treated as violations on sight:
/// unproven cure and efficacy claims that the statutes prohibit outright.
static RISKY_PHRASES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "医師が推奨",
        "医師推奨",
        "癌が治る",
        "癌を治す",
        "病気が治る",
        "病気を治す",
        "治療効果",
        "薬効",
        "効能",
        "治癒",
        "完治",
        "cures cancer",
        "cures disease",
        "prevents disease",
        "doctor recommended",
    ]
});

/// Indicators in the *generated* analysis that point at a violation.
static VIOLATION_INDICATORS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "違反",
        "違法",
        "不適切",
        "抵触",
        "non-compliant",
        "not compliant",
        "violation",
        "inappropriate",
        "misleading",
    ]
});

/// Markers in the generated analysis that point at compliance. Scanned only
/// after the negated forms below have been removed, so 適合 inside 不適合
/// (or "compliant" inside "non-compliant") cannot flip the verdict.
static COMPLIANT_MARKERS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec!["適合", "適法", "問題なし", "compliant", "no violation", "no issues"]
});

static NEGATED_MARKERS: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["不適合", "non-compliant", "not compliant"]);

#[derive(Debug, Clone, Default, Serialize)]
pub struct VerdictSignals {
    pub risky_phrases: Vec<String>,
    pub violation_indicators: Vec<String>,
    pub compliant_markers: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    pub compliant: bool,
    pub confidence: f32,
    pub reason: String,
    pub signals: VerdictSignals,
}

/// Applies the rules in order of strength: risky input phrases trump the
/// generated text, explicit violation language trumps compliance markers,
/// and an unclear result defaults to non-compliant.
pub fn evaluate(input_text: &str, generated_text: &str) -> Verdict {
    let signals = collect_signals(input_text, generated_text);

    if !signals.risky_phrases.is_empty() {
        return Verdict {
            compliant: false,
            confidence: 0.9,
            reason: format!(
                "input contains prohibited expression: {}",
                signals.risky_phrases.join(", ")
            ),
            signals,
        };
    }

    let has_violation = !signals.violation_indicators.is_empty();
    let has_marker = !signals.compliant_markers.is_empty();

    if has_violation && !has_marker {
        return Verdict {
            compliant: false,
            confidence: 0.8,
            reason: "analysis indicates a violation".to_string(),
            signals,
        };
    }
    if has_marker && !has_violation {
        return Verdict {
            compliant: true,
            confidence: 0.8,
            reason: "analysis indicates compliance".to_string(),
            signals,
        };
    }

    // Absent or contradictory signals: flag rather than pass.
    Verdict {
        compliant: false,
        confidence: 0.5,
        reason: "analysis inconclusive, defaulting to flagged".to_string(),
        signals,
    }
}

fn collect_signals(input_text: &str, generated_text: &str) -> VerdictSignals {
    let input_lower = input_text.to_lowercase();
    let generated_lower = generated_text.to_lowercase();

    let risky_phrases = RISKY_PHRASES
        .iter()
        .filter(|p| input_lower.contains(*p))
        .map(|p| p.to_string())
        .collect();

    // "no violation" must not fire the "violation" indicator.
    let mut violation_scan = generated_lower.clone();
    for cleared in ["no violation", "違反なし", "違反はありません"] {
        violation_scan = violation_scan.replace(cleared, "");
    }
    let violation_indicators = VIOLATION_INDICATORS
        .iter()
        .filter(|p| violation_scan.contains(*p))
        .map(|p| p.to_string())
        .collect();

    // Strip negated forms before scanning for positive markers.
    let mut depolarized = generated_lower.clone();
    for negated in NEGATED_MARKERS.iter() {
        depolarized = depolarized.replace(negated, "");
    }
    let compliant_markers = COMPLIANT_MARKERS
        .iter()
        .filter(|p| depolarized.contains(*p))
        .map(|p| p.to_string())
        .collect();

    VerdictSignals {
        risky_phrases,
        violation_indicators,
        compliant_markers,
    }
}
