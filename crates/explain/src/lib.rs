//! Explanation and report generation for trademark conflict results.
//!
//! Converts comparison results into human-readable explanations and the
//! per-candidate comparison report shown to reviewers.

use markclash_model::{
    Algorithm, CandidateOutcome, CandidateRecord, ComparisonResult, MatchedField, SubScore, Tier,
};
use serde::Serialize;

/// Default minimum composite score for a match to appear in a report.
pub const DEFAULT_MIN_SCORE: f64 = 50.0;

/// A structured explanation for one comparison result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    /// Short summary (1 line)
    pub summary: String,

    /// Detailed explanation (2-3 sentences)
    pub detail: String,

    /// Composite score the explanation refers to
    pub score: f64,

    /// Evidence items supporting this explanation
    pub evidence: Vec<EvidenceItem>,
}

/// A piece of evidence supporting an explanation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvidenceItem {
    /// Type of evidence
    pub kind: String,

    /// The specific value or match
    pub value: String,

    /// Optional context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Generate the explanation for a comparison result.
pub fn explain_result(result: &ComparisonResult, candidate_text: &str) -> Explanation {
    let mut detail = format!(
        "'{}' and '{}' score {:.2} when comparing {}. {}",
        candidate_text,
        result.reference_text,
        result.composite,
        result.matched_field.label(),
        tier_sentence(result.tier),
    );

    if let Some(field) = result.fields.iter().find(|f| f.field == result.matched_field) {
        let families: Vec<String> = [("sound", field.phonetic), ("spelling", field.fuzzy)]
            .iter()
            .filter_map(|(name, value)| value.map(|v| format!("{} {:.0}%", name, v)))
            .collect();
        if !families.is_empty() {
            detail.push_str(&format!(" Similarity by {}.", families.join(", ")));
        }
    }

    let mut evidence: Vec<EvidenceItem> = result.sub_scores.iter().map(explain_sub_score).collect();
    if result.fallback_used {
        evidence.push(EvidenceItem {
            kind: "applicant_fallback".to_string(),
            value: result.reference_text.clone(),
            context: Some("Reference row has no trademark; applicant name compared instead".to_string()),
        });
    }

    Explanation {
        summary: summarize(result),
        detail,
        score: result.composite,
        evidence,
    }
}

/// Evidence item for a single sub-score.
pub fn explain_sub_score(score: &SubScore) -> EvidenceItem {
    let context = match score.algorithm {
        Algorithm::PhoneticCoarse if score.value >= 100.0 => "Soundex codes match",
        Algorithm::PhoneticCoarse if score.value > 0.0 => "Soundex codes match for some words",
        Algorithm::PhoneticCoarse => "Soundex codes differ",
        Algorithm::PhoneticFine => "Metaphone code similarity",
        Algorithm::EditRatio => "Character-level spelling similarity",
        Algorithm::TokenSetRatio => "Similarity ignoring word order and repeats",
        Algorithm::TokenSortRatio => "Similarity ignoring word order",
        Algorithm::PartialRatio => "Best overlap of the shorter text within the longer",
    };
    EvidenceItem {
        kind: score.algorithm.name().to_string(),
        value: format!("{:.2}", score.value),
        context: Some(context.to_string()),
    }
}

fn tier_sentence(tier: Tier) -> &'static str {
    match tier {
        Tier::High => "The marks are likely to be taken for the same brand.",
        Tier::Medium => "The marks are close enough to present a potential conflict.",
        Tier::Low => "Some resemblance exists and is worth a manual review.",
        Tier::Minimal => "No significant similarity was found.",
    }
}

/// One-line summary, e.g. `MEDIUM - Potential conflict: 73.33% (name)`.
pub fn summarize(result: &ComparisonResult) -> String {
    let mut line = format!(
        "{}: {:.2}% ({})",
        result.tier.label(),
        result.composite,
        result.matched_field.label()
    );
    if result.fallback_used {
        line.push_str(" [applicant fallback]");
    }
    line
}

/// Whether a candidate could be compared.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportStatus {
    Compared,
    NoComparableData { reason: String },
}

/// A reported match above the minimum score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportMatch {
    #[serde(flatten)]
    pub result: ComparisonResult,
    pub level: String,
    pub comparison_note: String,
    pub explanation: Explanation,
}

/// Per-candidate report: what was compared and which references came close.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub candidate_id: String,
    pub candidate_name: String,
    #[serde(flatten)]
    pub status: ReportStatus,
    pub min_score: f64,
    pub similar_trademarks_found: usize,
    pub matches: Vec<ReportMatch>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ComparisonReport {
    pub fn best_match(&self) -> Option<&ReportMatch> {
        self.matches.first()
    }
}

/// Build the report for one candidate, keeping results scoring at least `min_score`.
pub fn build_report(
    candidate: &CandidateRecord,
    outcome: &CandidateOutcome,
    min_score: f64,
) -> ComparisonReport {
    match outcome {
        CandidateOutcome::NoComparableData {
            candidate_id,
            reason,
        } => ComparisonReport {
            candidate_id: candidate_id.clone(),
            candidate_name: candidate.name().to_string(),
            status: ReportStatus::NoComparableData {
                reason: reason.to_string(),
            },
            min_score,
            similar_trademarks_found: 0,
            matches: Vec::new(),
            warnings: Vec::new(),
        },
        CandidateOutcome::Compared {
            candidate_id,
            results,
            skipped,
        } => {
            let matches: Vec<ReportMatch> = results
                .iter()
                .filter(|r| r.composite >= min_score)
                .map(|r| ReportMatch {
                    result: r.clone(),
                    level: r.tier.label().to_string(),
                    comparison_note: comparison_note(r),
                    explanation: explain_result(r, candidate_text(candidate, r.matched_field)),
                })
                .collect();

            ComparisonReport {
                candidate_id: candidate_id.clone(),
                candidate_name: candidate.name().to_string(),
                status: ReportStatus::Compared,
                min_score,
                similar_trademarks_found: matches.len(),
                matches,
                warnings: skipped.iter().map(ToString::to_string).collect(),
            }
        }
    }
}

fn candidate_text(candidate: &CandidateRecord, field: MatchedField) -> &str {
    match field {
        MatchedField::LogoText => candidate.text_in_logo(),
        MatchedField::Name | MatchedField::Applicant => candidate.name(),
    }
}

fn comparison_note(result: &ComparisonResult) -> String {
    if result.fallback_used {
        "Used Client / Applicant name for trademark comparison (Trademark column empty)".to_string()
    } else {
        format!("Normal comparison on {}", result.matched_field.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use markclash_model::{FieldScore, MalformedInput};

    fn result(reference: &str, composite: f64, tier: Tier) -> ComparisonResult {
        let sub_scores = vec![
            SubScore::new(Algorithm::PhoneticCoarse, 0.0),
            SubScore::new(Algorithm::PhoneticFine, 100.0),
            SubScore::new(Algorithm::EditRatio, 83.33),
            SubScore::new(Algorithm::TokenSetRatio, 83.33),
        ];
        ComparisonResult {
            candidate_id: "c1".into(),
            reference_id: "TM1".into(),
            reference_index: 0,
            reference_text: reference.into(),
            composite,
            tier,
            matched_field: MatchedField::Name,
            fallback_used: false,
            sub_scores: sub_scores.clone(),
            fields: vec![FieldScore {
                field: MatchedField::Name,
                composite,
                phonetic: Some(50.0),
                fuzzy: Some(83.33),
                sub_scores,
            }],
        }
    }

    #[test]
    fn test_explain_medium_result() {
        let explanation = explain_result(&result("Cromax", 73.33, Tier::Medium), "Kromax");
        assert!(explanation.summary.starts_with("MEDIUM"));
        assert!(explanation.detail.contains("'Kromax' and 'Cromax'"));
        assert!(explanation.detail.contains("sound 50%"));
        assert_eq!(explanation.evidence.len(), 4);
        assert_eq!(explanation.evidence[0].context.as_deref(), Some("Soundex codes differ"));
    }

    #[test]
    fn test_fallback_is_called_out() {
        let mut r = result("Kromax Paints", 90.0, Tier::High);
        r.fallback_used = true;
        assert!(summarize(&r).ends_with("[applicant fallback]"));
        assert!(explain_result(&r, "Kromax")
            .evidence
            .iter()
            .any(|e| e.kind == "applicant_fallback"));
        assert!(comparison_note(&r).starts_with("Used Client / Applicant"));
    }

    #[test]
    fn test_report_filters_by_min_score() {
        let outcome = CandidateOutcome::Compared {
            candidate_id: "c1".into(),
            results: vec![
                result("Kromax", 100.0, Tier::High),
                result("Cromax", 73.33, Tier::Medium),
                result("Bluewater", 12.5, Tier::Minimal),
            ],
            skipped: vec![MalformedInput::MissingTrademark {
                index: 3,
                id: "row-4".into(),
            }],
        };
        let report = build_report(&CandidateRecord::named("Kromax"), &outcome, DEFAULT_MIN_SCORE);
        assert_eq!(report.similar_trademarks_found, 2);
        assert_eq!(report.best_match().unwrap().result.reference_text, "Kromax");
        assert_eq!(report.warnings, vec!["reference row 4 (row-4) has no trademark"]);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "compared");
        assert_eq!(json["matches"][1]["level"], "MEDIUM - Potential conflict");
        assert_eq!(json["matches"][1]["sub_scores"]["phonetic-fine"], 100.0);
    }

    #[test]
    fn test_report_marks_no_comparable_data() {
        let outcome = CandidateOutcome::NoComparableData {
            candidate_id: "page-2".into(),
            reason: MalformedInput::UnusableCandidateName {
                candidate_id: "page-2".into(),
            },
        };
        let report = build_report(&CandidateRecord::default(), &outcome, DEFAULT_MIN_SCORE);
        assert_eq!(report.similar_trademarks_found, 0);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "no_comparable_data");
        assert_eq!(json["reason"], "candidate page-2 has no usable name");
    }
}
