use markclash_features::{fuzzy_score, normalize, phonetic_score};
use markclash_model::{
    CandidateRecord, FamilyWeights, ReferenceEntry, Tier, TierBounds,
};
use markclash_score::{
    classify, CancellationToken, Comparator, ComparatorConfig,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn reference_set(marks: &[&str]) -> Vec<ReferenceEntry> {
    marks
        .iter()
        .enumerate()
        .map(|(i, m)| ReferenceEntry::new(format!("TM{}", i + 1), *m))
        .collect()
}

#[test]
fn kromax_scenario() {
    let comparator = Comparator::new(ComparatorConfig::default()).unwrap();
    let refs = reference_set(&["Kromax", "Cromax", "Bluewater"]);
    let outcome = comparator.compare_all(&CandidateRecord::named("Kromax"), &refs);
    let results = outcome.results();

    let ranked: Vec<&str> = results.iter().map(|r| r.reference_text.as_str()).collect();
    assert_eq!(ranked, vec!["Kromax", "Cromax", "Bluewater"]);

    assert_eq!(results[0].composite, 100.0);
    assert_eq!(results[0].tier, Tier::High);

    assert!(results[1].composite >= 70.0 && results[1].composite < 100.0);
    assert!(matches!(results[1].tier, Tier::Medium | Tier::High));

    assert!(results[2].composite < 50.0);
    assert_eq!(results[2].tier, Tier::Minimal);
}

#[test]
fn disabling_phonetic_family_yields_fuzzy_family_score() {
    let config = ComparatorConfig::default().with_weights(FamilyWeights::fuzzy_only());
    let comparator = Comparator::new(config).unwrap();
    for (a, b) in [("Kromax", "Cromax"), ("Star Foods", "Foods Star"), ("Apple", "Aple")] {
        let score = comparator.compare_texts(a, b);
        assert_eq!(Some(score.composite), score.fuzzy, "{} vs {}", a, b);
        assert!(score.phonetic.is_none());
    }
}

#[test]
fn compare_all_is_deterministic() {
    let comparator = Comparator::new(ComparatorConfig::default()).unwrap();
    let refs = reference_set(&[
        "Kromax", "Cromax", "Bluewater", "Kromax", "Krom Ax", "", "Blue Water", "Cromex",
    ]);
    let candidate = CandidateRecord::named("Kromax Paints");

    let first = serde_json::to_string(&comparator.compare_all(&candidate, &refs)).unwrap();
    for _ in 0..5 {
        let again = serde_json::to_string(&comparator.compare_all(&candidate, &refs)).unwrap();
        assert_eq!(first, again);
    }
}

#[test]
fn batch_matches_individual_comparisons() {
    let comparator = Comparator::new(ComparatorConfig::default()).unwrap();
    let refs = reference_set(&["Kromax", "Cromax", "Bluewater"]);
    let candidates: Vec<CandidateRecord> = ["Kromax", "Blue Water", "Cromax"]
        .iter()
        .enumerate()
        .map(|(i, n)| CandidateRecord::named(*n).with_source_id(format!("c{}", i)))
        .collect();

    let batch = comparator.compare_batch(&candidates, &refs, &CancellationToken::new());
    assert!(!batch.cancelled);
    for (candidate, outcome) in candidates.iter().zip(&batch.outcomes) {
        assert_eq!(outcome, &comparator.compare_all(candidate, &refs));
    }
}

#[test]
fn sensitivity_raises_the_bar() {
    let strict = ComparatorConfig::default().with_sensitivity(80.0).unwrap();
    let comparator = Comparator::new(strict).unwrap();
    let result = comparator
        .compare_one(&CandidateRecord::named("Kromax"), &ReferenceEntry::new("A", "Cromax"))
        .unwrap();
    assert_eq!(result.tier, Tier::Minimal);
}

fn text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z]{0,10}( [a-zA-Z]{1,8}){0,3}",
        "[a-z0-9.,'& -]{0,16}",
        "\\PC{0,12}",
    ]
}

proptest! {
    #[test]
    fn fuzzy_and_phonetic_are_symmetric(a in text(), b in text()) {
        let (a, b) = (normalize(&a), normalize(&b));
        prop_assert_eq!(fuzzy_score(&a, &b), fuzzy_score(&b, &a));
        prop_assert_eq!(phonetic_score(&a, &b), phonetic_score(&b, &a));
    }

    #[test]
    fn identity_is_high(a in text()) {
        let comparator = Comparator::new(ComparatorConfig::default()).unwrap();
        prop_assume!(!normalize(&a).is_empty());
        let score = comparator.compare_texts(&a, &a);
        prop_assert_eq!(score.composite, 100.0);
        prop_assert_eq!(comparator.classify(score.composite), Tier::High);
    }

    #[test]
    fn empty_input_is_minimal(a in text()) {
        let comparator = Comparator::new(ComparatorConfig::default()).unwrap();
        let score = comparator.compare_texts(&a, "");
        prop_assert_eq!(score.composite, 0.0);
        prop_assert_eq!(comparator.classify(score.composite), Tier::Minimal);
    }

    #[test]
    fn tiers_partition_the_range(
        low in 0.0f64..60.0,
        gap1 in 0.5f64..20.0,
        gap2 in 0.5f64..20.0,
        score in 0.0f64..=100.0,
    ) {
        let bounds = TierBounds { low, medium: low + gap1, high: low + gap1 + gap2 };
        let tier = classify(score, &bounds).unwrap();
        let expected = if score >= bounds.high {
            Tier::High
        } else if score >= bounds.medium {
            Tier::Medium
        } else if score >= bounds.low {
            Tier::Low
        } else {
            Tier::Minimal
        };
        prop_assert_eq!(tier, expected);
    }

    #[test]
    fn composite_stays_in_range(a in text(), b in text()) {
        let comparator = Comparator::new(ComparatorConfig::default()).unwrap();
        let score = comparator.compare_texts(&a, &b);
        prop_assert!((0.0..=100.0).contains(&score.composite));
    }
}
