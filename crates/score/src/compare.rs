use markclash_features::{score_all, NormalizedText, Normalizer};
use markclash_model::{
    Algorithm, CandidateOutcome, CandidateRecord, ComparisonResult, ConfigError, Family,
    FamilyWeights, FieldScore, MalformedInput, MatchedField, ReferenceEntry, Tier,
};
use rayon::prelude::*;
use tokio_util::sync::CancellationToken;

use crate::aggregate::aggregate;
use crate::classify::ConflictClassifier;
use crate::config::ComparatorConfig;

/// Result of comparing many candidates against one reference set.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    /// One outcome per fully compared candidate, in input order
    pub outcomes: Vec<CandidateOutcome>,
    /// Reference rows excluded from scoring
    pub skipped_references: Vec<MalformedInput>,
    /// The batch stopped early; candidates still in flight were dropped whole
    pub cancelled: bool,
}

/// Candidate fields in normalized form.
struct PreparedCandidate {
    id: String,
    name: NormalizedText,
    logo_text: NormalizedText,
}

/// Reference fields in normalized form, plus the display text of the mark.
struct PreparedReference<'a> {
    index: usize,
    entry: &'a ReferenceEntry,
    mark: NormalizedText,
    mark_display: &'a str,
    applicant: NormalizedText,
    fallback_used: bool,
}

/// Scores candidates against reference entries.
///
/// Holds a validated configuration and nothing else; every method is a pure
/// function of its inputs, so one comparator can serve concurrent batches.
#[derive(Debug, Clone)]
pub struct Comparator {
    config: ComparatorConfig,
    normalizer: Normalizer,
    classifier: ConflictClassifier,
}

impl Comparator {
    /// Validate the configuration. Fails before any scoring happens.
    pub fn new(mut config: ComparatorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut seen = Vec::with_capacity(config.algorithms.len());
        config.algorithms.retain(|a| {
            let fresh = !seen.contains(a);
            seen.push(*a);
            fresh
        });

        let classifier = ConflictClassifier::new(config.thresholds.bounds)?;
        let normalizer = Normalizer::new(config.normalizer.clone());
        Ok(Self {
            config,
            normalizer,
            classifier,
        })
    }

    pub fn config(&self) -> &ComparatorConfig {
        &self.config
    }

    pub fn classify(&self, score: f64) -> Tier {
        self.classifier.classify(score)
    }

    /// Score two free texts with the name-field weights.
    pub fn compare_texts(&self, a: &str, b: &str) -> FieldScore {
        let a = self.normalizer.normalize(a);
        let b = self.normalizer.normalize(b);
        self.score_field(MatchedField::Name, &a, &b, &self.config.thresholds.weights)
    }

    /// Compare one candidate against one reference entry.
    pub fn compare_one(
        &self,
        candidate: &CandidateRecord,
        reference: &ReferenceEntry,
    ) -> Result<ComparisonResult, MalformedInput> {
        let candidate = self.prepare_candidate(candidate, candidate.id())?;
        let reference = self.prepare_reference(0, reference)?;
        Ok(self.evaluate(&candidate, &reference))
    }

    /// Compare one candidate against a whole reference set.
    ///
    /// Results are ordered by descending composite score; ties keep the
    /// reference set's order. Unusable rows are reported in `skipped`.
    pub fn compare_all(
        &self,
        candidate: &CandidateRecord,
        references: &[ReferenceEntry],
    ) -> CandidateOutcome {
        let (prepared, skipped) = self.prepare_references(references);
        self.outcome_for(candidate, candidate.id(), &prepared, &skipped, None)
            .unwrap_or_else(|| CandidateOutcome::Compared {
                candidate_id: candidate.id(),
                results: Vec::new(),
                skipped,
            })
    }

    /// Like [`Comparator::compare_all`], but gives up between pair evaluations
    /// once `cancel` fires. Returns `None` when cancelled.
    pub fn compare_all_cancellable(
        &self,
        candidate: &CandidateRecord,
        references: &[ReferenceEntry],
        cancel: &CancellationToken,
    ) -> Option<CandidateOutcome> {
        let (prepared, skipped) = self.prepare_references(references);
        self.outcome_for(candidate, candidate.id(), &prepared, &skipped, Some(cancel))
    }

    /// Compare every candidate independently against the reference set.
    pub fn compare_batch(
        &self,
        candidates: &[CandidateRecord],
        references: &[ReferenceEntry],
        cancel: &CancellationToken,
    ) -> BatchOutcome {
        let (prepared, skipped) = self.prepare_references(references);

        let outcomes: Vec<Option<CandidateOutcome>> = candidates
            .par_iter()
            .enumerate()
            .map(|(i, candidate)| {
                let id = match (&candidate.source_id, candidate.page_number) {
                    (None, None) => format!("candidate-{}", i + 1),
                    _ => candidate.id(),
                };
                self.outcome_for(candidate, id, &prepared, &skipped, Some(cancel))
            })
            .collect();

        let cancelled = outcomes.iter().any(Option::is_none);
        let outcomes: Vec<CandidateOutcome> = outcomes.into_iter().flatten().collect();
        if cancelled {
            tracing::warn!(
                completed = outcomes.len(),
                total = candidates.len(),
                "batch comparison cancelled"
            );
        } else {
            tracing::debug!(
                candidates = candidates.len(),
                references = prepared.len(),
                skipped = skipped.len(),
                "batch comparison finished"
            );
        }

        BatchOutcome {
            outcomes,
            skipped_references: skipped,
            cancelled,
        }
    }

    fn outcome_for(
        &self,
        candidate: &CandidateRecord,
        id: String,
        references: &[PreparedReference<'_>],
        skipped: &[MalformedInput],
        cancel: Option<&CancellationToken>,
    ) -> Option<CandidateOutcome> {
        let candidate = match self.prepare_candidate(candidate, id) {
            Ok(candidate) => candidate,
            Err(reason) => {
                tracing::warn!(%reason, "candidate excluded from scoring");
                return Some(CandidateOutcome::NoComparableData {
                    candidate_id: reason_candidate_id(&reason),
                    reason,
                });
            }
        };

        let mut results: Vec<ComparisonResult> = references
            .par_iter()
            .map(|reference| {
                if cancel.is_some_and(CancellationToken::is_cancelled) {
                    None
                } else {
                    Some(self.evaluate(&candidate, reference))
                }
            })
            .collect::<Option<Vec<_>>>()?;

        // Stable order: score descending, then reference position.
        results.sort_by(|a, b| {
            b.composite
                .total_cmp(&a.composite)
                .then(a.reference_index.cmp(&b.reference_index))
        });

        Some(CandidateOutcome::Compared {
            candidate_id: candidate.id,
            results,
            skipped: skipped.to_vec(),
        })
    }

    fn prepare_candidate(
        &self,
        candidate: &CandidateRecord,
        id: String,
    ) -> Result<PreparedCandidate, MalformedInput> {
        let name = self.normalizer.normalize(candidate.name());
        if name.is_empty() {
            return Err(MalformedInput::UnusableCandidateName { candidate_id: id });
        }
        Ok(PreparedCandidate {
            id,
            name,
            logo_text: self.normalizer.normalize(candidate.text_in_logo()),
        })
    }

    fn prepare_reference<'a>(
        &self,
        index: usize,
        entry: &'a ReferenceEntry,
    ) -> Result<PreparedReference<'a>, MalformedInput> {
        let applicant = self.normalizer.normalize(entry.applicant.as_str());
        let mark = self.normalizer.normalize(entry.trademark.as_str());

        let (mark, mark_display, fallback_used) = if !mark.is_empty() {
            (mark, entry.trademark.as_str(), false)
        } else if self.config.applicant_fallback && !applicant.is_empty() {
            (applicant.clone(), entry.applicant.as_str(), true)
        } else {
            return Err(MalformedInput::MissingTrademark {
                index,
                id: entry.id(index),
            });
        };

        Ok(PreparedReference {
            index,
            entry,
            mark,
            mark_display,
            applicant,
            fallback_used,
        })
    }

    fn prepare_references<'a>(
        &self,
        references: &'a [ReferenceEntry],
    ) -> (Vec<PreparedReference<'a>>, Vec<MalformedInput>) {
        let mut prepared = Vec::with_capacity(references.len());
        let mut skipped = Vec::new();
        for (index, entry) in references.iter().enumerate() {
            match self.prepare_reference(index, entry) {
                Ok(reference) => prepared.push(reference),
                Err(reason) => {
                    tracing::warn!(%reason, "reference row skipped");
                    skipped.push(reason);
                }
            }
        }
        (prepared, skipped)
    }

    fn evaluate(
        &self,
        candidate: &PreparedCandidate,
        reference: &PreparedReference<'_>,
    ) -> ComparisonResult {
        let mut fields = vec![self.score_field(
            MatchedField::Name,
            &candidate.name,
            &reference.mark,
            &self.config.thresholds.weights,
        )];

        for secondary in &self.config.secondary {
            let (left, right) = match secondary.field {
                MatchedField::Applicant => (&candidate.name, &reference.applicant),
                MatchedField::LogoText => (&candidate.logo_text, &reference.mark),
                MatchedField::Name => continue,
            };
            if left.is_empty() || right.is_empty() {
                continue;
            }
            fields.push(self.score_field(secondary.field, left, right, &secondary.weights));
        }

        let best = fields
            .iter()
            .skip(1)
            .fold(&fields[0], |best, f| if f.composite > best.composite { f } else { best })
            .clone();

        let reference_text = match best.field {
            MatchedField::Applicant => reference.entry.applicant.as_str(),
            MatchedField::Name | MatchedField::LogoText => reference.mark_display,
        };

        ComparisonResult {
            candidate_id: candidate.id.clone(),
            reference_id: reference.entry.id(reference.index),
            reference_index: reference.index,
            reference_text: reference_text.to_string(),
            composite: best.composite,
            tier: self.classifier.classify(best.composite),
            matched_field: best.field,
            fallback_used: reference.fallback_used,
            sub_scores: best.sub_scores,
            fields,
        }
    }

    fn score_field(
        &self,
        field: MatchedField,
        a: &NormalizedText,
        b: &NormalizedText,
        weights: &FamilyWeights,
    ) -> FieldScore {
        let algorithms: Vec<Algorithm> = self
            .config
            .algorithms
            .iter()
            .copied()
            .filter(|a| family_weight(weights, a.family()) > 0.0)
            .collect();
        let sub_scores = score_all(&algorithms, a, b);
        let aggregate = aggregate(&sub_scores, weights);

        FieldScore {
            field,
            composite: aggregate.composite,
            phonetic: aggregate.phonetic,
            fuzzy: aggregate.fuzzy,
            sub_scores,
        }
    }
}

fn family_weight(weights: &FamilyWeights, family: Family) -> f64 {
    match family {
        Family::Phonetic => weights.phonetic,
        Family::Fuzzy => weights.fuzzy,
    }
}

fn reason_candidate_id(reason: &MalformedInput) -> String {
    match reason {
        MalformedInput::UnusableCandidateName { candidate_id } => candidate_id.clone(),
        MalformedInput::MissingTrademark { id, .. } => id.clone(),
    }
}
