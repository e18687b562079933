use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Algorithm family; each family is reduced to one mean score before weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Phonetic,
    Fuzzy,
}

impl Family {
    pub const ALL: [Family; 2] = [Family::Phonetic, Family::Fuzzy];
}

/// The closed set of similarity algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    /// Soundex code equality (binary)
    PhoneticCoarse,
    /// Edit ratio over Metaphone codes
    PhoneticFine,
    /// Normalized Levenshtein ratio over the whole text
    EditRatio,
    /// Edit ratio over sorted, de-duplicated tokens
    TokenSetRatio,
    /// Edit ratio over sorted tokens, duplicates kept
    TokenSortRatio,
    /// Best edit ratio of the shorter text against windows of the longer
    PartialRatio,
}

impl Algorithm {
    /// Algorithms enabled unless configuration says otherwise.
    pub const DEFAULT: [Algorithm; 4] = [
        Algorithm::PhoneticCoarse,
        Algorithm::PhoneticFine,
        Algorithm::EditRatio,
        Algorithm::TokenSetRatio,
    ];

    pub const ALL: [Algorithm; 6] = [
        Algorithm::PhoneticCoarse,
        Algorithm::PhoneticFine,
        Algorithm::EditRatio,
        Algorithm::TokenSetRatio,
        Algorithm::TokenSortRatio,
        Algorithm::PartialRatio,
    ];

    pub fn family(&self) -> Family {
        match self {
            Self::PhoneticCoarse | Self::PhoneticFine => Family::Phonetic,
            Self::EditRatio | Self::TokenSetRatio | Self::TokenSortRatio | Self::PartialRatio => {
                Family::Fuzzy
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::PhoneticCoarse => "phonetic-coarse",
            Self::PhoneticFine => "phonetic-fine",
            Self::EditRatio => "edit-ratio",
            Self::TokenSetRatio => "token-set-ratio",
            Self::TokenSortRatio => "token-sort-ratio",
            Self::PartialRatio => "partial-ratio",
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One algorithm's similarity for one field pair, in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubScore {
    pub algorithm: Algorithm,
    pub value: f64,
}

impl SubScore {
    pub fn new(algorithm: Algorithm, value: f64) -> Self {
        Self {
            algorithm,
            value: value.clamp(0.0, 100.0),
        }
    }
}

/// Conflict severity derived from a composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    Minimal,
    Low,
    Medium,
    High,
}

impl Tier {
    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "HIGH - Likely same brand",
            Self::Medium => "MEDIUM - Potential conflict",
            Self::Low => "LOW - Worth reviewing",
            Self::Minimal => "MINIMAL - No significant similarity",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Which pair of fields produced a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchedField {
    /// Candidate name against reference trademark
    Name,
    /// Candidate name against reference applicant
    Applicant,
    /// Candidate logo text against reference trademark
    LogoText,
}

impl MatchedField {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Applicant => "applicant",
            Self::LogoText => "logo text",
        }
    }
}

/// Aggregated scores for one field pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldScore {
    pub field: MatchedField,
    /// Weighted composite in [0, 100], two decimals
    pub composite: f64,
    /// Phonetic family mean, absent when no phonetic algorithm ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<f64>,
    /// Fuzzy family mean, absent when no fuzzy algorithm ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuzzy: Option<f64>,
    #[serde(serialize_with = "serialize_sub_scores")]
    pub sub_scores: Vec<SubScore>,
}

/// Outcome of comparing one candidate against one reference entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub candidate_id: String,
    pub reference_id: String,
    /// Position of the entry in the reference set
    pub reference_index: usize,
    /// Reference text that was compared, as displayed
    pub reference_text: String,
    pub composite: f64,
    pub tier: Tier,
    pub matched_field: MatchedField,
    /// The reference had no trademark and its applicant name stood in
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub fallback_used: bool,
    /// Sub-scores of the matched field, algorithm name to value
    #[serde(serialize_with = "serialize_sub_scores")]
    pub sub_scores: Vec<SubScore>,
    /// Every field pair that was evaluated, name first
    pub fields: Vec<FieldScore>,
}

fn serialize_sub_scores<S>(scores: &[SubScore], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(scores.len()))?;
    for score in scores {
        map.serialize_entry(score.algorithm.name(), &score.value)?;
    }
    map.end()
}

/// Input that had to be excluded from scoring.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MalformedInput {
    #[error("reference row {} ({id}) has no trademark", .index + 1)]
    MissingTrademark { index: usize, id: String },

    #[error("candidate {candidate_id} has no usable name")]
    UnusableCandidateName { candidate_id: String },
}

/// Per-candidate result of a batch comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CandidateOutcome {
    /// Results ordered by descending composite score
    Compared {
        candidate_id: String,
        results: Vec<ComparisonResult>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        skipped: Vec<MalformedInput>,
    },
    /// The candidate could not be compared at all
    NoComparableData {
        candidate_id: String,
        reason: MalformedInput,
    },
}

impl CandidateOutcome {
    pub fn candidate_id(&self) -> &str {
        match self {
            Self::Compared { candidate_id, .. } | Self::NoComparableData { candidate_id, .. } => {
                candidate_id
            }
        }
    }

    /// Ranked results, empty when the candidate could not be compared.
    pub fn results(&self) -> &[ComparisonResult] {
        match self {
            Self::Compared { results, .. } => results,
            Self::NoComparableData { .. } => &[],
        }
    }
}
