use markclash_features::NormalizerConfig;
use markclash_model::{Algorithm, ConfigError, FamilyWeights, MatchedField, ThresholdConfig};
use serde::{Deserialize, Serialize};

/// An extra field pair compared alongside the name, with its own weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecondaryField {
    pub field: MatchedField,
    #[serde(default)]
    pub weights: FamilyWeights,
}

/// Everything the comparator needs. Loaded from TOML or built in code.
///
/// ```toml
/// algorithms = ["phonetic-coarse", "phonetic-fine", "edit-ratio", "token-set-ratio"]
/// applicant_fallback = false
///
/// [thresholds.bounds]
/// low = 50.0
/// medium = 70.0
/// high = 85.0
///
/// [thresholds.weights]
/// phonetic = 0.3
/// fuzzy = 0.7
///
/// [[secondary]]
/// field = "applicant"
/// weights = { phonetic = 0.2, fuzzy = 0.8 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComparatorConfig {
    pub normalizer: NormalizerConfig,
    /// Tier bounds and the name-field family weights
    pub thresholds: ThresholdConfig,
    /// Enabled algorithms, in sub-score order
    pub algorithms: Vec<Algorithm>,
    /// Optional comparisons beyond candidate name vs. reference trademark
    pub secondary: Vec<SecondaryField>,
    /// Compare rows without a trademark using their applicant name instead of skipping them
    pub applicant_fallback: bool,
}

impl Default for ComparatorConfig {
    fn default() -> Self {
        Self {
            normalizer: NormalizerConfig::default(),
            thresholds: ThresholdConfig::default(),
            algorithms: Algorithm::DEFAULT.to_vec(),
            secondary: Vec::new(),
            applicant_fallback: false,
        }
    }
}

impl ComparatorConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds.validate()?;
        if self.algorithms.is_empty() {
            return Err(ConfigError::NoAlgorithms);
        }
        for secondary in &self.secondary {
            if secondary.field == MatchedField::Name {
                return Err(ConfigError::NameAsSecondary);
            }
            secondary.weights.validate()?;
        }
        Ok(())
    }

    /// Re-derive the tier bounds from a sensitivity value in [30, 95].
    pub fn with_sensitivity(mut self, sensitivity: f64) -> Result<Self, ConfigError> {
        self.thresholds = self.thresholds.with_sensitivity(sensitivity)?;
        Ok(self)
    }

    pub fn with_weights(mut self, weights: FamilyWeights) -> Self {
        self.thresholds.weights = weights;
        self
    }

    pub fn with_secondary(mut self, field: MatchedField, weights: FamilyWeights) -> Self {
        self.secondary.push(SecondaryField { field, weights });
        self
    }
}
