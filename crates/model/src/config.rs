use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Accepted range of the host-facing sensitivity value.
pub const SENSITIVITY_RANGE: std::ops::RangeInclusive<f64> = 30.0..=95.0;

const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Configuration that cannot be used for scoring. Always fatal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("tier bounds must satisfy 0 <= low < medium < high <= 100 (got {low}/{medium}/{high})")]
    UnorderedBounds { low: f64, medium: f64, high: f64 },

    #[error("{family} weight {weight} is outside [0, 1]")]
    WeightOutOfRange { family: &'static str, weight: f64 },

    #[error("family weights must sum to 1.0 (got {0})")]
    WeightSum(f64),

    #[error("sensitivity {0} is outside [30, 95]")]
    Sensitivity(f64),

    #[error("no similarity algorithm is enabled")]
    NoAlgorithms,

    #[error("the name field cannot be listed as a secondary field")]
    NameAsSecondary,

    #[error("config parse error: {0}")]
    Parse(String),
}

/// Weights of the two algorithm families. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FamilyWeights {
    pub phonetic: f64,
    pub fuzzy: f64,
}

impl Default for FamilyWeights {
    fn default() -> Self {
        Self {
            phonetic: 0.30,
            fuzzy: 0.70,
        }
    }
}

impl FamilyWeights {
    /// Weights that disable the phonetic family.
    pub fn fuzzy_only() -> Self {
        Self {
            phonetic: 0.0,
            fuzzy: 1.0,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (family, weight) in [("phonetic", self.phonetic), ("fuzzy", self.fuzzy)] {
            if !(0.0..=1.0).contains(&weight) {
                return Err(ConfigError::WeightOutOfRange { family, weight });
            }
        }
        let sum = self.phonetic + self.fuzzy;
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ConfigError::WeightSum(sum));
        }
        Ok(())
    }
}

/// Lower edges of the Low, Medium and High tiers. Minimal starts at 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TierBounds {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for TierBounds {
    fn default() -> Self {
        Self {
            low: 50.0,
            medium: 70.0,
            high: 85.0,
        }
    }
}

impl TierBounds {
    /// Map a sensitivity value in [30, 95] onto the tier bounds.
    ///
    /// `low` is the sensitivity itself; `medium` and `high` sit at 40% and 70%
    /// of the remaining distance to 100. A sensitivity of 50 gives the
    /// defaults 50/70/85, and every bound rises with the sensitivity.
    pub fn from_sensitivity(sensitivity: f64) -> Result<Self, ConfigError> {
        if !SENSITIVITY_RANGE.contains(&sensitivity) {
            return Err(ConfigError::Sensitivity(sensitivity));
        }
        let headroom = 100.0 - sensitivity;
        let bounds = Self {
            low: sensitivity,
            medium: sensitivity + 0.4 * headroom,
            high: sensitivity + 0.7 * headroom,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let Self { low, medium, high } = *self;
        let ordered = 0.0 <= low && low < medium && medium < high && high <= 100.0;
        if ordered {
            Ok(())
        } else {
            Err(ConfigError::UnorderedBounds { low, medium, high })
        }
    }
}

/// Tier bounds plus family weights, passed explicitly to every scoring entry point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    #[serde(default)]
    pub bounds: TierBounds,
    #[serde(default)]
    pub weights: FamilyWeights,
}

impl ThresholdConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bounds.validate()?;
        self.weights.validate()
    }

    /// Replace the tier bounds according to a sensitivity value; weights are untouched.
    pub fn with_sensitivity(mut self, sensitivity: f64) -> Result<Self, ConfigError> {
        self.bounds = TierBounds::from_sensitivity(sensitivity)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ThresholdConfig::default().validate().is_ok());
        assert!(FamilyWeights::fuzzy_only().validate().is_ok());
    }

    #[test]
    fn test_unordered_bounds_rejected() {
        let bounds = TierBounds {
            low: 70.0,
            medium: 70.0,
            high: 85.0,
        };
        assert!(matches!(bounds.validate(), Err(ConfigError::UnorderedBounds { .. })));

        let bounds = TierBounds {
            low: 50.0,
            medium: 70.0,
            high: 101.0,
        };
        assert!(bounds.validate().is_err());
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let weights = FamilyWeights {
            phonetic: 0.5,
            fuzzy: 0.6,
        };
        assert!(matches!(weights.validate(), Err(ConfigError::WeightSum(_))));

        let weights = FamilyWeights {
            phonetic: -0.2,
            fuzzy: 1.2,
        };
        assert!(matches!(
            weights.validate(),
            Err(ConfigError::WeightOutOfRange { family: "phonetic", .. })
        ));
    }

    #[test]
    fn test_sensitivity_fifty_gives_defaults() {
        let bounds = TierBounds::from_sensitivity(50.0).unwrap();
        assert_eq!(bounds, TierBounds::default());
    }

    #[test]
    fn test_sensitivity_is_monotonic() {
        let mut previous = TierBounds::from_sensitivity(30.0).unwrap();
        for s in 31..=95 {
            let next = TierBounds::from_sensitivity(s as f64).unwrap();
            assert!(next.low > previous.low);
            assert!(next.medium > previous.medium);
            assert!(next.high > previous.high);
            previous = next;
        }
    }

    #[test]
    fn test_sensitivity_out_of_range() {
        assert_eq!(
            TierBounds::from_sensitivity(20.0),
            Err(ConfigError::Sensitivity(20.0))
        );
        assert!(TierBounds::from_sensitivity(96.0).is_err());
    }

    #[test]
    fn test_with_sensitivity_keeps_weights() {
        let config = ThresholdConfig {
            weights: FamilyWeights::fuzzy_only(),
            ..Default::default()
        };
        let tuned = config.with_sensitivity(80.0).unwrap();
        assert_eq!(tuned.weights, FamilyWeights::fuzzy_only());
        assert_eq!(tuned.bounds.low, 80.0);
    }
}
