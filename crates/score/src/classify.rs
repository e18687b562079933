use markclash_model::{ConfigError, Tier, TierBounds};

/// Maps composite scores to conflict tiers. Construction validates the bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConflictClassifier {
    bounds: TierBounds,
}

impl ConflictClassifier {
    pub fn new(bounds: TierBounds) -> Result<Self, ConfigError> {
        bounds.validate()?;
        Ok(Self { bounds })
    }

    pub fn bounds(&self) -> &TierBounds {
        &self.bounds
    }

    /// Lower edges are inclusive: a score equal to `high` is High.
    pub fn classify(&self, score: f64) -> Tier {
        let TierBounds { low, medium, high } = self.bounds;
        if score >= high {
            Tier::High
        } else if score >= medium {
            Tier::Medium
        } else if score >= low {
            Tier::Low
        } else {
            Tier::Minimal
        }
    }
}

/// One-off classification; rejects unordered bounds.
pub fn classify(score: f64, bounds: &TierBounds) -> Result<Tier, ConfigError> {
    Ok(ConflictClassifier::new(*bounds)?.classify(score))
}
