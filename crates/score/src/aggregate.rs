use markclash_model::{Family, FamilyWeights, SubScore};

/// Family means and the weighted composite for one field pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregate {
    pub composite: f64,
    pub phonetic: Option<f64>,
    pub fuzzy: Option<f64>,
}

impl Aggregate {
    pub fn family(&self, family: Family) -> Option<f64> {
        match family {
            Family::Phonetic => self.phonetic,
            Family::Fuzzy => self.fuzzy,
        }
    }
}

/// Round to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn weight_of(weights: &FamilyWeights, family: Family) -> f64 {
    match family {
        Family::Phonetic => weights.phonetic,
        Family::Fuzzy => weights.fuzzy,
    }
}

/// Arithmetic mean of one family's sub-scores, `None` when the family produced none.
pub fn family_mean(sub_scores: &[SubScore], family: Family) -> Option<f64> {
    let values: Vec<f64> = sub_scores
        .iter()
        .filter(|s| s.algorithm.family() == family)
        .map(|s| s.value)
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Combine sub-scores into a composite in [0, 100], rounded to two decimals.
///
/// Families without sub-scores drop out and their weight is spread over the
/// remaining families in proportion to their own weights. With no active
/// weight left the composite is 0.
pub fn aggregate(sub_scores: &[SubScore], weights: &FamilyWeights) -> Aggregate {
    let means: Vec<(Family, f64)> = Family::ALL
        .iter()
        .filter_map(|&family| family_mean(sub_scores, family).map(|mean| (family, mean)))
        .collect();

    let active_weight: f64 = means.iter().map(|(family, _)| weight_of(weights, *family)).sum();
    let composite = if active_weight > 0.0 {
        means
            .iter()
            .map(|(family, mean)| weight_of(weights, *family) / active_weight * mean)
            .sum::<f64>()
    } else {
        0.0
    };

    let rounded = |family: Family| family_mean(sub_scores, family).map(round2);
    Aggregate {
        composite: round2(composite.clamp(0.0, 100.0)),
        phonetic: rounded(Family::Phonetic),
        fuzzy: rounded(Family::Fuzzy),
    }
}
