//! Feature extraction for trademark comparison.
//!
//! Provides pure functions that turn two texts into similarity sub-scores:
//! - Text normalization (`Normalizer`)
//! - Phonetic matching (Soundex, Metaphone) with token alignment
//! - Fuzzy matching (edit ratio, token set/sort ratio, partial ratio)
//!
//! Every algorithm in [`Algorithm`] is reachable through the [`Matcher`]
//! capability, so callers can score an arbitrary algorithm list generically.

mod fuzzy;
mod normalize;
mod phonetic;

pub use fuzzy::{edit_ratio, fuzzy_score, partial_ratio, token_set_ratio, token_sort_ratio};
pub use normalize::{normalize, NormalizedText, Normalizer, NormalizerConfig};
pub use phonetic::{align_tokens, compute_phonetics, phonetic_score, PhoneticCodes};

use markclash_model::{Algorithm, SubScore};

/// Something that produces a sub-score from two normalized texts.
pub trait Matcher {
    fn algorithm(&self) -> Algorithm;

    fn score(&self, a: &NormalizedText, b: &NormalizedText) -> SubScore;
}

impl Matcher for Algorithm {
    fn algorithm(&self) -> Algorithm {
        *self
    }

    fn score(&self, a: &NormalizedText, b: &NormalizedText) -> SubScore {
        // Fixed argument order makes every algorithm bit-for-bit symmetric.
        let (a, b) = if a.as_str() <= b.as_str() { (a, b) } else { (b, a) };

        let value = match self {
            Algorithm::PhoneticCoarse => phonetic::coarse(a, b),
            Algorithm::PhoneticFine => phonetic::fine(a, b),
            Algorithm::EditRatio => edit_ratio(a.as_str(), b.as_str()),
            Algorithm::TokenSetRatio => token_set_ratio(a, b),
            Algorithm::TokenSortRatio => token_sort_ratio(a, b),
            Algorithm::PartialRatio => partial_ratio(a.as_str(), b.as_str()),
        };
        SubScore::new(*self, value)
    }
}

/// Score two texts with each algorithm in order.
pub fn score_all(algorithms: &[Algorithm], a: &NormalizedText, b: &NormalizedText) -> Vec<SubScore> {
    algorithms.iter().map(|algorithm| algorithm.score(a, b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_all_keeps_order() {
        let a = normalize("Kromax");
        let b = normalize("Cromax");
        let scores = score_all(&Algorithm::ALL, &a, &b);
        let order: Vec<_> = scores.iter().map(|s| s.algorithm).collect();
        assert_eq!(order, Algorithm::ALL.to_vec());
    }

    #[test]
    fn test_every_algorithm_identity() {
        let a = normalize("Blue Water Foods");
        for algorithm in Algorithm::ALL {
            assert_eq!(algorithm.score(&a, &a).value, 100.0, "{}", algorithm);
        }
    }

    #[test]
    fn test_every_algorithm_empty_is_zero() {
        let a = normalize("Blue Water Foods");
        let empty = normalize("");
        for algorithm in Algorithm::ALL {
            assert_eq!(algorithm.score(&a, &empty).value, 0.0, "{}", algorithm);
            assert_eq!(algorithm.score(&empty, &empty).value, 0.0, "{}", algorithm);
        }
    }
}
