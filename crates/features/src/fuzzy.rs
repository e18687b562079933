use std::collections::BTreeSet;

use markclash_model::{Algorithm, SubScore};
use strsim::levenshtein;

use crate::normalize::NormalizedText;
use crate::Matcher;

/// Edit-distance and token-set sub-scores for a pair of texts.
pub fn fuzzy_score(a: &NormalizedText, b: &NormalizedText) -> Vec<SubScore> {
    [Algorithm::EditRatio, Algorithm::TokenSetRatio]
        .iter()
        .map(|algorithm| algorithm.score(a, b))
        .collect()
}

/// Levenshtein similarity as a percentage (0.0-100.0), measured in characters.
///
/// Empty input carries no signal and scores 0, even against another empty string.
pub fn edit_ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let longest = a.chars().count().max(b.chars().count()).max(1);
    let distance = levenshtein(a, b);
    (100.0 * (1.0 - distance as f64 / longest as f64)).clamp(0.0, 100.0)
}

/// Edit ratio over the sorted, de-duplicated tokens of both texts.
pub fn token_set_ratio(a: &NormalizedText, b: &NormalizedText) -> f64 {
    let set_a: BTreeSet<&str> = a.tokens().collect();
    let set_b: BTreeSet<&str> = b.tokens().collect();
    edit_ratio(&join(set_a), &join(set_b))
}

/// Edit ratio over the sorted tokens of both texts, duplicates kept.
pub fn token_sort_ratio(a: &NormalizedText, b: &NormalizedText) -> f64 {
    let mut tokens_a: Vec<&str> = a.tokens().collect();
    let mut tokens_b: Vec<&str> = b.tokens().collect();
    tokens_a.sort_unstable();
    tokens_b.sort_unstable();
    edit_ratio(&join(tokens_a), &join(tokens_b))
}

/// Best edit ratio of the shorter text against each same-length window of the longer.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let chars_a: Vec<char> = a.chars().collect();
    let chars_b: Vec<char> = b.chars().collect();
    if chars_a.len() == chars_b.len() {
        return edit_ratio(a, b);
    }

    let (short, long) = if chars_a.len() < chars_b.len() {
        (a, &chars_b)
    } else {
        (b, &chars_a)
    };
    let width = short.chars().count();

    let mut best = 0.0_f64;
    for window in long.windows(width) {
        let window: String = window.iter().collect();
        best = best.max(edit_ratio(short, &window));
        if best >= 100.0 {
            break;
        }
    }
    best
}

fn join<'a>(tokens: impl IntoIterator<Item = &'a str>) -> String {
    tokens.into_iter().collect::<Vec<_>>().join(" ")
}
