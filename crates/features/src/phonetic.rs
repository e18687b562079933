use markclash_model::{Algorithm, SubScore};
use rphonetic::{Encoder, Metaphone, Soundex};
use unicode_normalization::UnicodeNormalization;

use crate::fuzzy::edit_ratio;
use crate::normalize::NormalizedText;

/// Above this many tokens on the longer side, alignment falls back to greedy matching.
const EXACT_ALIGNMENT_LIMIT: usize = 12;

/// Phonetic encodings for a single token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhoneticCodes {
    pub soundex: String,
    pub metaphone: String,
}

/// Compute phonetic encodings for every token of a normalized text.
///
/// Tokens without any encodable letter (such as "501") use the token itself
/// as their code, so they still match themselves.
pub fn compute_phonetics(text: &NormalizedText) -> Vec<PhoneticCodes> {
    let soundex = Soundex::default();
    let metaphone = Metaphone::default();

    text.tokens()
        .map(|token| {
            let folded = fold_to_ascii(token).to_ascii_uppercase();
            if folded.is_empty() {
                return PhoneticCodes {
                    soundex: token.to_string(),
                    metaphone: token.to_string(),
                };
            }

            let soundex_code = soundex.encode(&folded);
            let metaphone_code = metaphone.encode(&folded);
            PhoneticCodes {
                soundex: if soundex_code.is_empty() { folded.clone() } else { soundex_code },
                metaphone: if metaphone_code.is_empty() { folded } else { metaphone_code },
            }
        })
        .collect()
}

/// Both phonetic sub-scores for a pair of texts.
pub fn phonetic_score(a: &NormalizedText, b: &NormalizedText) -> Vec<SubScore> {
    use crate::Matcher;

    [Algorithm::PhoneticCoarse, Algorithm::PhoneticFine]
        .iter()
        .map(|algorithm| algorithm.score(a, b))
        .collect()
}

/// Soundex equality, token-aligned.
pub(crate) fn coarse(a: &NormalizedText, b: &NormalizedText) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let (codes_a, codes_b) = (compute_phonetics(a), compute_phonetics(b));
    align_tokens(codes_a.len(), codes_b.len(), |i, j| {
        if codes_a[i].soundex == codes_b[j].soundex {
            100.0
        } else {
            0.0
        }
    })
}

/// Edit ratio over Metaphone codes, token-aligned.
pub(crate) fn fine(a: &NormalizedText, b: &NormalizedText) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let (codes_a, codes_b) = (compute_phonetics(a), compute_phonetics(b));
    align_tokens(codes_a.len(), codes_b.len(), |i, j| {
        edit_ratio(&codes_a[i].metaphone, &codes_b[j].metaphone)
    })
}

/// Score of the best one-to-one token alignment.
///
/// `pair_score(i, j)` scores left token `i` against right token `j`. The
/// alignment maximizing the summed score is found exactly while the longer
/// side has at most 12 tokens, greedily beyond that. The sum is divided by
/// the larger token count, so unmatched tokens count as zero.
pub fn align_tokens<F>(left: usize, right: usize, pair_score: F) -> f64
where
    F: Fn(usize, usize) -> f64,
{
    if left == 0 || right == 0 {
        return 0.0;
    }

    let transpose = left > right;
    let (rows, cols) = if transpose { (right, left) } else { (left, right) };
    let matrix: Vec<Vec<f64>> = (0..rows)
        .map(|r| {
            (0..cols)
                .map(|c| if transpose { pair_score(c, r) } else { pair_score(r, c) })
                .collect()
        })
        .collect();

    let total = if cols <= EXACT_ALIGNMENT_LIMIT {
        optimal_assignment(&matrix, cols)
    } else {
        greedy_assignment(&matrix)
    };
    total / cols as f64
}

/// Bitmask DP over used columns; rows are assigned in order.
fn optimal_assignment(matrix: &[Vec<f64>], cols: usize) -> f64 {
    let rows = matrix.len();
    let mut best = vec![f64::NEG_INFINITY; 1 << cols];
    best[0] = 0.0;
    let mut answer = 0.0_f64;

    for mask in 0..best.len() {
        let current = best[mask];
        if current == f64::NEG_INFINITY {
            continue;
        }
        let row = mask.count_ones() as usize;
        if row == rows {
            answer = answer.max(current);
            continue;
        }
        for col in 0..cols {
            if mask & (1 << col) != 0 {
                continue;
            }
            let next = mask | (1 << col);
            let value = current + matrix[row][col];
            if value > best[next] {
                best[next] = value;
            }
        }
    }

    answer
}

fn greedy_assignment(matrix: &[Vec<f64>]) -> f64 {
    let mut pairs: Vec<(usize, usize, f64)> = matrix
        .iter()
        .enumerate()
        .flat_map(|(r, row)| row.iter().enumerate().map(move |(c, &s)| (r, c, s)))
        .collect();
    pairs.sort_by(|a, b| b.2.total_cmp(&a.2).then(a.0.cmp(&b.0)).then(a.1.cmp(&b.1)));

    let mut row_used = vec![false; matrix.len()];
    let mut col_used = vec![false; matrix.first().map_or(0, Vec::len)];
    let mut total = 0.0;
    for (r, c, s) in pairs {
        if !row_used[r] && !col_used[c] {
            row_used[r] = true;
            col_used[c] = true;
            total += s;
        }
    }
    total
}

/// Decompose diacritics and keep ASCII letters only (lower-case).
fn fold_to_ascii(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    for ch in token.nfd() {
        for lc in ch.to_lowercase() {
            if lc.is_ascii_alphabetic() {
                out.push(lc);
            } else {
                match lc {
                    'ß' => out.push_str("ss"),
                    'æ' => out.push_str("ae"),
                    'œ' => out.push_str("oe"),
                    'ø' => out.push('o'),
                    'đ' => out.push('d'),
                    'ł' => out.push('l'),
                    _ => {}
                }
            }
        }
    }
    out
}
