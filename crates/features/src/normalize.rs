use serde::{Deserialize, Serialize};

/// Punctuation handling for the normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NormalizerConfig {
    /// Punctuation kept verbatim (e.g. "&" when it distinguishes marks)
    pub preserve: String,
    /// Characters dropped without leaving a gap
    pub remove: String,
    /// Keep a period that sits between two alphanumerics ("a.b.c", "3.0")
    pub keep_inner_periods: bool,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            preserve: String::new(),
            remove: "'\u{2018}\u{2019}`".to_string(),
            keep_inner_periods: true,
        }
    }
}

/// Canonical form of a text field, shared by all matchers.
///
/// Lower-case, single-spaced, trimmed. Only a [`Normalizer`] can build one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length in Unicode scalar values.
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.split(' ').filter(|t| !t.is_empty())
    }
}

impl std::fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Text normalizer. Cheap to clone and safe to share across threads.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Normalize text for comparison. Empty or all-punctuation input yields an empty value.
    pub fn normalize(&self, text: &str) -> NormalizedText {
        let chars: Vec<char> = text.chars().collect();
        let mut out = String::with_capacity(text.len());

        for (i, &c) in chars.iter().enumerate() {
            if c.is_alphanumeric() {
                out.extend(c.to_lowercase());
            } else if c.is_whitespace() {
                out.push(' ');
            } else if self.config.remove.contains(c) {
                continue;
            } else if self.config.preserve.contains(c) {
                out.push(c);
            } else if c == '.' && self.config.keep_inner_periods && is_inner(&chars, i) {
                out.push('.');
            } else {
                out.push(' ');
            }
        }

        NormalizedText(out.split_whitespace().collect::<Vec<_>>().join(" "))
    }
}

fn is_inner(chars: &[char], i: usize) -> bool {
    let before = i.checked_sub(1).and_then(|j| chars.get(j));
    let after = chars.get(i + 1);
    matches!((before, after), (Some(b), Some(a)) if b.is_alphanumeric() && a.is_alphanumeric())
}

/// Normalize with the default configuration.
pub fn normalize(text: &str) -> NormalizedText {
    Normalizer::default().normalize(text)
}
