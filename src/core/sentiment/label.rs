//! Sentiment label normalization.
//!
//! The backend emits labels in whatever casing its model produced
//! (`"POSITIVE"`, `"negative"`, ...). Every label is rewritten to a single
//! canonical casing before it touches dashboard state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical order used by the pie chart, the stats row and snapshots.
pub const CANONICAL_LABELS: [&str; 3] = ["Positive", "Negative", "Neutral"];

/// Normalize a raw label: first character upper-cased, the rest lower-cased.
///
/// Surrounding whitespace is ignored and an empty label falls back to
/// `"Neutral"`. Applying this twice yields the same string.
pub fn normalize_label(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut chars = trimmed.chars();

    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => "Neutral".to_string(),
    }
}

/// A normalized sentiment label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
    /// Any label outside the canonical three, kept in its normalized casing
    Other(String),
}

impl SentimentLabel {
    /// Normalize `raw` and classify it.
    pub fn from_raw(raw: &str) -> Self {
        let normalized = normalize_label(raw);
        match normalized.as_str() {
            "Positive" => SentimentLabel::Positive,
            "Negative" => SentimentLabel::Negative,
            "Neutral" => SentimentLabel::Neutral,
            _ => SentimentLabel::Other(normalized),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Other(label) => label,
        }
    }

    pub fn is_canonical(&self) -> bool {
        !matches!(self, SentimentLabel::Other(_))
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for SentimentLabel {
    fn from(raw: String) -> Self {
        SentimentLabel::from_raw(&raw)
    }
}

impl From<SentimentLabel> for String {
    fn from(label: SentimentLabel) -> Self {
        label.as_str().to_string()
    }
}
