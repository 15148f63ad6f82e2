//! Per-label counts of classified posts.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::label::{normalize_label, SentimentLabel, CANONICAL_LABELS};

/// Sentiment counts.
///
/// The three canonical buckets always exist. Labels outside them get their own
/// bucket on first sight and are excluded from [`total`](Self::total).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SentimentDistribution {
    #[serde(rename = "Positive")]
    pub positive: u64,
    #[serde(rename = "Negative")]
    pub negative: u64,
    #[serde(rename = "Neutral")]
    pub neutral: u64,
    #[serde(flatten)]
    pub other: BTreeMap<String, u64>,
}

impl SentimentDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from a `/api/sentiment/distribution` body.
    ///
    /// The backend groups by stored label, so keys may be `positive` or
    /// `Positive`. The lower-case key wins when it holds a non-zero count,
    /// then the capitalized key, then any other casing. Missing or
    /// non-numeric values count as zero. Other keys become extra buckets
    /// under their normalized name.
    pub fn from_snapshot(snapshot: &Map<String, Value>) -> Self {
        let mut distribution = Self::new();

        for name in CANONICAL_LABELS {
            let lower = name.to_lowercase();
            let exact = [lower.as_str(), name]
                .into_iter()
                .filter_map(|key| snapshot.get(key).and_then(value_as_count))
                .find(|&count| count > 0);

            let count = exact
                .or_else(|| {
                    snapshot
                        .iter()
                        .filter(|(key, _)| normalize_label(key) == name)
                        .filter_map(|(_, value)| value_as_count(value))
                        .find(|&count| count > 0)
                })
                .unwrap_or(0);

            *distribution.canonical_mut(name) = count;
        }

        for (key, value) in snapshot {
            let SentimentLabel::Other(name) = SentimentLabel::from_raw(key) else {
                continue;
            };
            let Some(count) = value_as_count(value).filter(|&count| count > 0) else {
                continue;
            };
            // Same first-non-zero rule as the canonical buckets
            distribution.other.entry(name).or_insert(count);
        }

        distribution
    }

    fn canonical_mut(&mut self, name: &str) -> &mut u64 {
        match name {
            "Positive" => &mut self.positive,
            "Negative" => &mut self.negative,
            _ => &mut self.neutral,
        }
    }

    pub fn get(&self, label: &SentimentLabel) -> u64 {
        match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.neutral,
            SentimentLabel::Other(name) => self.other.get(name).copied().unwrap_or(0),
        }
    }

    pub fn increment(&mut self, label: &SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Negative => self.negative += 1,
            SentimentLabel::Neutral => self.neutral += 1,
            SentimentLabel::Other(name) => *self.other.entry(name.clone()).or_insert(0) += 1,
        }
    }

    /// Positive + Negative + Neutral.
    pub fn total(&self) -> u64 {
        self.positive + self.negative + self.neutral
    }

    /// Canonical buckets in display order.
    pub fn canonical_counts(&self) -> [(SentimentLabel, u64); 3] {
        CANONICAL_LABELS.map(|name| {
            let label = SentimentLabel::from_raw(name);
            let count = self.get(&label);
            (label, count)
        })
    }

    /// Count as a percentage of [`total`](Self::total), 0.0 when empty.
    pub fn percentage(&self, label: &SentimentLabel) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.get(label) as f64 * 100.0 / total as f64
    }
}

fn value_as_count(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|v| *v >= 0.0).map(|v| v as u64))
}
