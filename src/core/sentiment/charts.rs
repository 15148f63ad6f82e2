//! Chart models derived from dashboard state.
//!
//! These are pure functions of the state; the TUI turns them into widgets.

use super::buffers::TrendBuffer;
use super::distribution::SentimentDistribution;
use super::label::SentimentLabel;

/// One pie slice
#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: SentimentLabel,
    pub value: u64,
    /// Share of the total in `0.0..=1.0`
    pub fraction: f64,
}

/// Three-slice distribution pie in fixed Positive, Negative, Neutral order
#[derive(Debug, Clone, PartialEq)]
pub struct PieChart {
    pub slices: Vec<PieSlice>,
    pub total: u64,
}

impl PieChart {
    pub fn from_distribution(distribution: &SentimentDistribution) -> Self {
        let total = distribution.total();
        let slices = distribution
            .canonical_counts()
            .into_iter()
            .map(|(label, value)| PieSlice {
                label,
                value,
                fraction: if total == 0 {
                    0.0
                } else {
                    value as f64 / total as f64
                },
            })
            .collect();

        Self { slices, total }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Slice under `turn`, a position around the circle in `0.0..1.0`
    /// measured clockwise from twelve o'clock.
    pub fn slice_at(&self, turn: f64) -> Option<&PieSlice> {
        if self.is_empty() {
            return None;
        }

        let mut end = 0.0;
        for slice in self.slices.iter().filter(|s| s.value > 0) {
            end += slice.fraction;
            if turn < end {
                return Some(slice);
            }
        }

        // Rounding can leave the last sliver uncovered
        self.slices.iter().rev().find(|s| s.value > 0)
    }
}

/// Cumulative positive/negative counts over the trend window
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrendSeries {
    pub positive: Vec<u64>,
    pub negative: Vec<u64>,
}

impl TrendSeries {
    /// Scan the buffer oldest to newest, recording both running counts at
    /// every position. Neutral and other labels advance neither counter.
    pub fn from_buffer(buffer: &TrendBuffer) -> Self {
        let mut positive_so_far = 0;
        let mut negative_so_far = 0;
        let mut series = Self {
            positive: Vec::with_capacity(buffer.len()),
            negative: Vec::with_capacity(buffer.len()),
        };

        for post in buffer.iter() {
            match post.sentiment {
                SentimentLabel::Positive => positive_so_far += 1,
                SentimentLabel::Negative => negative_so_far += 1,
                _ => {}
            }
            series.positive.push(positive_so_far);
            series.negative.push(negative_so_far);
        }

        series
    }

    pub fn len(&self) -> usize {
        self.positive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positive.is_empty()
    }

    /// Highest value on either line
    pub fn max_value(&self) -> u64 {
        let last_pos = self.positive.last().copied().unwrap_or(0);
        let last_neg = self.negative.last().copied().unwrap_or(0);
        last_pos.max(last_neg)
    }

    /// `(x, y)` points with a 1-based position on the x axis
    pub fn positive_points(&self) -> Vec<(f64, f64)> {
        Self::points(&self.positive)
    }

    pub fn negative_points(&self) -> Vec<(f64, f64)> {
        Self::points(&self.negative)
    }

    fn points(values: &[u64]) -> Vec<(f64, f64)> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| ((i + 1) as f64, v as f64))
            .collect()
    }
}
