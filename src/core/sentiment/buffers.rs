use std::collections::VecDeque;

use super::event::{AlertPayload, NormalizedPost};

pub const DEFAULT_FEED_CAPACITY: usize = 10;
pub const DEFAULT_TREND_CAPACITY: usize = 24;
pub const DEFAULT_ALERT_CAPACITY: usize = 10;

/// Fixed-capacity list that keeps the newest item at the front
#[derive(Debug, Clone)]
pub struct NewestFirst<T> {
    capacity: usize,
    items: VecDeque<T>,
}

impl<T> NewestFirst<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            items: VecDeque::with_capacity(capacity),
        }
    }

    /// Prepend `item`, dropping the oldest entries past capacity
    pub fn push(&mut self, item: T) {
        self.items.push_front(item);
        self.items.truncate(self.capacity);
    }

    /// Replace the contents, keeping the first `capacity` items of `items`
    pub fn replace(&mut self, items: impl IntoIterator<Item = T>) {
        self.items.clear();
        self.items.extend(items.into_iter().take(self.capacity));
    }

    pub fn newest(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Sliding window that keeps items oldest first
#[derive(Debug, Clone)]
pub struct SlidingWindow<T> {
    capacity: usize,
    items: VecDeque<T>,
}

impl<T> SlidingWindow<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            items: VecDeque::with_capacity(capacity),
        }
    }

    /// Append `item`, evicting from the front once full
    pub fn push(&mut self, item: T) {
        if self.capacity == 0 {
            return;
        }
        if self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    pub fn newest(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Recent posts feed, newest first
pub type RecentPosts = NewestFirst<NormalizedPost>;

/// Trend window, oldest first
pub type TrendBuffer = SlidingWindow<NormalizedPost>;

/// Alert panel contents, newest first
pub type AlertLog = NewestFirst<AlertPayload>;
