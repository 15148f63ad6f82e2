//! Dashboard state and the fold that applies live events to it.
//!
//! The state is a plain struct; every mutation goes through one of the
//! methods below, each keyed to a single kind of input.

use serde_json::{Map, Value};

use super::buffers::{
    AlertLog, RecentPosts, TrendBuffer, DEFAULT_ALERT_CAPACITY, DEFAULT_FEED_CAPACITY,
    DEFAULT_TREND_CAPACITY,
};
use super::distribution::SentimentDistribution;
use super::event::{AlertPayload, LiveEvent, NormalizedPost, SentimentPost};

/// Buffer sizes for the three bounded views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacities {
    pub feed: usize,
    pub trend: usize,
    pub alerts: usize,
}

impl Default for Capacities {
    fn default() -> Self {
        Self {
            feed: DEFAULT_FEED_CAPACITY,
            trend: DEFAULT_TREND_CAPACITY,
            alerts: DEFAULT_ALERT_CAPACITY,
        }
    }
}

/// What a call to [`DashboardState::apply`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Sentiment,
    Alert,
    Ignored,
}

/// Everything the dashboard renders
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub alerts: AlertLog,
    pub distribution: SentimentDistribution,
    pub live_posts: RecentPosts,
    pub trend: TrendBuffer,
    /// Sentiment events folded in since start
    pub sentiment_events: u64,
    /// Frames with an unhandled `type`
    pub ignored_events: u64,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::with_capacities(Capacities::default())
    }

    pub fn with_capacities(capacities: Capacities) -> Self {
        Self {
            alerts: AlertLog::with_capacity(capacities.alerts),
            distribution: SentimentDistribution::new(),
            live_posts: RecentPosts::with_capacity(capacities.feed),
            trend: TrendBuffer::with_capacity(capacities.trend),
            sentiment_events: 0,
            ignored_events: 0,
        }
    }

    /// Replace the alert log with a `/api/alerts` result (newest first).
    pub fn seed_alerts(&mut self, alerts: Vec<AlertPayload>) {
        self.alerts.replace(alerts);
    }

    /// Replace the distribution with a `/api/sentiment/distribution` body.
    pub fn seed_distribution(&mut self, snapshot: &Map<String, Value>) {
        self.distribution = SentimentDistribution::from_snapshot(snapshot);
    }

    /// Fold one live event into the state.
    pub fn apply(&mut self, event: LiveEvent) -> Applied {
        match event {
            LiveEvent::Sentiment(post) => {
                self.apply_sentiment(post);
                Applied::Sentiment
            }
            LiveEvent::Alert(alert) => {
                self.alerts.push(alert);
                Applied::Alert
            }
            LiveEvent::Unknown(kind) => {
                log::debug!("Ignoring live event of type {:?}", kind);
                self.ignored_events += 1;
                Applied::Ignored
            }
        }
    }

    fn apply_sentiment(&mut self, post: SentimentPost) {
        let normalized = NormalizedPost::from_post(post);
        if !normalized.sentiment.is_canonical() {
            log::debug!("Counting non-canonical label {:?}", normalized.sentiment.as_str());
        }

        // Feed, counts and trend move together for every accepted event.
        self.distribution.increment(&normalized.sentiment);
        self.trend.push(normalized.clone());
        self.live_posts.push(normalized);
        self.sentiment_events += 1;
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}
