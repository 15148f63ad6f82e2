//! Sentiment data model and the live-feed fold.
//!
//! Raw stream frames are decoded into [`LiveEvent`]s, labels are normalized,
//! and each event is folded into a [`DashboardState`]. Chart models are
//! derived from that state on demand.

pub mod buffers;
pub mod charts;
pub mod distribution;
pub mod event;
pub mod label;
pub mod state;

pub use buffers::{AlertLog, NewestFirst, RecentPosts, SlidingWindow, TrendBuffer};
pub use charts::{PieChart, PieSlice, TrendSeries};
pub use distribution::SentimentDistribution;
pub use event::{decode_event, AlertPayload, LiveEvent, NormalizedPost, SentimentPost};
pub use label::{normalize_label, SentimentLabel, CANONICAL_LABELS};
pub use state::{Applied, Capacities, DashboardState};
