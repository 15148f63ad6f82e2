// End-to-end folding of wire frames into dashboard state, as the live
// dashboard sees them.

use sentiment_dash::core::sentiment::{
    decode_event, Applied, DashboardState, PieChart, SentimentLabel, TrendSeries,
};
use serde_json::json;

use super::support::sentiment_frame;

fn apply_frame(state: &mut DashboardState, frame: &str) -> Applied {
    state.apply(decode_event(frame).unwrap())
}

#[test]
fn test_alternating_run_keeps_last_24_in_trend() {
    let mut state = DashboardState::new();
    for i in 1..=25 {
        let label = if i % 2 == 1 { "positive" } else { "negative" };
        apply_frame(&mut state, &sentiment_frame(label, &format!("p{}", i)));
    }

    assert_eq!(state.distribution.positive, 13);
    assert_eq!(state.distribution.negative, 12);
    assert_eq!(state.live_posts.len(), 10);
    assert_eq!(state.trend.len(), 24);

    let series = TrendSeries::from_buffer(&state.trend);
    assert_eq!(series.len(), 24);
    // First event fell out of the window; the remaining run starts negative
    assert_eq!(series.positive[0], 0);
    assert_eq!(series.negative[0], 1);
    assert_eq!(series.positive.last(), Some(&12));
    assert_eq!(series.negative.last(), Some(&12));

    let newest = state.live_posts.newest().unwrap();
    assert_eq!(newest.post_id().as_deref(), Some("p25"));
    assert_eq!(newest.sentiment, SentimentLabel::Positive);
}

#[test]
fn test_interleaved_alert_and_sentiment() {
    let mut state = DashboardState::new();

    assert_eq!(
        apply_frame(&mut state, r#"{"type":"alert","ratio":0.35,"post_count":12}"#),
        Applied::Alert
    );
    assert_eq!(
        apply_frame(&mut state, &sentiment_frame("Negative", "p1")),
        Applied::Sentiment
    );
    assert_eq!(
        apply_frame(&mut state, r#"{"type":"alert","ratio":0.5}"#),
        Applied::Alert
    );

    assert_eq!(state.alerts.len(), 2);
    assert_eq!(state.alerts.newest().unwrap().0["ratio"], json!(0.5));
    assert_eq!(state.distribution.negative, 1);
    assert_eq!(state.distribution.total(), 1);
    assert_eq!(state.live_posts.len(), 1);
    assert_eq!(state.trend.len(), 1);
}

#[test]
fn test_seeded_distribution_then_live_increments() {
    let mut state = DashboardState::new();
    state.seed_distribution(json!({"positive": 5, "negative": 2}).as_object().unwrap());

    assert_eq!(state.distribution.positive, 5);
    assert_eq!(state.distribution.negative, 2);
    assert_eq!(state.distribution.neutral, 0);

    apply_frame(&mut state, &sentiment_frame("NEUTRAL", "p1"));
    apply_frame(&mut state, &sentiment_frame("positive", "p2"));

    assert_eq!(state.distribution.positive, 6);
    assert_eq!(state.distribution.neutral, 1);
    assert_eq!(state.distribution.total(), 9);

    let pie = PieChart::from_distribution(&state.distribution);
    let labels: Vec<_> = pie.slices.iter().map(|s| s.label.clone()).collect();
    assert_eq!(
        labels,
        vec![
            SentimentLabel::Positive,
            SentimentLabel::Negative,
            SentimentLabel::Neutral
        ]
    );
    assert_eq!(pie.total, 9);
}

#[test]
fn test_buffers_are_capped() {
    let mut state = DashboardState::new();
    for i in 0..40 {
        apply_frame(&mut state, &sentiment_frame("neutral", &format!("p{}", i)));
        apply_frame(&mut state, &format!(r#"{{"type":"alert","id":{}}}"#, i));
    }

    assert_eq!(state.live_posts.len(), 10);
    assert_eq!(state.trend.len(), 24);
    assert_eq!(state.alerts.len(), 10);
    assert_eq!(state.alerts.newest().unwrap().0["id"], json!(39));
    assert_eq!(state.distribution.neutral, 40);
}

#[test]
fn test_unknown_types_and_other_labels() {
    let mut state = DashboardState::new();

    assert_eq!(
        apply_frame(&mut state, r#"{"type":"heartbeat","ts":1}"#),
        Applied::Ignored
    );
    assert_eq!(
        apply_frame(&mut state, &sentiment_frame("mixed", "p1")),
        Applied::Sentiment
    );

    assert_eq!(state.ignored_events, 1);
    assert_eq!(
        state.live_posts.newest().unwrap().sentiment,
        SentimentLabel::Other("Mixed".to_string())
    );
    // Extra buckets stay out of the total and the pie
    assert_eq!(state.distribution.total(), 0);
    assert!(PieChart::from_distribution(&state.distribution).is_empty());
}

#[test]
fn test_malformed_frames_are_rejected() {
    assert!(decode_event("{").is_err());
    assert!(decode_event(r#"[1, 2]"#).is_err());
    assert!(decode_event(r#"{"sentiment":"positive"}"#).is_err());
    assert!(decode_event(r#"{"type":"sentiment","sentiment":3}"#).is_err());
}
