use sentiment_dash::core::{live_stream_task, ConnectionStatus, ReconnectPolicy, StreamMessage};
use sentiment_dash::LiveEvent;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

use super::support::{sentiment_frame, spawn_ws, spawn_ws_held_open};

fn no_reconnect() -> ReconnectPolicy {
    ReconnectPolicy {
        enabled: false,
        ..Default::default()
    }
}

async fn collect_until_closed(mut rx: mpsc::Receiver<StreamMessage>) -> Vec<StreamMessage> {
    let mut messages = Vec::new();
    let collect = async {
        while let Some(message) = rx.recv().await {
            let done = matches!(message, StreamMessage::Status(ConnectionStatus::Closed(_)));
            messages.push(message);
            if done {
                break;
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(10), collect)
        .await
        .expect("stream task did not finish");
    messages
}

#[tokio::test]
async fn test_frames_arrive_in_order_and_malformed_is_survived() {
    let addr = spawn_ws(vec![
        sentiment_frame("positive", "p1"),
        "not json at all".to_string(),
        r#"{"type":"alert","ratio":0.4}"#.to_string(),
        r#"{"type":"heartbeat"}"#.to_string(),
        sentiment_frame("NEGATIVE", "p2"),
    ])
    .await;

    let (tx, rx) = mpsc::channel::<StreamMessage>(64);
    let (_shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    let task = tokio::spawn(live_stream_task(
        format!("ws://{}/ws/live", addr),
        no_reconnect(),
        tx,
        shutdown_rx,
    ));

    let messages = collect_until_closed(rx).await;
    task.await.unwrap();

    assert_eq!(
        messages.first(),
        Some(&StreamMessage::Status(ConnectionStatus::Connecting))
    );
    assert_eq!(
        messages.get(1),
        Some(&StreamMessage::Status(ConnectionStatus::Connected))
    );

    let kinds: Vec<String> = messages
        .iter()
        .filter_map(|m| match m {
            StreamMessage::Event(event) => Some(event.kind().to_string()),
            StreamMessage::Malformed(_) => Some("malformed".to_string()),
            StreamMessage::Status(_) => None,
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["sentiment", "malformed", "alert", "heartbeat", "sentiment"]
    );

    let labels: Vec<&str> = messages
        .iter()
        .filter_map(|m| match m {
            StreamMessage::Event(LiveEvent::Sentiment(post)) => Some(post.sentiment.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(labels, vec!["positive", "NEGATIVE"]);

    assert!(matches!(
        messages.last(),
        Some(StreamMessage::Status(ConnectionStatus::Closed(_)))
    ));
}

#[tokio::test]
async fn test_shutdown_closes_open_connection() {
    let addr = spawn_ws_held_open(vec![sentiment_frame("neutral", "p1")]).await;

    let (tx, mut rx) = mpsc::channel::<StreamMessage>(64);
    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    let task = tokio::spawn(live_stream_task(
        format!("ws://{}/ws/live", addr),
        ReconnectPolicy::default(),
        tx,
        shutdown_rx,
    ));

    // Wait for the first event, then ask the task to stop
    let first_event = tokio::time::timeout(Duration::from_secs(10), async {
        while let Some(message) = rx.recv().await {
            if let StreamMessage::Event(event) = message {
                return Some(event);
            }
        }
        None
    })
    .await
    .unwrap();
    assert!(matches!(first_event, Some(LiveEvent::Sentiment(_))));

    shutdown_tx.send(()).unwrap();
    let rest = collect_until_closed(rx).await;
    assert_eq!(
        rest.last(),
        Some(&StreamMessage::Status(ConnectionStatus::Closed(
            "shutdown".to_string()
        )))
    );
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_refused_connection_reports_reconnect_then_gives_up() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let policy = ReconnectPolicy {
        enabled: true,
        initial_delay_ms: 10,
        max_delay_ms: 20,
        max_attempts: Some(2),
    };

    let (tx, rx) = mpsc::channel::<StreamMessage>(64);
    let (_shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    tokio::spawn(live_stream_task(
        format!("ws://{}/ws/live", addr),
        policy,
        tx,
        shutdown_rx,
    ));

    let messages = collect_until_closed(rx).await;
    let attempts: Vec<u32> = messages
        .iter()
        .filter_map(|m| match m {
            StreamMessage::Status(ConnectionStatus::Reconnecting { attempt, .. }) => Some(*attempt),
            _ => None,
        })
        .collect();
    assert_eq!(attempts, vec![1, 2]);
    assert!(!messages
        .iter()
        .any(|m| matches!(m, StreamMessage::Status(ConnectionStatus::Connected))));

    match messages.last() {
        Some(StreamMessage::Status(ConnectionStatus::Closed(reason))) => {
            assert!(reason.starts_with("Live stream connection error"), "{}", reason)
        }
        other => panic!("expected a closed status, got {:?}", other),
    }
}
