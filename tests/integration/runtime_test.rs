use sentiment_dash::core::{Config, ConnectionStatus, DashboardRuntime, DashboardSnapshot, ReconnectPolicy};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::support::{
    sentiment_frame, spawn_http, spawn_ws_held_open, spawn_ws_watching_close, Routes,
};

fn wait_for(
    runtime: &DashboardRuntime,
    what: &str,
    condition: impl Fn(&DashboardSnapshot) -> bool,
) -> Arc<DashboardSnapshot> {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        let snapshot = runtime.snapshot();
        if condition(&snapshot) {
            return snapshot;
        }
        assert!(Instant::now() < deadline, "timed out waiting for {}", what);
        std::thread::sleep(Duration::from_millis(20));
    }
}

#[test]
fn test_dashboard_runtime_seeds_then_streams() {
    // Backends live on their own runtime; the dashboard builds its own
    let server_rt = tokio::runtime::Runtime::new().unwrap();

    let mut routes = Routes::new();
    routes.insert(
        "/api/sentiment/distribution",
        (200, r#"{"positive": 5, "negative": 2}"#.to_string()),
    );
    routes.insert(
        "/api/alerts",
        (200, r#"[{"alert_type":"negative_spike","actual_value":0.6}]"#.to_string()),
    );
    let http_addr = server_rt.block_on(spawn_http(routes));
    let ws_addr = server_rt.block_on(spawn_ws_held_open(vec![
        sentiment_frame("positive", "p1"),
        "garbage".to_string(),
        sentiment_frame("negative", "p2"),
    ]));

    let config = Config {
        api_base: format!("http://{}", http_addr),
        ws_url: Some(format!("ws://{}/ws/live", ws_addr)),
        fetch_retries: 0,
        ..Default::default()
    };

    let runtime = DashboardRuntime::start(&config).unwrap();

    let snapshot = wait_for(&runtime, "seed and stream", |s| {
        s.state.alerts.len() == 1
            && s.state.distribution.positive >= 5
            && s.state.live_posts.len() == 2
            && s.dropped_frames == 1
    });

    assert_eq!(snapshot.connection, ConnectionStatus::Connected);
    assert!(snapshot.last_fetch_at.is_some());
    assert_eq!(snapshot.state.live_posts.newest().unwrap().post_id().as_deref(), Some("p2"));
    assert_eq!(snapshot.state.trend.len(), 2);

    // The stream may land before or after the seed; the seed replaces counts
    let dist = &snapshot.state.distribution;
    assert!(dist.positive == 5 || dist.positive == 6, "positive = {}", dist.positive);
    assert!(dist.negative == 2 || dist.negative == 3, "negative = {}", dist.negative);

    runtime.shutdown();
}

#[test]
fn test_dashboard_runtime_survives_backend_down() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = Config {
        api_base: format!("http://{}", addr),
        fetch_retries: 0,
        reconnect: ReconnectPolicy {
            enabled: false,
            ..Default::default()
        },
        ..Default::default()
    };

    let runtime = DashboardRuntime::start(&config).unwrap();

    let snapshot = wait_for(&runtime, "fetch failure and closed stream", |s| {
        s.fetch_error().is_some() && matches!(s.connection, ConnectionStatus::Closed(_))
    });

    assert!(snapshot.state.alerts.is_empty());
    assert_eq!(snapshot.state.distribution.total(), 0);
    assert!(snapshot.last_fetch_at.is_none());

    // Refresh is accepted even with the backend down
    assert!(runtime.request_refresh());
    runtime.shutdown();
}

#[test]
fn test_dropping_runtime_closes_stream() {
    let server_rt = tokio::runtime::Runtime::new().unwrap();
    let (ws_addr, close_seen) =
        server_rt.block_on(spawn_ws_watching_close(vec![sentiment_frame("positive", "p1")]));

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let api_addr = listener.local_addr().unwrap();
    drop(listener);

    let config = Config {
        api_base: format!("http://{}", api_addr),
        ws_url: Some(format!("ws://{}/ws/live", ws_addr)),
        fetch_retries: 0,
        ..Default::default()
    };

    let runtime = DashboardRuntime::start(&config).unwrap();
    wait_for(&runtime, "first live event", |s| {
        s.connection == ConnectionStatus::Connected && s.state.live_posts.len() == 1
    });

    let started = Instant::now();
    drop(runtime);
    assert!(started.elapsed() < Duration::from_secs(3));

    let saw_close = server_rt
        .block_on(async { tokio::time::timeout(Duration::from_secs(2), close_seen).await })
        .expect("server never heard from the client")
        .unwrap_or(false);
    assert!(saw_close, "connection ended without a Close frame");
}
