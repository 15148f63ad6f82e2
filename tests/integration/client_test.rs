use sentiment_dash::core::ApiClient;
use sentiment_dash::{DashError, SentimentDistribution};
use serde_json::json;

use super::support::{spawn_http, Routes};

fn backend_routes() -> Routes {
    let mut routes = Routes::new();
    routes.insert(
        "/api/sentiment/distribution",
        (200, r#"{"Positive": 5, "negative": 2, "mixed": 9}"#.to_string()),
    );
    routes.insert(
        "/api/alerts",
        (
            200,
            r#"[{"alert_type":"negative_spike","actual_value":0.61,"post_count":40}]"#.to_string(),
        ),
    );
    routes.insert(
        "/api/posts",
        (
            200,
            r#"[{"post_id":"p1","content":"hello","sentiment":"positive","emotion":"joy"},
               {"post_id":7}]"#
                .to_string(),
        ),
    );
    routes.insert("/api/health", (200, r#"{"status":"healthy"}"#.to_string()));
    routes
}

#[tokio::test]
async fn test_distribution_keys_pass_through() {
    let addr = spawn_http(backend_routes()).await;
    let client = ApiClient::new(format!("http://{}", addr));

    let raw = client.fetch_sentiment_distribution().await.unwrap();
    assert_eq!(raw.get("Positive"), Some(&json!(5)));
    assert_eq!(raw.get("mixed"), Some(&json!(9)));

    let distribution = SentimentDistribution::from_snapshot(&raw);
    assert_eq!(distribution.positive, 5);
    assert_eq!(distribution.negative, 2);
    assert_eq!(distribution.neutral, 0);
    assert_eq!(distribution.total(), 7);
}

#[tokio::test]
async fn test_fetch_alerts_and_posts() {
    let addr = spawn_http(backend_routes()).await;
    let client = ApiClient::new(format!("http://{}/", addr));

    let alerts = client.fetch_alerts().await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].kind(), "negative_spike");
    assert_eq!(alerts[0].post_count(), Some(40));

    let posts = client.fetch_posts(500, 0).await.unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].sentiment.as_deref(), Some("positive"));
    assert_eq!(posts[1].post_id, json!(7));
    assert!(posts[1].content.is_none());

    assert!(client.health().await.unwrap().is_healthy());
}

#[tokio::test]
async fn test_non_success_status_is_request_error() {
    let mut routes = Routes::new();
    routes.insert("/api/alerts", (500, r#"{"detail":"boom"}"#.to_string()));
    let addr = spawn_http(routes).await;
    let client = ApiClient::new(format!("http://{}", addr));

    let err = client.fetch_alerts().await.unwrap_err();
    assert!(matches!(err, DashError::Request(_)), "got {:?}", err);

    // Unrouted path answers 404
    let err = client.fetch_sentiment_distribution().await.unwrap_err();
    assert!(matches!(err, DashError::Request(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_unreachable_backend_is_request_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::new(format!("http://{}", addr));
    assert!(matches!(
        client.health().await,
        Err(DashError::Request(_))
    ));
}
