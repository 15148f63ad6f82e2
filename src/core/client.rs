//! REST client for the sentiment backend.
//!
//! A thin pass-through: responses come back as parsed JSON and the caller
//! decides how to normalize them.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::sentiment::AlertPayload;
use crate::error::{DashError, Result};

pub const MAX_POSTS_PAGE: u32 = 100;

/// Row of `GET /api/posts`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub post_id: Value,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub sentiment: Option<String>,
    #[serde(default)]
    pub emotion: Option<String>,
}

/// Body of `GET /api/health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: String,
}

impl ApiClient {
    pub fn new(base: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base)
    }

    pub fn with_client(http: Client, base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self { http, base }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// `GET /api/alerts`, newest first as the backend orders them.
    pub async fn fetch_alerts(&self) -> Result<Vec<AlertPayload>> {
        self.get_json("/api/alerts", &[]).await
    }

    /// `GET /api/sentiment/distribution`, keys untouched.
    pub async fn fetch_sentiment_distribution(&self) -> Result<Map<String, Value>> {
        self.get_json("/api/sentiment/distribution", &[]).await
    }

    /// `GET /api/posts`; `limit` is clamped to what the backend accepts.
    pub async fn fetch_posts(&self, limit: u32, offset: u32) -> Result<Vec<PostRecord>> {
        let limit = limit.clamp(1, MAX_POSTS_PAGE).to_string();
        let offset = offset.to_string();
        self.get_json(
            "/api/posts",
            &[("limit", limit.as_str()), ("offset", offset.as_str())],
        )
        .await
    }

    /// `GET /api/health`
    pub async fn health(&self) -> Result<HealthStatus> {
        self.get_json("/api/health", &[]).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base, path);
        log::debug!("GET {}", url);

        let response = self.http.get(&url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DashError::request(format!(
                "GET {} returned status {}: {}",
                url,
                status,
                body.trim()
            )));
        }

        Ok(response.json::<T>().await?)
    }
}
