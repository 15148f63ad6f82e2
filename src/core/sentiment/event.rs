//! Live events delivered on the `/ws/live` stream.
//!
//! Every frame is a JSON object discriminated by its `type` field:
//!
//! ```text
//! {"type": "sentiment", "post_id": "p-1", "sentiment": "positive", "emotion": "joy"}
//! {"type": "alert", "ratio": 0.42, "post_count": 17, "window_start": "...", "window_end": "..."}
//! ```

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::label::SentimentLabel;
use crate::error::{DashError, Result};

/// A decoded stream frame.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveEvent {
    Sentiment(SentimentPost),
    Alert(AlertPayload),
    /// A well-formed frame whose `type` this dashboard does not handle
    Unknown(String),
}

impl LiveEvent {
    pub fn kind(&self) -> &str {
        match self {
            LiveEvent::Sentiment(_) => "sentiment",
            LiveEvent::Alert(_) => "alert",
            LiveEvent::Unknown(kind) => kind,
        }
    }
}

/// A classified post as it arrives, label still in backend casing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentPost {
    pub sentiment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Every other field (`post_id`, `source`, ...) passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A sentiment post after label normalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedPost {
    pub sentiment: SentimentLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(skip)]
    pub received_at: DateTime<Local>,
}

impl NormalizedPost {
    pub fn from_post(post: SentimentPost) -> Self {
        Self::from_post_at(post, Local::now())
    }

    pub fn from_post_at(post: SentimentPost, received_at: DateTime<Local>) -> Self {
        Self {
            sentiment: SentimentLabel::from_raw(&post.sentiment),
            emotion: post.emotion,
            content: post.content,
            extra: post.extra,
            received_at,
        }
    }

    /// Backend post id, if the frame carried one.
    pub fn post_id(&self) -> Option<String> {
        match self.extra.get("post_id")? {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }
}

/// Opaque alert record, either from `/api/alerts` or an `alert` frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertPayload(pub Value);

impl AlertPayload {
    fn field(&self, key: &str) -> Option<&Value> {
        self.0.as_object()?.get(key)
    }

    /// `high_negative_ratio` for stored alerts; streamed alerts carry no kind.
    pub fn kind(&self) -> &str {
        self.field("alert_type")
            .and_then(Value::as_str)
            .unwrap_or("alert")
    }

    /// Observed ratio: `actual_value` on stored alerts, `ratio` on streamed ones.
    pub fn ratio(&self) -> Option<f64> {
        self.field("actual_value")
            .or_else(|| self.field("ratio"))
            .and_then(Value::as_f64)
    }

    pub fn post_count(&self) -> Option<u64> {
        self.field("post_count").and_then(Value::as_u64)
    }

    pub fn window_end(&self) -> Option<&str> {
        self.field("window_end").and_then(Value::as_str)
    }

    /// One-line description used by the alert panel and the CLI.
    pub fn summary(&self) -> String {
        let mut parts = vec![self.kind().replace('_', " ")];

        if let Some(ratio) = self.ratio() {
            parts.push(format!("ratio {:.2}", ratio));
        }
        if let Some(count) = self.post_count() {
            parts.push(format!("{} posts", count));
        }
        if let Some(end) = self.window_end() {
            parts.push(format!("until {}", end));
        }

        parts.join(" · ")
    }
}

/// Decode one text frame.
///
/// Invalid JSON, a missing `type`, or a `sentiment` frame without a string
/// `sentiment` field are decode errors. Unrecognized types decode to
/// [`LiveEvent::Unknown`].
pub fn decode_event(text: &str) -> Result<LiveEvent> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| DashError::decode(format!("invalid JSON: {}", e)))?;

    let Value::Object(mut object) = value else {
        return Err(DashError::decode("frame is not a JSON object"));
    };

    let kind = match object.get("type") {
        Some(Value::String(kind)) => kind.clone(),
        Some(_) => return Err(DashError::decode("`type` is not a string")),
        None => return Err(DashError::decode("missing `type` field")),
    };

    match kind.as_str() {
        "sentiment" => {
            object.remove("type");
            let post: SentimentPost = serde_json::from_value(Value::Object(object))
                .map_err(|e| DashError::decode(format!("bad sentiment event: {}", e)))?;
            Ok(LiveEvent::Sentiment(post))
        }
        "alert" => Ok(LiveEvent::Alert(AlertPayload(Value::Object(object)))),
        _ => Ok(LiveEvent::Unknown(kind)),
    }
}
