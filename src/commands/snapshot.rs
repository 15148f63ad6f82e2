//! One-shot snapshot of the backend: health, distribution, alerts and the
//! latest posts, printed as a colored summary or as JSON.

use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::{ColoredString, Colorize};
use serde::Serialize;

use crate::core::client::{ApiClient, HealthStatus, PostRecord};
use crate::core::sentiment::{AlertPayload, SentimentDistribution, SentimentLabel};
use crate::ui::{dimmed, warn};

/// Everything one snapshot collected; a failed request leaves its part empty
#[derive(Debug, Serialize)]
pub struct BackendSnapshot {
    pub api: String,
    pub health: Option<HealthStatus>,
    pub distribution: Option<SentimentDistribution>,
    pub alerts: Option<Vec<AlertPayload>>,
    pub posts: Option<Vec<PostRecord>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// Execute the snapshot command
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = super::resolve_config(matches)?;
    let post_limit = matches.get_one::<u32>("posts").copied().unwrap_or(10);
    let json_output = matches.get_flag("json");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    let client = ApiClient::new(config.api_base.clone());
    let snapshot = runtime.block_on(collect_snapshot(&client, post_limit));

    if json_output {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_snapshot(&snapshot);
    }

    Ok(())
}

/// Issue all requests concurrently and gather what succeeded.
pub async fn collect_snapshot(client: &ApiClient, post_limit: u32) -> BackendSnapshot {
    let (health, distribution, alerts, posts) = tokio::join!(
        client.health(),
        client.fetch_sentiment_distribution(),
        client.fetch_alerts(),
        async {
            if post_limit == 0 {
                Ok(Vec::new())
            } else {
                client.fetch_posts(post_limit, 0).await
            }
        },
    );

    let mut errors = Vec::new();
    let health = keep(&mut errors, "health", health);
    let distribution = keep(
        &mut errors,
        "distribution",
        distribution.map(|raw| SentimentDistribution::from_snapshot(&raw)),
    );
    let alerts = keep(&mut errors, "alerts", alerts);
    let posts = keep(&mut errors, "posts", posts);

    BackendSnapshot {
        api: client.base().to_string(),
        health,
        distribution,
        alerts,
        posts,
        errors,
    }
}

fn keep<T>(errors: &mut Vec<String>, what: &str, result: crate::Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Snapshot: {} unavailable: {}", what, e);
            errors.push(format!("{}: {}", what, e));
            None
        }
    }
}

/// `text` in the color of `label`
fn colored_label(label: &SentimentLabel, text: &str) -> ColoredString {
    match label {
        SentimentLabel::Positive => text.green().bold(),
        SentimentLabel::Negative => text.red().bold(),
        _ => text.white().bold(),
    }
}

fn print_snapshot(snapshot: &BackendSnapshot) {
    println!("{} {}", "Sentiment backend:".white().bold(), snapshot.api.cyan());

    match &snapshot.health {
        Some(health) if health.is_healthy() => println!("  health: {}", "healthy".green()),
        Some(health) => println!("  health: {}", health.status.yellow()),
        None => println!("  health: {}", "unreachable".red()),
    }
    println!();

    if let Some(distribution) = &snapshot.distribution {
        println!("{}", "Distribution".white().bold());
        for (label, count) in distribution.canonical_counts() {
            println!(
                "  {} {:>6}  {:>5.1}%",
                colored_label(&label, &format!("{:<10}", label.as_str())),
                count,
                distribution.percentage(&label)
            );
        }
        println!("  {} {:>6}", format!("{:<10}", "Total").bold(), distribution.total());
        println!();
    }

    if let Some(alerts) = &snapshot.alerts {
        println!("{} ({})", "Alerts".white().bold(), alerts.len());
        if alerts.is_empty() {
            dimmed("  none");
        }
        for alert in alerts {
            println!("  {} {}", "●".red(), alert.summary());
        }
        println!();
    }

    if let Some(posts) = &snapshot.posts {
        println!("{} ({})", "Latest posts".white().bold(), posts.len());
        for post in posts {
            let label = SentimentLabel::from_raw(post.sentiment.as_deref().unwrap_or_default());
            let emotion = post.emotion.as_deref().unwrap_or("Analyzing...");
            let content = post.content.as_deref().unwrap_or_default();
            println!(
                "  {} — {} {}",
                colored_label(&label, label.as_str()),
                emotion,
                crate::ui::dashboard_tui::truncate_to_width(content, 80).dimmed()
            );
        }
        println!();
    }

    for error in &snapshot.errors {
        warn(error);
    }
}
