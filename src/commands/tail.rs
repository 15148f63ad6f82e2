//! Headless live stream consumer.
//!
//! Prints every decoded live event as it arrives, either as a colored line
//! with running counts or as one JSON document per line (for scripting).

use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use serde_json::{json, Value};
use tokio::sync::{broadcast, mpsc};

use crate::core::sentiment::{DashboardState, LiveEvent, NormalizedPost, SentimentLabel};
use crate::core::stream::{live_stream_task, ConnectionStatus, StreamMessage};
use crate::ui::{dimmed, info, warn};

/// Execute the tail command
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = super::resolve_config(matches)?;
    let json_output = matches.get_flag("json");
    let live_url = config.live_url().context("Invalid live stream URL")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let ctrlc_tx = shutdown_tx.clone();
    ctrlc::set_handler(move || {
        let _ = ctrlc_tx.send(());
    })
    .context("Failed to install Ctrl-C handler")?;

    if !json_output {
        info(&format!("Tailing {} (Ctrl-C to stop)", live_url));
    }

    let (tx, mut rx) = mpsc::channel::<StreamMessage>(256);
    runtime.spawn(live_stream_task(
        live_url,
        config.reconnect.clone(),
        tx,
        shutdown_tx.subscribe(),
    ));

    let mut state = DashboardState::with_capacities(config.capacities());

    runtime.block_on(async {
        while let Some(message) = rx.recv().await {
            match message {
                StreamMessage::Event(event) => {
                    if json_output {
                        println!("{}", event_json(&event));
                    } else {
                        print_event(&event);
                    }
                    state.apply(event);
                    if !json_output {
                        print_counts(&state);
                    }
                }
                StreamMessage::Malformed(reason) => {
                    if !json_output {
                        warn(&format!("dropped malformed frame: {}", reason));
                    }
                }
                StreamMessage::Status(ConnectionStatus::Closed(reason)) => {
                    if !json_output {
                        dimmed(&format!("stream closed: {}", reason));
                    }
                    break;
                }
                StreamMessage::Status(status) => {
                    if !json_output {
                        dimmed(&format!("stream {}", status));
                    }
                }
            }
        }
    });

    Ok(())
}

/// One JSON line per event; sentiment labels are normalized.
pub fn event_json(event: &LiveEvent) -> Value {
    match event {
        LiveEvent::Sentiment(post) => {
            let normalized = NormalizedPost::from_post(post.clone());
            let mut value = serde_json::to_value(&normalized).unwrap_or(Value::Null);
            if let Value::Object(map) = &mut value {
                map.insert("type".to_string(), json!("sentiment"));
            }
            value
        }
        LiveEvent::Alert(alert) => alert.0.clone(),
        LiveEvent::Unknown(kind) => json!({ "type": kind }),
    }
}

fn print_event(event: &LiveEvent) {
    let time = chrono::Local::now().format("%H:%M:%S").to_string();
    match event {
        LiveEvent::Sentiment(post) => {
            let label = SentimentLabel::from_raw(&post.sentiment);
            let label_text = match label {
                SentimentLabel::Positive => label.as_str().green().bold(),
                SentimentLabel::Negative => label.as_str().red().bold(),
                _ => label.as_str().white().bold(),
            };
            println!(
                "{} {} — {} {}",
                time.dimmed(),
                label_text,
                post.emotion.as_deref().unwrap_or("Analyzing..."),
                post.content.as_deref().unwrap_or_default().dimmed()
            );
        }
        LiveEvent::Alert(alert) => {
            println!("{} {} {}", time.dimmed(), "ALERT".red().bold(), alert.summary());
        }
        LiveEvent::Unknown(kind) => {
            println!("{} {}", time.dimmed(), format!("ignored event type {:?}", kind).dimmed());
        }
    }
}

fn print_counts(state: &DashboardState) {
    let dist = &state.distribution;
    dimmed(&format!(
        "         positive {} · negative {} · neutral {} · total {}",
        dist.positive,
        dist.negative,
        dist.neutral,
        dist.total()
    ));
}
