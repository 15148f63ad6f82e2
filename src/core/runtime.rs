//! Tokio runtime and orchestrator for the dashboard.
//!
//! The UI thread stays synchronous. Everything that talks to the backend runs
//! on a small dedicated runtime:
//!
//! - fetch tasks for `/api/alerts` and `/api/sentiment/distribution`, started
//!   together at launch and again on every refresh request,
//! - the live stream task,
//! - one orchestrator task, the only owner of [`DashboardState`], which applies
//!   every update in arrival order and publishes snapshots on a watch channel.

use anyhow::Context;
use chrono::{DateTime, Local};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

use super::client::ApiClient;
use super::config::Config;
use super::sentiment::{AlertPayload, Applied, DashboardState};
use super::stream::{live_stream_task, ConnectionStatus, StreamMessage};
use crate::error::Result;

const UPDATE_CHANNEL_SIZE: usize = 256;
const STREAM_CLOSE_GRACE: Duration = Duration::from_millis(500);

/// Input to the orchestrator.
#[derive(Debug, Clone)]
pub enum DashboardUpdate {
    Alerts(Vec<AlertPayload>),
    Distribution(Map<String, Value>),
    Stream(StreamMessage),
    FetchFailed { what: &'static str, error: String },
}

impl From<StreamMessage> for DashboardUpdate {
    fn from(message: StreamMessage) -> Self {
        DashboardUpdate::Stream(message)
    }
}

/// Requests from the UI to the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardCommand {
    Refresh,
}

/// What the UI renders: dashboard state plus connection bookkeeping.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub state: DashboardState,
    pub connection: ConnectionStatus,
    pub dropped_frames: u64,
    pub last_event_at: Option<DateTime<Local>>,
    pub last_fetch_at: Option<DateTime<Local>>,
    /// Latest failure per fetch (`alerts`, `distribution`), cleared by that
    /// fetch's next success
    pub fetch_errors: BTreeMap<&'static str, String>,
    /// Fetch results (success or failure) applied so far
    pub fetch_outcomes: u64,
}

impl DashboardSnapshot {
    pub fn new(state: DashboardState) -> Self {
        Self {
            state,
            connection: ConnectionStatus::Connecting,
            dropped_frames: 0,
            last_event_at: None,
            last_fetch_at: None,
            fetch_errors: BTreeMap::new(),
            fetch_outcomes: 0,
        }
    }

    /// Apply one update.
    pub fn apply(&mut self, update: DashboardUpdate) {
        match update {
            DashboardUpdate::Alerts(alerts) => {
                self.state.seed_alerts(alerts);
                self.fetched("alerts");
            }
            DashboardUpdate::Distribution(snapshot) => {
                self.state.seed_distribution(&snapshot);
                self.fetched("distribution");
            }
            DashboardUpdate::FetchFailed { what, error } => {
                self.fetch_errors.insert(what, error);
                self.fetch_outcomes += 1;
            }
            DashboardUpdate::Stream(StreamMessage::Status(status)) => {
                self.connection = status;
            }
            DashboardUpdate::Stream(StreamMessage::Event(event)) => {
                if self.state.apply(event) != Applied::Ignored {
                    self.last_event_at = Some(Local::now());
                }
            }
            DashboardUpdate::Stream(StreamMessage::Malformed(_)) => {
                self.dropped_frames += 1;
            }
        }
    }

    fn fetched(&mut self, what: &'static str) {
        self.last_fetch_at = Some(Local::now());
        self.fetch_errors.remove(what);
        self.fetch_outcomes += 1;
    }

    /// All outstanding fetch failures on one line
    pub fn fetch_error(&self) -> Option<String> {
        if self.fetch_errors.is_empty() {
            return None;
        }
        let parts: Vec<String> = self
            .fetch_errors
            .iter()
            .map(|(what, error)| format!("{}: {}", what, error))
            .collect();
        Some(parts.join(" · "))
    }
}

#[derive(Debug, Clone, Copy)]
struct FetchSettings {
    retries: u32,
    delay: Duration,
}

/// Background runtime feeding the dashboard.
///
/// Dropping it signals shutdown, gives the stream task a moment to send its
/// Close frame, then stops the runtime.
pub struct DashboardRuntime {
    /// Latest dashboard snapshot
    pub snapshot_rx: watch::Receiver<Arc<DashboardSnapshot>>,
    command_tx: mpsc::Sender<DashboardCommand>,
    shutdown_tx: broadcast::Sender<()>,
    stream_handle: Option<JoinHandle<()>>,
    runtime: Option<tokio::runtime::Runtime>,
}

impl DashboardRuntime {
    /// Start all background tasks for `config`.
    pub fn start(config: &Config) -> anyhow::Result<Self> {
        let live_url = config.live_url().context("Invalid live stream URL")?;
        let client = ApiClient::new(config.api_base.clone());
        let settings = FetchSettings {
            retries: config.fetch_retries,
            delay: config.fetch_retry_delay(),
        };

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .thread_name("dashboard-worker")
            .build()
            .context("Failed to build tokio runtime")?;

        let initial = DashboardSnapshot::new(DashboardState::with_capacities(config.capacities()));
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(initial.clone()));
        let (update_tx, update_rx) = mpsc::channel::<DashboardUpdate>(UPDATE_CHANNEL_SIZE);
        // One slot: extra refresh requests coalesce into the queued one
        let (command_tx, command_rx) = mpsc::channel::<DashboardCommand>(1);
        let (shutdown_tx, _) = broadcast::channel::<()>(1);

        runtime.spawn(orchestrator_task(
            initial,
            update_rx,
            snapshot_tx,
            shutdown_tx.subscribe(),
        ));

        runtime.spawn(fetch_coordinator_task(
            client,
            settings,
            update_tx.clone(),
            command_rx,
            shutdown_tx.subscribe(),
        ));

        let stream_handle = runtime.spawn(live_stream_task(
            live_url,
            config.reconnect.clone(),
            update_tx,
            shutdown_tx.subscribe(),
        ));

        log::info!("Dashboard runtime started against {}", config.api_base);

        Ok(Self {
            snapshot_rx,
            command_tx,
            shutdown_tx,
            stream_handle: Some(stream_handle),
            runtime: Some(runtime),
        })
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Arc<DashboardSnapshot> {
        self.snapshot_rx.borrow().clone()
    }

    /// Re-run both REST fetches once the current round finishes. Returns
    /// `false` if a refresh is already queued; the queued one covers it.
    pub fn request_refresh(&self) -> bool {
        self.command_tx.try_send(DashboardCommand::Refresh).is_ok()
    }

    /// Shut down gracefully; same as dropping.
    pub fn shutdown(self) {
        drop(self);
    }
}

impl Drop for DashboardRuntime {
    fn drop(&mut self) {
        log::info!("Shutting down dashboard runtime");
        let _ = self.shutdown_tx.send(());

        if let Some(runtime) = self.runtime.take() {
            if let Some(handle) = self.stream_handle.take() {
                // The timer must be created inside the runtime
                runtime.block_on(async move {
                    let _ = tokio::time::timeout(STREAM_CLOSE_GRACE, handle).await;
                });
            }
            runtime.shutdown_timeout(STREAM_CLOSE_GRACE);
        }
    }
}

/// Sole owner of the dashboard state.
async fn orchestrator_task(
    mut snapshot: DashboardSnapshot,
    mut update_rx: mpsc::Receiver<DashboardUpdate>,
    snapshot_tx: watch::Sender<Arc<DashboardSnapshot>>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            update = update_rx.recv() => {
                let Some(update) = update else { break };
                snapshot.apply(update);

                // Only fails when the UI is gone
                let _ = snapshot_tx.send(Arc::new(snapshot.clone()));
            }
            _ = shutdown.recv() => break,
        }
    }

    log::debug!("Orchestrator task stopped");
}

/// Runs the startup fetch, then one fetch round per refresh command.
/// Rounds never overlap, so a later round always lands after an earlier one.
async fn fetch_coordinator_task(
    client: ApiClient,
    settings: FetchSettings,
    update_tx: mpsc::Sender<DashboardUpdate>,
    mut command_rx: mpsc::Receiver<DashboardCommand>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = run_fetch_round(&client, settings, &update_tx) => {}
            _ = shutdown.recv() => break,
        }

        tokio::select! {
            command = command_rx.recv() => match command {
                Some(DashboardCommand::Refresh) => {
                    log::info!("Refreshing alerts and distribution");
                }
                None => break,
            },
            _ = shutdown.recv() => break,
        }
    }

    log::debug!("Fetch coordinator stopped");
}

/// Fetch alerts and distribution concurrently; each result is sent as soon
/// as it lands.
async fn run_fetch_round(
    client: &ApiClient,
    settings: FetchSettings,
    update_tx: &mpsc::Sender<DashboardUpdate>,
) {
    let alerts = async {
        let update = match fetch_with_retry("alerts", settings, || client.fetch_alerts()).await {
            Ok(alerts) => DashboardUpdate::Alerts(alerts),
            Err(e) => DashboardUpdate::FetchFailed {
                what: "alerts",
                error: e.to_string(),
            },
        };
        let _ = update_tx.send(update).await;
    };

    let distribution = async {
        let update = match fetch_with_retry("distribution", settings, || {
            client.fetch_sentiment_distribution()
        })
        .await
        {
            Ok(snapshot) => DashboardUpdate::Distribution(snapshot),
            Err(e) => DashboardUpdate::FetchFailed {
                what: "distribution",
                error: e.to_string(),
            },
        };
        let _ = update_tx.send(update).await;
    };

    tokio::join!(alerts, distribution);
}

async fn fetch_with_retry<T, F, Fut>(what: &str, settings: FetchSettings, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < settings.retries => {
                attempt += 1;
                log::warn!(
                    "Fetching {} failed (attempt {}/{}): {}",
                    what,
                    attempt,
                    settings.retries + 1,
                    e
                );
                tokio::time::sleep(settings.delay).await;
            }
            Err(e) => {
                log::warn!("Fetching {} failed, keeping current data: {}", what, e);
                return Err(e);
            }
        }
    }
}
