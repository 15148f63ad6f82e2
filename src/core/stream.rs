//! Live stream connection.
//!
//! One task owns the WebSocket for the lifetime of the dashboard. Text frames
//! are decoded into [`LiveEvent`]s and forwarded in arrival order; malformed
//! frames are reported and dropped without closing the connection. When the
//! connection fails or drops, the task reconnects according to its
//! [`ReconnectPolicy`].

use futures_util::{SinkExt, StreamExt};
use std::fmt;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use crate::core::config::ReconnectPolicy;
use crate::core::sentiment::{decode_event, LiveEvent};
use crate::error::DashError;

type LiveSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// State of the live stream as shown in the dashboard header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Reconnecting { attempt: u32, delay: Duration },
    /// The task stopped: shutdown requested or the reconnect policy gave up
    Closed(String),
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Connecting => write!(f, "connecting"),
            ConnectionStatus::Connected => write!(f, "live"),
            ConnectionStatus::Reconnecting { attempt, delay } => {
                write!(f, "reconnecting in {}s (attempt {})", delay.as_secs(), attempt)
            }
            ConnectionStatus::Closed(reason) => write!(f, "closed: {}", reason),
        }
    }
}

/// Messages emitted by [`live_stream_task`]
#[derive(Debug, Clone, PartialEq)]
pub enum StreamMessage {
    Status(ConnectionStatus),
    Event(LiveEvent),
    /// A frame that failed to decode; the connection stays open
    Malformed(String),
}

enum SessionEnd {
    Shutdown,
    ReceiverGone,
    Dropped(DashError),
}

/// Run the live stream until shutdown, the receiver goes away, or the
/// reconnect policy gives up.
pub async fn live_stream_task<M>(
    url: String,
    policy: ReconnectPolicy,
    tx: mpsc::Sender<M>,
    mut shutdown: broadcast::Receiver<()>,
) where
    M: From<StreamMessage> + Send + 'static,
{
    log::info!("Live stream task started for {}", url);
    let mut attempt: u32 = 0;

    loop {
        if send(&tx, StreamMessage::Status(ConnectionStatus::Connecting))
            .await
            .is_err()
        {
            return;
        }

        let error = tokio::select! {
            connected = connect_async(url.as_str()) => match connected {
                Ok((socket, _response)) => {
                    log::info!("Connected to live stream {}", url);
                    attempt = 0;
                    if send(&tx, StreamMessage::Status(ConnectionStatus::Connected))
                        .await
                        .is_err()
                    {
                        return;
                    }

                    match run_session(socket, &tx, &mut shutdown).await {
                        SessionEnd::Shutdown => {
                            let _ = send(&tx, closed("shutdown")).await;
                            return;
                        }
                        SessionEnd::ReceiverGone => return,
                        SessionEnd::Dropped(error) => error,
                    }
                }
                Err(e) => DashError::from(e),
            },
            _ = shutdown.recv() => {
                let _ = send(&tx, closed("shutdown")).await;
                return;
            }
        };

        log::warn!("Live stream {} interrupted: {}", url, error);
        attempt += 1;

        let Some(delay) = policy.delay_for(attempt) else {
            log::warn!("Giving up on live stream after {} attempt(s)", attempt);
            let _ = send(&tx, closed(&error.to_string())).await;
            return;
        };

        if send(
            &tx,
            StreamMessage::Status(ConnectionStatus::Reconnecting { attempt, delay }),
        )
        .await
        .is_err()
        {
            return;
        }

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = shutdown.recv() => {
                let _ = send(&tx, closed("shutdown")).await;
                return;
            }
        }
    }
}

async fn run_session<M>(
    socket: LiveSocket,
    tx: &mpsc::Sender<M>,
    shutdown: &mut broadcast::Receiver<()>,
) -> SessionEnd
where
    M: From<StreamMessage>,
{
    let (mut write, mut read) = socket.split();

    loop {
        tokio::select! {
            frame = read.next() => {
                let message = match frame {
                    Some(Ok(Message::Text(text))) => decode_frame(text.as_str()),
                    Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                        Ok(text) => decode_frame(text),
                        Err(_) => StreamMessage::Malformed("binary frame is not UTF-8".to_string()),
                    },
                    Some(Ok(Message::Close(frame))) => {
                        let reason = frame
                            .map(|f| format!("closed by server ({})", f.code))
                            .unwrap_or_else(|| "closed by server".to_string());
                        return SessionEnd::Dropped(DashError::connection(reason));
                    }
                    // Ping/Pong are answered by tungstenite itself
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => return SessionEnd::Dropped(e.into()),
                    None => return SessionEnd::Dropped(DashError::connection("stream ended")),
                };

                if send(tx, message).await.is_err() {
                    let _ = write.send(Message::Close(None)).await;
                    return SessionEnd::ReceiverGone;
                }
            }
            _ = shutdown.recv() => {
                log::info!("Closing live stream");
                let _ = write.send(Message::Close(None)).await;
                return SessionEnd::Shutdown;
            }
        }
    }
}

fn decode_frame(text: &str) -> StreamMessage {
    match decode_event(text) {
        Ok(event) => StreamMessage::Event(event),
        Err(e) => {
            log::warn!("Dropping live frame: {}", e);
            StreamMessage::Malformed(e.to_string())
        }
    }
}

fn closed(reason: &str) -> StreamMessage {
    StreamMessage::Status(ConnectionStatus::Closed(reason.to_string()))
}

async fn send<M: From<StreamMessage>>(
    tx: &mpsc::Sender<M>,
    message: StreamMessage,
) -> Result<(), mpsc::error::SendError<M>> {
    tx.send(M::from(message)).await
}
