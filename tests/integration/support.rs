// Minimal local backends for the integration tests: a canned-response HTTP
// server and a WebSocket server that plays a fixed list of frames.

use futures_util::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;

/// `path -> (status, body)`; unknown paths answer 404.
pub type Routes = HashMap<&'static str, (u16, String)>;

pub async fn spawn_http(routes: Routes) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let routes = routes.clone();
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                let head = String::from_utf8_lossy(&request);
                let target = head.split_whitespace().nth(1).unwrap_or("/");
                let path = target.split('?').next().unwrap_or(target);
                let (status, body) = routes
                    .get(path)
                    .cloned()
                    .unwrap_or((404, r#"{"detail":"Not Found"}"#.to_string()));

                let response = format!(
                    "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Accepts one connection, sends `frames` in order, then closes.
pub async fn spawn_ws(frames: Vec<String>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let Ok((stream, _)) = listener.accept().await else {
            return;
        };
        let Ok(mut socket) = tokio_tungstenite::accept_async(stream).await else {
            return;
        };
        for frame in frames {
            if socket.send(Message::text(frame)).await.is_err() {
                return;
            }
        }
        let _ = socket.close(None).await;
        // Drain until the client acknowledges the close
        while let Some(Ok(_)) = socket.next().await {}
    });

    addr
}

/// Like [`spawn_ws`] but keeps the connection open after the frames.
pub async fn spawn_ws_held_open(frames: Vec<String>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let Ok((stream, _)) = listener.accept().await else {
            return;
        };
        let Ok(mut socket) = tokio_tungstenite::accept_async(stream).await else {
            return;
        };
        for frame in frames {
            if socket.send(Message::text(frame)).await.is_err() {
                return;
            }
        }
        while let Some(Ok(_)) = socket.next().await {}
    });

    addr
}

/// Sends `frames`, then reports whether the client ended the connection
/// with a Close frame (`false` for a bare disconnect).
pub async fn spawn_ws_watching_close(frames: Vec<String>) -> (SocketAddr, oneshot::Receiver<bool>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (close_tx, close_rx) = oneshot::channel();

    tokio::spawn(async move {
        let Ok((stream, _)) = listener.accept().await else {
            return;
        };
        let Ok(mut socket) = tokio_tungstenite::accept_async(stream).await else {
            return;
        };
        for frame in frames {
            if socket.send(Message::text(frame)).await.is_err() {
                return;
            }
        }

        let mut saw_close = false;
        while let Some(Ok(message)) = socket.next().await {
            if message.is_close() {
                saw_close = true;
                break;
            }
        }
        let _ = close_tx.send(saw_close);
    });

    (addr, close_rx)
}

pub fn sentiment_frame(label: &str, post_id: &str) -> String {
    format!(
        r#"{{"type":"sentiment","post_id":"{}","sentiment":"{}","emotion":"joy","content":"post {}"}}"#,
        post_id, label, post_id
    )
}
