//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

use taskhub_collab::{CollabHandle, CollabSession, SessionEvent, WsConnector};
use taskhub_core::config::CollabConfig;

/// How long any single wait in a test may take
pub const WAIT: Duration = Duration::from_secs(5);

/// A loopback collaboration server that hands each accepted socket to the test.
pub struct FakeServer {
    pub addr: SocketAddr,
    connections: mpsc::UnboundedReceiver<ServerConn>,
}

/// One client connection as seen by the server.
pub struct ServerConn {
    /// Request path and query the client connected with
    pub uri: String,
    ws: WebSocketStream<TcpStream>,
}

impl FakeServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");
        let (tx, connections) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let mut uri = String::new();
                let callback = |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
                    uri = req.uri().to_string();
                    Ok(resp)
                };
                let Ok(ws) = tokio_tungstenite::accept_hdr_async(stream, callback).await else {
                    continue;
                };
                if tx.send(ServerConn { uri, ws }).is_err() {
                    break;
                }
            }
        });

        Self { addr, connections }
    }

    /// Base URL a session should be configured with
    pub fn base_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// Wait for the next client connection.
    pub async fn accept(&mut self) -> ServerConn {
        timeout(WAIT, self.connections.recv())
            .await
            .expect("Timed out waiting for a client connection")
            .expect("Server accept loop ended")
    }

    /// Whether a client connects within `within`.
    pub async fn connects_within(&mut self, within: Duration) -> bool {
        matches!(timeout(within, self.connections.recv()).await, Ok(Some(_)))
    }
}

impl ServerConn {
    pub async fn send_json(&mut self, value: Value) {
        self.send_raw(&value.to_string()).await;
    }

    pub async fn send_raw(&mut self, text: &str) {
        self.ws
            .send(Message::text(text.to_string()))
            .await
            .expect("Failed to send frame to client");
    }

    /// Next JSON text frame from the client, or `None` once it closed.
    pub async fn recv_json(&mut self) -> Option<Value> {
        loop {
            let msg = timeout(WAIT, self.ws.next())
                .await
                .expect("Timed out waiting for a client frame");
            match msg {
                Some(Ok(Message::Text(text))) => {
                    return Some(serde_json::from_str(text.as_str()).expect("Client sent invalid JSON"));
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return None,
                Some(Ok(_)) => continue,
            }
        }
    }

    /// Close the socket from the server side.
    pub async fn close(mut self) {
        let _ = self.ws.close(None).await;
        // Drain until the client finishes the closing handshake.
        let _ = timeout(WAIT, async { while self.ws.next().await.is_some() {} }).await;
    }
}

/// Session settings pointed at `server` with a short retry delay.
pub fn test_config(server: &FakeServer) -> CollabConfig {
    CollabConfig {
        base_url: server.base_url(),
        reconnect_delay_ms: 50,
        max_reconnect_attempts: 3,
        ..CollabConfig::default()
    }
}

/// Start a real WebSocket session against `server`.
pub fn start_session(server: &FakeServer, workspace: &str, token: &str) -> CollabSession {
    CollabSession::start(
        &test_config(server),
        Arc::new(WsConnector),
        workspace.into(),
        token,
    )
    .expect("Failed to start session")
}

/// Wait until the session snapshot satisfies `predicate`.
pub async fn wait_until(
    handle: &CollabHandle,
    predicate: impl FnMut(&taskhub_collab::CollabSnapshot) -> bool,
) {
    let mut watch = handle.watch();
    timeout(WAIT, watch.wait_for(predicate))
        .await
        .expect("Timed out waiting for session state")
        .expect("Session task ended");
}

/// Wait for the first event matching `predicate`, skipping others.
pub async fn next_event(
    events: &mut mpsc::Receiver<SessionEvent>,
    mut predicate: impl FnMut(&SessionEvent) -> bool,
) -> SessionEvent {
    timeout(WAIT, async {
        loop {
            match events.recv().await {
                Some(event) if predicate(&event) => return event,
                Some(_) => continue,
                None => panic!("Event stream ended"),
            }
        }
    })
    .await
    .expect("Timed out waiting for event")
}
