//! In-memory connector for driving sessions in tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};
use futures::{FutureExt, StreamExt, future, sink};
use serde_json::Value;

use crate::connection::transport::{Connector, Transport};
use crate::error::CollabError;

enum Outcome {
    Hang,
    Open(Transport),
}

/// Connector that replays a script of outcomes. An empty script fails.
#[derive(Default)]
pub(crate) struct MockConnector {
    script: Mutex<VecDeque<Outcome>>,
    attempts: AtomicUsize,
    urls: Mutex<Vec<String>>,
}

impl MockConnector {
    pub(crate) fn new() -> std::sync::Arc<Self> {
        std::sync::Arc::new(Self::default())
    }

    /// Queue a successful connection and return the server side of it.
    pub(crate) fn script_open(&self) -> MockPeer {
        let (transport, peer) = mock_link();
        self.script.lock().unwrap().push_back(Outcome::Open(transport));
        peer
    }

    /// Queue an attempt that never completes.
    pub(crate) fn script_hang(&self) {
        self.script.lock().unwrap().push_back(Outcome::Hang);
    }

    pub(crate) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub(crate) fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, url: &str) -> Result<Transport, CollabError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Outcome::Open(transport)) => Ok(transport),
            Some(Outcome::Hang) => future::pending().await,
            None => Err(CollabError::Connect {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            }),
        }
    }
}

/// Server side of a mock connection.
pub(crate) struct MockPeer {
    server_tx: Option<UnboundedSender<Result<String, CollabError>>>,
    client_rx: UnboundedReceiver<String>,
}

impl MockPeer {
    /// Deliver a JSON frame to the client.
    pub(crate) fn push(&self, frame: Value) {
        self.push_raw(frame.to_string());
    }

    pub(crate) fn push_raw(&self, frame: impl Into<String>) {
        if let Some(tx) = &self.server_tx {
            let _ = tx.unbounded_send(Ok(frame.into()));
        }
    }

    /// Fail the client's read side.
    pub(crate) fn push_error(&self, reason: &str) {
        if let Some(tx) = &self.server_tx {
            let _ = tx.unbounded_send(Err(CollabError::Transport(reason.to_string())));
        }
    }

    /// Close the connection from the server side.
    pub(crate) fn close(&mut self) {
        self.server_tx = None;
    }

    /// Drain every frame the client has written so far.
    pub(crate) fn sent(&mut self) -> Vec<Value> {
        let mut frames = Vec::new();
        while let Some(Some(frame)) = self.client_rx.next().now_or_never() {
            frames.push(serde_json::from_str(&frame).unwrap());
        }
        frames
    }

    /// Whether the client closed its write side.
    pub(crate) fn client_closed(&mut self) -> bool {
        matches!(self.client_rx.next().now_or_never(), Some(None))
    }
}

fn mock_link() -> (Transport, MockPeer) {
    let (client_tx, client_rx) = unbounded::<String>();
    let (server_tx, server_rx) = unbounded::<Result<String, CollabError>>();
    let sink = sink::unfold(client_tx, |tx, frame: String| async move {
        tx.unbounded_send(frame)
            .map_err(|e| CollabError::Transport(e.to_string()))?;
        Ok::<_, CollabError>(tx)
    });
    (
        Transport::new(sink, server_rx),
        MockPeer {
            server_tx: Some(server_tx),
            client_rx,
        },
    )
}
