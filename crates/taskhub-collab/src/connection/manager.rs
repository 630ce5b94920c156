//! Connection manager: the per-workspace session task.
//!
//! One task owns the socket, the reconnect policy, the heartbeat and the
//! whole [`CollabState`]. Callers reach it only through [`CollabHandle`]
//! commands, and observe it through events and snapshots. Because every
//! timer lives inside the link it belongs to, replacing or dropping the
//! link cancels them.

use std::fmt;
use std::future::{Future, pending};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use taskhub_core::config::CollabConfig;
use taskhub_core::types::{UserId, WorkspaceId};
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, sleep_until, timeout};
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use super::handle::CollabHandle;
use super::heartbeat::{Heartbeat, ping_message};
use super::reconnect::ReconnectPolicy;
use super::state::ConnectionState;
use super::transport::{Connector, Transport, redact_url};
use crate::error::CollabError;
use crate::event::{EventSink, SessionEvent};
use crate::message::router::{Routed, route_frame};
use crate::message::serializer;
use crate::message::types::OutboundMessage;
use crate::metrics::{SessionMetrics, connections, messages};
use crate::state::{CollabSnapshot, CollabState};

/// How long a graceful close may take before the socket is abandoned.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Requests from handles to the session task.
#[derive(Debug)]
pub(crate) enum Command {
    Send(OutboundMessage),
    Reconnect,
    Disconnect,
    Shutdown,
}

type ConnectFuture = Pin<Box<dyn Future<Output = Result<Transport, CollabError>> + Send>>;

/// The session's single link to the server. At most one exists.
enum Link {
    Idle,
    Connecting(ConnectFuture),
    Open {
        conn_id: Uuid,
        transport: Transport,
        heartbeat: Heartbeat,
    },
    Backoff(Instant),
}

impl Link {
    fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting(_) => "connecting",
            Self::Open { .. } => "open",
            Self::Backoff(_) => "backoff",
        }
    }
}

enum Step {
    Command(Option<Command>),
    Connected(Result<Transport, CollabError>),
    Frame(Option<Result<String, CollabError>>),
    Heartbeat,
    Retry,
    TypingExpired(UserId),
}

/// Drives one workspace session.
pub struct ConnectionManager {
    workspace_id: WorkspaceId,
    url: String,
    connector: Arc<dyn Connector>,
    policy: ReconnectPolicy,
    connect_timeout: Duration,
    heartbeat_interval: Duration,
    should_reconnect: bool,
    link: Link,
    collab: CollabState,
    commands: mpsc::UnboundedReceiver<Command>,
    events: EventSink,
    snapshot: watch::Sender<CollabSnapshot>,
    metrics: Arc<SessionMetrics>,
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("workspace_id", &self.workspace_id)
            .field("url", &redact_url(&self.url))
            .field("state", &self.collab.connection)
            .field("link", &self.link.label())
            .field("attempts", &self.policy.attempts())
            .field("should_reconnect", &self.should_reconnect)
            .finish()
    }
}

impl ConnectionManager {
    /// Build a session task and the handle and event stream that talk to it.
    ///
    /// Nothing happens until [`run`](Self::run) is polled.
    pub fn new(
        config: &CollabConfig,
        workspace_id: WorkspaceId,
        url: String,
        connector: Arc<dyn Connector>,
    ) -> (Self, CollabHandle, mpsc::Receiver<SessionEvent>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (events, event_rx) = EventSink::channel(workspace_id.clone(), config.event_buffer_size);
        let (snapshot_tx, snapshot_rx) = watch::channel(CollabSnapshot::default());
        let metrics = Arc::new(SessionMetrics::new());

        let handle = CollabHandle::new(
            workspace_id.clone(),
            command_tx,
            snapshot_rx,
            Arc::clone(&metrics),
        );

        let manager = Self {
            workspace_id,
            url,
            connector,
            policy: ReconnectPolicy::new(config.reconnect_delay(), config.max_reconnect_attempts),
            connect_timeout: config.connect_timeout(),
            heartbeat_interval: config.heartbeat_interval(),
            should_reconnect: true,
            link: Link::Idle,
            collab: CollabState::new(config.typing_timeout()),
            commands: command_rx,
            events,
            snapshot: snapshot_tx,
            metrics,
        };

        (manager, handle, event_rx)
    }

    /// Run until shut down or every handle is dropped.
    pub async fn run(mut self) {
        info!(
            workspace_id = %self.workspace_id,
            url = %redact_url(&self.url),
            "Collaboration session started"
        );
        self.begin_connect();

        loop {
            match self.next_step().await {
                Step::Command(Some(Command::Send(message))) => self.write(message).await,
                Step::Command(Some(Command::Reconnect)) => self.reconnect().await,
                Step::Command(Some(Command::Disconnect)) => self.disconnect().await,
                Step::Command(Some(Command::Shutdown) | None) => break,
                Step::Connected(result) => {
                    self.link = Link::Idle;
                    match result {
                        Ok(transport) => self.on_open(transport),
                        Err(e) => self.on_failure(e).await,
                    }
                }
                Step::Frame(Some(Ok(frame))) => self.on_frame(&frame),
                Step::Frame(Some(Err(e))) => self.on_failure(e).await,
                Step::Frame(None) => self.on_closed().await,
                Step::Heartbeat => self.send_heartbeat().await,
                Step::Retry => self.begin_connect(),
                Step::TypingExpired(user_id) => {
                    debug!(workspace_id = %self.workspace_id, user_id = %user_id, "Typing expired");
                    self.publish();
                    self.events
                        .emit(SessionEvent::TypingChanged(self.collab.typing.users()));
                }
            }
        }

        self.teardown().await;
    }

    async fn next_step(&mut self) -> Step {
        tokio::select! {
            biased;
            command = self.commands.recv() => Step::Command(command),
            step = link_step(&mut self.link) => step,
            user_id = self.collab.typing.next_expired() => Step::TypingExpired(user_id),
        }
    }

    fn begin_connect(&mut self) {
        let connector = Arc::clone(&self.connector);
        let url = self.url.clone();
        let limit = self.connect_timeout;
        // An attempt that outlives the limit is a failed attempt.
        self.link = Link::Connecting(Box::pin(async move {
            match timeout(limit, connector.connect(&url)).await {
                Ok(result) => result,
                Err(_) => Err(CollabError::Connect {
                    url: redact_url(&url),
                    reason: format!("timed out after {}ms", limit.as_millis()),
                }),
            }
        }));
        self.collab.connection = ConnectionState::Connecting;
        self.publish();

        info!(
            workspace_id = %self.workspace_id,
            attempt = self.policy.attempts() + 1,
            url = %redact_url(&self.url),
            "Connecting to collaboration service"
        );
    }

    fn on_open(&mut self, transport: Transport) {
        let conn_id = Uuid::new_v4();
        self.policy.reset();
        connections::record_open(&self.metrics);

        self.link = Link::Open {
            conn_id,
            transport,
            heartbeat: Heartbeat::start(self.heartbeat_interval),
        };
        self.collab.connection = ConnectionState::Connected;
        self.publish();

        info!(
            workspace_id = %self.workspace_id,
            conn_id = %conn_id,
            "Collaboration connection open"
        );
        self.events.emit(SessionEvent::Opened);
    }

    /// A connect attempt or an open socket failed.
    async fn on_failure(&mut self, error: CollabError) {
        warn!(
            workspace_id = %self.workspace_id,
            link = self.link.label(),
            error = %error,
            "Collaboration connection error"
        );
        self.policy.record_failure();
        self.collab.connection = ConnectionState::Error;
        self.publish();
        self.events.emit(SessionEvent::Error(error.to_string()));

        self.on_closed().await;
    }

    /// The link ended without being asked to.
    async fn on_closed(&mut self) {
        self.close_link().await;
        self.collab.connection = ConnectionState::Disconnected;
        self.schedule_retry();
        self.publish();
        self.events.emit(SessionEvent::Closed);
    }

    fn schedule_retry(&mut self) {
        if !self.should_reconnect {
            self.link = Link::Idle;
            return;
        }

        match self.policy.next_delay() {
            Some(delay) => {
                connections::record_reconnect_attempt(&self.metrics);
                info!(
                    workspace_id = %self.workspace_id,
                    failures = self.policy.attempts(),
                    max_attempts = self.policy.max_attempts(),
                    delay_ms = delay.as_millis() as u64,
                    "Scheduling reconnect"
                );
                self.link = Link::Backoff(Instant::now() + delay);
            }
            None => {
                warn!(
                    workspace_id = %self.workspace_id,
                    failures = self.policy.attempts(),
                    "Reconnect attempts exhausted; waiting for an explicit reconnect"
                );
                self.link = Link::Idle;
            }
        }
    }

    /// Drop the current link. Heartbeat first, then the socket.
    ///
    /// Returns whether an open socket was closed.
    async fn close_link(&mut self) -> bool {
        match std::mem::replace(&mut self.link, Link::Idle) {
            Link::Open {
                conn_id,
                mut transport,
                heartbeat,
            } => {
                drop(heartbeat);
                match timeout(CLOSE_TIMEOUT, transport.sink.close()).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        debug!(conn_id = %conn_id, error = %e, "Socket close reported an error")
                    }
                    Err(_) => debug!(conn_id = %conn_id, "Socket close timed out"),
                }
                info!(
                    workspace_id = %self.workspace_id,
                    conn_id = %conn_id,
                    "Collaboration connection closed"
                );
                true
            }
            Link::Connecting(_) => {
                debug!(workspace_id = %self.workspace_id, "Abandoned in-flight connection attempt");
                false
            }
            Link::Backoff(_) => {
                debug!(workspace_id = %self.workspace_id, "Cancelled pending reconnect");
                false
            }
            Link::Idle => false,
        }
    }

    async fn disconnect(&mut self) {
        self.should_reconnect = false;
        let was_open = self.close_link().await;
        let changed = self.collab.connection != ConnectionState::Disconnected;
        self.collab.connection = ConnectionState::Disconnected;
        if changed {
            self.publish();
        }
        if was_open {
            info!(workspace_id = %self.workspace_id, "Disconnected by request");
            self.events.emit(SessionEvent::Closed);
        }
    }

    async fn reconnect(&mut self) {
        info!(workspace_id = %self.workspace_id, "Manual reconnect requested");
        let was_open = self.close_link().await;
        self.collab.connection = ConnectionState::Disconnected;
        if was_open {
            self.events.emit(SessionEvent::Closed);
        }
        self.policy.reset();
        self.should_reconnect = true;
        self.begin_connect();
    }

    async fn teardown(&mut self) {
        self.should_reconnect = false;
        self.collab.typing.clear();
        let was_open = self.close_link().await;
        self.collab.connection = ConnectionState::Disconnected;
        self.publish();
        if was_open {
            self.events.emit(SessionEvent::Closed);
        }
        info!(workspace_id = %self.workspace_id, "Collaboration session stopped");
    }

    /// Write one message if connected; otherwise drop it.
    async fn write(&mut self, message: OutboundMessage) {
        let kind = message.kind();
        if !self.collab.connection.is_connected() {
            warn!(
                workspace_id = %self.workspace_id,
                kind,
                state = %self.collab.connection,
                "Not connected; dropping outbound message"
            );
            messages::record_dropped(&self.metrics);
            return;
        }

        let frame = match serializer::encode(&message) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(workspace_id = %self.workspace_id, kind, error = %e, "Failed to encode message");
                return;
            }
        };

        let Link::Open { transport, .. } = &mut self.link else {
            messages::record_dropped(&self.metrics);
            return;
        };
        let result = transport.sink.send(frame).await;

        match result {
            Ok(()) => {
                messages::record_sent(&self.metrics);
                trace!(workspace_id = %self.workspace_id, kind, "Sent message");
            }
            Err(e) => self.on_failure(e).await,
        }
    }

    async fn send_heartbeat(&mut self) {
        if !self.collab.connection.is_connected() {
            return;
        }
        trace!(workspace_id = %self.workspace_id, "Sending heartbeat");
        messages::record_heartbeat(&self.metrics);
        self.write(ping_message()).await;
    }

    fn on_frame(&mut self, frame: &str) {
        messages::record_received(&self.metrics);

        let (envelope, events) = match route_frame(&mut self.collab, frame) {
            Routed::Dispatched { envelope, events } => (envelope, events),
            Routed::Ignored(envelope) => (envelope, Vec::new()),
            Routed::Dropped(_) => {
                messages::record_decode_error(&self.metrics);
                return;
            }
        };

        self.collab.last_message = Some(envelope.clone());
        self.publish();
        self.events.emit(SessionEvent::Message(envelope));
        self.events.emit_all(events);
    }

    fn publish(&self) {
        self.snapshot
            .send_replace(self.collab.snapshot(self.policy.attempts()));
    }
}

/// Wait for whatever the current link produces next.
///
/// Cancel-safe: the connect future, the frame stream and the heartbeat all
/// keep their progress when this future is dropped.
async fn link_step(link: &mut Link) -> Step {
    match link {
        Link::Idle => pending().await,
        Link::Connecting(connect) => Step::Connected(connect.await),
        Link::Open {
            transport,
            heartbeat,
            ..
        } => {
            tokio::select! {
                frame = transport.stream.next() => Step::Frame(frame),
                _ = heartbeat.tick() => Step::Heartbeat,
            }
        }
        Link::Backoff(deadline) => {
            sleep_until(*deadline).await;
            Step::Retry
        }
    }
}
