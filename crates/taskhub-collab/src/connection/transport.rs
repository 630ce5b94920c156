//! Socket transport seam.
//!
//! The session task only ever sees a sink of text frames and a stream of
//! text frames. [`WsConnector`] provides them over `tokio-tungstenite`;
//! tests substitute an in-memory connector.

use std::fmt;
use std::future;
use std::pin::Pin;

use async_trait::async_trait;
use futures::{Sink, SinkExt, Stream, StreamExt};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use taskhub_core::types::WorkspaceId;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;

use crate::error::CollabError;

/// Outbound half of a connection
pub type FrameSink = Pin<Box<dyn Sink<String, Error = CollabError> + Send>>;
/// Inbound half of a connection; ends when the peer closes
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<String, CollabError>> + Send>>;

/// An established connection.
pub struct Transport {
    pub sink: FrameSink,
    pub stream: FrameStream,
}

impl Transport {
    pub fn new<Si, St>(sink: Si, stream: St) -> Self
    where
        Si: Sink<String, Error = CollabError> + Send + 'static,
        St: Stream<Item = Result<String, CollabError>> + Send + 'static,
    {
        Self {
            sink: Box::pin(sink),
            stream: Box::pin(stream),
        }
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport").finish_non_exhaustive()
    }
}

/// Opens connections to the collaboration service.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Open a connection to `url`.
    async fn connect(&self, url: &str) -> Result<Transport, CollabError>;
}

/// WebSocket connector.
#[derive(Debug, Default, Clone, Copy)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &str) -> Result<Transport, CollabError> {
        let (socket, response) = connect_async(url).await.map_err(|e| CollabError::Connect {
            url: redact_url(url),
            reason: e.to_string(),
        })?;
        debug!(
            url = %redact_url(url),
            status = %response.status(),
            "WebSocket handshake complete"
        );

        let (write, read) = socket.split();

        let sink =
            write.with(|text: String| future::ready(Ok::<_, CollabError>(Message::text(text))));

        let stream = read
            .take_while(|msg| future::ready(!matches!(msg, Ok(Message::Close(_)))))
            .filter_map(|msg| {
                future::ready(match msg {
                    Ok(Message::Text(text)) => Some(Ok(text.as_str().to_owned())),
                    Ok(Message::Binary(bytes)) => match String::from_utf8(bytes.to_vec()) {
                        Ok(text) => Some(Ok(text)),
                        Err(_) => {
                            debug!(len = bytes.len(), "Skipping non-UTF-8 binary frame");
                            None
                        }
                    },
                    Ok(_) => None,
                    Err(e) => Some(Err(CollabError::from(e))),
                })
            });

        Ok(Transport::new(sink, stream))
    }
}

/// RFC 3986 unreserved characters pass through; everything else is escaped.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Build the session URL: `<base>/workspace/<id>?token=<token>`.
///
/// Trailing slashes on `base` are ignored; an empty token omits the query.
/// The workspace id and token are percent-encoded.
pub fn session_url(base: &str, workspace_id: &WorkspaceId, token: &str) -> String {
    let base = base.trim().trim_end_matches('/');
    let workspace = utf8_percent_encode(workspace_id.as_str(), UNRESERVED);
    if token.is_empty() {
        format!("{base}/workspace/{workspace}")
    } else {
        let token = utf8_percent_encode(token, UNRESERVED);
        format!("{base}/workspace/{workspace}?token={token}")
    }
}

/// Strip the query string so credentials never reach the logs.
pub fn redact_url(url: &str) -> String {
    match url.split_once('?') {
        Some((path, _)) => format!("{path}?<redacted>"),
        None => url.to_string(),
    }
}
