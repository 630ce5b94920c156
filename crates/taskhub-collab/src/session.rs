//! A running collaboration session.

use std::sync::Arc;

use taskhub_core::config::CollabConfig;
use taskhub_core::types::WorkspaceId;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{Instrument, info_span, warn};

use crate::connection::handle::CollabHandle;
use crate::connection::manager::ConnectionManager;
use crate::connection::transport::{Connector, session_url};
use crate::error::{CollabError, CollabResult};
use crate::event::SessionEvent;

/// Owns the task behind one workspace session.
///
/// Dropping the session asks the task to tear down; [`shutdown`](Self::shutdown)
/// does the same and waits for it.
#[derive(Debug)]
pub struct CollabSession {
    handle: CollabHandle,
    events: Option<mpsc::Receiver<SessionEvent>>,
    task: Option<JoinHandle<()>>,
}

impl CollabSession {
    /// Validate `config`, then spawn a session for `workspace_id` that
    /// authenticates with `token`.
    ///
    /// Must be called inside a tokio runtime.
    pub fn start(
        config: &CollabConfig,
        connector: Arc<dyn Connector>,
        workspace_id: WorkspaceId,
        token: &str,
    ) -> CollabResult<Self> {
        config.validate()?;
        if workspace_id.as_str().trim().is_empty() {
            return Err(CollabError::InvalidConfig(
                "workspace id must not be empty".to_string(),
            ));
        }

        let url = session_url(&config.base_url, &workspace_id, token);
        let span = info_span!("collab_session", workspace_id = %workspace_id);
        let (manager, handle, events) = ConnectionManager::new(config, workspace_id, url, connector);
        let task = tokio::spawn(manager.run().instrument(span));

        Ok(Self {
            handle,
            events: Some(events),
            task: Some(task),
        })
    }

    /// A new handle to the session
    pub fn handle(&self) -> CollabHandle {
        self.handle.clone()
    }

    pub fn workspace_id(&self) -> &WorkspaceId {
        self.handle.workspace_id()
    }

    /// Take the event stream. Only the first call returns it.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<SessionEvent>> {
        self.events.take()
    }

    /// Tear the session down and wait for its task to finish.
    pub async fn shutdown(mut self) {
        let _ = self.handle.shutdown();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(
                    workspace_id = %self.handle.workspace_id(),
                    error = %e,
                    "Collaboration session task failed"
                );
            }
        }
    }
}

impl Drop for CollabSession {
    fn drop(&mut self) {
        if self.task.is_some() {
            let _ = self.handle.shutdown();
        }
    }
}
