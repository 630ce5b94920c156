//! Session registry: at most one live session per workspace.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use taskhub_core::config::CollabConfig;
use taskhub_core::types::WorkspaceId;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::connection::handle::CollabHandle;
use crate::connection::transport::Connector;
use crate::error::CollabResult;
use crate::event::SessionEvent;
use crate::session::CollabSession;

/// Live sessions indexed by workspace.
pub struct SessionRegistry {
    config: CollabConfig,
    connector: Arc<dyn Connector>,
    sessions: DashMap<WorkspaceId, CollabSession>,
}

impl fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("sessions", &self.sessions.len())
            .finish_non_exhaustive()
    }
}

impl SessionRegistry {
    pub fn new(config: CollabConfig, connector: Arc<dyn Connector>) -> Self {
        Self {
            config,
            connector,
            sessions: DashMap::new(),
        }
    }

    /// Open a session for `workspace_id`, or return the one already open.
    pub fn open(&self, workspace_id: WorkspaceId, token: &str) -> CollabResult<CollabHandle> {
        match self.sessions.entry(workspace_id) {
            Entry::Occupied(entry) => {
                debug!(workspace_id = %entry.key(), "Reusing existing collaboration session");
                Ok(entry.get().handle())
            }
            Entry::Vacant(entry) => {
                let session = CollabSession::start(
                    &self.config,
                    Arc::clone(&self.connector),
                    entry.key().clone(),
                    token,
                )?;
                let handle = session.handle();
                info!(workspace_id = %entry.key(), "Collaboration session opened");
                entry.insert(session);
                Ok(handle)
            }
        }
    }

    /// Take the event stream of a session. Only the first call returns it.
    pub fn take_events(&self, workspace_id: &WorkspaceId) -> Option<mpsc::Receiver<SessionEvent>> {
        self.sessions.get_mut(workspace_id)?.take_events()
    }

    pub fn get(&self, workspace_id: &WorkspaceId) -> Option<CollabHandle> {
        self.sessions.get(workspace_id).map(|s| s.handle())
    }

    /// Shut a session down. Returns whether one was open.
    pub async fn close(&self, workspace_id: &WorkspaceId) -> bool {
        let Some((_, session)) = self.sessions.remove(workspace_id) else {
            return false;
        };
        session.shutdown().await;
        info!(workspace_id = %workspace_id, "Collaboration session closed");
        true
    }

    /// Shut every session down.
    pub async fn close_all(&self) {
        for workspace_id in self.workspace_ids() {
            self.close(&workspace_id).await;
        }
    }

    pub fn workspace_ids(&self) -> Vec<WorkspaceId> {
        self.sessions.iter().map(|e| e.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
