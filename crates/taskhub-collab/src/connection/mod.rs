//! Connection lifecycle: transport, heartbeat, bounded reconnect and the
//! session task that drives them.

pub mod handle;
pub mod heartbeat;
pub mod manager;
pub mod reconnect;
pub mod state;
pub mod transport;

pub use handle::CollabHandle;
pub use manager::ConnectionManager;
pub use reconnect::ReconnectPolicy;
pub use state::ConnectionState;
pub use transport::{Connector, Transport, WsConnector, session_url};
