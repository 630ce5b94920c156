//! TaskHub Sync: joins a workspace collaboration session and logs what
//! happens in it.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use taskhub_collab::{CollabSession, SessionEvent, WsConnector};
use taskhub_core::config::AppConfig;
use taskhub_core::error::AppError;
use taskhub_core::types::WorkspaceId;

/// Join a TaskHub workspace collaboration session.
#[derive(Debug, Parser)]
#[command(name = "taskhub-sync", version, about)]
struct Cli {
    /// Workspace to join
    #[arg(short, long)]
    workspace: String,

    /// Auth token passed to the collaboration service
    #[arg(short, long, env = "TASKHUB_TOKEN", default_value = "", hide_env_values = true)]
    token: String,

    /// Configuration environment (selects config/<env>.toml)
    #[arg(short, long, env = "TASKHUB_ENV", default_value = "development")]
    env: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config, cli).await {
        tracing::error!("Sync error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig, cli: Cli) -> Result<(), AppError> {
    tracing::info!("Starting TaskHub Sync v{}", env!("CARGO_PKG_VERSION"));

    let workspace_id = WorkspaceId::new(cli.workspace);
    let mut session = CollabSession::start(
        &config.collab,
        Arc::new(WsConnector),
        workspace_id.clone(),
        &cli.token,
    )?;
    let mut events = session
        .take_events()
        .ok_or_else(|| AppError::internal("Session event stream already taken"))?;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => log_event(&workspace_id, &event),
                None => break,
            },
            _ = &mut shutdown => {
                tracing::info!("Shutdown signal received");
                break;
            }
        }
    }

    session.shutdown().await;
    tracing::info!("TaskHub Sync stopped");
    Ok(())
}

fn log_event(workspace_id: &WorkspaceId, event: &SessionEvent) {
    match event {
        SessionEvent::Opened => tracing::info!(%workspace_id, "Connected"),
        SessionEvent::Closed => tracing::info!(%workspace_id, "Disconnected"),
        SessionEvent::Error(reason) => tracing::warn!(%workspace_id, %reason, "Connection error"),
        SessionEvent::Message(envelope) => {
            tracing::debug!(%workspace_id, kind = %envelope.kind, "Message received")
        }
        SessionEvent::CursorColorAssigned(color) => {
            tracing::info!(%workspace_id, %color, "Cursor color assigned")
        }
        SessionEvent::RosterReplaced(users) => {
            tracing::info!(%workspace_id, count = users.len(), "Roster received")
        }
        SessionEvent::UserJoined(user) => {
            tracing::info!(%workspace_id, user_id = %user.id, name = %user.name, "User joined")
        }
        SessionEvent::UserLeft(user_id) => tracing::info!(%workspace_id, %user_id, "User left"),
        SessionEvent::UserIdle { user_id, idle } => {
            tracing::info!(%workspace_id, %user_id, idle, "User idle state changed")
        }
        SessionEvent::DocumentUpdated(update) => tracing::info!(
            %workspace_id,
            document_id = %update.document_id,
            user_id = %update.user_id,
            version = update.version,
            kind = update.operation.kind(),
            "Document updated"
        ),
        SessionEvent::Activity(activity) => tracing::info!(
            %workspace_id,
            user_id = %activity.user_id,
            activity = %activity.activity,
            "Activity"
        ),
        SessionEvent::TypingChanged(users) => {
            tracing::debug!(%workspace_id, typing = users.len(), "Typing set changed")
        }
        other => tracing::trace!(%workspace_id, kind = other.kind(), "Session event"),
    }
}
