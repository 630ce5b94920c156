//! Integration tests for the collaboration session lifecycle over a real
//! WebSocket.

mod helpers;

use std::time::Duration;

use serde_json::json;

use taskhub_collab::{ConnectionState, SessionEvent};

#[tokio::test]
async fn test_connects_with_token_in_query() {
    let mut server = helpers::FakeServer::start().await;
    let mut session = helpers::start_session(&server, "ws-int", "secret-token");
    let mut events = session.take_events().unwrap();

    let conn = server.accept().await;
    assert_eq!(conn.uri, "/ws/workspace/ws-int?token=secret-token");

    let opened = helpers::next_event(&mut events, |e| matches!(e, SessionEvent::Opened)).await;
    assert_eq!(opened, SessionEvent::Opened);
    assert_eq!(session.handle().state(), ConnectionState::Connected);

    session.shutdown().await;
}

#[tokio::test]
async fn test_connection_established_assigns_cursor_color() {
    let mut server = helpers::FakeServer::start().await;
    let mut session = helpers::start_session(&server, "ws-int", "t");
    let mut events = session.take_events().unwrap();
    let handle = session.handle();

    let mut conn = server.accept().await;
    conn.send_json(json!({
        "type": "connection_established",
        "data": {"cursor_color": "#4ECDC4"}
    }))
    .await;

    let event =
        helpers::next_event(&mut events, |e| matches!(e, SessionEvent::CursorColorAssigned(_)))
            .await;
    assert_eq!(event, SessionEvent::CursorColorAssigned("#4ECDC4".to_string()));
    assert_eq!(handle.cursor_color().as_deref(), Some("#4ECDC4"));

    session.shutdown().await;
}

#[tokio::test]
async fn test_reconnects_after_server_close() {
    let mut server = helpers::FakeServer::start().await;
    let session = helpers::start_session(&server, "ws-int", "t");
    let handle = session.handle();

    let first = server.accept().await;
    helpers::wait_until(&handle, |s| s.is_connected()).await;

    first.close().await;
    let second = server.accept().await;
    assert_eq!(second.uri, "/ws/workspace/ws-int?token=t");
    helpers::wait_until(&handle, |s| s.is_connected()).await;
    assert_eq!(handle.metrics().snapshot().connections_opened, 2);

    session.shutdown().await;
}

#[tokio::test]
async fn test_disconnect_stops_reconnecting() {
    let mut server = helpers::FakeServer::start().await;
    let session = helpers::start_session(&server, "ws-int", "t");
    let handle = session.handle();

    let mut conn = server.accept().await;
    helpers::wait_until(&handle, |s| s.is_connected()).await;

    handle.disconnect().unwrap();
    assert!(conn.recv_json().await.is_none());
    helpers::wait_until(&handle, |s| s.state == ConnectionState::Disconnected).await;

    assert!(!server.connects_within(Duration::from_millis(500)).await);

    handle.reconnect().unwrap();
    let _again = server.accept().await;
    helpers::wait_until(&handle, |s| s.is_connected()).await;

    session.shutdown().await;
}

#[tokio::test]
async fn test_gives_up_after_max_attempts() {
    // Bind and drop a listener so the port refuses connections.
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let config = taskhub_core::config::CollabConfig {
        base_url: format!("ws://{addr}/ws"),
        reconnect_delay_ms: 20,
        max_reconnect_attempts: 3,
        ..Default::default()
    };
    let mut session = taskhub_collab::CollabSession::start(
        &config,
        std::sync::Arc::new(taskhub_collab::WsConnector),
        "ws-int".into(),
        "t",
    )
    .unwrap();
    let mut events = session.take_events().unwrap();
    let handle = session.handle();

    helpers::wait_until(&handle, |s| s.reconnect_attempts == 3).await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    let mut errors = 0;
    while let Ok(event) = events.try_recv() {
        if matches!(event, SessionEvent::Error(_)) {
            errors += 1;
        }
    }
    assert_eq!(errors, 3);
    assert_eq!(handle.state(), ConnectionState::Disconnected);

    session.shutdown().await;
}

#[tokio::test]
async fn test_send_while_disconnected_writes_nothing() {
    let mut server = helpers::FakeServer::start().await;
    let session = helpers::start_session(&server, "ws-int", "t");
    let handle = session.handle();

    let mut conn = server.accept().await;
    helpers::wait_until(&handle, |s| s.is_connected()).await;
    handle.disconnect().unwrap();
    helpers::wait_until(&handle, |s| s.state == ConnectionState::Disconnected).await;

    handle.request_sync();
    handle.set_typing(true, None);

    assert!(conn.recv_json().await.is_none());
    assert_eq!(handle.metrics().snapshot().frames_dropped, 2);

    session.shutdown().await;
}
