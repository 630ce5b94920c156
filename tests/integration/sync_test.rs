//! Integration tests for presence, cursor, typing and document sync over a
//! real WebSocket.

mod helpers;

use serde_json::json;

use taskhub_collab::SessionEvent;
use taskhub_collab::cursor::Position;
use taskhub_collab::document::EditOperation;
use taskhub_collab::presence::PresenceStatus;

#[tokio::test]
async fn test_roster_and_cursor_flow() {
    let mut server = helpers::FakeServer::start().await;
    let session = helpers::start_session(&server, "ws-sync", "t");
    let handle = session.handle();
    let mut conn = server.accept().await;

    conn.send_json(json!({
        "type": "workspace_users",
        "data": {"users": [{"id": "u1", "name": "Ada"}, {"id": "u2", "name": "Grace"}]}
    }))
    .await;
    conn.send_json(json!({"type": "user_joined", "data": {"id": "u3", "name": "Linus"}}))
        .await;
    conn.send_json(json!({"type": "user_joined", "data": {"id": "u3", "name": "Linus"}}))
        .await;
    conn.send_json(json!({
        "type": "cursor_update",
        "data": {"user_id": "u1", "user_name": "Ada", "position": {"line": 1, "col": 0}}
    }))
    .await;
    conn.send_json(json!({
        "type": "cursor_update",
        "data": {"user_id": "u1", "user_name": "Ada", "position": {"line": 2, "col": 5}}
    }))
    .await;
    conn.send_json(json!({"type": "user_idle", "data": {"user_id": "u2"}}))
        .await;

    helpers::wait_until(&handle, |s| {
        s.users.len() == 3
            && s.cursor(&"u1".into()).map(|c| c.position) == Some(Position::new(2, 5))
            && s.user(&"u2".into()).map(|u| u.status) == Some(PresenceStatus::Idle)
    })
    .await;
    assert_eq!(handle.cursors().len(), 1);

    conn.send_json(json!({"type": "user_left", "data": {"user_id": "u1"}}))
        .await;
    helpers::wait_until(&handle, |s| s.users.len() == 2 && s.cursors.is_empty()).await;

    session.shutdown().await;
}

#[tokio::test]
async fn test_outbound_messages_use_envelope() {
    let mut server = helpers::FakeServer::start().await;
    let session = helpers::start_session(&server, "ws-sync", "t");
    let handle = session.handle();
    let mut conn = server.accept().await;
    helpers::wait_until(&handle, |s| s.is_connected()).await;

    handle.update_cursor(Position::new(4, 2), None, Some("board/roadmap".to_string()));
    handle.send_operation(
        "doc-1".into(),
        EditOperation::Insert {
            position: 0,
            content: "Hello".to_string(),
        },
    );
    handle.send_activity("viewing_task", Some(json!({"task_id": 7})));
    handle.set_typing(true, None);

    assert_eq!(
        conn.recv_json().await.unwrap(),
        json!({
            "type": "cursor_update",
            "data": {"position": {"line": 4, "column": 2}, "file_path": "board/roadmap"}
        })
    );
    assert_eq!(
        conn.recv_json().await.unwrap(),
        json!({
            "type": "document_update",
            "data": {
                "document_id": "doc-1",
                "operation": {"type": "insert", "position": 0, "content": "Hello"}
            }
        })
    );
    assert_eq!(
        conn.recv_json().await.unwrap(),
        json!({"type": "activity_update", "data": {"activity": "viewing_task", "details": {"task_id": 7}}})
    );
    assert_eq!(
        conn.recv_json().await.unwrap(),
        json!({"type": "typing_indicator", "data": {"is_typing": true}})
    );

    session.shutdown().await;
}

#[tokio::test]
async fn test_remote_document_updates_relayed_in_order() {
    let mut server = helpers::FakeServer::start().await;
    let mut session = helpers::start_session(&server, "ws-sync", "t");
    let mut events = session.take_events().unwrap();
    let mut conn = server.accept().await;

    for version in [3, 1, 2] {
        conn.send_json(json!({
            "type": "document_update",
            "data": {
                "document_id": "doc-1",
                "user_id": "u2",
                "version": version,
                "operation": {"type": "delete", "position": 1, "length": 1}
            }
        }))
        .await;
    }

    let mut versions = Vec::new();
    while versions.len() < 3 {
        match helpers::next_event(&mut events, |e| matches!(e, SessionEvent::DocumentUpdated(_)))
            .await
        {
            SessionEvent::DocumentUpdated(update) => versions.push(update.version),
            _ => unreachable!(),
        }
    }
    assert_eq!(versions, vec![3, 1, 2]);

    session.shutdown().await;
}

#[tokio::test]
async fn test_typing_indicator_stop_and_malformed_frames() {
    let mut server = helpers::FakeServer::start().await;
    let session = helpers::start_session(&server, "ws-sync", "t");
    let handle = session.handle();
    let mut conn = server.accept().await;

    conn.send_raw("definitely not json").await;
    conn.send_json(json!({"type": "user_typing", "data": {"user_id": "u1", "is_typing": true}}))
        .await;
    helpers::wait_until(&handle, |s| s.typing.len() == 1).await;

    conn.send_json(json!({"type": "typing_indicator", "data": {"user_id": "u1", "is_typing": false}}))
        .await;
    helpers::wait_until(&handle, |s| s.typing.is_empty()).await;

    assert!(handle.is_connected());
    assert_eq!(handle.metrics().snapshot().decode_errors, 1);

    session.shutdown().await;
}
