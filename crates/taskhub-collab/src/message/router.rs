//! Inbound message routing.
//!
//! Each recognised kind has exactly one handler that mutates
//! [`CollabState`] and reports what changed as [`SessionEvent`]s.

use tracing::{debug, warn};

use super::envelope::Envelope;
use super::serializer;
use super::types::InboundMessage;
use crate::document::relay::DocumentRelay;
use crate::error::CollabError;
use crate::event::SessionEvent;
use crate::state::CollabState;

/// Outcome of routing one inbound frame.
#[derive(Debug)]
pub enum Routed {
    /// A known kind was applied.
    Dispatched {
        envelope: Envelope,
        events: Vec<SessionEvent>,
    },
    /// Well-formed, but of a kind this client does not handle.
    Ignored(Envelope),
    /// The frame could not be decoded and was discarded.
    Dropped(CollabError),
}

/// Decode a text frame and apply it to `state`.
///
/// Malformed frames are logged and dropped; they never abort the session.
///
/// # Panics
///
/// Typing signals arm a timer, so this must run inside a Tokio runtime
/// with the time driver enabled.
pub fn route_frame(state: &mut CollabState, frame: &str) -> Routed {
    let envelope = match serializer::decode(frame) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, len = frame.len(), "Dropping undecodable frame");
            return Routed::Dropped(e);
        }
    };

    match envelope.to_inbound() {
        Ok(Some(message)) => {
            debug!(kind = %envelope.kind, "Routing inbound message");
            let events = route(state, message);
            Routed::Dispatched { envelope, events }
        }
        Ok(None) => {
            debug!(kind = %envelope.kind, "Ignoring unknown message kind");
            Routed::Ignored(envelope)
        }
        Err(e) => {
            warn!(kind = %envelope.kind, error = %e, "Dropping malformed message");
            Routed::Dropped(e)
        }
    }
}

/// Apply a decoded message to `state`.
///
/// Same runtime requirement as [`route_frame`].
pub fn route(state: &mut CollabState, message: InboundMessage) -> Vec<SessionEvent> {
    match message {
        InboundMessage::ConnectionEstablished(payload) => {
            if payload.user_id.is_some() {
                state.local_user_id = payload.user_id;
            }
            state.cursor_color = Some(payload.cursor_color.clone());
            vec![SessionEvent::CursorColorAssigned(payload.cursor_color)]
        }
        InboundMessage::WorkspaceUsers(snapshot) => {
            state.presence.replace_all(snapshot.into_users());
            vec![SessionEvent::RosterReplaced(state.presence.users().to_vec())]
        }
        InboundMessage::CursorPositions(snapshot) => {
            state.cursors.replace_all(snapshot.into_cursors());
            vec![SessionEvent::CursorsReplaced(state.cursors.cursors().to_vec())]
        }
        InboundMessage::UserJoined(user) => {
            if state.presence.apply_join(user.clone()) {
                vec![SessionEvent::UserJoined(user)]
            } else {
                Vec::new()
            }
        }
        InboundMessage::UserLeft(payload) => {
            let mut events = Vec::new();
            let left = state.presence.apply_leave(&payload.user_id).is_some();
            state.cursors.remove_for_user(&payload.user_id);
            let was_typing = state.typing.remove(&payload.user_id);
            if left {
                events.push(SessionEvent::UserLeft(payload.user_id));
            }
            if was_typing {
                events.push(SessionEvent::TypingChanged(state.typing.users()));
            }
            events
        }
        InboundMessage::CursorUpdate(cursor) => {
            state.cursors.apply_cursor_update(cursor.clone());
            vec![SessionEvent::CursorMoved(cursor)]
        }
        InboundMessage::DocumentUpdate(update) => vec![DocumentRelay::deliver(update)],
        InboundMessage::ActivityUpdate(activity) => vec![SessionEvent::Activity(activity)],
        InboundMessage::UserTyping(signal) => {
            if state.typing.apply_typing(signal) {
                vec![SessionEvent::TypingChanged(state.typing.users())]
            } else {
                Vec::new()
            }
        }
        InboundMessage::UserIdle(payload) => {
            if state.presence.apply_idle(&payload.user_id, payload.is_idle) {
                vec![SessionEvent::UserIdle {
                    user_id: payload.user_id,
                    idle: payload.is_idle,
                }]
            } else {
                Vec::new()
            }
        }
        InboundMessage::Pong(_) => vec![SessionEvent::Pong],
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::cursor::position::Position;
    use crate::presence::status::PresenceStatus;
    use serde_json::json;

    fn state() -> CollabState {
        CollabState::new(Duration::from_secs(3))
    }

    fn frame(value: serde_json::Value) -> String {
        value.to_string()
    }

    fn dispatched(routed: Routed) -> Vec<SessionEvent> {
        match routed {
            Routed::Dispatched { events, .. } => events,
            other => panic!("expected dispatch, got {other:?}"),
        }
    }

    #[test]
    fn test_connection_established_sets_color() {
        let mut state = state();
        let events = dispatched(route_frame(
            &mut state,
            &frame(json!({"type": "connection_established", "data": {"cursor_color": "#4ECDC4"}})),
        ));
        assert_eq!(state.cursor_color.as_deref(), Some("#4ECDC4"));
        assert_eq!(events, vec![SessionEvent::CursorColorAssigned("#4ECDC4".into())]);
    }

    #[test]
    fn test_duplicate_join_yields_single_entry() {
        let mut state = state();
        let join = frame(json!({"type": "user_joined", "data": {"id": "u1", "name": "Ada"}}));
        assert_eq!(dispatched(route_frame(&mut state, &join)).len(), 1);
        assert!(dispatched(route_frame(&mut state, &join)).is_empty());
        assert_eq!(state.presence.len(), 1);
    }

    #[test]
    fn test_cursor_updates_replace() {
        let mut state = state();
        route_frame(
            &mut state,
            &frame(json!({"type": "cursor_update", "data": {"user_id": "u1", "position": {"line": 1, "col": 0}}})),
        );
        route_frame(
            &mut state,
            &frame(json!({"type": "cursor_update", "data": {"user_id": "u1", "position": {"line": 2, "col": 5}}})),
        );
        assert_eq!(state.cursors.len(), 1);
        assert_eq!(state.cursors.cursors()[0].position, Position::new(2, 5));
    }

    #[tokio::test]
    async fn test_user_left_cascades() {
        let mut state = state();
        route_frame(&mut state, &frame(json!({"type": "user_joined", "data": {"id": "u1"}})));
        route_frame(
            &mut state,
            &frame(json!({"type": "cursor_update", "data": {"user_id": "u1", "position": {"line": 0}}})),
        );
        route_frame(
            &mut state,
            &frame(json!({"type": "user_typing", "data": {"user_id": "u1", "is_typing": true}})),
        );

        let events = dispatched(route_frame(
            &mut state,
            &frame(json!({"type": "user_left", "data": {"user_id": "u1"}})),
        ));

        assert!(state.presence.is_empty());
        assert!(state.cursors.is_empty());
        assert!(state.typing.is_empty());
        assert_eq!(
            events,
            vec![
                SessionEvent::UserLeft("u1".into()),
                SessionEvent::TypingChanged(Vec::new())
            ]
        );
    }

    #[test]
    fn test_idle_round_trip_for_known_user_only() {
        let mut state = state();
        route_frame(&mut state, &frame(json!({"type": "user_joined", "data": {"id": "u1"}})));

        route_frame(&mut state, &frame(json!({"type": "user_idle", "data": {"user_id": "u1"}})));
        assert_eq!(state.presence.get(&"u1".into()).unwrap().status, PresenceStatus::Idle);

        route_frame(
            &mut state,
            &frame(json!({"type": "user_idle", "data": {"user_id": "u1", "is_idle": false}})),
        );
        assert_eq!(state.presence.get(&"u1".into()).unwrap().status, PresenceStatus::Active);

        let events = dispatched(route_frame(
            &mut state,
            &frame(json!({"type": "user_idle", "data": {"user_id": "ghost"}})),
        ));
        assert!(events.is_empty());
        assert_eq!(state.presence.len(), 1);
    }

    #[test]
    fn test_snapshots_replace_collections() {
        let mut state = state();
        route_frame(&mut state, &frame(json!({"type": "user_joined", "data": {"id": "old"}})));
        route_frame(
            &mut state,
            &frame(json!({"type": "workspace_users", "data": {"users": [{"id": "u1"}, {"id": "u2"}]}})),
        );
        route_frame(
            &mut state,
            &frame(json!({"type": "cursor_positions", "data": [{"user_id": "u2", "position": {"line": 3}}]})),
        );

        assert_eq!(state.presence.len(), 2);
        assert!(!state.presence.contains(&"old".into()));
        assert_eq!(state.cursors.len(), 1);
    }

    #[test]
    fn test_epoch_millis_cursor_timestamp_is_accepted() {
        let mut state = state();
        let events = dispatched(route_frame(
            &mut state,
            &frame(json!({
                "type": "cursor_update",
                "data": {"user_id": "u1", "position": {"line": 4}, "timestamp": 1_700_000_000_000_i64}
            })),
        ));
        assert_eq!(events.len(), 1);
        assert_eq!(state.cursors.len(), 1);
        assert_eq!(
            state.cursors.cursors()[0].timestamp.timestamp_millis(),
            1_700_000_000_000
        );
    }

    #[test]
    fn test_naive_join_timestamp_is_accepted() {
        let mut state = state();
        route_frame(
            &mut state,
            &frame(json!({
                "type": "user_joined",
                "data": {"id": "u1", "joined_at": "2024-05-01T10:00:00.123456"}
            })),
        );
        let user = state.presence.get(&"u1".into()).unwrap();
        assert_eq!(user.joined_at.to_rfc3339(), "2024-05-01T10:00:00.123456+00:00");
    }

    #[test]
    fn test_unreadable_timestamp_falls_back_to_now() {
        let mut state = state();
        let before = chrono::Utc::now();
        route_frame(
            &mut state,
            &frame(json!({
                "type": "user_joined",
                "data": {"id": "u1", "joined_at": "not a date", "last_activity": null}
            })),
        );
        let user = state.presence.get(&"u1".into()).unwrap();
        assert!(user.joined_at >= before);
        assert!(user.last_activity >= before);
    }

    #[test]
    fn test_numeric_user_id_is_accepted() {
        let mut state = state();
        let events = dispatched(route_frame(
            &mut state,
            &frame(json!({"type": "user_joined", "data": {"id": 7, "name": "Ada"}})),
        ));
        assert_eq!(events.len(), 1);
        assert!(state.presence.contains(&"7".into()));

        route_frame(&mut state, &frame(json!({"type": "user_left", "data": {"user_id": 7}})));
        assert!(state.presence.is_empty());
    }

    #[test]
    fn test_unknown_kind_is_ignored() {
        let mut state = state();
        let routed = route_frame(&mut state, &frame(json!({"type": "brand_new", "data": {}})));
        assert!(matches!(routed, Routed::Ignored(env) if env.kind == "brand_new"));
    }

    #[test]
    fn test_malformed_frames_are_dropped() {
        let mut state = state();
        assert!(matches!(route_frame(&mut state, "{oops"), Routed::Dropped(_)));
        assert!(matches!(
            route_frame(&mut state, &frame(json!({"type": "user_left", "data": {"who": 1}}))),
            Routed::Dropped(_)
        ));
        assert!(state.presence.is_empty());
    }

    #[test]
    fn test_document_update_relayed_verbatim() {
        let mut state = state();
        let events = dispatched(route_frame(
            &mut state,
            &frame(json!({
                "type": "document_update",
                "data": {
                    "document_id": "d1",
                    "user_id": "u2",
                    "version": 4,
                    "operation": {"type": "insert", "position": 0, "content": "hi"}
                }
            })),
        ));
        assert!(matches!(&events[..], [SessionEvent::DocumentUpdated(u)] if u.version == 4));
    }

    #[test]
    fn test_pong() {
        let mut state = state();
        let events = dispatched(route_frame(&mut state, r#"{"type":"pong"}"#));
        assert_eq!(events, vec![SessionEvent::Pong]);
    }
}
