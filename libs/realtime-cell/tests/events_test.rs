use std::sync::Arc;

use assert_matches::assert_matches;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use realtime_cell::models::ClientMessage;
use realtime_cell::router::{realtime_routes, RealtimeState};
use realtime_cell::{AppointmentEvent, AppointmentEventKind, EventHub, RoomEvent, RoomEventKind};
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

#[tokio::test]
async fn ws_route_requires_authentication() {
    let test_config = TestConfig::default();
    let state = RealtimeState {
        config: test_config.to_arc(),
        hub: Arc::new(EventHub::new()),
    };

    let response = realtime_routes(state)
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/ws")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn ws_route_rejects_plain_http_requests() {
    let test_config = TestConfig::default();
    let state = RealtimeState {
        config: test_config.to_arc(),
        hub: Arc::new(EventHub::new()),
    };
    let user = TestUser::patient("viewer@example.com");
    let token = JwtTestUtils::create_test_token(&user, &test_config.jwt_secret, Some(1));

    // Authenticated but without the websocket upgrade headers.
    let response = realtime_routes(state)
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/ws")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[test]
fn client_messages_parse_from_wire_json() {
    let joined: ClientMessage =
        serde_json::from_str(r#"{"action": "join-meeting", "room_id": "room-abc123"}"#).unwrap();
    assert_matches!(joined, ClientMessage::JoinMeeting { room_id } if room_id == "room-abc123");

    let audio: ClientMessage = serde_json::from_str(
        r#"{"action": "toggle-audio", "room_id": "room-abc123", "enabled": false}"#,
    )
    .unwrap();
    assert_matches!(audio, ClientMessage::ToggleAudio { enabled: false, .. });

    let chat: ClientMessage = serde_json::from_str(
        r#"{"action": "send-chat", "room_id": "room-abc123", "message": "hello"}"#,
    )
    .unwrap();
    assert_matches!(chat, ClientMessage::SendChat { message, .. } if message == "hello");
}

#[test]
fn unknown_client_actions_fail_to_parse() {
    let result: Result<ClientMessage, _> =
        serde_json::from_str(r#"{"action": "delete-room", "room_id": "room-abc123"}"#);
    assert!(result.is_err());
}

#[test]
fn appointment_events_carry_type_and_payload() {
    let appointment_id = Uuid::new_v4();
    let event = AppointmentEvent::new(
        AppointmentEventKind::Cancelled,
        appointment_id,
        json!({"reason": "Patient request"}),
    );

    let wire: Value = serde_json::to_value(&event).unwrap();
    assert_eq!(wire["type"], "cancelled");
    assert_eq!(wire["appointment_id"], appointment_id.to_string().as_str());
    assert_eq!(wire["data"]["reason"], "Patient request");
    assert!(wire["timestamp"].is_string());
}

#[test]
fn room_events_carry_type_and_sender() {
    let user_id = Uuid::new_v4();
    let event = RoomEvent::new(
        RoomEventKind::ScreenShareStarted,
        "room-abc123def456",
        user_id,
        json!({"name": "Dr. Vega"}),
    );

    let wire: Value = serde_json::to_value(&event).unwrap();
    assert_eq!(wire["type"], "screen-share-started");
    assert_eq!(wire["room_id"], "room-abc123def456");
    assert_eq!(wire["user_id"], user_id.to_string().as_str());
}
