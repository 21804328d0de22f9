use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use uuid::Uuid;

use meeting_cell::models::MeetingError;
use meeting_cell::services::MeetingRoomService;
use meeting_cell::store::RoomStore;
use realtime_cell::EventHub;
use shared_models::auth::User;
use shared_utils::test_utils::TestUser;

fn test_service() -> (Arc<MeetingRoomService>, Arc<RoomStore>, Arc<EventHub>) {
    let store = Arc::new(RoomStore::new());
    let hub = Arc::new(EventHub::new());
    let service = Arc::new(MeetingRoomService::new(
        store.clone(),
        hub.clone(),
        "http://localhost:3000",
    ));
    (service, store, hub)
}

fn host_user() -> User {
    TestUser::doctor("host@example.com").to_user()
}

fn guest_user() -> User {
    TestUser::patient("guest@example.com").to_user()
}

#[tokio::test]
async fn created_room_has_generated_credentials() {
    let (service, _, _) = test_service();
    let appointment_id = Uuid::new_v4();
    let host = host_user();

    let room = service.create_room(appointment_id, host.id).await.unwrap();

    assert!(room.room_id.starts_with("room-"));
    assert_eq!(room.room_id.len(), "room-".len() + 12);
    assert_eq!(room.access_code.len(), 6);
    assert_eq!(room.password.len(), 12);
    assert_eq!(
        room.room_link,
        format!("http://localhost:3000/room/{}", room.room_id)
    );
    assert_eq!(room.appointment_id, appointment_id);
    assert_eq!(room.host_id, host.id);
    assert!(!room.is_active);
    assert!(room.started_at.is_none());
    assert!(room.participants.is_empty());
}

#[tokio::test]
async fn rejoining_appends_a_second_participant_entry() {
    let (service, _, _) = test_service();
    let host = host_user();
    let guest = guest_user();
    let room = service.create_room(Uuid::new_v4(), host.id).await.unwrap();

    let (_, first_role) = service.join_room(&room.room_id, &guest).await.unwrap();
    service.leave_room(&room.room_id, &guest).await.unwrap();
    let (room_after, second_role) = service.join_room(&room.room_id, &guest).await.unwrap();

    assert_eq!(first_role.to_string(), "participant");
    assert_eq!(second_role.to_string(), "participant");

    let entries: Vec<_> = room_after
        .participants
        .iter()
        .filter(|p| p.user_id == guest.id)
        .collect();
    assert_eq!(entries.len(), 2, "both joins must be kept in history");
    assert!(entries[0].left_at.is_some());
    assert!(entries[1].left_at.is_none());
}

#[tokio::test]
async fn host_gets_the_host_role_on_join() {
    let (service, _, _) = test_service();
    let host = host_user();
    let room = service.create_room(Uuid::new_v4(), host.id).await.unwrap();

    let (room_after, role) = service.join_room(&room.room_id, &host).await.unwrap();

    assert_eq!(role.to_string(), "host");
    assert!(room_after.is_active, "first join activates the room");
    assert_eq!(room_after.peak_participants, 1);
}

#[tokio::test]
async fn leave_closes_only_the_most_recent_open_entry() {
    let (service, _, _) = test_service();
    let host = host_user();
    let guest = guest_user();
    let room = service.create_room(Uuid::new_v4(), host.id).await.unwrap();

    // Two open entries for the same user (double join without leave).
    service.join_room(&room.room_id, &guest).await.unwrap();
    service.join_room(&room.room_id, &guest).await.unwrap();

    let room_after = service.leave_room(&room.room_id, &guest).await.unwrap();

    let entries: Vec<_> = room_after
        .participants
        .iter()
        .filter(|p| p.user_id == guest.id)
        .collect();
    assert_eq!(entries.len(), 2);
    assert!(entries[0].left_at.is_none(), "older entry stays open");
    assert!(entries[1].left_at.is_some(), "latest entry is closed");
}

#[tokio::test]
async fn leave_without_open_entry_is_a_noop() {
    let (service, _, _) = test_service();
    let host = host_user();
    let guest = guest_user();
    let room = service.create_room(Uuid::new_v4(), host.id).await.unwrap();

    let room_after = service.leave_room(&room.room_id, &guest).await.unwrap();
    assert!(room_after.participants.is_empty());
}

#[tokio::test]
async fn only_the_host_may_start_or_end() {
    let (service, _, _) = test_service();
    let host = host_user();
    let guest = guest_user();
    let room = service.create_room(Uuid::new_v4(), host.id).await.unwrap();

    let start = service.start_meeting(&room.room_id, &guest).await;
    assert_matches!(start, Err(MeetingError::HostRequired));

    let end = service.end_meeting(&room.room_id, &guest, None).await;
    assert_matches!(end, Err(MeetingError::HostRequired));
}

#[tokio::test]
async fn end_computes_duration_in_whole_seconds() {
    let (service, store, _) = test_service();
    let host = host_user();
    let room = service.create_room(Uuid::new_v4(), host.id).await.unwrap();

    service.start_meeting(&room.room_id, &host).await.unwrap();

    // Pretend the meeting started 125 seconds ago.
    store
        .update_with(&room.room_id, |room| {
            room.started_at = Some(Utc::now() - Duration::seconds(125));
        })
        .await
        .unwrap();

    let ended = service.end_meeting(&room.room_id, &host, None).await.unwrap();

    assert!(!ended.is_active);
    assert!(ended.ended_at.is_some());
    assert_eq!(ended.total_duration_seconds, Some(125));
}

#[tokio::test]
async fn restarting_overwrites_the_start_time() {
    let (service, store, _) = test_service();
    let host = host_user();
    let room = service.create_room(Uuid::new_v4(), host.id).await.unwrap();

    service.start_meeting(&room.room_id, &host).await.unwrap();
    let backdated = Utc::now() - Duration::seconds(600);
    store
        .update_with(&room.room_id, |room| {
            room.started_at = Some(backdated);
        })
        .await
        .unwrap();

    let restarted = service.start_meeting(&room.room_id, &host).await.unwrap();
    assert!(restarted.started_at.unwrap() > backdated);
}

#[tokio::test]
async fn double_end_is_idempotent_and_emits_one_terminal_event() {
    let (service, _, hub) = test_service();
    let host = host_user();
    let room = service.create_room(Uuid::new_v4(), host.id).await.unwrap();
    service.start_meeting(&room.room_id, &host).await.unwrap();

    // Subscribe after start so only end events arrive.
    let mut events = hub.subscribe_room(&room.room_id).await;

    let (first, second) = tokio::join!(
        service.end_meeting(&room.room_id, &host, None),
        service.end_meeting(&room.room_id, &host, None),
    );

    let first = first.unwrap();
    let second = second.unwrap();
    assert_eq!(first.ended_at, second.ended_at);
    assert_eq!(first.total_duration_seconds, second.total_duration_seconds);

    let mut ended_events = 0;
    while let Ok(message) = events.try_recv() {
        let parsed: serde_json::Value = serde_json::from_str(&message).unwrap();
        if parsed["type"] == "meeting-ended" {
            ended_events += 1;
        }
    }
    assert_eq!(ended_events, 1, "only one end transition may be observed");
}

#[tokio::test]
async fn end_without_start_leaves_duration_unset() {
    let (service, _, _) = test_service();
    let host = host_user();
    let room = service.create_room(Uuid::new_v4(), host.id).await.unwrap();

    let ended = service.end_meeting(&room.room_id, &host, None).await.unwrap();
    assert!(ended.ended_at.is_some());
    assert_eq!(ended.total_duration_seconds, None);
}

#[tokio::test]
async fn ended_meetings_reject_join_and_start() {
    let (service, _, _) = test_service();
    let host = host_user();
    let guest = guest_user();
    let room = service.create_room(Uuid::new_v4(), host.id).await.unwrap();
    service.end_meeting(&room.room_id, &host, None).await.unwrap();

    let join = service.join_room(&room.room_id, &guest).await;
    assert_matches!(join, Err(MeetingError::AlreadyEnded));

    let start = service.start_meeting(&room.room_id, &host).await;
    assert_matches!(start, Err(MeetingError::AlreadyEnded));
}

#[tokio::test]
async fn end_binds_the_recording_id() {
    let (service, _, _) = test_service();
    let host = host_user();
    let room = service.create_room(Uuid::new_v4(), host.id).await.unwrap();
    service.start_meeting(&room.room_id, &host).await.unwrap();

    let ended = service
        .end_meeting(&room.room_id, &host, Some("rec-42".to_string()))
        .await
        .unwrap();
    assert_eq!(ended.recording_id.as_deref(), Some("rec-42"));
}

#[tokio::test]
async fn chat_requires_message_text() {
    let (service, _, _) = test_service();
    let host = host_user();
    let room = service.create_room(Uuid::new_v4(), host.id).await.unwrap();

    let result = service.add_chat_message(&room.room_id, &host, "   ").await;
    assert_matches!(result, Err(MeetingError::ValidationError(_)));
}

#[tokio::test]
async fn chat_appends_in_order_and_does_not_require_membership() {
    let (service, _, _) = test_service();
    let host = host_user();
    let stranger = guest_user();
    let room = service.create_room(Uuid::new_v4(), host.id).await.unwrap();

    service
        .add_chat_message(&room.room_id, &host, "hello")
        .await
        .unwrap();
    // Not a participant, still allowed to post.
    let room_after = service
        .add_chat_message(&room.room_id, &stranger, "hi there")
        .await
        .unwrap();

    assert_eq!(room_after.chat_history.len(), 2);
    assert_eq!(room_after.chat_history[0].message, "hello");
    assert_eq!(room_after.chat_history[1].message, "hi there");
    assert_eq!(room_after.chat_history[1].user_id, stranger.id);
}

#[tokio::test]
async fn active_meetings_exclude_ended_rooms_and_sort_recent_first() {
    let (service, store, _) = test_service();
    let host = host_user();
    let guest = guest_user();

    let older = service.create_room(Uuid::new_v4(), host.id).await.unwrap();
    let newer = service.create_room(Uuid::new_v4(), host.id).await.unwrap();
    let ended = service.create_room(Uuid::new_v4(), host.id).await.unwrap();

    // Give the rooms distinct creation times.
    store
        .update_with(&older.room_id, |room| {
            room.created_at = Utc::now() - Duration::minutes(30);
        })
        .await
        .unwrap();

    service.join_room(&older.room_id, &guest).await.unwrap();
    service.join_room(&newer.room_id, &guest).await.unwrap();
    service.join_room(&ended.room_id, &guest).await.unwrap();
    service.end_meeting(&ended.room_id, &host, None).await.unwrap();

    let active = service.active_meetings_for(guest.id).await;

    assert_eq!(active.len(), 2);
    assert_eq!(active[0].room_id, newer.room_id);
    assert_eq!(active[1].room_id, older.room_id);
}

#[tokio::test]
async fn get_room_for_unknown_id_is_not_found() {
    let (service, _, _) = test_service();
    let result = service.get_room("room-000000000000").await;
    assert_matches!(result, Err(MeetingError::RoomNotFound));
}
