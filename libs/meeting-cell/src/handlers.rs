// libs/meeting-cell/src/handlers.rs
use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};

use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{EndMeetingRequest, SendChatMessageRequest};
use crate::router::MeetingState;

#[axum::debug_handler]
pub async fn get_meeting(
    State(state): State<MeetingState>,
    Extension(user): Extension<User>,
    Path(room_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let room = state.rooms.get_room(&room_id).await.map_err(AppError::from)?;

    let is_host = room.host_id == user.id;
    Ok(Json(json!({
        "room": room,
        "role": if is_host { "host" } else { "participant" }
    })))
}

#[axum::debug_handler]
pub async fn join_meeting(
    State(state): State<MeetingState>,
    Extension(user): Extension<User>,
    Path(room_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let (room, role) = state
        .rooms
        .join_room(&room_id, &user)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({
        "success": true,
        "message": "Joined meeting",
        "room": room,
        "role": role.to_string()
    })))
}

#[axum::debug_handler]
pub async fn leave_meeting(
    State(state): State<MeetingState>,
    Extension(user): Extension<User>,
    Path(room_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let room = state
        .rooms
        .leave_room(&room_id, &user)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({
        "success": true,
        "message": "Left meeting",
        "room": room
    })))
}

#[axum::debug_handler]
pub async fn start_meeting(
    State(state): State<MeetingState>,
    Extension(user): Extension<User>,
    Path(room_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let room = state
        .rooms
        .start_meeting(&room_id, &user)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({
        "success": true,
        "message": "Meeting started",
        "room": room
    })))
}

#[axum::debug_handler]
pub async fn end_meeting(
    State(state): State<MeetingState>,
    Extension(user): Extension<User>,
    Path(room_id): Path<String>,
    Json(request): Json<EndMeetingRequest>,
) -> Result<Json<Value>, AppError> {
    let room = state
        .rooms
        .end_meeting(&room_id, &user, request.recording_id)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({
        "success": true,
        "message": "Meeting ended",
        "room": room,
        "total_duration_seconds": room.total_duration_seconds
    })))
}

#[axum::debug_handler]
pub async fn send_chat_message(
    State(state): State<MeetingState>,
    Extension(user): Extension<User>,
    Path(room_id): Path<String>,
    Json(request): Json<SendChatMessageRequest>,
) -> Result<Json<Value>, AppError> {
    let room = state
        .rooms
        .add_chat_message(&room_id, &user, &request.message)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({
        "success": true,
        "message": "Message sent",
        "chat_history": room.chat_history
    })))
}

#[axum::debug_handler]
pub async fn get_chat_history(
    State(state): State<MeetingState>,
    Extension(_user): Extension<User>,
    Path(room_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let messages = state
        .rooms
        .chat_history(&room_id)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({ "chat_history": messages })))
}

#[axum::debug_handler]
pub async fn get_active_meetings(
    State(state): State<MeetingState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let rooms = state.rooms.active_meetings_for(user.id).await;

    Ok(Json(json!({
        "count": rooms.len(),
        "meetings": rooms
    })))
}
