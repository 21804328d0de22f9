// libs/meeting-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use shared_models::error::AppError;

// ==============================================================================
// CORE MEETING ROOM MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingRoom {
    pub room_id: String,
    pub room_name: String,
    pub access_code: String,
    /// Opaque shared room secret handed to invitees. Not a user credential.
    pub password: String,
    pub room_link: String,
    pub host_id: Uuid,
    pub appointment_id: Uuid,
    pub is_active: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub is_recording: bool,
    pub recording_id: Option<String>,
    pub participants: Vec<RoomParticipant>,
    pub chat_history: Vec<ChatMessage>,
    pub total_duration_seconds: Option<i64>,
    pub peak_participants: i32,
    pub settings: RoomSettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MeetingRoom {
    pub fn has_ended(&self) -> bool {
        self.ended_at.is_some()
    }

    /// Participants currently in the room (joined and not yet left).
    pub fn present_participants(&self) -> usize {
        self.participants
            .iter()
            .filter(|participant| participant.left_at.is_none())
            .count()
    }

    pub fn has_participant(&self, user_id: Uuid) -> bool {
        self.participants
            .iter()
            .any(|participant| participant.user_id == user_id)
    }
}

/// One join of a user. Re-joins append a fresh entry, so the full
/// attendance history of a room is preserved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomParticipant {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: RoomRole,
    pub joined_at: DateTime<Utc>,
    pub left_at: Option<DateTime<Utc>>,
    pub is_audio_enabled: bool,
    pub is_video_enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoomRole {
    Host,
    CoHost,
    Participant,
    Observer,
}

impl fmt::Display for RoomRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomRole::Host => write!(f, "host"),
            RoomRole::CoHost => write!(f, "co-host"),
            RoomRole::Participant => write!(f, "participant"),
            RoomRole::Observer => write!(f, "observer"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub user_id: Uuid,
    pub name: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Room settings carried on every room. Defaults mirror the hosted product;
/// enforcement stays with the client layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSettings {
    pub max_participants: i32,
    pub allow_recording: bool,
    pub waiting_room_enabled: bool,
    pub screen_share_enabled: bool,
    pub chat_enabled: bool,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            max_participants: 100,
            allow_recording: true,
            waiting_room_enabled: false,
            screen_share_enabled: true,
            chat_enabled: true,
        }
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndMeetingRequest {
    pub recording_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendChatMessageRequest {
    pub message: String,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum MeetingError {
    #[error("Meeting room not found")]
    RoomNotFound,

    #[error("Only the host can perform this action")]
    HostRequired,

    #[error("Meeting has already ended")]
    AlreadyEnded,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<MeetingError> for AppError {
    fn from(error: MeetingError) -> Self {
        match error {
            MeetingError::RoomNotFound => AppError::NotFound(error.to_string()),
            MeetingError::HostRequired => AppError::Forbidden(error.to_string()),
            MeetingError::AlreadyEnded => AppError::Conflict(error.to_string()),
            MeetingError::ValidationError(message) => AppError::ValidationError(message),
            MeetingError::Internal(message) => AppError::Internal(message),
        }
    }
}
