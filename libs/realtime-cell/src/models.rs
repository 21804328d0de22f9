use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentEventKind {
    Scheduled,
    Updated,
    Cancelled,
    Reminder,
}

/// Event pushed to the per-user channels of appointment participants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentEvent {
    #[serde(rename = "type")]
    pub kind: AppointmentEventKind,
    pub appointment_id: Uuid,
    pub data: Value,
    pub timestamp: DateTime<Utc>,
}

impl AppointmentEvent {
    pub fn new(kind: AppointmentEventKind, appointment_id: Uuid, data: Value) -> Self {
        Self {
            kind,
            appointment_id,
            data,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoomEventKind {
    ParticipantJoined,
    ParticipantLeft,
    MeetingStarted,
    MeetingEnded,
    ChatMessage,
    AudioToggled,
    VideoToggled,
    ScreenShareStarted,
    ScreenShareStopped,
}

/// Event pushed to a per-room channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomEvent {
    #[serde(rename = "type")]
    pub kind: RoomEventKind,
    pub room_id: String,
    pub user_id: Uuid,
    pub data: Value,
    pub timestamp: DateTime<Utc>,
}

impl RoomEvent {
    pub fn new(kind: RoomEventKind, room_id: &str, user_id: Uuid, data: Value) -> Self {
        Self {
            kind,
            room_id: room_id.to_string(),
            user_id,
            data,
            timestamp: Utc::now(),
        }
    }
}

/// Messages a connected websocket client may send. Room subscriptions and
/// transient presence/media signals; nothing here mutates stored state.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum ClientMessage {
    JoinMeeting { room_id: String },
    LeaveMeeting { room_id: String },
    ToggleAudio { room_id: String, enabled: bool },
    ToggleVideo { room_id: String, enabled: bool },
    ScreenShareStart { room_id: String },
    ScreenShareStop { room_id: String },
    SendChat { room_id: String, message: String },
}
