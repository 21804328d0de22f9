use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use realtime_cell::{EventHub, RoomEvent, RoomEventKind};
use shared_models::auth::User;

use crate::models::{
    ChatMessage, MeetingError, MeetingRoom, RoomParticipant, RoomRole, RoomSettings,
};
use crate::services::codes::{generate_access_code, generate_room_id, generate_room_password};
use crate::store::RoomStore;

/// Outcome of a guarded lifecycle write, decided inside the atomic update.
enum LifecycleOutcome {
    Applied,
    AlreadyEnded,
    NotHost,
}

pub struct MeetingRoomService {
    rooms: Arc<RoomStore>,
    hub: Arc<EventHub>,
    meeting_base_url: String,
}

impl MeetingRoomService {
    pub fn new(rooms: Arc<RoomStore>, hub: Arc<EventHub>, meeting_base_url: &str) -> Self {
        Self {
            rooms,
            hub,
            meeting_base_url: meeting_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Creates the dedicated room for an appointment. The room starts
    /// inactive; `join` brings it to life.
    pub async fn create_room(
        &self,
        appointment_id: Uuid,
        host_id: Uuid,
    ) -> Result<MeetingRoom, MeetingError> {
        let now = Utc::now();
        let room_id = generate_room_id();

        let room = MeetingRoom {
            room_id: room_id.clone(),
            room_name: format!("Meeting-{}", now.timestamp_millis()),
            access_code: generate_access_code(),
            password: generate_room_password(),
            room_link: format!("{}/room/{}", self.meeting_base_url, room_id),
            host_id,
            appointment_id,
            is_active: false,
            started_at: None,
            ended_at: None,
            is_recording: false,
            recording_id: None,
            participants: Vec::new(),
            chat_history: Vec::new(),
            total_duration_seconds: None,
            peak_participants: 0,
            settings: RoomSettings::default(),
            created_at: now,
            updated_at: now,
        };

        self.rooms
            .insert(room.clone())
            .await
            .map_err(|e| MeetingError::Internal(format!("Failed to store room: {}", e)))?;

        info!(
            "Created meeting room {} for appointment {}",
            room.room_id, appointment_id
        );
        Ok(room)
    }

    pub async fn get_room(&self, room_id: &str) -> Result<MeetingRoom, MeetingError> {
        self.rooms
            .find_by_id(room_id)
            .await
            .ok_or(MeetingError::RoomNotFound)
    }

    /// Adds a fresh participant entry for the caller. Re-joins append a new
    /// entry rather than reviving an old one, so attendance history survives.
    pub async fn join_room(
        &self,
        room_id: &str,
        user: &User,
    ) -> Result<(MeetingRoom, RoomRole), MeetingError> {
        let (room, outcome) = self
            .rooms
            .update_with(room_id, |room| {
                if room.has_ended() {
                    return Err(MeetingError::AlreadyEnded);
                }

                let role = if room.host_id == user.id {
                    RoomRole::Host
                } else {
                    RoomRole::Participant
                };
                let now = Utc::now();

                room.participants.push(RoomParticipant {
                    user_id: user.id,
                    name: user.display_name(),
                    email: user.email_or_empty(),
                    role,
                    joined_at: now,
                    left_at: None,
                    is_audio_enabled: true,
                    is_video_enabled: true,
                });
                room.is_active = true;

                let present = room.present_participants() as i32;
                if present > room.peak_participants {
                    room.peak_participants = present;
                }
                room.updated_at = now;
                Ok(role)
            })
            .await
            .map_err(|_| MeetingError::RoomNotFound)?;
        let role = outcome?;

        debug!("User {} joined room {} as {}", user.id, room_id, role);
        let event = RoomEvent::new(
            RoomEventKind::ParticipantJoined,
            room_id,
            user.id,
            json!({ "name": user.display_name(), "role": role.to_string() }),
        );
        self.hub.publish_room_event(&event).await;

        Ok((room, role))
    }

    /// Closes the caller's most recently joined open entry. Leaving without
    /// an open entry, or after the meeting ended, is a no-op.
    pub async fn leave_room(&self, room_id: &str, user: &User) -> Result<MeetingRoom, MeetingError> {
        let (room, closed) = self
            .rooms
            .update_with(room_id, |room| {
                if room.has_ended() {
                    return false;
                }
                let now = Utc::now();
                let open_entry = room
                    .participants
                    .iter_mut()
                    .filter(|p| p.user_id == user.id && p.left_at.is_none())
                    .max_by_key(|p| p.joined_at);
                match open_entry {
                    Some(entry) => {
                        entry.left_at = Some(now);
                        room.updated_at = now;
                        true
                    }
                    None => false,
                }
            })
            .await
            .map_err(|_| MeetingError::RoomNotFound)?;

        if closed {
            debug!("User {} left room {}", user.id, room_id);
            let event = RoomEvent::new(
                RoomEventKind::ParticipantLeft,
                room_id,
                user.id,
                json!({ "name": user.display_name() }),
            );
            self.hub.publish_room_event(&event).await;
        }

        Ok(room)
    }

    /// Marks the meeting as running. Note: calling start on an already
    /// running meeting resets `started_at`, which also resets the measured
    /// duration on end.
    pub async fn start_meeting(
        &self,
        room_id: &str,
        user: &User,
    ) -> Result<MeetingRoom, MeetingError> {
        let (room, outcome) = self
            .rooms
            .update_with(room_id, |room| {
                if room.host_id != user.id {
                    return LifecycleOutcome::NotHost;
                }
                if room.has_ended() {
                    return LifecycleOutcome::AlreadyEnded;
                }
                let now = Utc::now();
                room.is_active = true;
                room.started_at = Some(now);
                room.updated_at = now;
                LifecycleOutcome::Applied
            })
            .await
            .map_err(|_| MeetingError::RoomNotFound)?;

        match outcome {
            LifecycleOutcome::NotHost => Err(MeetingError::HostRequired),
            LifecycleOutcome::AlreadyEnded => Err(MeetingError::AlreadyEnded),
            LifecycleOutcome::Applied => {
                info!("Meeting {} started by host {}", room_id, user.id);
                let event =
                    RoomEvent::new(RoomEventKind::MeetingStarted, room_id, user.id, json!({}));
                self.hub.publish_room_event(&event).await;
                Ok(room)
            }
        }
    }

    /// Ends the meeting and records the total duration in whole seconds.
    /// Ending an already ended meeting returns it unchanged; the guard runs
    /// inside the same atomic update, so a double submit cannot produce two
    /// terminal transitions.
    pub async fn end_meeting(
        &self,
        room_id: &str,
        user: &User,
        recording_id: Option<String>,
    ) -> Result<MeetingRoom, MeetingError> {
        let (room, outcome) = self
            .rooms
            .update_with(room_id, |room| {
                if room.host_id != user.id {
                    return LifecycleOutcome::NotHost;
                }
                if room.has_ended() {
                    return LifecycleOutcome::AlreadyEnded;
                }
                let now = Utc::now();
                room.is_active = false;
                room.ended_at = Some(now);
                room.total_duration_seconds = room
                    .started_at
                    .map(|started| now.signed_duration_since(started).num_seconds());
                if let Some(id) = recording_id {
                    room.recording_id = Some(id);
                }
                room.updated_at = now;
                LifecycleOutcome::Applied
            })
            .await
            .map_err(|_| MeetingError::RoomNotFound)?;

        match outcome {
            LifecycleOutcome::NotHost => Err(MeetingError::HostRequired),
            LifecycleOutcome::AlreadyEnded => {
                debug!("Meeting {} already ended, returning current state", room_id);
                Ok(room)
            }
            LifecycleOutcome::Applied => {
                if room.started_at.is_none() {
                    warn!("Meeting {} ended without ever being started", room_id);
                }
                info!(
                    "Meeting {} ended by host {} after {:?} seconds",
                    room_id, user.id, room.total_duration_seconds
                );
                let event = RoomEvent::new(
                    RoomEventKind::MeetingEnded,
                    room_id,
                    user.id,
                    json!({ "total_duration_seconds": room.total_duration_seconds }),
                );
                self.hub.publish_room_event(&event).await;
                self.hub.remove_room_channel(room_id).await;
                Ok(room)
            }
        }
    }

    /// Appends a chat message. Any authenticated caller may post; the room
    /// does not check membership.
    pub async fn add_chat_message(
        &self,
        room_id: &str,
        user: &User,
        message: &str,
    ) -> Result<MeetingRoom, MeetingError> {
        if message.trim().is_empty() {
            return Err(MeetingError::ValidationError(
                "Valid message text is required".to_string(),
            ));
        }

        let (room, _) = self
            .rooms
            .update_with(room_id, |room| {
                let now = Utc::now();
                room.chat_history.push(ChatMessage {
                    user_id: user.id,
                    name: user.display_name(),
                    message: message.to_string(),
                    timestamp: now,
                });
                room.updated_at = now;
            })
            .await
            .map_err(|_| MeetingError::RoomNotFound)?;

        let event = RoomEvent::new(
            RoomEventKind::ChatMessage,
            room_id,
            user.id,
            json!({ "name": user.display_name(), "message": message }),
        );
        self.hub.publish_room_event(&event).await;

        Ok(room)
    }

    pub async fn chat_history(&self, room_id: &str) -> Result<Vec<ChatMessage>, MeetingError> {
        let room = self.get_room(room_id).await?;
        Ok(room.chat_history)
    }

    /// Rooms the user belongs to that are waiting or in progress.
    pub async fn active_meetings_for(&self, user_id: Uuid) -> Vec<MeetingRoom> {
        self.rooms.find_open_for_user(user_id).await
    }
}
