use std::cmp::Reverse;

use uuid::Uuid;

use shared_store::{Collection, StoreError};

use crate::models::MeetingRoom;

/// Meeting room collection keyed by room id.
pub struct RoomStore {
    rooms: Collection<String, MeetingRoom>,
}

impl RoomStore {
    pub fn new() -> Self {
        Self {
            rooms: Collection::new(),
        }
    }

    pub async fn insert(&self, room: MeetingRoom) -> Result<(), StoreError> {
        self.rooms.insert(room.room_id.clone(), room).await
    }

    pub async fn find_by_id(&self, room_id: &str) -> Option<MeetingRoom> {
        self.rooms.get(&room_id.to_string()).await
    }

    pub async fn update_with<R, F>(
        &self,
        room_id: &str,
        f: F,
    ) -> Result<(MeetingRoom, R), StoreError>
    where
        F: FnOnce(&mut MeetingRoom) -> R,
    {
        self.rooms.update_with(&room_id.to_string(), f).await
    }

    /// Rooms the user has joined that have not ended, most recent first.
    pub async fn find_open_for_user(&self, user_id: Uuid) -> Vec<MeetingRoom> {
        let mut rooms = self
            .rooms
            .find(|room| !room.has_ended() && room.has_participant(user_id))
            .await;
        rooms.sort_by_key(|room| Reverse(room.created_at));
        rooms
    }
}

impl Default for RoomStore {
    fn default() -> Self {
        Self::new()
    }
}
