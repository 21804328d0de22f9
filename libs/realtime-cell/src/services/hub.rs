use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{AppointmentEvent, RoomEvent};

pub type EventSender = broadcast::Sender<String>;
pub type EventReceiver = broadcast::Receiver<String>;

/// Fan-out hub with per-user and per-room broadcast channels.
///
/// Delivery is at-most-once: events are dropped when a channel has no
/// subscribers, and a lagging receiver loses the oldest messages. Within one
/// channel, subscribers observe a publisher's events in publish order.
pub struct EventHub {
    user_channels: Arc<RwLock<HashMap<Uuid, EventSender>>>,
    room_channels: Arc<RwLock<HashMap<String, EventSender>>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self {
            user_channels: Arc::new(RwLock::new(HashMap::new())),
            room_channels: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Subscribes to a user's channel, creating it on first use.
    pub async fn subscribe_user(&self, user_id: Uuid) -> EventReceiver {
        let mut channels = self.user_channels.write().await;
        let sender = channels.entry(user_id).or_insert_with(|| {
            debug!("Created user channel for {}", user_id);
            let (sender, _) = broadcast::channel(100);
            sender
        });
        sender.subscribe()
    }

    /// Subscribes to a room's channel, creating it on first use.
    pub async fn subscribe_room(&self, room_id: &str) -> EventReceiver {
        let mut channels = self.room_channels.write().await;
        let sender = channels.entry(room_id.to_string()).or_insert_with(|| {
            debug!("Created room channel for {}", room_id);
            let (sender, _) = broadcast::channel(100);
            sender
        });
        sender.subscribe()
    }

    pub async fn remove_room_channel(&self, room_id: &str) {
        let mut channels = self.room_channels.write().await;
        channels.remove(room_id);
        debug!("Removed room channel for {}", room_id);
    }

    /// Publishes an appointment event to every recipient's user channel.
    /// Best effort: recipients without an open channel are skipped.
    pub async fn publish_appointment_event(&self, recipients: &[Uuid], event: &AppointmentEvent) {
        let message = match serde_json::to_string(event) {
            Ok(message) => message,
            Err(e) => {
                warn!("Failed to serialize appointment event: {}", e);
                return;
            }
        };

        let channels = self.user_channels.read().await;
        for user_id in recipients {
            if let Some(sender) = channels.get(user_id) {
                if let Err(e) = sender.send(message.clone()) {
                    debug!("No live subscribers for user {}: {}", user_id, e);
                }
            }
        }

        debug!(
            "Published {:?} event for appointment {} to {} recipients",
            event.kind,
            event.appointment_id,
            recipients.len()
        );
    }

    /// Publishes a room event to the room's channel. Best effort.
    pub async fn publish_room_event(&self, event: &RoomEvent) {
        let message = match serde_json::to_string(event) {
            Ok(message) => message,
            Err(e) => {
                warn!("Failed to serialize room event: {}", e);
                return;
            }
        };

        let channels = self.room_channels.read().await;
        if let Some(sender) = channels.get(&event.room_id) {
            if let Err(e) = sender.send(message) {
                debug!("No live subscribers in room {}: {}", event.room_id, e);
            }
        }

        debug!("Published {:?} event to room {}", event.kind, event.room_id);
    }

    pub async fn active_room_channels(&self) -> Vec<String> {
        let channels = self.room_channels.read().await;
        channels.keys().cloned().collect()
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventHub {
    fn clone(&self) -> Self {
        Self {
            user_channels: Arc::clone(&self.user_channels),
            room_channels: Arc::clone(&self.room_channels),
        }
    }
}
