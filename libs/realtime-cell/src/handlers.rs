use std::collections::HashMap;

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    response::Response,
    Extension,
};
use futures::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use shared_models::auth::User;

use crate::models::{ClientMessage, RoomEvent, RoomEventKind};
use crate::router::RealtimeState;
use crate::services::{EventHub, EventReceiver};

/// Upgrades the connection and binds it to the caller's user channel.
pub async fn realtime_ws(
    State(state): State<RealtimeState>,
    Extension(user): Extension<User>,
    ws: WebSocketUpgrade,
) -> Response {
    let hub = state.hub.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, hub, user))
}

async fn handle_socket(socket: WebSocket, hub: std::sync::Arc<EventHub>, user: User) {
    info!("Realtime connection opened for user {}", user.id);

    let (mut sink, mut stream) = socket.split();

    // All subscriptions funnel into one outbound queue for this connection.
    let (outbound, mut outbound_rx) = mpsc::channel::<String>(64);

    let user_events = hub.subscribe_user(user.id).await;
    let mut room_tasks: HashMap<String, JoinHandle<()>> = HashMap::new();
    let user_task = tokio::spawn(forward_events(user_events, outbound.clone()));

    loop {
        tokio::select! {
            Some(message) = outbound_rx.recv() => {
                if sink.send(Message::Text(message.into())).await.is_err() {
                    break;
                }
            }
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        handle_client_message(text.as_str(), &hub, &user, &outbound, &mut room_tasks).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!("Realtime socket error for user {}: {}", user.id, e);
                        break;
                    }
                }
            }
        }
    }

    user_task.abort();
    for (_, task) in room_tasks {
        task.abort();
    }
    info!("Realtime connection closed for user {}", user.id);
}

async fn handle_client_message(
    text: &str,
    hub: &EventHub,
    user: &User,
    outbound: &mpsc::Sender<String>,
    room_tasks: &mut HashMap<String, JoinHandle<()>>,
) {
    let message: ClientMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(e) => {
            debug!("Ignoring malformed client message from {}: {}", user.id, e);
            return;
        }
    };

    match message {
        ClientMessage::JoinMeeting { room_id } => {
            if !room_tasks.contains_key(&room_id) {
                let events = hub.subscribe_room(&room_id).await;
                let task = tokio::spawn(forward_events(events, outbound.clone()));
                room_tasks.insert(room_id.clone(), task);
            }
            let event = RoomEvent::new(
                RoomEventKind::ParticipantJoined,
                &room_id,
                user.id,
                json!({ "name": user.display_name() }),
            );
            hub.publish_room_event(&event).await;
        }
        ClientMessage::LeaveMeeting { room_id } => {
            if let Some(task) = room_tasks.remove(&room_id) {
                task.abort();
            }
            let event = RoomEvent::new(
                RoomEventKind::ParticipantLeft,
                &room_id,
                user.id,
                json!({ "name": user.display_name() }),
            );
            hub.publish_room_event(&event).await;
        }
        ClientMessage::ToggleAudio { room_id, enabled } => {
            let event = RoomEvent::new(
                RoomEventKind::AudioToggled,
                &room_id,
                user.id,
                json!({ "enabled": enabled }),
            );
            hub.publish_room_event(&event).await;
        }
        ClientMessage::ToggleVideo { room_id, enabled } => {
            let event = RoomEvent::new(
                RoomEventKind::VideoToggled,
                &room_id,
                user.id,
                json!({ "enabled": enabled }),
            );
            hub.publish_room_event(&event).await;
        }
        ClientMessage::ScreenShareStart { room_id } => {
            let event = RoomEvent::new(
                RoomEventKind::ScreenShareStarted,
                &room_id,
                user.id,
                json!({ "name": user.display_name() }),
            );
            hub.publish_room_event(&event).await;
        }
        ClientMessage::ScreenShareStop { room_id } => {
            let event = RoomEvent::new(
                RoomEventKind::ScreenShareStopped,
                &room_id,
                user.id,
                json!({}),
            );
            hub.publish_room_event(&event).await;
        }
        ClientMessage::SendChat { room_id, message } => {
            // Broadcast only; persistence goes through the meeting chat endpoint.
            let event = RoomEvent::new(
                RoomEventKind::ChatMessage,
                &room_id,
                user.id,
                json!({ "name": user.display_name(), "message": message }),
            );
            hub.publish_room_event(&event).await;
        }
    }
}

/// Forwards broadcast events into the connection's outbound queue. A lagging
/// connection skips the dropped range and keeps going.
async fn forward_events(mut events: EventReceiver, outbound: mpsc::Sender<String>) {
    loop {
        match events.recv().await {
            Ok(message) => {
                if outbound.send(message).await.is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!("Subscriber lagged, skipped {} events", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
