use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::{
    end_meeting, get_active_meetings, get_chat_history, get_meeting, join_meeting, leave_meeting,
    send_chat_message, start_meeting,
};
use crate::services::MeetingRoomService;

#[derive(Clone)]
pub struct MeetingState {
    pub config: Arc<AppConfig>,
    pub rooms: Arc<MeetingRoomService>,
}

pub fn meeting_routes(state: MeetingState) -> Router {
    let protected_routes = Router::new()
        .route("/active", get(get_active_meetings))
        .route("/{room_id}", get(get_meeting))
        .route("/{room_id}/join", post(join_meeting))
        .route("/{room_id}/leave", post(leave_meeting))
        .route("/{room_id}/start", post(start_meeting))
        .route("/{room_id}/end", post(end_meeting))
        .route("/{room_id}/chat", post(send_chat_message).get(get_chat_history))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
