use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::realtime_ws;
use crate::services::EventHub;

#[derive(Clone)]
pub struct RealtimeState {
    pub config: Arc<AppConfig>,
    pub hub: Arc<EventHub>,
}

pub fn realtime_routes(state: RealtimeState) -> Router {
    let protected_routes = Router::new()
        .route("/ws", get(realtime_ws))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
