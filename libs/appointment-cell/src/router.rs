// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::{
    accept_appointment, cancel_appointment, create_appointment, decline_appointment,
    get_appointment, get_available_slots, list_my_appointments, update_appointment,
};
use crate::services::availability::AvailabilityService;
use crate::services::scheduling::AppointmentScheduler;

#[derive(Clone)]
pub struct AppointmentState {
    pub config: Arc<AppConfig>,
    pub scheduler: Arc<AppointmentScheduler>,
    pub availability: Arc<AvailabilityService>,
}

pub fn appointment_routes(state: AppointmentState) -> Router {
    let protected_routes = Router::new()
        .route("/", post(create_appointment))
        .route("/my-appointments", get(list_my_appointments))
        .route(
            "/doctors/{doctor_id}/available-slots",
            get(get_available_slots),
        )
        .route(
            "/{appointment_id}",
            get(get_appointment).put(update_appointment),
        )
        .route("/{appointment_id}/cancel", post(cancel_appointment))
        .route("/{appointment_id}/accept", post(accept_appointment))
        .route("/{appointment_id}/decline", post(decline_appointment))
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ));

    Router::new().merge(protected_routes).with_state(state)
}
