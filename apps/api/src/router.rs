use axum::{routing::get, Router};

use appointment_cell::router::{appointment_routes, AppointmentState};
use meeting_cell::router::{meeting_routes, MeetingState};
use realtime_cell::router::{realtime_routes, RealtimeState};

pub fn create_router(
    appointments: AppointmentState,
    meetings: MeetingState,
    realtime: RealtimeState,
) -> Router {
    Router::new()
        .route("/", get(|| async { "Telecare API is running!" }))
        .nest("/api/appointments", appointment_routes(appointments))
        .nest("/api/meetings", meeting_routes(meetings))
        .nest("/api/realtime", realtime_routes(realtime))
}
