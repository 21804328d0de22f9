use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use appointment_cell::{
    AppointmentScheduler, AppointmentState, AppointmentStore, AvailabilityService,
    DisabledCalendarSync, LoggingDispatcher, SchedulingConfig,
};
use meeting_cell::{MeetingRoomService, MeetingState, RoomStore};
use realtime_cell::{EventHub, RealtimeState};
use shared_config::AppConfig;
use shared_store::DirectoryStore;

#[tokio::main]
async fn main() {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Telecare API server");

    // Load configuration
    let config = Arc::new(AppConfig::from_env());

    // Shared infrastructure
    let hub = Arc::new(EventHub::new());
    let directory = Arc::new(DirectoryStore::new());
    let appointments = Arc::new(AppointmentStore::new());
    let rooms = Arc::new(RoomStore::new());

    // Cell services
    let meeting_rooms = Arc::new(MeetingRoomService::new(
        rooms,
        hub.clone(),
        &config.meeting_base_url,
    ));
    let scheduler = Arc::new(AppointmentScheduler::new(
        appointments.clone(),
        directory.clone(),
        meeting_rooms.clone(),
        Arc::new(DisabledCalendarSync),
        Arc::new(LoggingDispatcher),
        hub.clone(),
    ));
    let availability = Arc::new(AvailabilityService::new(
        appointments,
        directory,
        SchedulingConfig::default(),
    ));

    // Reminder sweep runs for the life of the process
    let sweep_scheduler = scheduler.clone();
    let lead = chrono::Duration::minutes(config.reminder_lead_minutes);
    let sweep_every = Duration::from_secs(config.reminder_sweep_seconds);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_every);
        loop {
            ticker.tick().await;
            sweep_scheduler.dispatch_due_reminders(lead).await;
        }
    });

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Per-cell state
    let appointment_state = AppointmentState {
        config: config.clone(),
        scheduler,
        availability,
    };
    let meeting_state = MeetingState {
        config: config.clone(),
        rooms: meeting_rooms,
    };
    let realtime_state = RealtimeState {
        config: config.clone(),
        hub,
    };

    // Build the application router
    let app = router::create_router(appointment_state, meeting_state, realtime_state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
