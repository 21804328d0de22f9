pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{AppointmentEvent, AppointmentEventKind, RoomEvent, RoomEventKind};
pub use router::{realtime_routes, RealtimeState};
pub use services::{EventHub, EventReceiver, EventSender};
