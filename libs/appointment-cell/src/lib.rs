// libs/appointment-cell/src/lib.rs
//! # Appointment Cell
//!
//! Scheduling core: availability lookup, conflict-free booking, lifecycle
//! transitions and participant invitations.
//!
//! Booking writes for one doctor are serialized behind a per-doctor lock, so
//! the conflict check and the insert act as one step and a doctor can never
//! hold two non-cancelled appointments that overlap. Virtual appointments
//! get their meeting room from the meeting cell before anything is stored.
//!
//! ## API Endpoints
//!
//! - `POST /appointments/` - book an appointment
//! - `GET /appointments/my-appointments` - appointments for the caller
//! - `GET /appointments/doctors/{doctor_id}/available-slots` - open slots
//! - `GET /appointments/{appointment_id}` - appointment details
//! - `PUT /appointments/{appointment_id}` - update or reschedule
//! - `POST /appointments/{appointment_id}/cancel` - cancel
//! - `POST /appointments/{appointment_id}/accept` - accept the invitation
//! - `POST /appointments/{appointment_id}/decline` - decline the invitation

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod store;
pub mod window;

pub use models::{
    Appointment, AppointmentError, AppointmentFilter, AppointmentStatus, AppointmentType,
    AppointmentVenue, SchedulingConfig,
};
pub use router::{appointment_routes, AppointmentState};
pub use services::availability::AvailabilityService;
pub use services::calendar::{CalendarSync, DisabledCalendarSync};
pub use services::notifications::{LoggingDispatcher, NotificationDispatcher};
pub use services::scheduling::AppointmentScheduler;
pub use store::AppointmentStore;
pub use window::TimeWindow;
