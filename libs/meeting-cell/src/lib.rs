// libs/meeting-cell/src/lib.rs
//! # Meeting Cell
//!
//! Virtual meeting rooms for appointments: creation with generated access
//! credentials, join/leave attendance tracking, host-controlled start/end
//! with duration accounting, and in-room chat.
//!
//! Rooms are created by the appointment cell when a virtual appointment is
//! booked; everything after that happens through this cell's endpoints.
//!
//! ## API Endpoints
//!
//! - `GET /meetings/active` - rooms the caller belongs to that have not ended
//! - `GET /meetings/{room_id}` - room details
//! - `POST /meetings/{room_id}/join` - join (appends a participant entry)
//! - `POST /meetings/{room_id}/leave` - leave (closes the latest open entry)
//! - `POST /meetings/{room_id}/start` - start, host only
//! - `POST /meetings/{room_id}/end` - end, host only, idempotent
//! - `POST /meetings/{room_id}/chat` - append a chat message
//! - `GET /meetings/{room_id}/chat` - chat history

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod store;

pub use models::{
    ChatMessage, MeetingError, MeetingRoom, RoomParticipant, RoomRole, RoomSettings,
};
pub use router::{meeting_routes, MeetingState};
pub use services::MeetingRoomService;
pub use store::RoomStore;
