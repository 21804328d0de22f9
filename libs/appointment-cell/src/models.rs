// libs/appointment-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use shared_models::error::AppError;

use crate::window::TimeWindow;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

/// A scheduled encounter between a doctor and a patient.
///
/// `end_time` is always `start_time + duration_minutes`; the pair is stored
/// denormalised so list responses and calendar payloads never recompute it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: AppointmentStatus,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub organization_id: Option<Uuid>,
    pub created_by: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: i32,
    pub timezone: String,
    pub venue: AppointmentVenue,
    pub calendar_event: Option<CalendarEventRef>,
    pub participants: Vec<AppointmentParticipant>,
    pub notes: Option<String>,
    pub reminders_sent: ReminderFlags,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// The appointment's occupancy as a half-open window.
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start_time, self.end_time)
    }

    pub fn appointment_type(&self) -> AppointmentType {
        self.venue.appointment_type()
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == AppointmentStatus::Cancelled
    }

    /// True when the user created the appointment or appears in its
    /// participant list. Read access is limited to these users.
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.created_by == user_id || self.participants.iter().any(|p| p.user_id == user_id)
    }

    pub fn participant_user_ids(&self) -> Vec<Uuid> {
        self.participants.iter().map(|p| p.user_id).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Cancelled,
    Completed,
    NoShow,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::NoShow => write!(f, "no-show"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentType {
    InPerson,
    Virtual,
    Phone,
}

impl fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentType::InPerson => write!(f, "in-person"),
            AppointmentType::Virtual => write!(f, "virtual"),
            AppointmentType::Phone => write!(f, "phone"),
        }
    }
}

/// Where the appointment takes place. A virtual appointment always carries
/// its room binding, so the type can never claim to be virtual without a
/// joinable room behind it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum AppointmentVenue {
    InPerson { location: Option<String> },
    Virtual { room: RoomBinding },
    Phone,
}

impl AppointmentVenue {
    pub fn appointment_type(&self) -> AppointmentType {
        match self {
            AppointmentVenue::InPerson { .. } => AppointmentType::InPerson,
            AppointmentVenue::Virtual { .. } => AppointmentType::Virtual,
            AppointmentVenue::Phone => AppointmentType::Phone,
        }
    }

    pub fn room(&self) -> Option<&RoomBinding> {
        match self {
            AppointmentVenue::Virtual { room } => Some(room),
            _ => None,
        }
    }
}

/// Join credentials for the meeting room backing a virtual appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomBinding {
    pub room_id: String,
    pub room_link: String,
    pub access_code: String,
    pub password: String,
}

/// Reference to a provider-side calendar event created for this appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEventRef {
    pub event_id: String,
    pub event_link: Option<String>,
}

/// Which reminder channels have already fired for an appointment. Set
/// exactly once by the reminder sweep.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ReminderFlags {
    pub email: bool,
    pub sms: bool,
}

// ==============================================================================
// PARTICIPANT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentParticipant {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: ParticipantRole,
    pub status: ParticipantStatus,
    pub responded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParticipantRole {
    Doctor,
    Patient,
    Observer,
}

impl fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticipantRole::Doctor => write!(f, "doctor"),
            ParticipantRole::Patient => write!(f, "patient"),
            ParticipantRole::Observer => write!(f, "observer"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParticipantStatus {
    Invited,
    Accepted,
    Declined,
}

impl fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticipantStatus::Invited => write!(f, "invited"),
            ParticipantStatus::Accepted => write!(f, "accepted"),
            ParticipantStatus::Declined => write!(f, "declined"),
        }
    }
}

// ==============================================================================
// SCHEDULING CONFIGURATION
// ==============================================================================

/// Knobs for the availability generator.
#[derive(Debug, Clone)]
pub struct SchedulingConfig {
    /// Start of the bookable day, minutes after midnight.
    pub working_day_open_minutes: i64,
    /// End of the bookable day, minutes after midnight. Candidate slots never
    /// start at or after this point.
    pub working_day_close_minutes: i64,
    /// Spacing between candidate slot starts.
    pub slot_step_minutes: i64,
    /// Slot length used when a request does not supply one.
    pub default_slot_duration_minutes: i32,
    /// When true, candidates whose end would run past the working-day close
    /// are dropped. Off by default: a 60-minute slot starting at 17:30 is
    /// still offered even though it ends at 18:30.
    pub clip_slots_to_close: bool,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            working_day_open_minutes: 9 * 60,
            working_day_close_minutes: 18 * 60,
            slot_step_minutes: 30,
            default_slot_duration_minutes: 60,
            clip_slots_to_close: false,
        }
    }
}

// ==============================================================================
// REQUEST / RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAppointmentRequest {
    pub title: String,
    pub description: Option<String>,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub organization_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i32,
    pub appointment_type: Option<AppointmentType>,
    pub location: Option<String>,
    pub timezone: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub location: Option<String>,
    pub status: Option<AppointmentStatus>,
    pub start_time: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CancelAppointmentRequest {
    pub reason: Option<String>,
}

/// Optional narrowing for appointment listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppointmentFilter {
    pub status: Option<AppointmentStatus>,
    pub appointment_type: Option<AppointmentType>,
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

/// One bookable opening returned by the availability endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct AvailableSlot {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: i32,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,
    #[error("Doctor not found")]
    DoctorNotFound,
    #[error("Patient not found")]
    PatientNotFound,
    #[error("Doctor has a conflicting appointment")]
    ConflictDetected,
    #[error("Only the creator can modify this appointment")]
    CreatorRequired,
    #[error("Not authorized to view this appointment")]
    AccessDenied,
    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Meeting room creation failed: {0}")]
    RoomCreationFailed(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AppointmentError> for AppError {
    fn from(error: AppointmentError) -> Self {
        match error {
            AppointmentError::NotFound
            | AppointmentError::DoctorNotFound
            | AppointmentError::PatientNotFound => AppError::NotFound(error.to_string()),
            AppointmentError::ConflictDetected => AppError::Conflict(error.to_string()),
            AppointmentError::CreatorRequired | AppointmentError::AccessDenied => {
                AppError::Forbidden(error.to_string())
            }
            AppointmentError::InvalidStatusTransition { .. } => {
                AppError::ValidationError(error.to_string())
            }
            AppointmentError::ValidationError(message) => AppError::ValidationError(message),
            AppointmentError::RoomCreationFailed(message) | AppointmentError::Internal(message) => {
                AppError::Internal(message)
            }
        }
    }
}
