// libs/appointment-cell/src/services/calendar.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::CalendarEventRef;

/// Payload handed to a calendar provider when mirroring an appointment.
#[derive(Debug, Clone)]
pub struct CalendarEventDetails {
    pub title: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub timezone: String,
    pub attendee_emails: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    #[error("No calendar provider is configured")]
    NotConfigured,
    #[error("Calendar provider error: {0}")]
    Provider(String),
}

/// Port for mirroring appointments into an external calendar.
///
/// The scheduler treats every call as best-effort: a failure is logged and
/// the appointment write stands. `account` is the doctor's provider-side
/// calendar account identifier.
#[async_trait]
pub trait CalendarSync: Send + Sync {
    async fn create_event(
        &self,
        account: &str,
        details: &CalendarEventDetails,
    ) -> Result<CalendarEventRef, CalendarError>;

    async fn update_event(
        &self,
        account: &str,
        event_id: &str,
        details: &CalendarEventDetails,
    ) -> Result<(), CalendarError>;

    async fn delete_event(&self, account: &str, event_id: &str) -> Result<(), CalendarError>;
}

/// Wiring used when no provider credentials are present. Every call reports
/// `NotConfigured`, which the scheduler downgrades to a debug log.
pub struct DisabledCalendarSync;

#[async_trait]
impl CalendarSync for DisabledCalendarSync {
    async fn create_event(
        &self,
        _account: &str,
        _details: &CalendarEventDetails,
    ) -> Result<CalendarEventRef, CalendarError> {
        Err(CalendarError::NotConfigured)
    }

    async fn update_event(
        &self,
        _account: &str,
        _event_id: &str,
        _details: &CalendarEventDetails,
    ) -> Result<(), CalendarError> {
        Err(CalendarError::NotConfigured)
    }

    async fn delete_event(&self, _account: &str, _event_id: &str) -> Result<(), CalendarError> {
        Err(CalendarError::NotConfigured)
    }
}
