use uuid::Uuid;

use chrono::{DateTime, Utc};
use shared_store::{Collection, StoreError};

use crate::models::{Appointment, AppointmentStatus};
use crate::window::TimeWindow;

/// Appointment collection keyed by appointment id.
///
/// Every query that feeds a scheduling decision filters cancelled
/// appointments out here, so a cancelled booking frees its slot without any
/// caller-side special casing.
pub struct AppointmentStore {
    appointments: Collection<Uuid, Appointment>,
}

impl AppointmentStore {
    pub fn new() -> Self {
        Self {
            appointments: Collection::new(),
        }
    }

    pub async fn insert(&self, appointment: Appointment) -> Result<(), StoreError> {
        self.appointments.insert(appointment.id, appointment).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Option<Appointment> {
        self.appointments.get(&id).await
    }

    pub async fn update_with<R, F>(&self, id: Uuid, f: F) -> Result<(Appointment, R), StoreError>
    where
        F: FnOnce(&mut Appointment) -> R,
    {
        self.appointments.update_with(&id, f).await
    }

    /// Non-cancelled appointments for the doctor whose occupancy intersects
    /// `window`. `exclude` skips one appointment id, for reschedule checks
    /// against everything but the appointment being moved.
    pub async fn find_overlapping(
        &self,
        doctor_id: Uuid,
        window: TimeWindow,
        exclude: Option<Uuid>,
    ) -> Vec<Appointment> {
        self.appointments
            .find(|appointment| {
                appointment.doctor_id == doctor_id
                    && appointment.status != AppointmentStatus::Cancelled
                    && exclude != Some(appointment.id)
                    && appointment.window().overlaps(&window)
            })
            .await
    }

    /// Appointments the user created or participates in.
    pub async fn find_for_user(&self, user_id: Uuid) -> Vec<Appointment> {
        self.appointments
            .find(|appointment| appointment.involves(user_id))
            .await
    }

    /// Non-cancelled appointments starting inside `[from, until]` whose email
    /// reminder has not fired yet.
    pub async fn find_reminder_due(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Vec<Appointment> {
        self.appointments
            .find(|appointment| {
                appointment.status != AppointmentStatus::Cancelled
                    && !appointment.reminders_sent.email
                    && appointment.start_time >= from
                    && appointment.start_time <= until
            })
            .await
    }
}

impl Default for AppointmentStore {
    fn default() -> Self {
        Self::new()
    }
}
