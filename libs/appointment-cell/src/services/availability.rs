// libs/appointment-cell/src/services/availability.rs
use chrono::{Duration, NaiveDate, NaiveTime};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use shared_store::DirectoryStore;

use crate::models::{AppointmentError, AvailableSlot, SchedulingConfig};
use crate::store::AppointmentStore;
use crate::window::TimeWindow;

/// Computes bookable slots from the working-day template and the doctor's
/// existing non-cancelled appointments.
pub struct AvailabilityService {
    appointments: Arc<AppointmentStore>,
    directory: Arc<DirectoryStore>,
    config: SchedulingConfig,
}

impl AvailabilityService {
    pub fn new(
        appointments: Arc<AppointmentStore>,
        directory: Arc<DirectoryStore>,
        config: SchedulingConfig,
    ) -> Self {
        Self {
            appointments,
            directory,
            config,
        }
    }

    /// Available slots for one doctor on one calendar day.
    ///
    /// Candidate starts walk from the working-day open to its close in
    /// `slot_step_minutes` increments; the close itself is never a start. A
    /// candidate survives unless it overlaps an existing booking. Unless
    /// `clip_slots_to_close` is set, the final candidates may end after the
    /// close (a 60-minute slot starting at 17:30 ends 18:30).
    pub async fn available_slots(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        requested_duration: Option<i32>,
    ) -> Result<Vec<AvailableSlot>, AppointmentError> {
        let duration_minutes =
            requested_duration.unwrap_or(self.config.default_slot_duration_minutes);
        if duration_minutes <= 0 {
            return Err(AppointmentError::ValidationError(
                "Slot duration must be positive".to_string(),
            ));
        }

        self.directory
            .find_doctor(doctor_id)
            .await
            .ok_or(AppointmentError::DoctorNotFound)?;

        // Bookings that intersect any part of the day. Fetching by
        // intersection rather than containment means an appointment that
        // started at 23:30 the night before still blocks the morning.
        let day_start = date.and_time(NaiveTime::MIN).and_utc();
        let day_window = TimeWindow::new(day_start, day_start + Duration::days(1));
        let booked = self
            .appointments
            .find_overlapping(doctor_id, day_window, None)
            .await;

        let open_at = day_start + Duration::minutes(self.config.working_day_open_minutes);
        let close_at = day_start + Duration::minutes(self.config.working_day_close_minutes);

        let mut slots = Vec::new();
        let mut current_time = open_at;

        while current_time < close_at {
            let candidate = TimeWindow::starting_at(current_time, duration_minutes as i64);

            let clipped = self.config.clip_slots_to_close && candidate.end > close_at;
            let has_conflict = booked.iter().any(|apt| apt.window().overlaps(&candidate));

            if !clipped && !has_conflict {
                slots.push(AvailableSlot {
                    start_time: candidate.start,
                    end_time: candidate.end,
                    duration_minutes,
                });
            }

            current_time += Duration::minutes(self.config.slot_step_minutes);
        }

        debug!(
            "Computed {} available slot(s) for doctor {} on {}",
            slots.len(),
            doctor_id,
            date
        );
        Ok(slots)
    }
}
