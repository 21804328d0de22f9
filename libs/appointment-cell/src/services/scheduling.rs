// libs/appointment-cell/src/services/scheduling.rs
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use meeting_cell::MeetingRoomService;
use realtime_cell::{AppointmentEvent, AppointmentEventKind, EventHub};
use shared_models::auth::User;
use shared_models::directory::DoctorProfile;
use shared_store::DirectoryStore;

use crate::models::{
    Appointment, AppointmentError, AppointmentFilter, AppointmentParticipant, AppointmentStatus,
    AppointmentType, AppointmentVenue, CreateAppointmentRequest, ParticipantRole,
    ParticipantStatus, RoomBinding, UpdateAppointmentRequest,
};
use crate::services::calendar::{CalendarError, CalendarEventDetails, CalendarSync};
use crate::services::lifecycle::validate_status_transition;
use crate::services::locks::DoctorScheduleLocks;
use crate::services::notifications::{
    NotificationDispatcher, NotificationKind, NotificationRecipient,
};
use crate::store::AppointmentStore;
use crate::window::TimeWindow;

/// Books and manages appointments.
///
/// Writes that could double-book run under the doctor's schedule lock;
/// notifications, calendar sync and realtime fan-out run after the lock is
/// released and can never fail a booking.
pub struct AppointmentScheduler {
    appointments: Arc<AppointmentStore>,
    directory: Arc<DirectoryStore>,
    meeting_rooms: Arc<MeetingRoomService>,
    calendar: Arc<dyn CalendarSync>,
    notifications: Arc<dyn NotificationDispatcher>,
    hub: Arc<EventHub>,
    locks: DoctorScheduleLocks,
}

impl AppointmentScheduler {
    pub fn new(
        appointments: Arc<AppointmentStore>,
        directory: Arc<DirectoryStore>,
        meeting_rooms: Arc<MeetingRoomService>,
        calendar: Arc<dyn CalendarSync>,
        notifications: Arc<dyn NotificationDispatcher>,
        hub: Arc<EventHub>,
    ) -> Self {
        Self {
            appointments,
            directory,
            meeting_rooms,
            calendar,
            notifications,
            hub,
            locks: DoctorScheduleLocks::new(),
        }
    }

    /// Book a new appointment.
    ///
    /// A virtual appointment gets its meeting room before anything is
    /// persisted; if room creation fails the booking fails with nothing
    /// written. A concurrent booking for the same doctor waits on the
    /// schedule lock and then fails the conflict check.
    #[instrument(skip(self, requester, request), fields(doctor_id = %request.doctor_id, patient_id = %request.patient_id))]
    pub async fn create_appointment(
        &self,
        requester: &User,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        info!(
            "Booking appointment for patient {} with doctor {}",
            request.patient_id, request.doctor_id
        );

        validate_create_request(&request)?;

        let doctor = self
            .directory
            .find_doctor(request.doctor_id)
            .await
            .ok_or(AppointmentError::DoctorNotFound)?;
        let patient = self
            .directory
            .find_patient(request.patient_id)
            .await
            .ok_or(AppointmentError::PatientNotFound)?;

        let window = TimeWindow::starting_at(request.start_time, request.duration_minutes as i64);

        let guard = self.locks.acquire(request.doctor_id).await;

        let conflicts = self
            .appointments
            .find_overlapping(request.doctor_id, window, None)
            .await;
        if !conflicts.is_empty() {
            warn!(
                "Appointment conflict detected for doctor {} at {}",
                request.doctor_id, request.start_time
            );
            return Err(AppointmentError::ConflictDetected);
        }

        let id = Uuid::new_v4();
        let venue = self.resolve_venue(id, &doctor, &request).await?;

        let now = Utc::now();
        let participants = vec![
            AppointmentParticipant {
                user_id: doctor.user_id,
                email: doctor.email.clone(),
                name: doctor.full_name(),
                role: ParticipantRole::Doctor,
                status: ParticipantStatus::Accepted,
                responded_at: Some(now),
            },
            AppointmentParticipant {
                user_id: patient.user_id,
                email: patient.email.clone(),
                name: patient.full_name(),
                role: ParticipantRole::Patient,
                status: ParticipantStatus::Invited,
                responded_at: None,
            },
        ];

        let appointment = Appointment {
            id,
            title: request.title.trim().to_string(),
            description: request.description,
            status: AppointmentStatus::Scheduled,
            doctor_id: request.doctor_id,
            patient_id: request.patient_id,
            organization_id: request.organization_id,
            created_by: requester.id,
            start_time: window.start,
            end_time: window.end,
            duration_minutes: request.duration_minutes,
            timezone: request.timezone.unwrap_or_else(|| "UTC".to_string()),
            venue,
            calendar_event: None,
            participants,
            notes: request.notes,
            reminders_sent: Default::default(),
            created_at: now,
            updated_at: now,
        };

        self.appointments
            .insert(appointment.clone())
            .await
            .map_err(|e| AppointmentError::Internal(format!("Failed to store appointment: {}", e)))?;

        drop(guard);

        let appointment = self.run_post_booking_tasks(appointment, &doctor).await;

        info!(
            "Appointment {} booked successfully with doctor {}",
            appointment.id, appointment.doctor_id
        );
        Ok(appointment)
    }

    /// Fetch one appointment. Readable only by its creator and participants.
    pub async fn get_appointment(
        &self,
        requester: &User,
        id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self
            .appointments
            .find_by_id(id)
            .await
            .ok_or(AppointmentError::NotFound)?;

        if !appointment.involves(requester.id) {
            return Err(AppointmentError::AccessDenied);
        }

        Ok(appointment)
    }

    /// Update fields on an appointment. Creator only.
    ///
    /// A reschedule (new start or duration) re-runs the conflict check under
    /// the doctor's lock, excluding the appointment being moved, and keeps
    /// `end_time` derived from start plus duration. Status changes go
    /// through the transition table.
    #[instrument(skip(self, requester, request), fields(appointment_id = %id))]
    pub async fn update_appointment(
        &self,
        requester: &User,
        id: Uuid,
        request: UpdateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Updating appointment {}", id);

        let existing = self
            .appointments
            .find_by_id(id)
            .await
            .ok_or(AppointmentError::NotFound)?;
        if existing.created_by != requester.id {
            return Err(AppointmentError::CreatorRequired);
        }

        if let Some(title) = &request.title {
            if title.trim().is_empty() {
                return Err(AppointmentError::ValidationError(
                    "Title cannot be empty".to_string(),
                ));
            }
        }

        let reschedule = request.start_time.is_some() || request.duration_minutes.is_some();
        let new_start = request.start_time.unwrap_or(existing.start_time);
        let new_duration = request.duration_minutes.unwrap_or(existing.duration_minutes);
        if new_duration <= 0 {
            return Err(AppointmentError::ValidationError(
                "Duration must be positive".to_string(),
            ));
        }
        let new_window = TimeWindow::starting_at(new_start, new_duration as i64);

        let _guard = if reschedule {
            Some(self.locks.acquire(existing.doctor_id).await)
        } else {
            None
        };

        if reschedule {
            let conflicts = self
                .appointments
                .find_overlapping(existing.doctor_id, new_window, Some(id))
                .await;
            if !conflicts.is_empty() {
                warn!(
                    "Reschedule conflict detected for doctor {} at {}",
                    existing.doctor_id, new_window.start
                );
                return Err(AppointmentError::ConflictDetected);
            }
        }

        let (appointment, outcome) = self
            .appointments
            .update_with(id, |apt| {
                // Validate before mutating anything so a rejected update
                // leaves the record untouched.
                if let Some(new_status) = request.status {
                    if new_status != apt.status {
                        validate_status_transition(apt.status, new_status)?;
                        apt.status = new_status;
                    }
                }
                if let Some(title) = request.title {
                    apt.title = title.trim().to_string();
                }
                if let Some(description) = request.description {
                    apt.description = Some(description);
                }
                if let Some(notes) = request.notes {
                    apt.notes = Some(notes);
                }
                if let Some(location) = request.location {
                    if let AppointmentVenue::InPerson {
                        location: venue_location,
                    } = &mut apt.venue
                    {
                        *venue_location = Some(location);
                    }
                }
                if reschedule {
                    apt.start_time = new_window.start;
                    apt.end_time = new_window.end;
                    apt.duration_minutes = new_duration;
                }
                apt.updated_at = Utc::now();
                Ok(())
            })
            .await
            .map_err(|_| AppointmentError::NotFound)?;
        outcome?;

        if reschedule {
            self.sync_calendar_update(&appointment).await;
        }
        self.publish_event(AppointmentEventKind::Updated, &appointment)
            .await;

        info!("Appointment {} updated", id);
        Ok(appointment)
    }

    /// Cancel an appointment. Creator only.
    ///
    /// Cancelling an already-cancelled appointment is a no-op success with
    /// no notifications. Cancelled is terminal; nothing revives it.
    pub async fn cancel_appointment(
        &self,
        requester: &User,
        id: Uuid,
        reason: Option<String>,
    ) -> Result<Appointment, AppointmentError> {
        let existing = self
            .appointments
            .find_by_id(id)
            .await
            .ok_or(AppointmentError::NotFound)?;
        if existing.created_by != requester.id {
            return Err(AppointmentError::CreatorRequired);
        }
        if existing.is_cancelled() {
            debug!("Appointment {} is already cancelled; nothing to do", id);
            return Ok(existing);
        }

        let (appointment, outcome) = self
            .appointments
            .update_with(id, |apt| {
                if apt.is_cancelled() {
                    return Ok(false);
                }
                validate_status_transition(apt.status, AppointmentStatus::Cancelled)?;
                apt.status = AppointmentStatus::Cancelled;
                apt.updated_at = Utc::now();
                Ok(true)
            })
            .await
            .map_err(|_| AppointmentError::NotFound)?;
        let cancelled_now = outcome?;
        if !cancelled_now {
            return Ok(appointment);
        }

        let reason = reason.unwrap_or_else(|| "No reason provided".to_string());

        self.notify_participants(
            &appointment,
            NotificationKind::AppointmentCancellation,
            json!({
                "title": appointment.title,
                "start_time": appointment.start_time,
                "reason": reason,
            }),
        )
        .await;
        self.remove_calendar_event(&appointment).await;
        self.publish_event(AppointmentEventKind::Cancelled, &appointment)
            .await;

        info!("Appointment {} cancelled", id);
        Ok(appointment)
    }

    pub async fn accept_appointment(
        &self,
        requester: &User,
        id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        self.respond_to_invitation(requester, id, ParticipantStatus::Accepted)
            .await
    }

    pub async fn decline_appointment(
        &self,
        requester: &User,
        id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        self.respond_to_invitation(requester, id, ParticipantStatus::Declined)
            .await
    }

    /// Appointments the user created or participates in, soonest first.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        filter: &AppointmentFilter,
    ) -> Vec<Appointment> {
        let mut appointments = self.appointments.find_for_user(user_id).await;

        if let Some(status) = filter.status {
            appointments.retain(|a| a.status == status);
        }
        if let Some(kind) = filter.appointment_type {
            appointments.retain(|a| a.appointment_type() == kind);
        }
        if let Some(from) = filter.from {
            appointments.retain(|a| a.start_time >= from);
        }
        if let Some(until) = filter.until {
            appointments.retain(|a| a.start_time <= until);
        }

        appointments.sort_by_key(|a| a.start_time);
        appointments
    }

    /// One sweep of the reminder scanner: fires the reminder for every
    /// non-cancelled appointment starting within `lead`, at most once per
    /// appointment. The sent flag is claimed atomically so overlapping
    /// sweeps cannot double-send.
    pub async fn dispatch_due_reminders(&self, lead: Duration) -> usize {
        let now = Utc::now();
        let due = self.appointments.find_reminder_due(now, now + lead).await;

        let mut dispatched = 0;
        for candidate in due {
            let claim = self
                .appointments
                .update_with(candidate.id, |apt| {
                    if apt.reminders_sent.email || apt.is_cancelled() {
                        false
                    } else {
                        apt.reminders_sent.email = true;
                        apt.updated_at = Utc::now();
                        true
                    }
                })
                .await;

            let (appointment, claimed) = match claim {
                Ok(result) => result,
                Err(_) => continue,
            };
            if !claimed {
                continue;
            }

            self.notify_participants(
                &appointment,
                NotificationKind::AppointmentReminder,
                json!({
                    "title": appointment.title,
                    "start_time": appointment.start_time,
                    "timezone": appointment.timezone,
                }),
            )
            .await;
            self.publish_event(AppointmentEventKind::Reminder, &appointment)
                .await;
            dispatched += 1;
        }

        if dispatched > 0 {
            info!("Dispatched {} appointment reminder(s)", dispatched);
        }
        dispatched
    }

    // ==============================================================================
    // PRIVATE HELPER METHODS
    // ==============================================================================

    /// Record an accept or decline from an invited participant.
    ///
    /// Idempotent: repeating a response, or responding without a participant
    /// entry, changes nothing and succeeds.
    async fn respond_to_invitation(
        &self,
        requester: &User,
        id: Uuid,
        response: ParticipantStatus,
    ) -> Result<Appointment, AppointmentError> {
        let requester_id = requester.id;
        let (appointment, changed) = self
            .appointments
            .update_with(id, |apt| {
                match apt
                    .participants
                    .iter_mut()
                    .find(|p| p.user_id == requester_id)
                {
                    Some(participant) if participant.status != response => {
                        participant.status = response;
                        participant.responded_at = Some(Utc::now());
                        apt.updated_at = Utc::now();
                        true
                    }
                    _ => false,
                }
            })
            .await
            .map_err(|_| AppointmentError::NotFound)?;

        if changed {
            debug!(
                "Participant {} marked {} on appointment {}",
                requester_id, response, id
            );
        } else {
            debug!(
                "Invitation response from {} on appointment {} changed nothing",
                requester_id, id
            );
        }
        Ok(appointment)
    }

    /// Builds the venue for a new appointment. Virtual appointments get
    /// their meeting room here, hosted by the doctor's user account.
    async fn resolve_venue(
        &self,
        appointment_id: Uuid,
        doctor: &DoctorProfile,
        request: &CreateAppointmentRequest,
    ) -> Result<AppointmentVenue, AppointmentError> {
        let appointment_type = request.appointment_type.unwrap_or(AppointmentType::InPerson);

        match appointment_type {
            AppointmentType::Virtual => {
                let room = self
                    .meeting_rooms
                    .create_room(appointment_id, doctor.user_id)
                    .await
                    .map_err(|e| AppointmentError::RoomCreationFailed(e.to_string()))?;
                Ok(AppointmentVenue::Virtual {
                    room: RoomBinding {
                        room_id: room.room_id,
                        room_link: room.room_link,
                        access_code: room.access_code,
                        password: room.password,
                    },
                })
            }
            AppointmentType::InPerson => Ok(AppointmentVenue::InPerson {
                location: request.location.clone(),
            }),
            AppointmentType::Phone => Ok(AppointmentVenue::Phone),
        }
    }

    async fn run_post_booking_tasks(
        &self,
        appointment: Appointment,
        doctor: &DoctorProfile,
    ) -> Appointment {
        self.notify_participants(
            &appointment,
            NotificationKind::AppointmentInvitation,
            json!({
                "title": appointment.title,
                "start_time": appointment.start_time,
                "timezone": appointment.timezone,
            }),
        )
        .await;

        let appointment = self.sync_calendar_create(appointment, doctor).await;

        self.publish_event(AppointmentEventKind::Scheduled, &appointment)
            .await;

        appointment
    }

    /// Mirrors a fresh booking into the doctor's calendar and persists the
    /// event reference. Best-effort: any failure leaves the booking intact.
    async fn sync_calendar_create(
        &self,
        appointment: Appointment,
        doctor: &DoctorProfile,
    ) -> Appointment {
        let Some(account) = doctor.calendar_account.as_deref() else {
            return appointment;
        };

        let details = calendar_details(&appointment);
        match self.calendar.create_event(account, &details).await {
            Ok(event_ref) => {
                let bound = self
                    .appointments
                    .update_with(appointment.id, |apt| {
                        apt.calendar_event = Some(event_ref);
                        apt.updated_at = Utc::now();
                    })
                    .await;
                match bound {
                    Ok((updated, _)) => updated,
                    Err(_) => appointment,
                }
            }
            Err(CalendarError::NotConfigured) => {
                debug!(
                    "No calendar provider configured; skipping event for appointment {}",
                    appointment.id
                );
                appointment
            }
            Err(e) => {
                warn!(
                    "Calendar sync failed for appointment {}: {}",
                    appointment.id, e
                );
                appointment
            }
        }
    }

    async fn sync_calendar_update(&self, appointment: &Appointment) {
        let Some(event_ref) = &appointment.calendar_event else {
            return;
        };
        let Some(doctor) = self.directory.find_doctor(appointment.doctor_id).await else {
            return;
        };
        let Some(account) = doctor.calendar_account.as_deref() else {
            return;
        };

        let details = calendar_details(appointment);
        if let Err(e) = self
            .calendar
            .update_event(account, &event_ref.event_id, &details)
            .await
        {
            warn!(
                "Calendar update failed for appointment {}: {}",
                appointment.id, e
            );
        }
    }

    async fn remove_calendar_event(&self, appointment: &Appointment) {
        let Some(event_ref) = &appointment.calendar_event else {
            return;
        };
        let Some(doctor) = self.directory.find_doctor(appointment.doctor_id).await else {
            return;
        };
        let Some(account) = doctor.calendar_account.as_deref() else {
            return;
        };

        if let Err(e) = self.calendar.delete_event(account, &event_ref.event_id).await {
            warn!(
                "Calendar delete failed for appointment {}: {}",
                appointment.id, e
            );
        }
    }

    async fn notify_participants(
        &self,
        appointment: &Appointment,
        kind: NotificationKind,
        data: Value,
    ) {
        let recipients: Vec<NotificationRecipient> = appointment
            .participants
            .iter()
            .map(|p| NotificationRecipient {
                email: p.email.clone(),
                name: p.name.clone(),
            })
            .collect();
        self.notifications.send_batch(&recipients, kind, &data).await;
    }

    async fn publish_event(&self, kind: AppointmentEventKind, appointment: &Appointment) {
        let data = serde_json::to_value(appointment).unwrap_or(Value::Null);
        let event = AppointmentEvent::new(kind, appointment.id, data);
        self.hub
            .publish_appointment_event(&appointment.participant_user_ids(), &event)
            .await;
    }
}

fn validate_create_request(request: &CreateAppointmentRequest) -> Result<(), AppointmentError> {
    if request.title.trim().is_empty() {
        return Err(AppointmentError::ValidationError(
            "Title is required".to_string(),
        ));
    }
    if request.duration_minutes <= 0 {
        return Err(AppointmentError::ValidationError(
            "Duration must be positive".to_string(),
        ));
    }
    Ok(())
}

fn calendar_details(appointment: &Appointment) -> CalendarEventDetails {
    CalendarEventDetails {
        title: appointment.title.clone(),
        description: appointment.description.clone().unwrap_or_default(),
        start_time: appointment.start_time,
        end_time: appointment.end_time,
        timezone: appointment.timezone.clone(),
        attendee_emails: appointment
            .participants
            .iter()
            .map(|p| p.email.clone())
            .collect(),
    }
}
