use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use appointment_cell::models::{
    Appointment, AppointmentError, CreateAppointmentRequest, SchedulingConfig,
};
use appointment_cell::services::availability::AvailabilityService;
use appointment_cell::services::calendar::DisabledCalendarSync;
use appointment_cell::services::notifications::LoggingDispatcher;
use appointment_cell::services::scheduling::AppointmentScheduler;
use appointment_cell::store::AppointmentStore;
use meeting_cell::services::MeetingRoomService;
use meeting_cell::store::RoomStore;
use realtime_cell::EventHub;
use shared_models::auth::User;
use shared_models::directory::{DoctorProfile, PatientProfile};
use shared_store::DirectoryStore;

struct TestEnv {
    scheduler: Arc<AppointmentScheduler>,
    appointments: Arc<AppointmentStore>,
    directory: Arc<DirectoryStore>,
    doctor: DoctorProfile,
    patient: PatientProfile,
}

impl TestEnv {
    fn availability(&self, config: SchedulingConfig) -> AvailabilityService {
        AvailabilityService::new(self.appointments.clone(), self.directory.clone(), config)
    }

    fn creator(&self) -> User {
        User {
            id: self.patient.user_id,
            email: Some(self.patient.email.clone()),
            name: None,
            role: Some("patient".to_string()),
            created_at: None,
        }
    }

    async fn book(&self, start: DateTime<Utc>, duration_minutes: i32) -> Appointment {
        let request = CreateAppointmentRequest {
            title: "Checkup".to_string(),
            description: None,
            doctor_id: self.doctor.id,
            patient_id: self.patient.id,
            organization_id: None,
            start_time: start,
            duration_minutes,
            appointment_type: None,
            location: None,
            timezone: None,
            notes: None,
        };
        self.scheduler
            .create_appointment(&self.creator(), request)
            .await
            .unwrap()
    }
}

async fn test_env() -> TestEnv {
    let appointments = Arc::new(AppointmentStore::new());
    let directory = Arc::new(DirectoryStore::new());
    let rooms = Arc::new(RoomStore::new());
    let hub = Arc::new(EventHub::new());
    let meeting_rooms = Arc::new(MeetingRoomService::new(
        rooms,
        hub.clone(),
        "http://localhost:3000",
    ));

    let doctor = DoctorProfile {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        first_name: "Grace".to_string(),
        last_name: "Osei".to_string(),
        email: "grace.osei@example.com".to_string(),
        calendar_account: None,
    };
    let patient = PatientProfile {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        first_name: "Tom".to_string(),
        last_name: "Iwu".to_string(),
        email: "tom.iwu@example.com".to_string(),
    };
    directory.add_doctor(doctor.clone()).await.unwrap();
    directory.add_patient(patient.clone()).await.unwrap();

    let scheduler = Arc::new(AppointmentScheduler::new(
        appointments.clone(),
        directory.clone(),
        meeting_rooms,
        Arc::new(DisabledCalendarSync),
        Arc::new(LoggingDispatcher),
        hub,
    ));

    TestEnv {
        scheduler,
        appointments,
        directory,
        doctor,
        patient,
    }
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
}

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, hour, minute, 0).unwrap()
}

#[tokio::test]
async fn an_empty_day_yields_the_full_working_day_grid() {
    let env = test_env().await;
    let availability = env.availability(SchedulingConfig::default());

    let slots = availability
        .available_slots(env.doctor.id, day(), None)
        .await
        .unwrap();

    // 09:00 through 17:30 in 30-minute steps.
    assert_eq!(slots.len(), 18);
    assert_eq!(slots[0].start_time, at(9, 0));
    assert_eq!(slots[0].end_time, at(10, 0));
    assert_eq!(slots[0].duration_minutes, 60);
    assert_eq!(slots[17].start_time, at(17, 30));
    // The last slot runs past the 18:00 close.
    assert_eq!(slots[17].end_time, at(18, 30));
}

#[tokio::test]
async fn booked_time_removes_every_overlapping_candidate() {
    let env = test_env().await;
    env.book(at(10, 0), 60).await;
    let availability = env.availability(SchedulingConfig::default());

    let slots = availability
        .available_slots(env.doctor.id, day(), None)
        .await
        .unwrap();

    // 09:30, 10:00 and 10:30 all overlap the 10:00-11:00 booking.
    assert_eq!(slots.len(), 15);
    assert!(slots.iter().all(|s| s.start_time != at(9, 30)));
    assert!(slots.iter().all(|s| s.start_time != at(10, 0)));
    assert!(slots.iter().all(|s| s.start_time != at(10, 30)));
    // 09:00-10:00 touches the booking's start and survives.
    assert!(slots.iter().any(|s| s.start_time == at(9, 0)));
    assert!(slots.iter().any(|s| s.start_time == at(11, 0)));
}

#[tokio::test]
async fn slots_touching_a_booking_boundary_are_kept() {
    let env = test_env().await;
    env.book(at(10, 0), 30).await;
    let availability = env.availability(SchedulingConfig::default());

    let slots = availability
        .available_slots(env.doctor.id, day(), Some(30))
        .await
        .unwrap();

    assert_eq!(slots.len(), 17);
    assert!(slots.iter().any(|s| s.start_time == at(9, 30)));
    assert!(slots.iter().all(|s| s.start_time != at(10, 0)));
    assert!(slots.iter().any(|s| s.start_time == at(10, 30)));
}

#[tokio::test]
async fn clipping_drops_candidates_that_run_past_the_close() {
    let env = test_env().await;
    let availability = env.availability(SchedulingConfig {
        clip_slots_to_close: true,
        ..Default::default()
    });

    let slots = availability
        .available_slots(env.doctor.id, day(), None)
        .await
        .unwrap();

    assert_eq!(slots.len(), 17);
    assert_eq!(slots[16].start_time, at(17, 0));
    assert_eq!(slots[16].end_time, at(18, 0));
}

#[tokio::test]
async fn cancelled_bookings_do_not_block_slots() {
    let env = test_env().await;
    let appointment = env.book(at(10, 0), 60).await;
    env.scheduler
        .cancel_appointment(&env.creator(), appointment.id, None)
        .await
        .unwrap();

    let availability = env.availability(SchedulingConfig::default());
    let slots = availability
        .available_slots(env.doctor.id, day(), None)
        .await
        .unwrap();

    assert_eq!(slots.len(), 18);
}

#[tokio::test]
async fn bookings_outside_working_hours_still_block_overlapping_slots() {
    let env = test_env().await;
    env.book(at(8, 30), 60).await;
    let availability = env.availability(SchedulingConfig::default());

    let slots = availability
        .available_slots(env.doctor.id, day(), None)
        .await
        .unwrap();

    // The 08:30-09:30 booking knocks out the 09:00 candidate only.
    assert_eq!(slots.len(), 17);
    assert!(slots.iter().all(|s| s.start_time != at(9, 0)));
    assert!(slots.iter().any(|s| s.start_time == at(9, 30)));
}

#[tokio::test]
async fn unknown_doctors_are_rejected() {
    let env = test_env().await;
    let availability = env.availability(SchedulingConfig::default());

    let result = availability
        .available_slots(Uuid::new_v4(), day(), None)
        .await;
    assert_matches!(result, Err(AppointmentError::DoctorNotFound));
}

#[tokio::test]
async fn non_positive_durations_are_rejected() {
    let env = test_env().await;
    let availability = env.availability(SchedulingConfig::default());

    let result = availability
        .available_slots(env.doctor.id, day(), Some(0))
        .await;
    assert_matches!(result, Err(AppointmentError::ValidationError(_)));
}
