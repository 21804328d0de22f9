// libs/appointment-cell/src/handlers.rs
use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{
    AppointmentFilter, AppointmentStatus, AppointmentType, CancelAppointmentRequest,
    CreateAppointmentRequest, UpdateAppointmentRequest,
};
use crate::router::AppointmentState;

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct MyAppointmentsQuery {
    pub status: Option<AppointmentStatus>,
    pub appointment_type: Option<AppointmentType>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct AvailableSlotsQuery {
    pub date: NaiveDate,
    pub duration: Option<i32>,
}

// ==============================================================================
// APPOINTMENT HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = state
        .scheduler
        .create_appointment(&user, request)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment booked successfully",
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn list_my_appointments(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
    Query(query): Query<MyAppointmentsQuery>,
) -> Result<Json<Value>, AppError> {
    let filter = AppointmentFilter {
        status: query.status,
        appointment_type: query.appointment_type,
        from: query.from_date,
        until: query.to_date,
    };
    let appointments = state.scheduler.list_for_user(user.id, &filter).await;

    Ok(Json(json!({
        "count": appointments.len(),
        "appointments": appointments
    })))
}

#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<AppointmentState>,
    Extension(_user): Extension<User>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<AvailableSlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let slots = state
        .availability
        .available_slots(doctor_id, query.date, query.duration)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({
        "date": query.date,
        "count": slots.len(),
        "slots": slots
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = state
        .scheduler
        .get_appointment(&user, appointment_id)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({ "appointment": appointment })))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = state
        .scheduler
        .update_appointment(&user, appointment_id, request)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment updated",
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<CancelAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = state
        .scheduler
        .cancel_appointment(&user, appointment_id, request.reason)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment cancelled",
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn accept_appointment(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = state
        .scheduler
        .accept_appointment(&user, appointment_id)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({
        "success": true,
        "message": "Invitation accepted",
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn decline_appointment(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = state
        .scheduler
        .decline_appointment(&user, appointment_id)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({
        "success": true,
        "message": "Invitation declined",
        "appointment": appointment
    })))
}
