use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use chrono::{NaiveDate, NaiveTime, Utc};
use headers::{authorization::Bearer, Authorization};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_models::interval::{slot_interval, TimeInterval};

use crate::models::{BookAppointmentRequest, SchedulingError, UpdateStatusRequest};
use crate::services::agenda::AppointmentFilter;
use crate::services::booking::BookingService;

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct DayAgendaQuery {
    pub date: Option<NaiveDate>,
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConflictCheckQuery {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub start: NaiveTime,
    /// When absent the candidate is an appointment occupying one
    /// implicit slot starting at `start`.
    pub end: Option<NaiveTime>,
}

fn map_scheduling_error(error: SchedulingError) -> AppError {
    match error {
        SchedulingError::InvalidRange(e) => AppError::BadRequest(e.to_string()),
        SchedulingError::Conflict => {
            AppError::Conflict("Appointment slot conflicts with an existing booking or blocked slot".to_string())
        }
        SchedulingError::InvalidTransition { .. } => AppError::BadRequest(error.to_string()),
        SchedulingError::NotFound => AppError::NotFound("Appointment not found".to_string()),
        SchedulingError::Unauthorized => {
            AppError::Auth("Not authorized for this appointment".to_string())
        }
        SchedulingError::Validation(msg) => AppError::BadRequest(msg),
        SchedulingError::Store(msg) => AppError::Store(msg),
    }
}

// ==============================================================================
// APPOINTMENT HANDLERS
// ==============================================================================

/// Book an appointment. Patients book for themselves, doctors for their
/// own calendar, admins for anyone.
#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let is_patient = user.is_patient() && request.patient_id.to_string() == user.id;
    let is_doctor = user.is_doctor() && request.doctor_id.to_string() == user.id;

    if !is_patient && !is_doctor && !user.is_admin() {
        return Err(AppError::Auth(
            "Not authorized to book appointment for this patient".to_string(),
        ));
    }

    let appointment = BookingService::new(&state)
        .book_appointment(request, auth.token())
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({ "success": true, "appointment": appointment })))
}

/// A patient's upcoming/history split. Visible to the patient themself
/// and to admins.
#[axum::debug_handler]
pub async fn get_patient_agenda(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let is_owner = user.is_patient() && patient_id.to_string() == user.id;
    if !is_owner && !user.is_admin() {
        return Err(AppError::Auth(
            "Not authorized to view this patient's appointments".to_string(),
        ));
    }

    let partition = BookingService::new(&state)
        .patient_agenda(patient_id, Utc::now().naive_utc(), auth.token())
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "upcoming": partition.upcoming,
        "history": partition.history,
    })))
}

/// A doctor's day agenda with status tallies. Defaults to today.
#[axum::debug_handler]
pub async fn get_doctor_day_agenda(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<DayAgendaQuery>,
) -> Result<Json<Value>, AppError> {
    let is_owner = user.is_doctor() && doctor_id.to_string() == user.id;
    if !is_owner && !user.is_admin() {
        return Err(AppError::Auth(
            "Not authorized to view this doctor's agenda".to_string(),
        ));
    }

    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());

    let agenda = BookingService::new(&state)
        .doctor_day_agenda(doctor_id, date, query.q.as_deref(), auth.token())
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({ "agenda": agenda })))
}

/// Move an appointment through its lifecycle. Doctors and admins only;
/// patients cancel through the dedicated endpoint.
#[axum::debug_handler]
pub async fn update_appointment_status(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    if !user.is_doctor() && !user.is_admin() {
        return Err(AppError::Auth(
            "Not authorized to change appointment status".to_string(),
        ));
    }

    let updated = BookingService::new(&state)
        .change_status(appointment_id, request.status, auth.token())
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({ "success": true, "appointment": updated })))
}

/// Cancellation shortcut. Any authenticated role may request it; the
/// store enforces per-row access for patients.
#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let cancelled = BookingService::new(&state)
        .cancel_appointment(appointment_id, auth.token())
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({ "success": true, "appointment": cancelled })))
}

/// Advisory conflict probe used by booking forms before submitting.
#[axum::debug_handler]
pub async fn check_appointment_conflicts(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Query(query): Query<ConflictCheckQuery>,
) -> Result<Json<Value>, AppError> {
    let candidate = match query.end {
        Some(end) => TimeInterval::new(query.date, query.start, end)
            .map_err(|e| AppError::BadRequest(e.to_string()))?,
        None => slot_interval(query.date, query.start, state.slot_minutes),
    };

    let has_conflict = BookingService::new(&state)
        .check_conflict(query.doctor_id, candidate, auth.token())
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({ "has_conflict": has_conflict })))
}

/// Filtered aggregate tallies. Admin only.
#[axum::debug_handler]
pub async fn get_appointment_stats(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(filter): Query<AppointmentFilter>,
) -> Result<Json<Value>, AppError> {
    if !user.is_admin() {
        return Err(AppError::Auth("Only admins can view appointment stats".to_string()));
    }

    let stats = BookingService::new(&state)
        .appointment_stats(&filter, auth.token())
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({ "stats": stats })))
}
