use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Method;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use doctor_cell::models::BlockedSlot;
use shared_config::AppConfig;
use shared_models::interval::TimeInterval;
use shared_store::AgendaStoreClient;

use crate::models::{
    Appointment, AppointmentStats, AppointmentStatus, BookAppointmentRequest, DayAgenda,
    SchedulingError,
};
use crate::services::agenda::{self, AgendaPartition, AppointmentFilter};
use crate::services::conflict::ConflictChecker;
use crate::services::lifecycle::AppointmentLifecycleService;

/// Orchestrates bookings and status changes against the external store.
///
/// Conflict checks run client-side for fast feedback, but the store is
/// the single source of truth and re-verifies every write; a race between
/// two bookings is settled there, not here.
pub struct BookingService {
    store: Arc<AgendaStoreClient>,
    conflict: ConflictChecker,
    lifecycle: AppointmentLifecycleService,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: Arc::new(AgendaStoreClient::new(config)),
            conflict: ConflictChecker::new(config.slot_minutes),
            lifecycle: AppointmentLifecycleService::new(),
        }
    }

    /// Book an appointment: reject bad ranges and occupied slots, then
    /// submit to the store, which creates the record as `pending`.
    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, SchedulingError> {
        info!(
            "Booking appointment for patient {} with doctor {} on {} at {}",
            request.patient_id, request.doctor_id, request.date, request.start_time
        );

        if request.reason.trim().is_empty() {
            return Err(SchedulingError::Validation(
                "A reason for the appointment is required".to_string(),
            ));
        }

        let candidate = self
            .conflict
            .booking_interval(request.date, request.start_time);

        let appointments = self
            .day_appointments(request.doctor_id, request.date, auth_token)
            .await?;
        let blocks = self.doctor_blocks(request.doctor_id, auth_token).await?;

        self.conflict
            .check_candidate(&candidate, &blocks, &appointments)?;

        let body = json!({
            "patient_id": request.patient_id,
            "patient_name": request.patient_name,
            "doctor_id": request.doctor_id,
            "doctor_name": request.doctor_name,
            "specialty": request.specialty,
            "date": request.date,
            "start_time": request.start_time,
            "reason": request.reason,
            "status": AppointmentStatus::Pending,
        });

        let created: Appointment = self
            .store
            .request(Method::POST, "/appointments", Some(auth_token), Some(body))
            .await
            .map_err(|e| SchedulingError::Store(e.to_string()))?;

        info!("Appointment {} created as pending", created.id);
        Ok(created)
    }

    /// Apply a status transition and persist it. The transition is
    /// validated before the store sees anything, so an illegal change
    /// leaves the record untouched.
    pub async fn change_status(
        &self,
        appointment_id: Uuid,
        new_status: AppointmentStatus,
        auth_token: &str,
    ) -> Result<Appointment, SchedulingError> {
        let current = self.get_appointment(appointment_id, auth_token).await?;

        let updated = self.lifecycle.apply_transition(&current, new_status)?;

        let path = format!("/appointments/{}/status", appointment_id);
        let persisted: Appointment = self
            .store
            .request(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(json!({ "status": updated.status })),
            )
            .await
            .map_err(|e| SchedulingError::Store(e.to_string()))?;

        info!(
            "Appointment {} moved from {} to {}",
            appointment_id, current.status, persisted.status
        );
        Ok(persisted)
    }

    pub async fn cancel_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, SchedulingError> {
        self.change_status(appointment_id, AppointmentStatus::Cancelled, auth_token)
            .await
    }

    /// Advisory conflict probe for a candidate interval on a doctor-day.
    pub async fn check_conflict(
        &self,
        doctor_id: Uuid,
        candidate: TimeInterval,
        auth_token: &str,
    ) -> Result<bool, SchedulingError> {
        let appointments = self
            .day_appointments(doctor_id, candidate.date, auth_token)
            .await?;
        let blocks = self.doctor_blocks(doctor_id, auth_token).await?;

        match self
            .conflict
            .check_candidate(&candidate, &blocks, &appointments)
        {
            Ok(()) => Ok(false),
            Err(SchedulingError::Conflict) => Ok(true),
            Err(e) => Err(e),
        }
    }

    /// A doctor's day view with per-status tallies.
    pub async fn doctor_day_agenda(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        query: Option<&str>,
        auth_token: &str,
    ) -> Result<DayAgenda, SchedulingError> {
        let appointments = self.day_appointments(doctor_id, date, auth_token).await?;
        let day = agenda::day_agenda(appointments, doctor_id, date, query);

        let counts = agenda::status_counts(&day)
            .into_iter()
            .map(|(status, count)| (status.to_string(), count))
            .collect();

        Ok(DayAgenda {
            date,
            appointments: day,
            counts,
        })
    }

    /// A patient's appointments split into upcoming and history.
    pub async fn patient_agenda(
        &self,
        patient_id: Uuid,
        now: NaiveDateTime,
        auth_token: &str,
    ) -> Result<AgendaPartition, SchedulingError> {
        let path = format!("/appointments?patient_id={}", patient_id);
        let appointments: Vec<Appointment> = self
            .store
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| SchedulingError::Store(e.to_string()))?;

        Ok(agenda::partition(appointments, now))
    }

    /// Filtered aggregate tallies for the admin dashboard.
    pub async fn appointment_stats(
        &self,
        filter: &AppointmentFilter,
        auth_token: &str,
    ) -> Result<AppointmentStats, SchedulingError> {
        let appointments: Vec<Appointment> = self
            .store
            .request(Method::GET, "/appointments", Some(auth_token), None)
            .await
            .map_err(|e| SchedulingError::Store(e.to_string()))?;

        // Catalogs reflect everything observed; tallies follow the filter
        let catalogs = agenda::catalogs(&appointments);
        let matched = filter.apply(appointments);

        let by_status = agenda::status_counts(&matched)
            .into_iter()
            .map(|(status, count)| (status.to_string(), count))
            .collect();

        Ok(AppointmentStats {
            total: matched.len(),
            by_status,
            by_specialty: agenda::aggregate_by(&matched, |a| a.specialty.clone()),
            by_doctor: agenda::aggregate_by(&matched, |a| a.doctor_name.clone()),
            catalogs,
        })
    }

    // ==============================================================================
    // PRIVATE HELPER METHODS
    // ==============================================================================

    async fn get_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, SchedulingError> {
        let path = format!("/appointments?id={}", appointment_id);
        let mut result: Vec<Appointment> = self
            .store
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| SchedulingError::Store(e.to_string()))?;

        match result.pop() {
            Some(appointment) => Ok(appointment),
            None => {
                warn!("Appointment {} not found", appointment_id);
                Err(SchedulingError::NotFound)
            }
        }
    }

    async fn day_appointments(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        let path = format!("/appointments?doctor_id={}&date={}", doctor_id, date);
        self.store
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| SchedulingError::Store(e.to_string()))
    }

    async fn doctor_blocks(
        &self,
        doctor_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<BlockedSlot>, SchedulingError> {
        let path = format!("/doctors/{}/blocks", doctor_id);
        debug!("Fetching blocked slots for doctor {}", doctor_id);
        self.store
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| SchedulingError::Store(e.to_string()))
    }
}
