use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::interval::InvalidRange;

use crate::services::agenda::AgendaCatalogs;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

/// The canonical appointment record shared by every role. Patient, doctor
/// and admin views are filters and aggregations over this one shape, not
/// separate schemas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub patient_name: String,
    pub doctor_id: Uuid,
    pub doctor_name: String,
    pub specialty: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub reason: String,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Combined instant used to order agendas and split upcoming from
    /// history.
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.start_time)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Attended,
    Cancelled,
}

impl AppointmentStatus {
    /// Terminal statuses accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Attended | AppointmentStatus::Cancelled)
    }

    /// Cancelled appointments release their slot; every other status
    /// keeps it occupied for conflict purposes.
    pub fn occupies_slot(&self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Attended => write!(f, "attended"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub patient_id: Uuid,
    pub patient_name: String,
    pub doctor_id: Uuid,
    pub doctor_name: String,
    pub specialty: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AppointmentStatus,
}

/// A doctor's agenda for one day, with per-status tallies for the
/// dashboard tiles.
#[derive(Debug, Clone, Serialize)]
pub struct DayAgenda {
    pub date: NaiveDate,
    pub appointments: Vec<Appointment>,
    pub counts: HashMap<String, usize>,
}

/// Aggregate tallies over a filtered appointment set, plus the catalogs
/// observed across all records. Key sets are derived from the data
/// itself; there is no fixed catalog.
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentStats {
    pub total: usize,
    pub by_status: HashMap<String, usize>,
    pub by_specialty: HashMap<String, usize>,
    pub by_doctor: HashMap<String, usize>,
    pub catalogs: AgendaCatalogs,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Error)]
pub enum SchedulingError {
    #[error(transparent)]
    InvalidRange(#[from] InvalidRange),

    #[error("requested slot conflicts with an existing appointment or blocked slot")]
    Conflict,

    #[error("status change from {from} to {to} is not allowed")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("appointment not found")]
    NotFound,

    #[error("not authorized for this appointment")]
    Unauthorized,

    #[error("validation error: {0}")]
    Validation(String),

    #[error("store error: {0}")]
    Store(String),
}
