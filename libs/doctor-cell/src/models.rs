use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::interval::{InvalidRange, TimeInterval};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub full_name: String,
    pub specialty: String,
}

/// A doctor-declared range of unavailability. Created by explicit action,
/// deleted by id, never edited in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockedSlot {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub note: Option<String>,
}

impl BlockedSlot {
    pub fn interval(&self) -> TimeInterval {
        TimeInterval {
            date: self.date,
            start: self.start_time,
            end: self.end_time,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBlockedSlotRequest {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub note: Option<String>,
}

/// Narrow projection of an appointment record: just enough to know which
/// slot it occupies when validating a new block against the day's agenda.
#[derive(Debug, Clone, Deserialize)]
pub struct BookedSlot {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub status: String,
}

impl BookedSlot {
    /// Cancelled bookings release their slot; every other status holds it.
    pub fn occupies_slot(&self) -> bool {
        self.status != "cancelled"
    }
}

#[derive(Debug, Error)]
pub enum BlockError {
    #[error(transparent)]
    InvalidRange(#[from] InvalidRange),

    #[error("blocked slot overlaps an existing slot or appointment")]
    Overlap,

    #[error("blocked slot not found")]
    NotFound,

    #[error("store error: {0}")]
    Store(String),
}
