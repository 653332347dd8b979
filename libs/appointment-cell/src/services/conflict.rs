use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, warn};

use doctor_cell::models::BlockedSlot;
use shared_config::DEFAULT_SLOT_MINUTES;
use shared_models::interval::{slot_interval, InvalidRange, TimeInterval};

use crate::models::{Appointment, SchedulingError};

/// Pure overlap detection over a doctor-day.
///
/// Appointments record only a start time, so each one is treated as
/// occupying a fixed-length slot for conflict purposes. Blocked slots and
/// appointment slots have equal weight: any overlapping occupied interval
/// rejects a candidate.
#[derive(Debug, Clone, Copy)]
pub struct ConflictChecker {
    slot_minutes: u32,
}

impl Default for ConflictChecker {
    fn default() -> Self {
        Self {
            slot_minutes: DEFAULT_SLOT_MINUTES,
        }
    }
}

impl ConflictChecker {
    pub fn new(slot_minutes: u32) -> Self {
        Self { slot_minutes }
    }

    /// The implicit slot a booked appointment occupies.
    pub fn appointment_interval(&self, appointment: &Appointment) -> TimeInterval {
        slot_interval(appointment.date, appointment.start_time, self.slot_minutes)
    }

    /// The slot a new booking at `start` would occupy.
    pub fn booking_interval(&self, date: NaiveDate, start: NaiveTime) -> TimeInterval {
        slot_interval(date, start, self.slot_minutes)
    }

    /// Validate a candidate interval against a doctor-day's blocked slots
    /// and appointments.
    ///
    /// An empty or reversed range fails with `InvalidRange` before any
    /// overlap is evaluated. Cancelled appointments do not hold their
    /// slot.
    pub fn check_candidate(
        &self,
        candidate: &TimeInterval,
        blocks: &[BlockedSlot],
        appointments: &[Appointment],
    ) -> Result<(), SchedulingError> {
        if candidate.start >= candidate.end {
            return Err(InvalidRange {
                start: candidate.start,
                end: candidate.end,
            }
            .into());
        }

        debug!(
            "Checking candidate {} {}-{} against {} blocks and {} appointments",
            candidate.date,
            candidate.start,
            candidate.end,
            blocks.len(),
            appointments.len()
        );

        let blocked = blocks.iter().map(BlockedSlot::interval);
        let booked = appointments
            .iter()
            .filter(|a| a.status.occupies_slot())
            .map(|a| self.appointment_interval(a));

        if blocked.chain(booked).any(|slot| slot.overlaps(candidate)) {
            warn!(
                "Conflict detected for candidate {} {}-{}",
                candidate.date, candidate.start, candidate.end
            );
            return Err(SchedulingError::Conflict);
        }

        Ok(())
    }
}
