use chrono::Utc;
use tracing::{debug, warn};

use crate::models::{Appointment, AppointmentStatus, SchedulingError};

/// State machine over appointment status.
///
/// pending -> confirmed | attended | cancelled
/// confirmed -> attended | cancelled
/// attended, cancelled -> (terminal)
///
/// A doctor may mark an unconfirmed appointment attended in one step, so
/// pending -> attended is a legal shortcut. Self-transitions are
/// rejected, and there is no administrative bypass: every role goes
/// through the same guard.
pub struct AppointmentLifecycleService;

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// All statuses reachable from `current`.
    pub fn valid_transitions(&self, current: AppointmentStatus) -> &'static [AppointmentStatus] {
        match current {
            AppointmentStatus::Pending => &[
                AppointmentStatus::Confirmed,
                AppointmentStatus::Attended,
                AppointmentStatus::Cancelled,
            ],
            AppointmentStatus::Confirmed => {
                &[AppointmentStatus::Attended, AppointmentStatus::Cancelled]
            }
            AppointmentStatus::Attended | AppointmentStatus::Cancelled => &[],
        }
    }

    pub fn validate_transition(
        &self,
        current: AppointmentStatus,
        new_status: AppointmentStatus,
    ) -> Result<(), SchedulingError> {
        debug!("Validating status transition {} -> {}", current, new_status);

        if !self.valid_transitions(current).contains(&new_status) {
            warn!("Invalid status transition attempted: {} -> {}", current, new_status);
            return Err(SchedulingError::InvalidTransition {
                from: current,
                to: new_status,
            });
        }

        Ok(())
    }

    /// Apply a transition, returning an updated copy. The input record is
    /// untouched; on failure nothing changes anywhere.
    pub fn apply_transition(
        &self,
        appointment: &Appointment,
        new_status: AppointmentStatus,
    ) -> Result<Appointment, SchedulingError> {
        self.validate_transition(appointment.status, new_status)?;

        let mut updated = appointment.clone();
        updated.status = new_status;
        updated.updated_at = Utc::now();
        Ok(updated)
    }
}

impl Default for AppointmentLifecycleService {
    fn default() -> Self {
        Self::new()
    }
}
