//! Derived read views over appointment collections. Each role's dashboard
//! is a different filter/aggregation over the same canonical records.

use std::collections::{BTreeSet, HashMap};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Appointment, AppointmentStatus};

/// A patient's agenda split around `now`.
#[derive(Debug, Clone, Serialize)]
pub struct AgendaPartition {
    pub upcoming: Vec<Appointment>,
    pub history: Vec<Appointment>,
}

/// True iff the appointment still lies ahead and was not cancelled.
pub fn is_upcoming(appointment: &Appointment, now: NaiveDateTime) -> bool {
    appointment.status != AppointmentStatus::Cancelled && appointment.starts_at() >= now
}

/// Split appointments into upcoming (ascending) and history (descending).
///
/// History keeps every past appointment, cancelled or not. A future
/// appointment that was cancelled lands in neither list; no appointment
/// ever lands in both.
pub fn partition(appointments: Vec<Appointment>, now: NaiveDateTime) -> AgendaPartition {
    let mut upcoming = Vec::new();
    let mut history = Vec::new();

    for appointment in appointments {
        if appointment.starts_at() < now {
            history.push(appointment);
        } else if appointment.status != AppointmentStatus::Cancelled {
            upcoming.push(appointment);
        }
    }

    upcoming.sort_by_key(Appointment::starts_at);
    history.sort_by(|a, b| b.starts_at().cmp(&a.starts_at()));

    AgendaPartition { upcoming, history }
}

/// One doctor's appointments for one date, free-text filtered and sorted
/// by start time. The query matches patient name, reason and status,
/// case-insensitively.
pub fn day_agenda(
    appointments: Vec<Appointment>,
    doctor_id: Uuid,
    date: NaiveDate,
    query: Option<&str>,
) -> Vec<Appointment> {
    let needle = query.map(str::to_lowercase).filter(|q| !q.is_empty());

    let mut day: Vec<Appointment> = appointments
        .into_iter()
        .filter(|a| a.doctor_id == doctor_id && a.date == date)
        .filter(|a| match &needle {
            Some(q) => {
                let haystack =
                    format!("{} {} {}", a.patient_name, a.reason, a.status).to_lowercase();
                haystack.contains(q)
            }
            None => true,
        })
        .collect();

    day.sort_by_key(|a| a.start_time);
    day
}

/// Tally appointments per status.
pub fn status_counts(appointments: &[Appointment]) -> HashMap<AppointmentStatus, usize> {
    let mut counts = HashMap::new();
    for appointment in appointments {
        *counts.entry(appointment.status).or_insert(0) += 1;
    }
    counts
}

/// Tally appointments under a caller-chosen key. The key set comes from
/// the data, so new doctors and specialties show up without any catalog
/// changes.
pub fn aggregate_by<F>(appointments: &[Appointment], key: F) -> HashMap<String, usize>
where
    F: Fn(&Appointment) -> String,
{
    let mut counts = HashMap::new();
    for appointment in appointments {
        *counts.entry(key(appointment)).or_insert(0) += 1;
    }
    counts
}

/// Distinct doctors, specialties and statuses observed in a data set.
/// Drives the admin filter dropdowns.
#[derive(Debug, Clone, Serialize)]
pub struct AgendaCatalogs {
    pub doctors: Vec<String>,
    pub specialties: Vec<String>,
    pub statuses: Vec<String>,
}

pub fn catalogs(appointments: &[Appointment]) -> AgendaCatalogs {
    let doctors: BTreeSet<String> = appointments.iter().map(|a| a.doctor_name.clone()).collect();
    let specialties: BTreeSet<String> = appointments.iter().map(|a| a.specialty.clone()).collect();

    let mut statuses = Vec::new();
    for appointment in appointments {
        let status = appointment.status.to_string();
        if !statuses.contains(&status) {
            statuses.push(status);
        }
    }

    AgendaCatalogs {
        doctors: doctors.into_iter().collect(),
        specialties: specialties.into_iter().collect(),
        statuses,
    }
}

/// Cross-cutting admin filter. Every criterion is optional; unset
/// criteria match everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentFilter {
    pub q: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub status: Option<AppointmentStatus>,
    pub specialty: Option<String>,
    pub doctor_name: Option<String>,
}

impl AppointmentFilter {
    pub fn matches(&self, appointment: &Appointment) -> bool {
        if let Some(from) = self.date_from {
            if appointment.date < from {
                return false;
            }
        }
        if let Some(to) = self.date_to {
            if appointment.date > to {
                return false;
            }
        }
        if let Some(status) = self.status {
            if appointment.status != status {
                return false;
            }
        }
        if let Some(specialty) = &self.specialty {
            if &appointment.specialty != specialty {
                return false;
            }
        }
        if let Some(doctor_name) = &self.doctor_name {
            if &appointment.doctor_name != doctor_name {
                return false;
            }
        }
        if let Some(q) = self.q.as_deref().filter(|q| !q.is_empty()) {
            let haystack = format!(
                "{} {} {} {} {}",
                appointment.patient_name,
                appointment.doctor_name,
                appointment.specialty,
                appointment.reason,
                appointment.status
            )
            .to_lowercase();
            if !haystack.contains(&q.to_lowercase()) {
                return false;
            }
        }
        true
    }

    /// Filter and sort chronologically.
    pub fn apply(&self, appointments: Vec<Appointment>) -> Vec<Appointment> {
        let mut matched: Vec<Appointment> = appointments
            .into_iter()
            .filter(|a| self.matches(a))
            .collect();
        matched.sort_by_key(Appointment::starts_at);
        matched
    }
}
