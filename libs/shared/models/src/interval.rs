use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A candidate range whose start is not strictly before its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid time range: start {start} must be before end {end}")]
pub struct InvalidRange {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// Half-open `[start, end)` range of minutes on a calendar date.
///
/// Every slot in the system - a doctor's blocked range or the implicit
/// duration of a booked appointment - reduces to one of these for
/// conflict checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeInterval {
    /// Build an interval, rejecting empty and reversed ranges.
    pub fn new(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Result<Self, InvalidRange> {
        if start >= end {
            return Err(InvalidRange { start, end });
        }
        Ok(Self { date, start, end })
    }

    /// Two intervals overlap iff they fall on the same date and their open
    /// ranges intersect. Adjacent intervals (`self.end == other.start`) do
    /// not overlap.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.date == other.date && self.start < other.end && other.start < self.end
    }
}

/// The implicit interval occupied by a booking that records only a start
/// time. Slots never span midnight; a start too close to the end of the
/// day clamps to 23:59:59.
pub fn slot_interval(date: NaiveDate, start: NaiveTime, minutes: u32) -> TimeInterval {
    let (end, wrapped) =
        start.overflowing_add_signed(chrono::Duration::minutes(i64::from(minutes)));
    let end = if wrapped != 0 || end <= start {
        NaiveTime::from_hms_opt(23, 59, 59).unwrap()
    } else {
        end
    };
    TimeInterval { date, start, end }
}

/// True iff any member of `existing` overlaps `candidate`.
///
/// The input does not need to be sorted; a linear scan is fine at the
/// scale of a single doctor-day.
pub fn has_conflict<'a, I>(candidate: &TimeInterval, existing: I) -> bool
where
    I: IntoIterator<Item = &'a TimeInterval>,
{
    existing.into_iter().any(|slot| slot.overlaps(candidate))
}
