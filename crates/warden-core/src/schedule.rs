//! Activities, schedule windows, and the overlap rule.
//!
//! A schedule window reserves a date range plus a daily time-of-day range for
//! one activity. Times of day are zero-padded `"HH:MM"` strings; for that
//! format lexicographic order equals chronological order, so the overlap rule
//! compares them as plain strings. This mirrors how the windows are stored
//! and must not be "normalised" away.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Activity ────────────────────────────────────────────────────────────────

/// A recurring facility activity (workshop, exercise, visitation block).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
  pub activity_id: i64,
  pub name:        String,
  pub description: String,
  pub location:    String,
}

/// Input to activity create/update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityInput {
  pub name:        String,
  #[serde(default)]
  pub description: String,
  pub location:    String,
}

// ─── Schedule window ─────────────────────────────────────────────────────────

/// A reserved period for an activity.
///
/// Invariant: no two windows of the same activity may overlap under
/// [`ScheduleWindow::overlaps`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleWindow {
  pub schedule_id:      i64,
  pub activity_id:      i64,
  pub staff_id:         i64,
  pub max_participants: i64,
  pub start_date:       NaiveDate,
  pub end_date:         NaiveDate,
  pub start_time:       String,
  pub end_time:         String,
}

/// Input to schedule create/update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInput {
  pub activity_id:      i64,
  pub staff_id:         i64,
  pub max_participants: i64,
  pub start_date:       NaiveDate,
  pub end_date:         NaiveDate,
  pub start_time:       String,
  pub end_time:         String,
}

impl ScheduleInput {
  /// Reject inverted date ranges and malformed times before any row is read.
  pub fn validate(&self) -> Result<()> {
    if self.end_date < self.start_date {
      return Err(Error::InvalidDateRange {
        start: self.start_date,
        end:   self.end_date,
      });
    }
    validate_time_of_day(&self.start_time)?;
    validate_time_of_day(&self.end_time)?;
    Ok(())
  }
}

impl ScheduleWindow {
  /// The overlap rule: inclusive on the date range, half-open on the
  /// time-of-day range. Two windows sharing only a boundary instant
  /// (`end_time == start_time`) do not overlap; date ranges that merely
  /// touch do.
  pub fn overlaps(&self, candidate: &ScheduleInput) -> bool {
    self.end_date >= candidate.start_date
      && self.start_date <= candidate.end_date
      && self.end_time.as_str() > candidate.start_time.as_str()
      && self.start_time.as_str() < candidate.end_time.as_str()
  }
}

/// Accept exactly `HH:MM` with HH in 00..=23 and MM in 00..=59.
pub fn validate_time_of_day(s: &str) -> Result<()> {
  let bytes = s.as_bytes();
  let well_formed = bytes.len() == 5
    && bytes[2] == b':'
    && bytes.iter().enumerate().all(|(i, b)| i == 2 || b.is_ascii_digit());
  if !well_formed {
    return Err(Error::InvalidTimeOfDay(s.to_owned()));
  }
  let hh: u8 = s[..2].parse().map_err(|_| Error::InvalidTimeOfDay(s.to_owned()))?;
  let mm: u8 = s[3..].parse().map_err(|_| Error::InvalidTimeOfDay(s.to_owned()))?;
  if hh > 23 || mm > 59 {
    return Err(Error::InvalidTimeOfDay(s.to_owned()));
  }
  Ok(())
}

// ─── Enrollment ──────────────────────────────────────────────────────────────

/// Participation state of one prisoner in one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
  Enrolled,
  Completed,
  Cancelled,
}

impl EnrollmentStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Enrolled => "enrolled",
      Self::Completed => "completed",
      Self::Cancelled => "cancelled",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "enrolled" => Some(Self::Enrolled),
      "completed" => Some(Self::Completed),
      "cancelled" => Some(Self::Cancelled),
      _ => None,
    }
  }
}

/// Links a prisoner to a schedule window.
///
/// Invariant: (schedule_id, prisoner_id) is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
  pub enrollment_id: i64,
  pub schedule_id:   i64,
  pub prisoner_id:   i64,
  pub status:        EnrollmentStatus,
  pub enrolled_at:   DateTime<Utc>,
  pub remarks:       Option<String>,
}

/// Input to [`crate::store::FacilityStore::enroll`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentInput {
  pub schedule_id: i64,
  pub prisoner_id: i64,
}

// ─── Read views ──────────────────────────────────────────────────────────────

/// An enrollment joined with the prisoner it belongs to, for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentView {
  #[serde(flatten)]
  pub enrollment:    Enrollment,
  pub inmate_code:   String,
  pub prisoner_name: String,
}

/// A schedule window preloaded with its activity, staff, and enrollments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleView {
  #[serde(flatten)]
  pub window:      ScheduleWindow,
  pub activity:    Activity,
  pub staff:       crate::staff::Staff,
  pub enrollments: Vec<EnrollmentView>,
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
  }

  fn window(start_date: &str, end_date: &str, start_time: &str, end_time: &str) -> ScheduleWindow {
    ScheduleWindow {
      schedule_id:      1,
      activity_id:      1,
      staff_id:         1,
      max_participants: 10,
      start_date:       date(start_date),
      end_date:         date(end_date),
      start_time:       start_time.into(),
      end_time:         end_time.into(),
    }
  }

  fn candidate(start_date: &str, end_date: &str, start_time: &str, end_time: &str) -> ScheduleInput {
    ScheduleInput {
      activity_id:      1,
      staff_id:         1,
      max_participants: 10,
      start_date:       date(start_date),
      end_date:         date(end_date),
      start_time:       start_time.into(),
      end_time:         end_time.into(),
    }
  }

  #[test]
  fn touching_time_boundary_is_not_overlap() {
    let existing = window("2024-05-01", "2024-05-10", "09:00", "11:00");
    assert!(!existing.overlaps(&candidate("2024-05-01", "2024-05-10", "11:00", "12:00")));
    assert!(!existing.overlaps(&candidate("2024-05-01", "2024-05-10", "08:00", "09:00")));
  }

  #[test]
  fn positive_time_overlap_on_shared_dates_conflicts() {
    let existing = window("2024-05-01", "2024-05-10", "09:00", "11:00");
    assert!(existing.overlaps(&candidate("2024-05-05", "2024-05-20", "10:59", "12:00")));
    assert!(existing.overlaps(&candidate("2024-05-01", "2024-05-01", "08:00", "09:01")));
  }

  #[test]
  fn date_ranges_are_compared_inclusively() {
    let existing = window("2024-05-01", "2024-05-10", "09:00", "11:00");
    // Candidate starts the day the existing window ends: dates touch, and
    // with overlapping times that still counts.
    assert!(existing.overlaps(&candidate("2024-05-10", "2024-05-15", "09:30", "10:30")));
    // Strictly disjoint dates never conflict.
    assert!(!existing.overlaps(&candidate("2024-05-11", "2024-05-15", "09:30", "10:30")));
  }

  #[test]
  fn containment_conflicts_both_ways() {
    let existing = window("2024-05-01", "2024-05-10", "09:00", "17:00");
    assert!(existing.overlaps(&candidate("2024-05-03", "2024-05-04", "10:00", "11:00")));

    let inner = window("2024-05-03", "2024-05-04", "10:00", "11:00");
    assert!(inner.overlaps(&candidate("2024-05-01", "2024-05-10", "09:00", "17:00")));
  }

  #[test]
  fn disjoint_times_on_same_dates_do_not_conflict() {
    let existing = window("2024-05-01", "2024-05-10", "09:00", "10:00");
    assert!(!existing.overlaps(&candidate("2024-05-01", "2024-05-10", "13:00", "14:00")));
  }

  #[test]
  fn validate_rejects_inverted_dates() {
    let input = candidate("2024-05-10", "2024-05-01", "09:00", "10:00");
    assert!(matches!(input.validate(), Err(Error::InvalidDateRange { .. })));
  }

  #[test]
  fn validate_time_of_day_accepts_padded_hhmm_only() {
    assert!(validate_time_of_day("00:00").is_ok());
    assert!(validate_time_of_day("23:59").is_ok());
    assert!(validate_time_of_day("9:00").is_err());
    assert!(validate_time_of_day("24:00").is_err());
    assert!(validate_time_of_day("12:60").is_err());
    assert!(validate_time_of_day("12-30").is_err());
    assert!(validate_time_of_day("").is_err());
  }
}
