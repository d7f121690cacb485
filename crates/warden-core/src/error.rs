//! Error types for `warden-core`.

use chrono::NaiveDate;
use thiserror::Error;

use crate::prisoner::Gender;

#[derive(Debug, Error)]
pub enum Error {
  // ── Validation ────────────────────────────────────────────────────────
  #[error("end date {end} precedes start date {start}")]
  InvalidDateRange { start: NaiveDate, end: NaiveDate },

  #[error("invalid time of day {0:?}, expected zero-padded HH:MM")]
  InvalidTimeOfDay(String),

  #[error("amount must be positive, got {0}")]
  InvalidAmount(i64),

  #[error("{gender} prisoners cannot be assigned to room {room_name:?}")]
  GenderRoomMismatch { gender: Gender, room_name: String },

  #[error("invalid inmate code {0:?}")]
  InvalidInmateCode(String),

  // ── Not found ─────────────────────────────────────────────────────────
  #[error("activity not found: {0}")]
  ActivityNotFound(i64),

  #[error("schedule window not found: {0}")]
  ScheduleNotFound(i64),

  #[error("prisoner not found: {0}")]
  PrisonerNotFound(i64),

  #[error("room not found: {0}")]
  RoomNotFound(i64),

  #[error("staff not found: {0}")]
  StaffNotFound(i64),

  #[error("parcel not found: {0}")]
  ParcelNotFound(i64),

  #[error("enrollment not found: {0}")]
  EnrollmentNotFound(i64),

  #[error("visitation not found: {0}")]
  VisitationNotFound(i64),

  #[error("time slot not found: {0}")]
  TimeSlotNotFound(i64),

  #[error("no score record for prisoner {0}")]
  ScoreRecordNotFound(i64),

  // ── Conflicts ─────────────────────────────────────────────────────────
  #[error("window overlaps an existing schedule for activity {0}")]
  ScheduleOverlap(i64),

  #[error("time slot {slot_id} is already booked on {date}")]
  SlotTaken { slot_id: i64, date: NaiveDate },

  #[error("prisoner {prisoner_id} is already enrolled in schedule {schedule_id}")]
  DuplicateEnrollment { schedule_id: i64, prisoner_id: i64 },

  #[error("parcel name already exists: {0:?}")]
  DuplicateParcelName(String),

  #[error("room name already exists: {0:?}")]
  DuplicateRoomName(String),

  #[error("inmate code already exists: {0:?}")]
  DuplicateInmateCode(String),

  #[error("activity {activity_id} is referenced by {count} schedule window(s)")]
  ActivityInUse { activity_id: i64, count: i64 },

  #[error("room {0} is at capacity")]
  RoomFull(i64),

  // ── Authorization ─────────────────────────────────────────────────────
  #[error("caller is not allowed to modify this visitation")]
  Forbidden,
}

/// Coarse classification used by the HTTP layer to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Validation,
  NotFound,
  Conflict,
  Forbidden,
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    use Error::*;
    match self {
      InvalidDateRange { .. }
      | InvalidTimeOfDay(_)
      | InvalidAmount(_)
      | GenderRoomMismatch { .. }
      | InvalidInmateCode(_) => ErrorKind::Validation,

      ActivityNotFound(_)
      | ScheduleNotFound(_)
      | PrisonerNotFound(_)
      | RoomNotFound(_)
      | StaffNotFound(_)
      | ParcelNotFound(_)
      | EnrollmentNotFound(_)
      | VisitationNotFound(_)
      | TimeSlotNotFound(_)
      | ScoreRecordNotFound(_) => ErrorKind::NotFound,

      ScheduleOverlap(_)
      | SlotTaken { .. }
      | DuplicateEnrollment { .. }
      | DuplicateParcelName(_)
      | DuplicateRoomName(_)
      | DuplicateInmateCode(_)
      | ActivityInUse { .. }
      | RoomFull(_) => ErrorKind::Conflict,

      Forbidden => ErrorKind::Forbidden,
    }
  }
}

/// Implemented by store error types so callers behind a generic
/// [`crate::store::FacilityStore`] can recover the domain rejection (and its
/// [`ErrorKind`]) without knowing the backend.
pub trait DomainError {
  /// The domain rejection, if this error is one.
  fn domain(&self) -> Option<&Error>;
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
