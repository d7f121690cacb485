//! Row-to-domain decoding.
//!
//! Each mapper reads one domain value from a [`rusqlite::Row`] starting at a
//! column offset, so composite SELECTs (joins producing a view) can reuse the
//! mappers for their fragments. The offset convention requires every query to
//! list columns in the same order as its mapper.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Row, types::Type};
use warden_core::{
  inventory::{OperationEntry, OperationView, OperatorKind, Parcel, StockStatus},
  prisoner::{Gender, Prisoner},
  room::{Room, RoomStatus},
  schedule::{
    Activity, Enrollment, EnrollmentStatus, EnrollmentView, ScheduleWindow,
  },
  score::{AdjustmentEntry, AdjustmentView, BehaviorEvaluation, ScoreRecord},
  staff::Staff,
  visitation::{TimeSlot, Visitation, Visitor},
};

/// A stored string no variant of the expected enum matches. Only reachable
/// if the database was edited out-of-band.
#[derive(Debug, thiserror::Error)]
#[error("unknown {what}: {value:?}")]
struct UnknownVariant {
  what:  &'static str,
  value: String,
}

fn conversion_failure(
  idx: usize,
  err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
  rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

// ─── Column decoders ─────────────────────────────────────────────────────────

pub(crate) fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339()
}

pub(crate) fn encode_date(date: NaiveDate) -> String {
  date.to_string()
}

pub(crate) fn date_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
  let text: String = row.get(idx)?;
  text.parse().map_err(|e| conversion_failure(idx, e))
}

pub(crate) fn opt_date_col(
  row: &Row<'_>,
  idx: usize,
) -> rusqlite::Result<Option<NaiveDate>> {
  let Some(text) = row.get::<_, Option<String>>(idx)? else {
    return Ok(None);
  };
  text.parse().map(Some).map_err(|e| conversion_failure(idx, e))
}

pub(crate) fn dt_col(
  row: &Row<'_>,
  idx: usize,
) -> rusqlite::Result<DateTime<Utc>> {
  let text: String = row.get(idx)?;
  DateTime::parse_from_rfc3339(&text)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| conversion_failure(idx, e))
}

fn parsed_col<T>(
  row: &Row<'_>,
  idx: usize,
  what: &'static str,
  parse: fn(&str) -> Option<T>,
) -> rusqlite::Result<T> {
  let text: String = row.get(idx)?;
  parse(&text)
    .ok_or_else(|| conversion_failure(idx, UnknownVariant { what, value: text }))
}

// ─── Row mappers ─────────────────────────────────────────────────────────────

pub(crate) fn activity_row(row: &Row<'_>, o: usize) -> rusqlite::Result<Activity> {
  Ok(Activity {
    activity_id: row.get(o)?,
    name:        row.get(o + 1)?,
    description: row.get(o + 2)?,
    location:    row.get(o + 3)?,
  })
}

pub(crate) fn staff_row(row: &Row<'_>, o: usize) -> rusqlite::Result<Staff> {
  Ok(Staff {
    staff_id:   row.get(o)?,
    first_name: row.get(o + 1)?,
    last_name:  row.get(o + 2)?,
  })
}

pub(crate) fn room_row(row: &Row<'_>, o: usize) -> rusqlite::Result<Room> {
  Ok(Room {
    room_id: row.get(o)?,
    name:    row.get(o + 1)?,
    status:  parsed_col(row, o + 2, "room status", RoomStatus::parse)?,
  })
}

pub(crate) fn window_row(
  row: &Row<'_>,
  o: usize,
) -> rusqlite::Result<ScheduleWindow> {
  Ok(ScheduleWindow {
    schedule_id:      row.get(o)?,
    activity_id:      row.get(o + 1)?,
    staff_id:         row.get(o + 2)?,
    max_participants: row.get(o + 3)?,
    start_date:       date_col(row, o + 4)?,
    end_date:         date_col(row, o + 5)?,
    start_time:       row.get(o + 6)?,
    end_time:         row.get(o + 7)?,
  })
}

pub(crate) fn enrollment_row(
  row: &Row<'_>,
  o: usize,
) -> rusqlite::Result<Enrollment> {
  Ok(Enrollment {
    enrollment_id: row.get(o)?,
    schedule_id:   row.get(o + 1)?,
    prisoner_id:   row.get(o + 2)?,
    status:        parsed_col(row, o + 3, "enrollment status", EnrollmentStatus::parse)?,
    enrolled_at:   dt_col(row, o + 4)?,
    remarks:       row.get(o + 5)?,
  })
}

/// Enrollment columns followed by `inmate_code, first_name || ' ' || last_name`.
pub(crate) fn enrollment_view_row(
  row: &Row<'_>,
  o: usize,
) -> rusqlite::Result<EnrollmentView> {
  Ok(EnrollmentView {
    enrollment:    enrollment_row(row, o)?,
    inmate_code:   row.get(o + 6)?,
    prisoner_name: row.get(o + 7)?,
  })
}

pub(crate) fn prisoner_row(row: &Row<'_>, o: usize) -> rusqlite::Result<Prisoner> {
  Ok(Prisoner {
    prisoner_id:  row.get(o)?,
    inmate_code:  row.get(o + 1)?,
    citizen_id:   row.get(o + 2)?,
    first_name:   row.get(o + 3)?,
    last_name:    row.get(o + 4)?,
    gender:       parsed_col(row, o + 5, "gender", Gender::parse)?,
    birthday:     date_col(row, o + 6)?,
    case_code:    row.get(o + 7)?,
    entry_date:   date_col(row, o + 8)?,
    release_date: opt_date_col(row, o + 9)?,
    room_id:      row.get(o + 10)?,
  })
}

pub(crate) fn score_record_row(
  row: &Row<'_>,
  o: usize,
) -> rusqlite::Result<ScoreRecord> {
  Ok(ScoreRecord {
    score_id:    row.get(o)?,
    prisoner_id: row.get(o + 1)?,
    score:       row.get(o + 2)?,
  })
}

pub(crate) fn adjustment_row(
  row: &Row<'_>,
  o: usize,
) -> rusqlite::Result<AdjustmentEntry> {
  Ok(AdjustmentEntry {
    adjustment_id:   row.get(o)?,
    old_score:       row.get(o + 1)?,
    new_score:       row.get(o + 2)?,
    prisoner_id:     row.get(o + 3)?,
    score_record_id: row.get(o + 4)?,
    actor_member_id: row.get(o + 5)?,
    recorded_at:     dt_col(row, o + 6)?,
    remarks:         row.get(o + 7)?,
  })
}

/// Adjustment columns followed by the prisoner join; the joined columns are
/// nullable because the ledger outlives its prisoner.
pub(crate) fn adjustment_view_row(
  row: &Row<'_>,
  o: usize,
) -> rusqlite::Result<AdjustmentView> {
  Ok(AdjustmentView {
    entry:         adjustment_row(row, o)?,
    inmate_code:   row.get::<_, Option<String>>(o + 8)?.unwrap_or_default(),
    prisoner_name: row.get::<_, Option<String>>(o + 9)?.unwrap_or_default(),
  })
}

pub(crate) fn evaluation_row(
  row: &Row<'_>,
  o: usize,
) -> rusqlite::Result<BehaviorEvaluation> {
  Ok(BehaviorEvaluation {
    evaluation_id:   row.get(o)?,
    score_record_id: row.get(o + 1)?,
    prisoner_id:     row.get(o + 2)?,
    criterion:       row.get(o + 3)?,
    actor_member_id: row.get(o + 4)?,
    evaluated_on:    date_col(row, o + 5)?,
    notes:           row.get(o + 6)?,
  })
}

pub(crate) fn parcel_row(row: &Row<'_>, o: usize) -> rusqlite::Result<Parcel> {
  Ok(Parcel {
    parcel_id: row.get(o)?,
    name:      row.get(o + 1)?,
    quantity:  row.get(o + 2)?,
    kind:      row.get(o + 3)?,
    status:    parsed_col(row, o + 4, "stock status", StockStatus::parse)?,
  })
}

pub(crate) fn operation_row(
  row: &Row<'_>,
  o: usize,
) -> rusqlite::Result<OperationEntry> {
  Ok(OperationEntry {
    operation_id:    row.get(o)?,
    recorded_at:     dt_col(row, o + 1)?,
    parcel_id:       row.get(o + 2)?,
    old_quantity:    row.get(o + 3)?,
    new_quantity:    row.get(o + 4)?,
    change_amount:   row.get(o + 5)?,
    operator:        parsed_col(row, o + 6, "operator", OperatorKind::parse)?,
    actor_member_id: row.get(o + 7)?,
    old_name:        row.get(o + 8)?,
    new_name:        row.get(o + 9)?,
    old_kind:        row.get(o + 10)?,
    new_kind:        row.get(o + 11)?,
  })
}

/// Operation columns followed by the parcel name join.
pub(crate) fn operation_view_row(
  row: &Row<'_>,
  o: usize,
) -> rusqlite::Result<OperationView> {
  Ok(OperationView {
    entry:       operation_row(row, o)?,
    parcel_name: row.get::<_, Option<String>>(o + 12)?.unwrap_or_default(),
  })
}

pub(crate) fn time_slot_row(row: &Row<'_>, o: usize) -> rusqlite::Result<TimeSlot> {
  Ok(TimeSlot {
    slot_id:    row.get(o)?,
    name:       row.get(o + 1)?,
    start_time: row.get(o + 2)?,
    end_time:   row.get(o + 3)?,
  })
}

pub(crate) fn visitor_row(row: &Row<'_>, o: usize) -> rusqlite::Result<Visitor> {
  Ok(Visitor {
    visitor_id: row.get(o)?,
    citizen_id: row.get(o + 1)?,
    first_name: row.get(o + 2)?,
    last_name:  row.get(o + 3)?,
  })
}

pub(crate) fn visitation_row(
  row: &Row<'_>,
  o: usize,
) -> rusqlite::Result<Visitation> {
  Ok(Visitation {
    visitation_id: row.get(o)?,
    visit_date:    date_col(row, o + 1)?,
    time_slot_id:  row.get(o + 2)?,
    prisoner_id:   row.get(o + 3)?,
    visitor_id:    row.get(o + 4)?,
    staff_id:      row.get(o + 5)?,
    relationship:  row.get(o + 6)?,
    status:        row.get(o + 7)?,
  })
}
