//! [`SqliteStore`] — the SQLite implementation of [`FacilityStore`].
//!
//! Domain rejections are threaded out of the connection closures as an inner
//! `Result<_, warden_core::Error>`: the closure returns `Ok(Err(..))`, the
//! open transaction is dropped uncommitted, and the outer method converts
//! the inner error into [`crate::Error::Domain`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, params};

use warden_core::{
  Error as CoreError,
  identity::{Identity, Rank},
  inventory::{OperationView, OperatorKind, Parcel, ParcelInput, StockStatus},
  prisoner::{PrisonerInput, PrisonerView},
  room::{ROOM_CAPACITY, Room, RoomStatus, check_room_gender},
  schedule::{
    Activity, ActivityInput, Enrollment, EnrollmentInput, EnrollmentStatus,
    EnrollmentView, ScheduleInput, ScheduleView, ScheduleWindow,
  },
  score::{
    AdjustmentEntry, AdjustmentInput, AdjustmentView, BehaviorEvaluation,
    EvaluationInput, ScoreRecord,
  },
  staff::{Staff, StaffInput},
  store::FacilityStore,
  visitation::{TimeSlot, VisitationInput, VisitationView, Visitor},
};

use crate::{Error, Result, rows, schema::SCHEMA};

/// The domain half of a closure result.
type Domain<T> = std::result::Result<T, CoreError>;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A facility store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Shared SELECT fragments ─────────────────────────────────────────────────

const SCHEDULE_VIEW_SELECT: &str = "
  SELECT s.schedule_id, s.activity_id, s.staff_id, s.max_participants,
         s.start_date, s.end_date, s.start_time, s.end_time,
         a.activity_id, a.name, a.description, a.location,
         f.staff_id, f.first_name, f.last_name
  FROM schedule_windows s
  JOIN activities a ON a.activity_id = s.activity_id
  JOIN staff f ON f.staff_id = s.staff_id";

const ENROLLMENT_VIEW_SELECT: &str = "
  SELECT e.enrollment_id, e.schedule_id, e.prisoner_id, e.status,
         e.enrolled_at, e.remarks,
         p.inmate_code, p.first_name || ' ' || p.last_name
  FROM enrollments e
  JOIN prisoners p ON p.prisoner_id = e.prisoner_id";

const PRISONER_VIEW_SELECT: &str = "
  SELECT p.prisoner_id, p.inmate_code, p.citizen_id, p.first_name,
         p.last_name, p.gender, p.birthday, p.case_code, p.entry_date,
         p.release_date, p.room_id,
         r.room_id, r.name, r.status
  FROM prisoners p
  LEFT JOIN rooms r ON r.room_id = p.room_id";

const VISITATION_VIEW_SELECT: &str = "
  SELECT v.visitation_id, v.visit_date, v.time_slot_id, v.prisoner_id,
         v.visitor_id, v.staff_id, v.relationship, v.status,
         t.slot_id, t.name, t.start_time, t.end_time,
         w.visitor_id, w.citizen_id, w.first_name, w.last_name,
         p.inmate_code, p.first_name || ' ' || p.last_name
  FROM visitations v
  JOIN time_slots t ON t.slot_id = v.time_slot_id
  JOIN visitors w ON w.visitor_id = v.visitor_id
  JOIN prisoners p ON p.prisoner_id = v.prisoner_id";

// ─── Connection-thread helpers ───────────────────────────────────────────────

fn exists(
  conn: &rusqlite::Connection,
  sql: &str,
  id: i64,
) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(sql, params![id], |_| Ok(()))
      .optional()?
      .is_some(),
  )
}

/// Non-released prisoners currently assigned to the room.
fn occupancy(conn: &rusqlite::Connection, room_id: i64) -> rusqlite::Result<i64> {
  conn.query_row(
    "SELECT COUNT(*) FROM prisoners
     WHERE room_id = ?1 AND release_date IS NULL",
    params![room_id],
    |r| r.get(0),
  )
}

/// Recompute the room's derived status from its current occupancy.
fn refresh_room_status(
  conn: &rusqlite::Connection,
  room_id: i64,
) -> rusqlite::Result<()> {
  let status = RoomStatus::for_occupancy(occupancy(conn, room_id)?);
  conn.execute(
    "UPDATE rooms SET status = ?1 WHERE room_id = ?2",
    params![status.as_str(), room_id],
  )?;
  Ok(())
}

fn get_room(
  conn: &rusqlite::Connection,
  room_id: i64,
) -> rusqlite::Result<Option<Room>> {
  conn
    .query_row(
      "SELECT room_id, name, status FROM rooms WHERE room_id = ?1",
      params![room_id],
      |row| rows::room_row(row, 0),
    )
    .optional()
}

fn get_window(
  conn: &rusqlite::Connection,
  schedule_id: i64,
) -> rusqlite::Result<Option<ScheduleWindow>> {
  conn
    .query_row(
      "SELECT schedule_id, activity_id, staff_id, max_participants,
              start_date, end_date, start_time, end_time
       FROM schedule_windows WHERE schedule_id = ?1",
      params![schedule_id],
      |row| rows::window_row(row, 0),
    )
    .optional()
}

/// Persisted windows of one activity, optionally excluding one window (for
/// edits, so a window never conflicts with itself).
fn windows_for_activity(
  conn: &rusqlite::Connection,
  activity_id: i64,
  exclude: Option<i64>,
) -> rusqlite::Result<Vec<ScheduleWindow>> {
  let mut stmt = conn.prepare(
    "SELECT schedule_id, activity_id, staff_id, max_participants,
            start_date, end_date, start_time, end_time
     FROM schedule_windows
     WHERE activity_id = ?1 AND (?2 IS NULL OR schedule_id <> ?2)",
  )?;
  stmt
    .query_map(params![activity_id, exclude], |row| rows::window_row(row, 0))?
    .collect()
}

fn enrollments_for(
  conn: &rusqlite::Connection,
  schedule_id: i64,
) -> rusqlite::Result<Vec<EnrollmentView>> {
  let sql = format!(
    "{ENROLLMENT_VIEW_SELECT} WHERE e.schedule_id = ?1 ORDER BY e.enrollment_id"
  );
  let mut stmt = conn.prepare(&sql)?;
  stmt
    .query_map(params![schedule_id], |row| rows::enrollment_view_row(row, 0))?
    .collect()
}

fn schedule_view(
  conn: &rusqlite::Connection,
  schedule_id: i64,
) -> rusqlite::Result<Option<ScheduleView>> {
  let sql = format!("{SCHEDULE_VIEW_SELECT} WHERE s.schedule_id = ?1");
  let header = conn
    .query_row(&sql, params![schedule_id], |row| {
      Ok((
        rows::window_row(row, 0)?,
        rows::activity_row(row, 8)?,
        rows::staff_row(row, 12)?,
      ))
    })
    .optional()?;
  let Some((window, activity, staff)) = header else {
    return Ok(None);
  };
  let enrollments = enrollments_for(conn, schedule_id)?;
  Ok(Some(ScheduleView { window, activity, staff, enrollments }))
}

fn prisoner_view(
  conn: &rusqlite::Connection,
  prisoner_id: i64,
) -> rusqlite::Result<Option<PrisonerView>> {
  let sql = format!("{PRISONER_VIEW_SELECT} WHERE p.prisoner_id = ?1");
  conn
    .query_row(&sql, params![prisoner_id], |row| {
      let prisoner = rows::prisoner_row(row, 0)?;
      let room = match row.get::<_, Option<i64>>(11)? {
        Some(_) => Some(rows::room_row(row, 11)?),
        None => None,
      };
      Ok(PrisonerView { prisoner, room })
    })
    .optional()
}

fn visitation_view(
  conn: &rusqlite::Connection,
  visitation_id: i64,
) -> rusqlite::Result<Option<VisitationView>> {
  let sql = format!("{VISITATION_VIEW_SELECT} WHERE v.visitation_id = ?1");
  conn
    .query_row(&sql, params![visitation_id], |row| {
      Ok(VisitationView {
        visitation:    rows::visitation_row(row, 0)?,
        slot:          rows::time_slot_row(row, 8)?,
        visitor:       rows::visitor_row(row, 12)?,
        inmate_code:   row.get(16)?,
        prisoner_name: row.get(17)?,
      })
    })
    .optional()
}

fn get_parcel(
  conn: &rusqlite::Connection,
  parcel_id: i64,
) -> rusqlite::Result<Option<Parcel>> {
  conn
    .query_row(
      "SELECT parcel_id, name, quantity, kind, status
       FROM parcels WHERE parcel_id = ?1",
      params![parcel_id],
      |row| rows::parcel_row(row, 0),
    )
    .optional()
}

fn visitor_by_citizen_id(
  conn: &rusqlite::Connection,
  citizen_id: &str,
) -> rusqlite::Result<Option<Visitor>> {
  conn
    .query_row(
      "SELECT visitor_id, citizen_id, first_name, last_name
       FROM visitors WHERE citizen_id = ?1",
      params![citizen_id],
      |row| rows::visitor_row(row, 0),
    )
    .optional()
}

/// Visitors are deduplicated by citizen id; an existing row keeps its stored
/// names.
fn find_or_create_visitor(
  conn: &rusqlite::Connection,
  input: &VisitationInput,
) -> rusqlite::Result<Visitor> {
  if let Some(visitor) = visitor_by_citizen_id(conn, &input.visitor_citizen_id)? {
    return Ok(visitor);
  }
  conn.execute(
    "INSERT INTO visitors (citizen_id, first_name, last_name)
     VALUES (?1, ?2, ?3)",
    params![
      input.visitor_citizen_id,
      input.visitor_first_name,
      input.visitor_last_name
    ],
  )?;
  Ok(Visitor {
    visitor_id: conn.last_insert_rowid(),
    citizen_id: input.visitor_citizen_id.clone(),
    first_name: input.visitor_first_name.clone(),
    last_name:  input.visitor_last_name.clone(),
  })
}

fn slot_taken(
  conn: &rusqlite::Connection,
  date: &str,
  time_slot_id: i64,
  exclude: Option<i64>,
) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM visitations
         WHERE visit_date = ?1 AND time_slot_id = ?2
           AND (?3 IS NULL OR visitation_id <> ?3)",
        params![date, time_slot_id, exclude],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

/// Whether a relative-ranked caller owns the given visitor row.
fn relative_owns(
  conn: &rusqlite::Connection,
  caller: &Identity,
  visitor_id: i64,
) -> rusqlite::Result<bool> {
  Ok(
    visitor_by_citizen_id(conn, &caller.citizen_id)?
      .is_some_and(|v| v.visitor_id == visitor_id),
  )
}

struct OperationInsert<'a> {
  parcel_id:       i64,
  old_quantity:    i64,
  new_quantity:    i64,
  change_amount:   i64,
  operator:        OperatorKind,
  actor_member_id: Option<i64>,
  old_name:        Option<&'a str>,
  new_name:        Option<&'a str>,
  old_kind:        Option<&'a str>,
  new_kind:        Option<&'a str>,
}

/// Append one row to the inventory operation ledger.
fn log_operation(
  conn: &rusqlite::Connection,
  op: OperationInsert<'_>,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO operations
       (recorded_at, parcel_id, old_quantity, new_quantity, change_amount,
        operator, actor_member_id, old_name, new_name, old_kind, new_kind)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    params![
      rows::encode_dt(Utc::now()),
      op.parcel_id,
      op.old_quantity,
      op.new_quantity,
      op.change_amount,
      op.operator.as_str(),
      op.actor_member_id,
      op.old_name,
      op.new_name,
      op.old_kind,
      op.new_kind
    ],
  )?;
  Ok(())
}

// ─── FacilityStore impl ──────────────────────────────────────────────────────

impl FacilityStore for SqliteStore {
  type Error = Error;

  // ── Activities ────────────────────────────────────────────────────────

  async fn create_activity(&self, input: ActivityInput) -> Result<Activity> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO activities (name, description, location)
           VALUES (?1, ?2, ?3)",
          params![input.name, input.description, input.location],
        )?;
        Ok(Activity {
          activity_id: conn.last_insert_rowid(),
          name:        input.name,
          description: input.description,
          location:    input.location,
        })
      })
      .await
      .map_err(Error::from)
  }

  async fn list_activities(&self) -> Result<Vec<Activity>> {
    self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT activity_id, name, description, location
           FROM activities ORDER BY name",
        )?;
        let activities = stmt
          .query_map([], |row| rows::activity_row(row, 0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(activities)
      })
      .await
      .map_err(Error::from)
  }

  async fn update_activity(
    &self,
    activity_id: i64,
    input: ActivityInput,
  ) -> Result<Activity> {
    let out: Domain<Activity> = self
      .conn
      .call(move |conn| {
        let affected = conn.execute(
          "UPDATE activities SET name = ?1, description = ?2, location = ?3
           WHERE activity_id = ?4",
          params![input.name, input.description, input.location, activity_id],
        )?;
        if affected == 0 {
          return Ok(Err(CoreError::ActivityNotFound(activity_id)));
        }
        Ok(Ok(Activity {
          activity_id,
          name: input.name,
          description: input.description,
          location: input.location,
        }))
      })
      .await?;
    Ok(out?)
  }

  async fn delete_activity(&self, activity_id: i64) -> Result<()> {
    let out: Domain<()> = self
      .conn
      .call(move |conn| {
        let count: i64 = conn.query_row(
          "SELECT COUNT(*) FROM schedule_windows WHERE activity_id = ?1",
          params![activity_id],
          |r| r.get(0),
        )?;
        if count > 0 {
          return Ok(Err(CoreError::ActivityInUse { activity_id, count }));
        }
        let affected = conn.execute(
          "DELETE FROM activities WHERE activity_id = ?1",
          params![activity_id],
        )?;
        if affected == 0 {
          return Ok(Err(CoreError::ActivityNotFound(activity_id)));
        }
        Ok(Ok(()))
      })
      .await?;
    Ok(out?)
  }

  // ── Schedule windows ──────────────────────────────────────────────────

  async fn create_schedule(&self, input: ScheduleInput) -> Result<ScheduleView> {
    input.validate()?;
    let out: Domain<ScheduleView> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !exists(
          &tx,
          "SELECT 1 FROM activities WHERE activity_id = ?1",
          input.activity_id,
        )? {
          return Ok(Err(CoreError::ActivityNotFound(input.activity_id)));
        }
        if !exists(&tx, "SELECT 1 FROM staff WHERE staff_id = ?1", input.staff_id)? {
          return Ok(Err(CoreError::StaffNotFound(input.staff_id)));
        }

        let windows = windows_for_activity(&tx, input.activity_id, None)?;
        if windows.iter().any(|w| w.overlaps(&input)) {
          return Ok(Err(CoreError::ScheduleOverlap(input.activity_id)));
        }

        tx.execute(
          "INSERT INTO schedule_windows
             (activity_id, staff_id, max_participants,
              start_date, end_date, start_time, end_time)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          params![
            input.activity_id,
            input.staff_id,
            input.max_participants,
            rows::encode_date(input.start_date),
            rows::encode_date(input.end_date),
            input.start_time,
            input.end_time
          ],
        )?;
        let schedule_id = tx.last_insert_rowid();

        let view = schedule_view(&tx, schedule_id)?
          .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        tx.commit()?;
        Ok(Ok(view))
      })
      .await?;
    Ok(out?)
  }

  async fn list_schedules(&self) -> Result<Vec<ScheduleView>> {
    self
      .conn
      .call(|conn| {
        let ids: Vec<i64> = conn
          .prepare("SELECT schedule_id FROM schedule_windows ORDER BY schedule_id")?
          .query_map([], |r| r.get(0))?
          .collect::<rusqlite::Result<_>>()?;
        let mut views = Vec::with_capacity(ids.len());
        for id in ids {
          if let Some(view) = schedule_view(conn, id)? {
            views.push(view);
          }
        }
        Ok(views)
      })
      .await
      .map_err(Error::from)
  }

  async fn update_schedule(
    &self,
    schedule_id: i64,
    input: ScheduleInput,
  ) -> Result<ScheduleView> {
    input.validate()?;
    let out: Domain<ScheduleView> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if get_window(&tx, schedule_id)?.is_none() {
          return Ok(Err(CoreError::ScheduleNotFound(schedule_id)));
        }
        if !exists(
          &tx,
          "SELECT 1 FROM activities WHERE activity_id = ?1",
          input.activity_id,
        )? {
          return Ok(Err(CoreError::ActivityNotFound(input.activity_id)));
        }
        if !exists(&tx, "SELECT 1 FROM staff WHERE staff_id = ?1", input.staff_id)? {
          return Ok(Err(CoreError::StaffNotFound(input.staff_id)));
        }

        let windows =
          windows_for_activity(&tx, input.activity_id, Some(schedule_id))?;
        if windows.iter().any(|w| w.overlaps(&input)) {
          return Ok(Err(CoreError::ScheduleOverlap(input.activity_id)));
        }

        tx.execute(
          "UPDATE schedule_windows
           SET activity_id = ?1, staff_id = ?2, max_participants = ?3,
               start_date = ?4, end_date = ?5, start_time = ?6, end_time = ?7
           WHERE schedule_id = ?8",
          params![
            input.activity_id,
            input.staff_id,
            input.max_participants,
            rows::encode_date(input.start_date),
            rows::encode_date(input.end_date),
            input.start_time,
            input.end_time,
            schedule_id
          ],
        )?;

        let view = schedule_view(&tx, schedule_id)?
          .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        tx.commit()?;
        Ok(Ok(view))
      })
      .await?;
    Ok(out?)
  }

  async fn delete_schedule(&self, schedule_id: i64) -> Result<()> {
    let out: Domain<()> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(window) = get_window(&tx, schedule_id)? else {
          return Ok(Err(CoreError::ScheduleNotFound(schedule_id)));
        };

        tx.execute(
          "DELETE FROM enrollments WHERE schedule_id = ?1",
          params![schedule_id],
        )?;
        tx.execute(
          "DELETE FROM schedule_windows WHERE schedule_id = ?1",
          params![schedule_id],
        )?;

        // Last window gone: the activity goes with it.
        let remaining: i64 = tx.query_row(
          "SELECT COUNT(*) FROM schedule_windows WHERE activity_id = ?1",
          params![window.activity_id],
          |r| r.get(0),
        )?;
        if remaining == 0 {
          tx.execute(
            "DELETE FROM activities WHERE activity_id = ?1",
            params![window.activity_id],
          )?;
        }

        tx.commit()?;
        Ok(Ok(()))
      })
      .await?;
    Ok(out?)
  }

  // ── Enrollments ───────────────────────────────────────────────────────

  async fn enroll(&self, input: EnrollmentInput) -> Result<Enrollment> {
    let out: Domain<Enrollment> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if get_window(&tx, input.schedule_id)?.is_none() {
          return Ok(Err(CoreError::ScheduleNotFound(input.schedule_id)));
        }
        if !exists(
          &tx,
          "SELECT 1 FROM prisoners WHERE prisoner_id = ?1",
          input.prisoner_id,
        )? {
          return Ok(Err(CoreError::PrisonerNotFound(input.prisoner_id)));
        }

        let duplicate: i64 = tx.query_row(
          "SELECT COUNT(*) FROM enrollments
           WHERE schedule_id = ?1 AND prisoner_id = ?2",
          params![input.schedule_id, input.prisoner_id],
          |r| r.get(0),
        )?;
        if duplicate > 0 {
          return Ok(Err(CoreError::DuplicateEnrollment {
            schedule_id: input.schedule_id,
            prisoner_id: input.prisoner_id,
          }));
        }

        let now = Utc::now();
        tx.execute(
          "INSERT INTO enrollments (schedule_id, prisoner_id, status, enrolled_at)
           VALUES (?1, ?2, ?3, ?4)",
          params![
            input.schedule_id,
            input.prisoner_id,
            EnrollmentStatus::Enrolled.as_str(),
            rows::encode_dt(now)
          ],
        )?;
        let enrollment_id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Ok(Enrollment {
          enrollment_id,
          schedule_id: input.schedule_id,
          prisoner_id: input.prisoner_id,
          status: EnrollmentStatus::Enrolled,
          enrolled_at: now,
          remarks: None,
        }))
      })
      .await?;
    Ok(out?)
  }

  async fn set_enrollment_status(
    &self,
    enrollment_id: i64,
    status: EnrollmentStatus,
    remarks: Option<String>,
  ) -> Result<Enrollment> {
    let out: Domain<Enrollment> = self
      .conn
      .call(move |conn| {
        let existing = conn
          .query_row(
            "SELECT enrollment_id, schedule_id, prisoner_id, status,
                    enrolled_at, remarks
             FROM enrollments WHERE enrollment_id = ?1",
            params![enrollment_id],
            |row| rows::enrollment_row(row, 0),
          )
          .optional()?;
        let Some(mut enrollment) = existing else {
          return Ok(Err(CoreError::EnrollmentNotFound(enrollment_id)));
        };

        conn.execute(
          "UPDATE enrollments SET status = ?1, remarks = ?2
           WHERE enrollment_id = ?3",
          params![status.as_str(), &remarks, enrollment_id],
        )?;
        enrollment.status = status;
        enrollment.remarks = remarks;
        Ok(Ok(enrollment))
      })
      .await?;
    Ok(out?)
  }

  async fn delete_enrollment(&self, enrollment_id: i64) -> Result<()> {
    let out: Domain<()> = self
      .conn
      .call(move |conn| {
        let affected = conn.execute(
          "DELETE FROM enrollments WHERE enrollment_id = ?1",
          params![enrollment_id],
        )?;
        if affected == 0 {
          return Ok(Err(CoreError::EnrollmentNotFound(enrollment_id)));
        }
        Ok(Ok(()))
      })
      .await?;
    Ok(out?)
  }

  // ── Staff / rooms ─────────────────────────────────────────────────────

  async fn add_staff(&self, input: StaffInput) -> Result<Staff> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO staff (first_name, last_name) VALUES (?1, ?2)",
          params![input.first_name, input.last_name],
        )?;
        Ok(Staff {
          staff_id:   conn.last_insert_rowid(),
          first_name: input.first_name,
          last_name:  input.last_name,
        })
      })
      .await
      .map_err(Error::from)
  }

  async fn list_staff(&self) -> Result<Vec<Staff>> {
    self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT staff_id, first_name, last_name FROM staff ORDER BY staff_id",
        )?;
        let staff = stmt
          .query_map([], |row| rows::staff_row(row, 0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(staff)
      })
      .await
      .map_err(Error::from)
  }

  async fn add_room(&self, name: String) -> Result<Room> {
    let out: Domain<Room> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let taken: i64 = tx.query_row(
          "SELECT COUNT(*) FROM rooms WHERE name = ?1",
          params![name],
          |r| r.get(0),
        )?;
        if taken > 0 {
          return Ok(Err(CoreError::DuplicateRoomName(name)));
        }

        tx.execute(
          "INSERT INTO rooms (name, status) VALUES (?1, ?2)",
          params![name, RoomStatus::Vacant.as_str()],
        )?;
        let room = Room {
          room_id: tx.last_insert_rowid(),
          name,
          status: RoomStatus::Vacant,
        };
        tx.commit()?;
        Ok(Ok(room))
      })
      .await?;
    Ok(out?)
  }

  async fn list_rooms(&self) -> Result<Vec<Room>> {
    self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare("SELECT room_id, name, status FROM rooms ORDER BY name")?;
        let rooms = stmt
          .query_map([], |row| rows::room_row(row, 0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rooms)
      })
      .await
      .map_err(Error::from)
  }

  // ── Prisoners ─────────────────────────────────────────────────────────

  async fn create_prisoner(&self, input: PrisonerInput) -> Result<PrisonerView> {
    input.validate()?;
    let out: Domain<PrisonerView> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let taken: i64 = tx.query_row(
          "SELECT COUNT(*) FROM prisoners WHERE inmate_code = ?1",
          params![input.inmate_code],
          |r| r.get(0),
        )?;
        if taken > 0 {
          return Ok(Err(CoreError::DuplicateInmateCode(
            input.inmate_code.clone(),
          )));
        }

        if let Some(room_id) = input.room_id {
          let Some(room) = get_room(&tx, room_id)? else {
            return Ok(Err(CoreError::RoomNotFound(room_id)));
          };
          if let Err(e) = check_room_gender(&room.name, input.gender) {
            return Ok(Err(e));
          }
          if occupancy(&tx, room_id)? >= ROOM_CAPACITY {
            return Ok(Err(CoreError::RoomFull(room_id)));
          }
        }

        tx.execute(
          "INSERT INTO prisoners
             (inmate_code, citizen_id, first_name, last_name, gender,
              birthday, case_code, entry_date, release_date, room_id)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          params![
            input.inmate_code,
            input.citizen_id,
            input.first_name,
            input.last_name,
            input.gender.as_str(),
            rows::encode_date(input.birthday),
            input.case_code,
            rows::encode_date(input.entry_date),
            input.release_date.map(rows::encode_date),
            input.room_id
          ],
        )?;
        let prisoner_id = tx.last_insert_rowid();

        tx.execute(
          "INSERT INTO score_records (prisoner_id, score) VALUES (?1, 0)",
          params![prisoner_id],
        )?;

        if let Some(room_id) = input.room_id {
          refresh_room_status(&tx, room_id)?;
        }

        let view = prisoner_view(&tx, prisoner_id)?
          .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        tx.commit()?;
        Ok(Ok(view))
      })
      .await?;
    Ok(out?)
  }

  async fn get_prisoner(&self, prisoner_id: i64) -> Result<Option<PrisonerView>> {
    self
      .conn
      .call(move |conn| Ok(prisoner_view(conn, prisoner_id)?))
      .await
      .map_err(Error::from)
  }

  async fn list_prisoners(&self) -> Result<Vec<PrisonerView>> {
    self
      .conn
      .call(|conn| {
        let sql = format!("{PRISONER_VIEW_SELECT} ORDER BY p.prisoner_id");
        let mut stmt = conn.prepare(&sql)?;
        let prisoners = stmt
          .query_map([], |row| {
            let prisoner = rows::prisoner_row(row, 0)?;
            let room = match row.get::<_, Option<i64>>(11)? {
              Some(_) => Some(rows::room_row(row, 11)?),
              None => None,
            };
            Ok(PrisonerView { prisoner, room })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(prisoners)
      })
      .await
      .map_err(Error::from)
  }

  async fn update_prisoner(
    &self,
    prisoner_id: i64,
    input: PrisonerInput,
  ) -> Result<PrisonerView> {
    input.validate()?;
    let out: Domain<PrisonerView> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let old_room: Option<Option<i64>> = tx
          .query_row(
            "SELECT room_id FROM prisoners WHERE prisoner_id = ?1",
            params![prisoner_id],
            |r| r.get(0),
          )
          .optional()?;
        let Some(old_room) = old_room else {
          return Ok(Err(CoreError::PrisonerNotFound(prisoner_id)));
        };

        if let Some(room_id) = input.room_id {
          let Some(room) = get_room(&tx, room_id)? else {
            return Ok(Err(CoreError::RoomNotFound(room_id)));
          };
          if let Err(e) = check_room_gender(&room.name, input.gender) {
            return Ok(Err(e));
          }
          // Capacity only gates moves into a different room; staying put
          // must not conflict with the prisoner's own occupancy.
          if old_room != Some(room_id) && occupancy(&tx, room_id)? >= ROOM_CAPACITY
          {
            return Ok(Err(CoreError::RoomFull(room_id)));
          }
        }

        // The inmate code is assigned once at intake and never rewritten.
        tx.execute(
          "UPDATE prisoners
           SET citizen_id = ?1, first_name = ?2, last_name = ?3, gender = ?4,
               birthday = ?5, case_code = ?6, entry_date = ?7,
               release_date = ?8, room_id = ?9
           WHERE prisoner_id = ?10",
          params![
            input.citizen_id,
            input.first_name,
            input.last_name,
            input.gender.as_str(),
            rows::encode_date(input.birthday),
            input.case_code,
            rows::encode_date(input.entry_date),
            input.release_date.map(rows::encode_date),
            input.room_id,
            prisoner_id
          ],
        )?;

        if let Some(room_id) = old_room
          && input.room_id != Some(room_id)
        {
          refresh_room_status(&tx, room_id)?;
        }
        if let Some(room_id) = input.room_id {
          refresh_room_status(&tx, room_id)?;
        }

        let view = prisoner_view(&tx, prisoner_id)?
          .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        tx.commit()?;
        Ok(Ok(view))
      })
      .await?;
    Ok(out?)
  }

  async fn delete_prisoner(&self, prisoner_id: i64) -> Result<()> {
    let out: Domain<()> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let room: Option<Option<i64>> = tx
          .query_row(
            "SELECT room_id FROM prisoners WHERE prisoner_id = ?1",
            params![prisoner_id],
            |r| r.get(0),
          )
          .optional()?;
        let Some(room) = room else {
          return Ok(Err(CoreError::PrisonerNotFound(prisoner_id)));
        };

        // Enrollments, the score record, and its evaluations cascade; the
        // adjustment ledger intentionally survives.
        tx.execute(
          "DELETE FROM prisoners WHERE prisoner_id = ?1",
          params![prisoner_id],
        )?;

        if let Some(room_id) = room {
          refresh_room_status(&tx, room_id)?;
        }

        tx.commit()?;
        Ok(Ok(()))
      })
      .await?;
    Ok(out?)
  }

  async fn next_inmate_code(&self) -> Result<String> {
    let latest: Option<String> = self
      .conn
      .call(|conn| {
        // Length-first ordering keeps P-10000 above P-9999.
        let latest = conn
          .query_row(
            "SELECT inmate_code FROM prisoners
             ORDER BY length(inmate_code) DESC, inmate_code DESC
             LIMIT 1",
            [],
            |r| r.get(0),
          )
          .optional()?;
        Ok(latest)
      })
      .await?;
    Ok(warden_core::prisoner::next_inmate_code(latest.as_deref())?)
  }

  // ── Scores ────────────────────────────────────────────────────────────

  async fn score_for_prisoner(
    &self,
    prisoner_id: i64,
  ) -> Result<Option<ScoreRecord>> {
    self
      .conn
      .call(move |conn| {
        let record = conn
          .query_row(
            "SELECT score_id, prisoner_id, score
             FROM score_records WHERE prisoner_id = ?1",
            params![prisoner_id],
            |row| rows::score_record_row(row, 0),
          )
          .optional()?;
        Ok(record)
      })
      .await
      .map_err(Error::from)
  }

  async fn adjust_score(&self, input: AdjustmentInput) -> Result<AdjustmentEntry> {
    let out: Domain<AdjustmentEntry> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !exists(
          &tx,
          "SELECT 1 FROM prisoners WHERE prisoner_id = ?1",
          input.prisoner_id,
        )? {
          return Ok(Err(CoreError::PrisonerNotFound(input.prisoner_id)));
        }

        let existing: Option<(i64, i64)> = tx
          .query_row(
            "SELECT score_id, score FROM score_records WHERE prisoner_id = ?1",
            params![input.prisoner_id],
            |r| Ok((r.get(0)?, r.get(1)?)),
          )
          .optional()?;

        // A missing record is backfilled, with the transition starting at 0.
        let (score_record_id, old_score) = match existing {
          Some((score_id, score)) => {
            tx.execute(
              "UPDATE score_records SET score = ?1 WHERE score_id = ?2",
              params![input.new_score, score_id],
            )?;
            (score_id, score)
          }
          None => {
            tx.execute(
              "INSERT INTO score_records (prisoner_id, score) VALUES (?1, ?2)",
              params![input.prisoner_id, input.new_score],
            )?;
            (tx.last_insert_rowid(), 0)
          }
        };

        let now = Utc::now();
        tx.execute(
          "INSERT INTO adjustments
             (old_score, new_score, prisoner_id, score_record_id,
              actor_member_id, recorded_at, remarks)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          params![
            old_score,
            input.new_score,
            input.prisoner_id,
            score_record_id,
            input.actor_member_id,
            rows::encode_dt(now),
            &input.remarks
          ],
        )?;
        let adjustment_id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Ok(AdjustmentEntry {
          adjustment_id,
          old_score,
          new_score: input.new_score,
          prisoner_id: input.prisoner_id,
          score_record_id,
          actor_member_id: input.actor_member_id,
          recorded_at: now,
          remarks: input.remarks,
        }))
      })
      .await?;
    Ok(out?)
  }

  async fn list_adjustments(&self) -> Result<Vec<AdjustmentView>> {
    self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT a.adjustment_id, a.old_score, a.new_score, a.prisoner_id,
                  a.score_record_id, a.actor_member_id, a.recorded_at,
                  a.remarks,
                  p.inmate_code, p.first_name || ' ' || p.last_name
           FROM adjustments a
           LEFT JOIN prisoners p ON p.prisoner_id = a.prisoner_id
           ORDER BY a.adjustment_id DESC",
        )?;
        let entries = stmt
          .query_map([], |row| rows::adjustment_view_row(row, 0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
      })
      .await
      .map_err(Error::from)
  }

  async fn record_evaluation(
    &self,
    input: EvaluationInput,
  ) -> Result<BehaviorEvaluation> {
    let out: Domain<BehaviorEvaluation> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !exists(
          &tx,
          "SELECT 1 FROM prisoners WHERE prisoner_id = ?1",
          input.prisoner_id,
        )? {
          return Ok(Err(CoreError::PrisonerNotFound(input.prisoner_id)));
        }
        let score_record_id: Option<i64> = tx
          .query_row(
            "SELECT score_id FROM score_records WHERE prisoner_id = ?1",
            params![input.prisoner_id],
            |r| r.get(0),
          )
          .optional()?;
        let Some(score_record_id) = score_record_id else {
          return Ok(Err(CoreError::ScoreRecordNotFound(input.prisoner_id)));
        };

        tx.execute(
          "INSERT INTO evaluations
             (score_record_id, prisoner_id, criterion, actor_member_id,
              evaluated_on, notes)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          params![
            score_record_id,
            input.prisoner_id,
            input.criterion,
            input.actor_member_id,
            rows::encode_date(input.evaluated_on),
            &input.notes
          ],
        )?;
        let evaluation_id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Ok(BehaviorEvaluation {
          evaluation_id,
          score_record_id,
          prisoner_id: input.prisoner_id,
          criterion: input.criterion,
          actor_member_id: input.actor_member_id,
          evaluated_on: input.evaluated_on,
          notes: input.notes,
        }))
      })
      .await?;
    Ok(out?)
  }

  async fn list_evaluations(&self) -> Result<Vec<BehaviorEvaluation>> {
    self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT evaluation_id, score_record_id, prisoner_id, criterion,
                  actor_member_id, evaluated_on, notes
           FROM evaluations ORDER BY evaluation_id",
        )?;
        let evaluations = stmt
          .query_map([], |row| rows::evaluation_row(row, 0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(evaluations)
      })
      .await
      .map_err(Error::from)
  }

  // ── Inventory ─────────────────────────────────────────────────────────

  async fn create_parcel(
    &self,
    input: ParcelInput,
    actor_member_id: Option<i64>,
  ) -> Result<Parcel> {
    if input.quantity < 0 {
      return Err(CoreError::InvalidAmount(input.quantity).into());
    }
    let out: Domain<Parcel> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let taken: i64 = tx.query_row(
          "SELECT COUNT(*) FROM parcels WHERE name = ?1",
          params![input.name],
          |r| r.get(0),
        )?;
        if taken > 0 {
          return Ok(Err(CoreError::DuplicateParcelName(input.name)));
        }

        let status = StockStatus::for_quantity(input.quantity);
        tx.execute(
          "INSERT INTO parcels (name, quantity, kind, status)
           VALUES (?1, ?2, ?3, ?4)",
          params![input.name, input.quantity, input.kind, status.as_str()],
        )?;
        let parcel_id = tx.last_insert_rowid();

        log_operation(&tx, OperationInsert {
          parcel_id,
          old_quantity: 0,
          new_quantity: input.quantity,
          change_amount: input.quantity,
          operator: OperatorKind::Created,
          actor_member_id,
          old_name: None,
          new_name: None,
          old_kind: None,
          new_kind: None,
        })?;
        tx.commit()?;

        Ok(Ok(Parcel {
          parcel_id,
          name: input.name,
          quantity: input.quantity,
          kind: input.kind,
          status,
        }))
      })
      .await?;
    Ok(out?)
  }

  async fn list_parcels(&self) -> Result<Vec<Parcel>> {
    self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT parcel_id, name, quantity, kind, status
           FROM parcels ORDER BY parcel_id",
        )?;
        let parcels = stmt
          .query_map([], |row| rows::parcel_row(row, 0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(parcels)
      })
      .await
      .map_err(Error::from)
  }

  async fn update_parcel(
    &self,
    parcel_id: i64,
    input: ParcelInput,
    actor_member_id: Option<i64>,
  ) -> Result<Parcel> {
    if input.quantity < 0 {
      return Err(CoreError::InvalidAmount(input.quantity).into());
    }
    let out: Domain<Parcel> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(parcel) = get_parcel(&tx, parcel_id)? else {
          return Ok(Err(CoreError::ParcelNotFound(parcel_id)));
        };

        if input.name != parcel.name {
          let taken: i64 = tx.query_row(
            "SELECT COUNT(*) FROM parcels WHERE name = ?1 AND parcel_id <> ?2",
            params![input.name, parcel_id],
            |r| r.get(0),
          )?;
          if taken > 0 {
            return Ok(Err(CoreError::DuplicateParcelName(input.name)));
          }
        }

        let status = StockStatus::for_quantity(input.quantity);
        tx.execute(
          "UPDATE parcels SET name = ?1, quantity = ?2, kind = ?3, status = ?4
           WHERE parcel_id = ?5",
          params![input.name, input.quantity, input.kind, status.as_str(), parcel_id],
        )?;

        log_operation(&tx, OperationInsert {
          parcel_id,
          old_quantity: parcel.quantity,
          new_quantity: input.quantity,
          change_amount: input.quantity - parcel.quantity,
          operator: OperatorKind::Edited,
          actor_member_id,
          old_name: Some(&parcel.name),
          new_name: Some(&input.name),
          old_kind: Some(&parcel.kind),
          new_kind: Some(&input.kind),
        })?;
        tx.commit()?;

        Ok(Ok(Parcel {
          parcel_id,
          name: input.name,
          quantity: input.quantity,
          kind: input.kind,
          status,
        }))
      })
      .await?;
    Ok(out?)
  }

  async fn add_stock(
    &self,
    parcel_id: i64,
    amount: i64,
    actor_member_id: Option<i64>,
  ) -> Result<Parcel> {
    if amount <= 0 {
      return Err(CoreError::InvalidAmount(amount).into());
    }
    let out: Domain<Parcel> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(mut parcel) = get_parcel(&tx, parcel_id)? else {
          return Ok(Err(CoreError::ParcelNotFound(parcel_id)));
        };

        let old_quantity = parcel.quantity;
        parcel.quantity = old_quantity + amount;
        parcel.status = StockStatus::for_quantity(parcel.quantity);

        tx.execute(
          "UPDATE parcels SET quantity = ?1, status = ?2 WHERE parcel_id = ?3",
          params![parcel.quantity, parcel.status.as_str(), parcel_id],
        )?;
        log_operation(&tx, OperationInsert {
          parcel_id,
          old_quantity,
          new_quantity: parcel.quantity,
          change_amount: amount,
          operator: OperatorKind::Added,
          actor_member_id,
          old_name: None,
          new_name: None,
          old_kind: None,
          new_kind: None,
        })?;
        tx.commit()?;
        Ok(Ok(parcel))
      })
      .await?;
    Ok(out?)
  }

  async fn reduce_stock(
    &self,
    parcel_id: i64,
    amount: i64,
    actor_member_id: Option<i64>,
  ) -> Result<Parcel> {
    if amount <= 0 {
      return Err(CoreError::InvalidAmount(amount).into());
    }
    let out: Domain<Parcel> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(mut parcel) = get_parcel(&tx, parcel_id)? else {
          return Ok(Err(CoreError::ParcelNotFound(parcel_id)));
        };

        let old_quantity = parcel.quantity;
        // The quantity clamps at zero, but the ledger keeps the requested
        // delta, so over-withdrawals stay visible in the history.
        parcel.quantity = (old_quantity - amount).max(0);
        parcel.status = StockStatus::for_quantity(parcel.quantity);

        tx.execute(
          "UPDATE parcels SET quantity = ?1, status = ?2 WHERE parcel_id = ?3",
          params![parcel.quantity, parcel.status.as_str(), parcel_id],
        )?;
        log_operation(&tx, OperationInsert {
          parcel_id,
          old_quantity,
          new_quantity: parcel.quantity,
          change_amount: -amount,
          operator: OperatorKind::Reduced,
          actor_member_id,
          old_name: None,
          new_name: None,
          old_kind: None,
          new_kind: None,
        })?;
        tx.commit()?;
        Ok(Ok(parcel))
      })
      .await?;
    Ok(out?)
  }

  async fn list_operations(&self) -> Result<Vec<OperationView>> {
    self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT o.operation_id, o.recorded_at, o.parcel_id, o.old_quantity,
                  o.new_quantity, o.change_amount, o.operator,
                  o.actor_member_id, o.old_name, o.new_name, o.old_kind,
                  o.new_kind,
                  p.name
           FROM operations o
           LEFT JOIN parcels p ON p.parcel_id = o.parcel_id
           ORDER BY o.operation_id DESC",
        )?;
        let entries = stmt
          .query_map([], |row| rows::operation_view_row(row, 0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
      })
      .await
      .map_err(Error::from)
  }

  // ── Visitations ───────────────────────────────────────────────────────

  async fn book_visitation(&self, input: VisitationInput) -> Result<VisitationView> {
    let out: Domain<VisitationView> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !exists(
          &tx,
          "SELECT 1 FROM time_slots WHERE slot_id = ?1",
          input.time_slot_id,
        )? {
          return Ok(Err(CoreError::TimeSlotNotFound(input.time_slot_id)));
        }
        if !exists(
          &tx,
          "SELECT 1 FROM prisoners WHERE prisoner_id = ?1",
          input.prisoner_id,
        )? {
          return Ok(Err(CoreError::PrisonerNotFound(input.prisoner_id)));
        }
        if !exists(&tx, "SELECT 1 FROM staff WHERE staff_id = ?1", input.staff_id)? {
          return Ok(Err(CoreError::StaffNotFound(input.staff_id)));
        }

        let date = rows::encode_date(input.visit_date);
        if slot_taken(&tx, &date, input.time_slot_id, None)? {
          return Ok(Err(CoreError::SlotTaken {
            slot_id: input.time_slot_id,
            date:    input.visit_date,
          }));
        }

        let visitor = find_or_create_visitor(&tx, &input)?;
        tx.execute(
          "INSERT INTO visitations
             (visit_date, time_slot_id, prisoner_id, visitor_id, staff_id,
              relationship, status)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          params![
            date,
            input.time_slot_id,
            input.prisoner_id,
            visitor.visitor_id,
            input.staff_id,
            input.relationship,
            input.status
          ],
        )?;
        let visitation_id = tx.last_insert_rowid();

        let view = visitation_view(&tx, visitation_id)?
          .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        tx.commit()?;
        Ok(Ok(view))
      })
      .await?;
    Ok(out?)
  }

  async fn list_visitations(
    &self,
    caller: Option<Identity>,
  ) -> Result<Vec<VisitationView>> {
    self
      .conn
      .call(move |conn| {
        let restrict_to = match &caller {
          Some(caller) if caller.rank == Rank::Relative => {
            match visitor_by_citizen_id(conn, &caller.citizen_id)? {
              Some(visitor) => Some(visitor.visitor_id),
              // A relative with no visitor row has never booked anything.
              None => return Ok(Vec::new()),
            }
          }
          _ => None,
        };

        let sql = format!(
          "{VISITATION_VIEW_SELECT}
           WHERE (?1 IS NULL OR v.visitor_id = ?1)
           ORDER BY v.visit_date DESC, v.visitation_id DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let views = stmt
          .query_map(params![restrict_to], |row| {
            Ok(VisitationView {
              visitation:    rows::visitation_row(row, 0)?,
              slot:          rows::time_slot_row(row, 8)?,
              visitor:       rows::visitor_row(row, 12)?,
              inmate_code:   row.get(16)?,
              prisoner_name: row.get(17)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(views)
      })
      .await
      .map_err(Error::from)
  }

  async fn update_visitation(
    &self,
    visitation_id: i64,
    input: VisitationInput,
    caller: Option<Identity>,
  ) -> Result<VisitationView> {
    let out: Domain<VisitationView> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let existing_visitor: Option<i64> = tx
          .query_row(
            "SELECT visitor_id FROM visitations WHERE visitation_id = ?1",
            params![visitation_id],
            |r| r.get(0),
          )
          .optional()?;
        let Some(existing_visitor) = existing_visitor else {
          return Ok(Err(CoreError::VisitationNotFound(visitation_id)));
        };

        if let Some(caller) = &caller
          && caller.rank == Rank::Relative
          && !relative_owns(&tx, caller, existing_visitor)?
        {
          return Ok(Err(CoreError::Forbidden));
        }

        if !exists(
          &tx,
          "SELECT 1 FROM time_slots WHERE slot_id = ?1",
          input.time_slot_id,
        )? {
          return Ok(Err(CoreError::TimeSlotNotFound(input.time_slot_id)));
        }
        if !exists(
          &tx,
          "SELECT 1 FROM prisoners WHERE prisoner_id = ?1",
          input.prisoner_id,
        )? {
          return Ok(Err(CoreError::PrisonerNotFound(input.prisoner_id)));
        }
        if !exists(&tx, "SELECT 1 FROM staff WHERE staff_id = ?1", input.staff_id)? {
          return Ok(Err(CoreError::StaffNotFound(input.staff_id)));
        }

        let date = rows::encode_date(input.visit_date);
        if slot_taken(&tx, &date, input.time_slot_id, Some(visitation_id))? {
          return Ok(Err(CoreError::SlotTaken {
            slot_id: input.time_slot_id,
            date:    input.visit_date,
          }));
        }

        let visitor = find_or_create_visitor(&tx, &input)?;
        tx.execute(
          "UPDATE visitations
           SET visit_date = ?1, time_slot_id = ?2, prisoner_id = ?3,
               visitor_id = ?4, staff_id = ?5, relationship = ?6, status = ?7
           WHERE visitation_id = ?8",
          params![
            date,
            input.time_slot_id,
            input.prisoner_id,
            visitor.visitor_id,
            input.staff_id,
            input.relationship,
            input.status,
            visitation_id
          ],
        )?;

        let view = visitation_view(&tx, visitation_id)?
          .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        tx.commit()?;
        Ok(Ok(view))
      })
      .await?;
    Ok(out?)
  }

  async fn delete_visitation(
    &self,
    visitation_id: i64,
    caller: Option<Identity>,
  ) -> Result<()> {
    let out: Domain<()> = self
      .conn
      .call(move |conn| {
        let visitor_id: Option<i64> = conn
          .query_row(
            "SELECT visitor_id FROM visitations WHERE visitation_id = ?1",
            params![visitation_id],
            |r| r.get(0),
          )
          .optional()?;
        let Some(visitor_id) = visitor_id else {
          return Ok(Err(CoreError::VisitationNotFound(visitation_id)));
        };

        if let Some(caller) = &caller
          && caller.rank == Rank::Relative
          && !relative_owns(conn, caller, visitor_id)?
        {
          return Ok(Err(CoreError::Forbidden));
        }

        conn.execute(
          "DELETE FROM visitations WHERE visitation_id = ?1",
          params![visitation_id],
        )?;
        Ok(Ok(()))
      })
      .await?;
    Ok(out?)
  }

  async fn list_time_slots(&self) -> Result<Vec<TimeSlot>> {
    self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT slot_id, name, start_time, end_time
           FROM time_slots ORDER BY slot_id",
        )?;
        let slots = stmt
          .query_map([], |row| rows::time_slot_row(row, 0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(slots)
      })
      .await
      .map_err(Error::from)
  }
}
