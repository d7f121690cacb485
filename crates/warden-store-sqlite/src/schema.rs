//! Database schema.
//!
//! Dates are ISO `YYYY-MM-DD` text, timestamps RFC 3339 text, times of day
//! zero-padded `HH:MM` text. Ledger tables (`adjustments`, `operations`)
//! carry no foreign keys so the audit trail survives deletion of the rows it
//! describes.

pub const SCHEMA: &str = "
  PRAGMA journal_mode = WAL;
  PRAGMA foreign_keys = ON;

  CREATE TABLE IF NOT EXISTS staff (
    staff_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL,
    last_name  TEXT NOT NULL
  );

  CREATE TABLE IF NOT EXISTS rooms (
    room_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name    TEXT NOT NULL UNIQUE,
    status  TEXT NOT NULL DEFAULT 'vacant'
  );

  CREATE TABLE IF NOT EXISTS prisoners (
    prisoner_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    inmate_code  TEXT NOT NULL UNIQUE,
    citizen_id   TEXT NOT NULL,
    first_name   TEXT NOT NULL,
    last_name    TEXT NOT NULL,
    gender       TEXT NOT NULL,
    birthday     TEXT NOT NULL,
    case_code    TEXT NOT NULL,
    entry_date   TEXT NOT NULL,
    release_date TEXT,
    room_id      INTEGER REFERENCES rooms (room_id)
  );
  CREATE INDEX IF NOT EXISTS prisoners_room_idx ON prisoners (room_id);

  CREATE TABLE IF NOT EXISTS activities (
    activity_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    location    TEXT NOT NULL
  );

  CREATE TABLE IF NOT EXISTS schedule_windows (
    schedule_id      INTEGER PRIMARY KEY AUTOINCREMENT,
    activity_id      INTEGER NOT NULL REFERENCES activities (activity_id),
    staff_id         INTEGER NOT NULL REFERENCES staff (staff_id),
    max_participants INTEGER NOT NULL,
    start_date       TEXT NOT NULL,
    end_date         TEXT NOT NULL,
    start_time       TEXT NOT NULL,
    end_time         TEXT NOT NULL
  );
  CREATE INDEX IF NOT EXISTS schedule_windows_activity_idx
    ON schedule_windows (activity_id);

  CREATE TABLE IF NOT EXISTS enrollments (
    enrollment_id INTEGER PRIMARY KEY AUTOINCREMENT,
    schedule_id   INTEGER NOT NULL
      REFERENCES schedule_windows (schedule_id) ON DELETE CASCADE,
    prisoner_id   INTEGER NOT NULL
      REFERENCES prisoners (prisoner_id) ON DELETE CASCADE,
    status        TEXT NOT NULL DEFAULT 'enrolled',
    enrolled_at   TEXT NOT NULL,
    remarks       TEXT,
    UNIQUE (schedule_id, prisoner_id)
  );

  CREATE TABLE IF NOT EXISTS score_records (
    score_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    prisoner_id INTEGER NOT NULL UNIQUE
      REFERENCES prisoners (prisoner_id) ON DELETE CASCADE,
    score       INTEGER NOT NULL
  );

  CREATE TABLE IF NOT EXISTS adjustments (
    adjustment_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    old_score       INTEGER NOT NULL,
    new_score       INTEGER NOT NULL,
    prisoner_id     INTEGER NOT NULL,
    score_record_id INTEGER NOT NULL,
    actor_member_id INTEGER,
    recorded_at     TEXT NOT NULL,
    remarks         TEXT
  );
  CREATE INDEX IF NOT EXISTS adjustments_prisoner_idx
    ON adjustments (prisoner_id);

  CREATE TABLE IF NOT EXISTS evaluations (
    evaluation_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    score_record_id INTEGER NOT NULL
      REFERENCES score_records (score_id) ON DELETE CASCADE,
    prisoner_id     INTEGER NOT NULL,
    criterion       TEXT NOT NULL,
    actor_member_id INTEGER,
    evaluated_on    TEXT NOT NULL,
    notes           TEXT
  );

  CREATE TABLE IF NOT EXISTS parcels (
    parcel_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name      TEXT NOT NULL UNIQUE,
    quantity  INTEGER NOT NULL,
    kind      TEXT NOT NULL,
    status    TEXT NOT NULL
  );

  CREATE TABLE IF NOT EXISTS operations (
    operation_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    recorded_at     TEXT NOT NULL,
    parcel_id       INTEGER NOT NULL,
    old_quantity    INTEGER NOT NULL,
    new_quantity    INTEGER NOT NULL,
    change_amount   INTEGER NOT NULL,
    operator        TEXT NOT NULL,
    actor_member_id INTEGER,
    old_name        TEXT,
    new_name        TEXT,
    old_kind        TEXT,
    new_kind        TEXT
  );
  CREATE INDEX IF NOT EXISTS operations_parcel_idx ON operations (parcel_id);

  CREATE TABLE IF NOT EXISTS time_slots (
    slot_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name       TEXT NOT NULL,
    start_time TEXT NOT NULL,
    end_time   TEXT NOT NULL
  );

  INSERT INTO time_slots (name, start_time, end_time)
  SELECT column1, column2, column3 FROM (VALUES
    ('Morning',   '09:00', '10:30'),
    ('Midday',    '11:00', '12:30'),
    ('Afternoon', '14:00', '15:30'))
  WHERE NOT EXISTS (SELECT 1 FROM time_slots);

  CREATE TABLE IF NOT EXISTS visitors (
    visitor_id INTEGER PRIMARY KEY AUTOINCREMENT,
    citizen_id TEXT NOT NULL UNIQUE,
    first_name TEXT NOT NULL,
    last_name  TEXT NOT NULL
  );

  CREATE TABLE IF NOT EXISTS visitations (
    visitation_id INTEGER PRIMARY KEY AUTOINCREMENT,
    visit_date    TEXT NOT NULL,
    time_slot_id  INTEGER NOT NULL REFERENCES time_slots (slot_id),
    prisoner_id   INTEGER NOT NULL
      REFERENCES prisoners (prisoner_id) ON DELETE CASCADE,
    visitor_id    INTEGER NOT NULL REFERENCES visitors (visitor_id),
    staff_id      INTEGER NOT NULL REFERENCES staff (staff_id),
    relationship  TEXT NOT NULL,
    status        TEXT NOT NULL,
    UNIQUE (visit_date, time_slot_id)
  );
";
