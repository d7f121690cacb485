//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use warden_core::{
  Error as CoreError,
  identity::{Identity, Rank},
  inventory::{OperatorKind, ParcelInput, StockStatus},
  prisoner::{Gender, PrisonerInput},
  room::RoomStatus,
  schedule::{ActivityInput, EnrollmentInput, EnrollmentStatus, ScheduleInput},
  score::{AdjustmentInput, EvaluationInput},
  staff::StaffInput,
  store::FacilityStore,
  visitation::VisitationInput,
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn date(s: &str) -> NaiveDate {
  s.parse().unwrap()
}

fn schedule_input(
  activity_id: i64,
  staff_id: i64,
  dates: (&str, &str),
  times: (&str, &str),
) -> ScheduleInput {
  ScheduleInput {
    activity_id,
    staff_id,
    max_participants: 10,
    start_date: date(dates.0),
    end_date: date(dates.1),
    start_time: times.0.into(),
    end_time: times.1.into(),
  }
}

fn prisoner_input(
  code: &str,
  gender: Gender,
  room_id: Option<i64>,
) -> PrisonerInput {
  PrisonerInput {
    inmate_code: code.into(),
    citizen_id: "1100000000001".into(),
    first_name: "Joe".into(),
    last_name: "Doe".into(),
    gender,
    birthday: date("1990-01-01"),
    case_code: "C-9".into(),
    entry_date: date("2024-01-01"),
    release_date: None,
    room_id,
  }
}

fn visitation_input(
  prisoner_id: i64,
  staff_id: i64,
  visit_date: &str,
  citizen_id: &str,
) -> VisitationInput {
  VisitationInput {
    visit_date: date(visit_date),
    time_slot_id: 1,
    prisoner_id,
    staff_id,
    relationship: "mother".into(),
    status: "booked".into(),
    visitor_first_name: "Mary".into(),
    visitor_last_name: "Doe".into(),
    visitor_citizen_id: citizen_id.into(),
  }
}

/// Staff member + activity, the prerequisites of every schedule.
async fn seed_schedule_deps(s: &SqliteStore) -> (i64, i64) {
  let staff = s
    .add_staff(StaffInput {
      first_name: "Ana".into(),
      last_name:  "Cruz".into(),
    })
    .await
    .unwrap();
  let activity = s
    .create_activity(ActivityInput {
      name:        "Woodshop".into(),
      description: String::new(),
      location:    "Hall B".into(),
    })
    .await
    .unwrap();
  (activity.activity_id, staff.staff_id)
}

// ─── Schedules ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn overlap_rejected_but_touching_boundary_allowed() {
  let s = store().await;
  let (activity_id, staff_id) = seed_schedule_deps(&s).await;

  s.create_schedule(schedule_input(
    activity_id,
    staff_id,
    ("2024-05-01", "2024-05-10"),
    ("09:00", "11:00"),
  ))
  .await
  .unwrap();

  let err = s
    .create_schedule(schedule_input(
      activity_id,
      staff_id,
      ("2024-05-05", "2024-05-20"),
      ("10:00", "12:00"),
    ))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Domain(CoreError::ScheduleOverlap(_))));

  // end_time == start_time of the existing window: no overlap.
  s.create_schedule(schedule_input(
    activity_id,
    staff_id,
    ("2024-05-01", "2024-05-10"),
    ("07:00", "09:00"),
  ))
  .await
  .unwrap();
}

#[tokio::test]
async fn editing_a_window_never_conflicts_with_itself() {
  let s = store().await;
  let (activity_id, staff_id) = seed_schedule_deps(&s).await;

  let input = schedule_input(
    activity_id,
    staff_id,
    ("2024-05-01", "2024-05-10"),
    ("09:00", "11:00"),
  );
  let view = s.create_schedule(input.clone()).await.unwrap();

  let updated = s
    .update_schedule(view.window.schedule_id, input)
    .await
    .unwrap();
  assert_eq!(updated.window.schedule_id, view.window.schedule_id);
}

#[tokio::test]
async fn deleting_the_last_window_drops_its_activity_and_enrollments() {
  let s = store().await;
  let (activity_id, staff_id) = seed_schedule_deps(&s).await;
  let view = s
    .create_schedule(schedule_input(
      activity_id,
      staff_id,
      ("2024-05-01", "2024-05-10"),
      ("09:00", "11:00"),
    ))
    .await
    .unwrap();

  let prisoner = s
    .create_prisoner(prisoner_input("P-0001", Gender::Male, None))
    .await
    .unwrap();
  let enrollment = s
    .enroll(EnrollmentInput {
      schedule_id: view.window.schedule_id,
      prisoner_id: prisoner.prisoner.prisoner_id,
    })
    .await
    .unwrap();

  s.delete_schedule(view.window.schedule_id).await.unwrap();

  assert!(s.list_schedules().await.unwrap().is_empty());
  assert!(s.list_activities().await.unwrap().is_empty());
  let err = s
    .set_enrollment_status(
      enrollment.enrollment_id,
      EnrollmentStatus::Completed,
      None,
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Domain(CoreError::EnrollmentNotFound(_))));
}

// ─── Scores ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn score_record_is_seeded_at_intake() {
  let s = store().await;
  let view = s
    .create_prisoner(prisoner_input("P-0001", Gender::Male, None))
    .await
    .unwrap();

  let record = s
    .score_for_prisoner(view.prisoner.prisoner_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(record.score, 0);
}

#[tokio::test]
async fn adjustment_ledger_chains_old_score_to_new_score() {
  let s = store().await;
  let view = s
    .create_prisoner(prisoner_input("P-0001", Gender::Male, None))
    .await
    .unwrap();
  let prisoner_id = view.prisoner.prisoner_id;

  for new_score in [5, 2, 9] {
    s.adjust_score(AdjustmentInput {
      prisoner_id,
      new_score,
      actor_member_id: Some(1),
      remarks: None,
    })
    .await
    .unwrap();
  }

  let record = s.score_for_prisoner(prisoner_id).await.unwrap().unwrap();
  assert_eq!(record.score, 9);

  // Newest first; walked oldest-to-newest the chain has no gaps.
  let mut entries = s.list_adjustments().await.unwrap();
  entries.reverse();
  assert_eq!(entries.len(), 3);
  assert_eq!(entries[0].entry.old_score, 0);
  for pair in entries.windows(2) {
    assert_eq!(pair[0].entry.new_score, pair[1].entry.old_score);
  }
}

#[tokio::test]
async fn adjustment_ledger_survives_prisoner_deletion() {
  let s = store().await;
  let view = s
    .create_prisoner(prisoner_input("P-0001", Gender::Male, None))
    .await
    .unwrap();
  let prisoner_id = view.prisoner.prisoner_id;

  s.adjust_score(AdjustmentInput {
    prisoner_id,
    new_score: 4,
    actor_member_id: None,
    remarks: Some("intake review".into()),
  })
  .await
  .unwrap();

  s.delete_prisoner(prisoner_id).await.unwrap();

  let entries = s.list_adjustments().await.unwrap();
  assert_eq!(entries.len(), 1);
  assert_eq!(entries[0].entry.prisoner_id, prisoner_id);
  // The prisoner join comes back empty once the row is gone.
  assert!(entries[0].inmate_code.is_empty());
}

#[tokio::test]
async fn evaluations_record_without_touching_the_score() {
  let s = store().await;
  let view = s
    .create_prisoner(prisoner_input("P-0001", Gender::Male, None))
    .await
    .unwrap();
  let prisoner_id = view.prisoner.prisoner_id;

  let evaluation = s
    .record_evaluation(EvaluationInput {
      prisoner_id,
      criterion: "conduct".into(),
      actor_member_id: Some(3),
      evaluated_on: date("2024-02-01"),
      notes: None,
    })
    .await
    .unwrap();
  assert_eq!(evaluation.actor_member_id, Some(3));

  let record = s.score_for_prisoner(prisoner_id).await.unwrap().unwrap();
  assert_eq!(record.score, 0);
  assert_eq!(evaluation.score_record_id, record.score_id);
}

// ─── Inventory ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn reduce_clamps_quantity_but_ledger_keeps_requested_delta() {
  let s = store().await;
  let parcel = s
    .create_parcel(
      ParcelInput {
        name:     "Soap".into(),
        quantity: 5,
        kind:     "hygiene".into(),
      },
      Some(1),
    )
    .await
    .unwrap();

  let reduced = s.reduce_stock(parcel.parcel_id, 10, Some(1)).await.unwrap();
  assert_eq!(reduced.quantity, 0);
  assert_eq!(reduced.status, StockStatus::OutOfStock);

  let ops = s.list_operations().await.unwrap();
  assert_eq!(ops[0].entry.operator, OperatorKind::Reduced);
  assert_eq!(ops[0].entry.old_quantity, 5);
  assert_eq!(ops[0].entry.new_quantity, 0);
  // The requested withdrawal, not the applied one.
  assert_eq!(ops[0].entry.change_amount, -10);
}

#[tokio::test]
async fn parcel_edit_snapshots_name_and_kind_in_the_ledger() {
  let s = store().await;
  let parcel = s
    .create_parcel(
      ParcelInput {
        name:     "Soap".into(),
        quantity: 30,
        kind:     "hygiene".into(),
      },
      None,
    )
    .await
    .unwrap();

  s.update_parcel(
    parcel.parcel_id,
    ParcelInput {
      name:     "Soap bars".into(),
      quantity: 25,
      kind:     "supplies".into(),
    },
    Some(2),
  )
  .await
  .unwrap();

  let ops = s.list_operations().await.unwrap();
  let edit = &ops[0].entry;
  assert_eq!(edit.operator, OperatorKind::Edited);
  assert_eq!(edit.old_name.as_deref(), Some("Soap"));
  assert_eq!(edit.new_name.as_deref(), Some("Soap bars"));
  assert_eq!(edit.old_kind.as_deref(), Some("hygiene"));
  assert_eq!(edit.new_kind.as_deref(), Some("supplies"));
  assert_eq!(edit.change_amount, -5);
}

#[tokio::test]
async fn non_positive_stock_amounts_are_rejected() {
  let s = store().await;
  let parcel = s
    .create_parcel(
      ParcelInput {
        name:     "Soap".into(),
        quantity: 5,
        kind:     "hygiene".into(),
      },
      None,
    )
    .await
    .unwrap();

  let err = s.add_stock(parcel.parcel_id, 0, None).await.unwrap_err();
  assert!(matches!(err, Error::Domain(CoreError::InvalidAmount(0))));
  let err = s.reduce_stock(parcel.parcel_id, -3, None).await.unwrap_err();
  assert!(matches!(err, Error::Domain(CoreError::InvalidAmount(-3))));
}

// ─── Rooms ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn second_occupant_fills_a_room_and_departure_vacates_it() {
  let s = store().await;
  let room = s.add_room("M-101".into()).await.unwrap();

  let first = s
    .create_prisoner(prisoner_input("P-0001", Gender::Male, Some(room.room_id)))
    .await
    .unwrap();
  assert_eq!(first.room.as_ref().unwrap().status, RoomStatus::Vacant);

  let second = s
    .create_prisoner(prisoner_input("P-0002", Gender::Male, Some(room.room_id)))
    .await
    .unwrap();
  assert_eq!(second.room.as_ref().unwrap().status, RoomStatus::Full);

  let err = s
    .create_prisoner(prisoner_input("P-0003", Gender::Male, Some(room.room_id)))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Domain(CoreError::RoomFull(_))));

  s.delete_prisoner(first.prisoner.prisoner_id).await.unwrap();
  let rooms = s.list_rooms().await.unwrap();
  assert_eq!(rooms[0].status, RoomStatus::Vacant);
}

#[tokio::test]
async fn moving_rooms_recomputes_both_statuses() {
  let s = store().await;
  let old_room = s.add_room("M-101".into()).await.unwrap();
  let new_room = s.add_room("M-102".into()).await.unwrap();

  s.create_prisoner(prisoner_input("P-0001", Gender::Male, Some(old_room.room_id)))
    .await
    .unwrap();
  let mover = s
    .create_prisoner(prisoner_input("P-0002", Gender::Male, Some(old_room.room_id)))
    .await
    .unwrap();

  let mut input = prisoner_input("P-0002", Gender::Male, Some(new_room.room_id));
  input.citizen_id = mover.prisoner.citizen_id.clone();
  let moved = s
    .update_prisoner(mover.prisoner.prisoner_id, input)
    .await
    .unwrap();
  assert_eq!(moved.prisoner.room_id, Some(new_room.room_id));

  let rooms = s.list_rooms().await.unwrap();
  // Ordered by name: M-101 first.
  assert_eq!(rooms[0].status, RoomStatus::Vacant);
  assert_eq!(rooms[1].status, RoomStatus::Vacant);
}

#[tokio::test]
async fn released_prisoners_do_not_occupy_their_room() {
  let s = store().await;
  let room = s.add_room("M-101".into()).await.unwrap();

  let mut input = prisoner_input("P-0001", Gender::Male, Some(room.room_id));
  input.release_date = Some(date("2024-06-01"));
  s.create_prisoner(input).await.unwrap();
  s.create_prisoner(prisoner_input("P-0002", Gender::Male, Some(room.room_id)))
    .await
    .unwrap();

  // One released + one held: still below capacity.
  let rooms = s.list_rooms().await.unwrap();
  assert_eq!(rooms[0].status, RoomStatus::Vacant);
}

#[tokio::test]
async fn malformed_inmate_code_never_reaches_the_sequence() {
  let s = store().await;

  let err = s
    .create_prisoner(prisoner_input("banana", Gender::Male, None))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Domain(CoreError::InvalidInmateCode(_))
  ));

  // Nothing was written, so code assignment still starts fresh.
  assert!(s.list_prisoners().await.unwrap().is_empty());
  assert_eq!(s.next_inmate_code().await.unwrap(), "P-0001");
}

#[tokio::test]
async fn duplicate_inmate_code_is_a_conflict() {
  let s = store().await;
  s.create_prisoner(prisoner_input("P-0001", Gender::Male, None))
    .await
    .unwrap();

  let err = s
    .create_prisoner(prisoner_input("P-0001", Gender::Male, None))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Domain(CoreError::DuplicateInmateCode(_))
  ));
  assert_eq!(s.list_prisoners().await.unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_room_name_is_a_conflict() {
  let s = store().await;
  s.add_room("M-101".into()).await.unwrap();

  let err = s.add_room("M-101".into()).await.unwrap_err();
  assert!(matches!(err, Error::Domain(CoreError::DuplicateRoomName(_))));
  assert_eq!(s.list_rooms().await.unwrap().len(), 1);
}

#[tokio::test]
async fn rejected_intake_writes_nothing() {
  let s = store().await;
  let room = s.add_room("F-201".into()).await.unwrap();

  let err = s
    .create_prisoner(prisoner_input("P-0001", Gender::Male, Some(room.room_id)))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Domain(CoreError::GenderRoomMismatch { .. })
  ));

  assert!(s.list_prisoners().await.unwrap().is_empty());
  assert_eq!(s.next_inmate_code().await.unwrap(), "P-0001");
}

// ─── Visitations ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn slot_conflict_scan_excludes_the_booking_itself() {
  let s = store().await;
  let (_, staff_id) = seed_schedule_deps(&s).await;
  let prisoner = s
    .create_prisoner(prisoner_input("P-0001", Gender::Male, None))
    .await
    .unwrap();
  let prisoner_id = prisoner.prisoner.prisoner_id;

  let booked = s
    .book_visitation(visitation_input(
      prisoner_id,
      staff_id,
      "2024-06-01",
      "2200000000001",
    ))
    .await
    .unwrap();

  // Re-saving the booking with its own date and slot is not a conflict.
  s.update_visitation(
    booked.visitation.visitation_id,
    visitation_input(prisoner_id, staff_id, "2024-06-01", "2200000000001"),
    None,
  )
  .await
  .unwrap();

  let err = s
    .book_visitation(visitation_input(
      prisoner_id,
      staff_id,
      "2024-06-01",
      "2200000000002",
    ))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Domain(CoreError::SlotTaken { .. })));
}

#[tokio::test]
async fn visitors_are_deduplicated_by_citizen_id() {
  let s = store().await;
  let (_, staff_id) = seed_schedule_deps(&s).await;
  let prisoner = s
    .create_prisoner(prisoner_input("P-0001", Gender::Male, None))
    .await
    .unwrap();
  let prisoner_id = prisoner.prisoner.prisoner_id;

  let first = s
    .book_visitation(visitation_input(
      prisoner_id,
      staff_id,
      "2024-06-01",
      "2200000000001",
    ))
    .await
    .unwrap();
  let second = s
    .book_visitation(visitation_input(
      prisoner_id,
      staff_id,
      "2024-06-02",
      "2200000000001",
    ))
    .await
    .unwrap();

  assert_eq!(first.visitor.visitor_id, second.visitor.visitor_id);
}

#[tokio::test]
async fn relatives_cannot_touch_foreign_bookings() {
  let s = store().await;
  let (_, staff_id) = seed_schedule_deps(&s).await;
  let prisoner = s
    .create_prisoner(prisoner_input("P-0001", Gender::Male, None))
    .await
    .unwrap();
  let prisoner_id = prisoner.prisoner.prisoner_id;

  let booked = s
    .book_visitation(visitation_input(
      prisoner_id,
      staff_id,
      "2024-06-01",
      "2200000000001",
    ))
    .await
    .unwrap();

  let stranger = Identity {
    member_id:  7,
    rank:       Rank::Relative,
    citizen_id: "3300000000009".into(),
  };
  let err = s
    .delete_visitation(booked.visitation.visitation_id, Some(stranger.clone()))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Domain(CoreError::Forbidden)));

  // Staff ranks are not restricted by ownership.
  let staff = Identity {
    member_id:  1,
    rank:       Rank::Staff,
    citizen_id: "9900000000001".into(),
  };
  assert!(s.list_visitations(Some(stranger)).await.unwrap().is_empty());
  assert_eq!(s.list_visitations(Some(staff)).await.unwrap().len(), 1);
}
