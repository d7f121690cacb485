//! End-to-end router tests against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt as _;
use warden_core::identity::{Identity, Rank};
use warden_store_sqlite::SqliteStore;

use crate::api_router;

async fn router() -> Router<()> {
  let store = SqliteStore::open_in_memory().await.expect("in-memory store");
  api_router(Arc::new(store))
}

async fn send(
  app: &Router<()>,
  method: &str,
  uri: &str,
  body: Option<Value>,
  identity: Option<Identity>,
) -> (StatusCode, Value) {
  let builder = Request::builder().method(method).uri(uri);
  let mut req = match body {
    Some(v) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(v.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };
  if let Some(identity) = identity {
    req.extensions_mut().insert(identity);
  }

  let resp = app.clone().oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

fn staff_identity() -> Identity {
  Identity {
    member_id:  99,
    rank:       Rank::Staff,
    citizen_id: "9900000000001".into(),
  }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

async fn add_staff(app: &Router<()>) -> i64 {
  let (status, body) = send(
    app,
    "POST",
    "/staff",
    Some(json!({ "first_name": "Ana", "last_name": "Cruz" })),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  body["staff_id"].as_i64().unwrap()
}

async fn add_activity(app: &Router<()>, name: &str) -> i64 {
  let (status, body) = send(
    app,
    "POST",
    "/activities",
    Some(json!({ "name": name, "location": "Hall B" })),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  body["activity_id"].as_i64().unwrap()
}

fn schedule_body(
  activity_id: i64,
  staff_id: i64,
  dates: (&str, &str),
  times: (&str, &str),
) -> Value {
  json!({
    "activity_id":      activity_id,
    "staff_id":         staff_id,
    "max_participants": 10,
    "start_date":       dates.0,
    "end_date":         dates.1,
    "start_time":       times.0,
    "end_time":         times.1,
  })
}

async fn add_prisoner(app: &Router<()>, room_id: Option<i64>) -> i64 {
  let (status, body) = send(
    app,
    "POST",
    "/prisoners",
    Some(json!({
      "citizen_id":   "1100000000001",
      "first_name":   "Joe",
      "last_name":    "Doe",
      "gender":       "male",
      "birthday":     "1990-01-01",
      "case_code":    "C-9",
      "entry_date":   "2024-01-01",
      "release_date": null,
      "room_id":      room_id,
    })),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  body["prisoner_id"].as_i64().unwrap()
}

fn visitation_body(prisoner_id: i64, staff_id: i64, citizen_id: &str) -> Value {
  json!({
    "visit_date":         "2024-06-01",
    "time_slot_id":       1,
    "prisoner_id":        prisoner_id,
    "staff_id":           staff_id,
    "relationship":       "mother",
    "status":             "booked",
    "visitor_first_name": "Mary",
    "visitor_last_name":  "Doe",
    "visitor_citizen_id": citizen_id,
  })
}

// ─── Schedules ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn schedule_roundtrip_with_joined_view() {
  let app = router().await;
  let staff_id = add_staff(&app).await;
  let activity_id = add_activity(&app, "Woodshop").await;

  let (status, created) = send(
    &app,
    "POST",
    "/schedules",
    Some(schedule_body(
      activity_id,
      staff_id,
      ("2024-05-01", "2024-05-10"),
      ("09:00", "11:00"),
    )),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(created["activity"]["name"], "Woodshop");
  assert_eq!(created["staff"]["first_name"], "Ana");

  let (status, listed) = send(&app, "GET", "/schedules", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(listed.as_array().unwrap().len(), 1);
  assert_eq!(listed[0]["schedule_id"], created["schedule_id"]);
}

#[tokio::test]
async fn overlapping_schedule_is_a_conflict() {
  let app = router().await;
  let staff_id = add_staff(&app).await;
  let activity_id = add_activity(&app, "Woodshop").await;

  let (status, _) = send(
    &app,
    "POST",
    "/schedules",
    Some(schedule_body(
      activity_id,
      staff_id,
      ("2024-05-01", "2024-05-10"),
      ("09:00", "11:00"),
    )),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);

  // Same dates, overlapping times.
  let (status, body) = send(
    &app,
    "POST",
    "/schedules",
    Some(schedule_body(
      activity_id,
      staff_id,
      ("2024-05-05", "2024-05-20"),
      ("10:00", "12:00"),
    )),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT, "{body}");

  // Touching time boundary is fine.
  let (status, _) = send(
    &app,
    "POST",
    "/schedules",
    Some(schedule_body(
      activity_id,
      staff_id,
      ("2024-05-01", "2024-05-10"),
      ("11:00", "12:00"),
    )),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn resaving_a_schedule_unchanged_succeeds() {
  let app = router().await;
  let staff_id = add_staff(&app).await;
  let activity_id = add_activity(&app, "Woodshop").await;

  let body = schedule_body(
    activity_id,
    staff_id,
    ("2024-05-01", "2024-05-10"),
    ("09:00", "11:00"),
  );
  let (status, created) =
    send(&app, "POST", "/schedules", Some(body.clone()), None).await;
  assert_eq!(status, StatusCode::CREATED);

  let schedule_id = created["schedule_id"].as_i64().unwrap();
  let (status, _) = send(
    &app,
    "PUT",
    &format!("/schedules/{schedule_id}"),
    Some(body),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn malformed_time_is_a_bad_request() {
  let app = router().await;
  let staff_id = add_staff(&app).await;
  let activity_id = add_activity(&app, "Woodshop").await;

  let (status, _) = send(
    &app,
    "POST",
    "/schedules",
    Some(schedule_body(
      activity_id,
      staff_id,
      ("2024-05-01", "2024-05-10"),
      ("9:00", "11:00"),
    )),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn scheduling_an_unknown_activity_is_not_found() {
  let app = router().await;
  let staff_id = add_staff(&app).await;

  let (status, _) = send(
    &app,
    "POST",
    "/schedules",
    Some(schedule_body(
      4242,
      staff_id,
      ("2024-05-01", "2024-05-10"),
      ("09:00", "11:00"),
    )),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_an_activity_with_schedules_conflicts() {
  let app = router().await;
  let staff_id = add_staff(&app).await;
  let activity_id = add_activity(&app, "Woodshop").await;
  let (status, _) = send(
    &app,
    "POST",
    "/schedules",
    Some(schedule_body(
      activity_id,
      staff_id,
      ("2024-05-01", "2024-05-10"),
      ("09:00", "11:00"),
    )),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);

  let (status, _) = send(
    &app,
    "DELETE",
    &format!("/activities/{activity_id}"),
    None,
    None,
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
}

// ─── Enrollments ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_enrollment_is_a_conflict() {
  let app = router().await;
  let staff_id = add_staff(&app).await;
  let activity_id = add_activity(&app, "Woodshop").await;
  let (_, schedule) = send(
    &app,
    "POST",
    "/schedules",
    Some(schedule_body(
      activity_id,
      staff_id,
      ("2024-05-01", "2024-05-10"),
      ("09:00", "11:00"),
    )),
    None,
  )
  .await;
  let schedule_id = schedule["schedule_id"].as_i64().unwrap();
  let prisoner_id = add_prisoner(&app, None).await;

  let body = json!({ "schedule_id": schedule_id, "prisoner_id": prisoner_id });
  let (status, _) =
    send(&app, "POST", "/enrollments", Some(body.clone()), None).await;
  assert_eq!(status, StatusCode::CREATED);

  let (status, _) = send(&app, "POST", "/enrollments", Some(body), None).await;
  assert_eq!(status, StatusCode::CONFLICT);
}

// ─── Prisoners ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn intake_assigns_sequential_inmate_codes() {
  let app = router().await;

  let (status, first) = send(
    &app,
    "POST",
    "/prisoners",
    Some(json!({
      "citizen_id": "1100000000001",
      "first_name": "Joe",
      "last_name":  "Doe",
      "gender":     "male",
      "birthday":   "1990-01-01",
      "case_code":  "C-9",
      "entry_date": "2024-01-01",
      "room_id":    null,
    })),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(first["inmate_code"], "P-0001");

  let (status, next) = send(&app, "GET", "/prisoners/next-code", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(next["inmate_code"], "P-0002");
}

#[tokio::test]
async fn client_supplied_inmate_codes_are_validated_and_unique() {
  let app = router().await;
  let body = |code: &str| {
    json!({
      "inmate_code": code,
      "citizen_id":  "1100000000001",
      "first_name":  "Joe",
      "last_name":   "Doe",
      "gender":      "male",
      "birthday":    "1990-01-01",
      "case_code":   "C-9",
      "entry_date":  "2024-01-01",
      "room_id":     null,
    })
  };

  let (status, _) =
    send(&app, "POST", "/prisoners", Some(body("banana")), None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) =
    send(&app, "POST", "/prisoners", Some(body("P-0007")), None).await;
  assert_eq!(status, StatusCode::CREATED);

  let (status, _) =
    send(&app, "POST", "/prisoners", Some(body("P-0007")), None).await;
  assert_eq!(status, StatusCode::CONFLICT);

  // The rejected bodies left the sequence intact.
  let (_, next) = send(&app, "GET", "/prisoners/next-code", None, None).await;
  assert_eq!(next["inmate_code"], "P-0008");
}

#[tokio::test]
async fn duplicate_room_name_is_a_conflict() {
  let app = router().await;
  let body = json!({ "name": "M-101" });
  let (status, _) =
    send(&app, "POST", "/rooms", Some(body.clone()), None).await;
  assert_eq!(status, StatusCode::CREATED);
  let (status, _) = send(&app, "POST", "/rooms", Some(body), None).await;
  assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn gender_room_mismatch_is_a_bad_request() {
  let app = router().await;
  let (status, room) = send(
    &app,
    "POST",
    "/rooms",
    Some(json!({ "name": "F-201" })),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  let room_id = room["room_id"].as_i64().unwrap();

  let (status, _) = send(
    &app,
    "POST",
    "/prisoners",
    Some(json!({
      "citizen_id": "1100000000001",
      "first_name": "Joe",
      "last_name":  "Doe",
      "gender":     "male",
      "birthday":   "1990-01-01",
      "case_code":  "C-9",
      "entry_date": "2024-01-01",
      "room_id":    room_id,
    })),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  // The failed intake wrote nothing: the sequence is untouched.
  let (_, next) = send(&app, "GET", "/prisoners/next-code", None, None).await;
  assert_eq!(next["inmate_code"], "P-0001");
}

// ─── Scores ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn adjustment_actor_falls_back_to_session_identity() {
  let app = router().await;
  let prisoner_id = add_prisoner(&app, None).await;

  let (status, entry) = send(
    &app,
    "POST",
    "/adjustments",
    Some(json!({ "prisoner_id": prisoner_id, "new_score": 5 })),
    Some(staff_identity()),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(entry["actor_member_id"], 99);
  assert_eq!(entry["old_score"], 0);
  assert_eq!(entry["new_score"], 5);

  // An explicit payload actor wins over the session.
  let (_, entry) = send(
    &app,
    "POST",
    "/adjustments",
    Some(json!({
      "prisoner_id":     prisoner_id,
      "new_score":       3,
      "actor_member_id": 7,
    })),
    Some(staff_identity()),
  )
  .await;
  assert_eq!(entry["actor_member_id"], 7);

  let (status, listed) = send(&app, "GET", "/adjustments", None, None).await;
  assert_eq!(status, StatusCode::OK);
  let listed = listed.as_array().unwrap();
  assert_eq!(listed.len(), 2);
  // Newest first, joined with the prisoner.
  assert_eq!(listed[0]["new_score"], 3);
  assert_eq!(listed[0]["inmate_code"], "P-0001");
}

#[tokio::test]
async fn missing_score_record_is_not_found() {
  let app = router().await;
  let (status, _) = send(&app, "GET", "/scores/4242", None, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ─── Inventory ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn parcel_mutations_append_to_the_ledger() {
  let app = router().await;

  let (status, parcel) = send(
    &app,
    "POST",
    "/parcels",
    Some(json!({ "name": "Soap", "quantity": 30, "kind": "hygiene" })),
    Some(staff_identity()),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(parcel["status"], "in_stock");
  let parcel_id = parcel["parcel_id"].as_i64().unwrap();

  let (status, parcel) = send(
    &app,
    "POST",
    &format!("/parcels/{parcel_id}/reduce"),
    Some(json!({ "amount": 25 })),
    Some(staff_identity()),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(parcel["quantity"], 5);
  assert_eq!(parcel["status"], "low");

  let (status, ops) = send(&app, "GET", "/operations", None, None).await;
  assert_eq!(status, StatusCode::OK);
  let ops = ops.as_array().unwrap();
  assert_eq!(ops.len(), 2);
  assert_eq!(ops[0]["operator"], "reduced");
  assert_eq!(ops[0]["change_amount"], -25);
  assert_eq!(ops[0]["actor_member_id"], 99);
  assert_eq!(ops[0]["parcel_name"], "Soap");
  assert_eq!(ops[1]["operator"], "created");
}

#[tokio::test]
async fn duplicate_parcel_name_is_a_conflict() {
  let app = router().await;
  let body = json!({ "name": "Soap", "quantity": 10, "kind": "hygiene" });
  let (status, _) =
    send(&app, "POST", "/parcels", Some(body.clone()), None).await;
  assert_eq!(status, StatusCode::CREATED);
  let (status, _) = send(&app, "POST", "/parcels", Some(body), None).await;
  assert_eq!(status, StatusCode::CONFLICT);
}

// ─── Visitations ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn double_booking_a_slot_is_a_conflict() {
  let app = router().await;
  let staff_id = add_staff(&app).await;
  let prisoner_id = add_prisoner(&app, None).await;

  let (status, _) = send(
    &app,
    "POST",
    "/visitations",
    Some(visitation_body(prisoner_id, staff_id, "2200000000001")),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);

  let (status, _) = send(
    &app,
    "POST",
    "/visitations",
    Some(visitation_body(prisoner_id, staff_id, "2200000000002")),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn relatives_see_and_touch_only_their_own_bookings() {
  let app = router().await;
  let staff_id = add_staff(&app).await;
  let prisoner_id = add_prisoner(&app, None).await;

  let (_, booked) = send(
    &app,
    "POST",
    "/visitations",
    Some(visitation_body(prisoner_id, staff_id, "2200000000001")),
    None,
  )
  .await;
  let visitation_id = booked["visitation_id"].as_i64().unwrap();

  let stranger = Identity {
    member_id:  7,
    rank:       Rank::Relative,
    citizen_id: "3300000000009".into(),
  };
  let (status, listed) =
    send(&app, "GET", "/visitations", None, Some(stranger.clone())).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(listed.as_array().unwrap().len(), 0);

  let (status, _) = send(
    &app,
    "DELETE",
    &format!("/visitations/{visitation_id}"),
    None,
    Some(stranger),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let owner = Identity {
    member_id:  8,
    rank:       Rank::Relative,
    citizen_id: "2200000000001".into(),
  };
  let (status, listed) =
    send(&app, "GET", "/visitations", None, Some(owner.clone())).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(listed.as_array().unwrap().len(), 1);

  let (status, _) = send(
    &app,
    "DELETE",
    &format!("/visitations/{visitation_id}"),
    None,
    Some(owner),
  )
  .await;
  assert_eq!(status, StatusCode::NO_CONTENT);
}
