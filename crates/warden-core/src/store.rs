//! The `FacilityStore` trait.
//!
//! Implemented by storage backends (e.g. `warden-store-sqlite`). The HTTP
//! layer depends on this abstraction, not on any concrete backend.
//!
//! Every operation that touches more than one row (window + enrollments,
//! live value + ledger entry, prisoner + room status) is required to be
//! atomic: either all of its writes persist or none do. Conflict pre-checks
//! run inside the same transaction as the write they guard.

use std::future::Future;

use crate::{
  identity::Identity,
  inventory::{OperationView, Parcel, ParcelInput},
  prisoner::{PrisonerInput, PrisonerView},
  schedule::{
    Activity, ActivityInput, Enrollment, EnrollmentInput, EnrollmentStatus,
    ScheduleInput, ScheduleView,
  },
  score::{
    AdjustmentEntry, AdjustmentInput, AdjustmentView, BehaviorEvaluation,
    EvaluationInput, ScoreRecord,
  },
  staff::{Staff, StaffInput},
  visitation::{TimeSlot, VisitationInput, VisitationView},
};

/// Abstraction over a facility store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait FacilityStore: Send + Sync {
  type Error: std::error::Error + crate::DomainError + Send + Sync + 'static;

  // ── Activities ────────────────────────────────────────────────────────

  fn create_activity(
    &self,
    input: ActivityInput,
  ) -> impl Future<Output = Result<Activity, Self::Error>> + Send + '_;

  fn list_activities(
    &self,
  ) -> impl Future<Output = Result<Vec<Activity>, Self::Error>> + Send + '_;

  fn update_activity(
    &self,
    activity_id: i64,
    input: ActivityInput,
  ) -> impl Future<Output = Result<Activity, Self::Error>> + Send + '_;

  /// Fails with a conflict while any schedule window references the
  /// activity.
  fn delete_activity(
    &self,
    activity_id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Schedule windows ──────────────────────────────────────────────────

  /// Create a window, rejecting it if it overlaps any persisted window of
  /// the same activity.
  fn create_schedule(
    &self,
    input: ScheduleInput,
  ) -> impl Future<Output = Result<ScheduleView, Self::Error>> + Send + '_;

  fn list_schedules(
    &self,
  ) -> impl Future<Output = Result<Vec<ScheduleView>, Self::Error>> + Send + '_;

  /// Edit a window; the overlap scan excludes the window's own id, so
  /// re-saving a window unchanged always succeeds.
  fn update_schedule(
    &self,
    schedule_id: i64,
    input: ScheduleInput,
  ) -> impl Future<Output = Result<ScheduleView, Self::Error>> + Send + '_;

  /// Delete a window and its enrollments; drops the parent activity too if
  /// this was its last window.
  fn delete_schedule(
    &self,
    schedule_id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Enrollments ───────────────────────────────────────────────────────

  /// Enroll a prisoner in a window; duplicate (schedule, prisoner) pairs
  /// fail with a conflict and insert nothing.
  fn enroll(
    &self,
    input: EnrollmentInput,
  ) -> impl Future<Output = Result<Enrollment, Self::Error>> + Send + '_;

  fn set_enrollment_status(
    &self,
    enrollment_id: i64,
    status: EnrollmentStatus,
    remarks: Option<String>,
  ) -> impl Future<Output = Result<Enrollment, Self::Error>> + Send + '_;

  fn delete_enrollment(
    &self,
    enrollment_id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Staff / rooms ─────────────────────────────────────────────────────

  fn add_staff(
    &self,
    input: StaffInput,
  ) -> impl Future<Output = Result<Staff, Self::Error>> + Send + '_;

  fn list_staff(
    &self,
  ) -> impl Future<Output = Result<Vec<Staff>, Self::Error>> + Send + '_;

  fn add_room(
    &self,
    name: String,
  ) -> impl Future<Output = Result<crate::room::Room, Self::Error>> + Send + '_;

  fn list_rooms(
    &self,
  ) -> impl Future<Output = Result<Vec<crate::room::Room>, Self::Error>> + Send + '_;

  // ── Prisoners ─────────────────────────────────────────────────────────

  /// Insert a prisoner, seed their score record at 0, and recompute the
  /// assigned room's occupancy status, all in one transaction. Gender/room
  /// compatibility and room capacity are checked first.
  fn create_prisoner(
    &self,
    input: PrisonerInput,
  ) -> impl Future<Output = Result<PrisonerView, Self::Error>> + Send + '_;

  fn get_prisoner(
    &self,
    prisoner_id: i64,
  ) -> impl Future<Output = Result<Option<PrisonerView>, Self::Error>> + Send + '_;

  fn list_prisoners(
    &self,
  ) -> impl Future<Output = Result<Vec<PrisonerView>, Self::Error>> + Send + '_;

  /// Update a prisoner; on a room move, both the old and the new room's
  /// occupancy status are recomputed inside the same transaction.
  fn update_prisoner(
    &self,
    prisoner_id: i64,
    input: PrisonerInput,
  ) -> impl Future<Output = Result<PrisonerView, Self::Error>> + Send + '_;

  fn delete_prisoner(
    &self,
    prisoner_id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The next unused `P-NNNN` inmate code.
  fn next_inmate_code(
    &self,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + '_;

  // ── Scores ────────────────────────────────────────────────────────────

  fn score_for_prisoner(
    &self,
    prisoner_id: i64,
  ) -> impl Future<Output = Result<Option<ScoreRecord>, Self::Error>> + Send + '_;

  /// Set a prisoner's score and append the audit ledger entry atomically.
  /// A missing score record is backfilled with old score 0.
  fn adjust_score(
    &self,
    input: AdjustmentInput,
  ) -> impl Future<Output = Result<AdjustmentEntry, Self::Error>> + Send + '_;

  /// Full adjustment history, newest first.
  fn list_adjustments(
    &self,
  ) -> impl Future<Output = Result<Vec<AdjustmentView>, Self::Error>> + Send + '_;

  fn record_evaluation(
    &self,
    input: EvaluationInput,
  ) -> impl Future<Output = Result<BehaviorEvaluation, Self::Error>> + Send + '_;

  fn list_evaluations(
    &self,
  ) -> impl Future<Output = Result<Vec<BehaviorEvaluation>, Self::Error>> + Send + '_;

  // ── Inventory ─────────────────────────────────────────────────────────

  /// Create a parcel (unique name) and its `created` ledger entry.
  fn create_parcel(
    &self,
    input: ParcelInput,
    actor_member_id: Option<i64>,
  ) -> impl Future<Output = Result<Parcel, Self::Error>> + Send + '_;

  fn list_parcels(
    &self,
  ) -> impl Future<Output = Result<Vec<Parcel>, Self::Error>> + Send + '_;

  /// Edit name/quantity/kind; the `edited` ledger entry snapshots the old
  /// and new name and kind.
  fn update_parcel(
    &self,
    parcel_id: i64,
    input: ParcelInput,
    actor_member_id: Option<i64>,
  ) -> impl Future<Output = Result<Parcel, Self::Error>> + Send + '_;

  fn add_stock(
    &self,
    parcel_id: i64,
    amount: i64,
    actor_member_id: Option<i64>,
  ) -> impl Future<Output = Result<Parcel, Self::Error>> + Send + '_;

  /// Withdraw stock, clamping the quantity at zero. The ledger records the
  /// requested delta even when the clamp applied a smaller one.
  fn reduce_stock(
    &self,
    parcel_id: i64,
    amount: i64,
    actor_member_id: Option<i64>,
  ) -> impl Future<Output = Result<Parcel, Self::Error>> + Send + '_;

  fn list_operations(
    &self,
  ) -> impl Future<Output = Result<Vec<OperationView>, Self::Error>> + Send + '_;

  // ── Visitations ───────────────────────────────────────────────────────

  /// Book a visit: find or create the visitor by citizen id, then insert
  /// unless the (date, slot) pair is already taken.
  fn book_visitation(
    &self,
    input: VisitationInput,
  ) -> impl Future<Output = Result<VisitationView, Self::Error>> + Send + '_;

  /// All visitations, newest first. Relative-ranked callers see only the
  /// bookings of their own visitor row (matched by citizen id).
  fn list_visitations(
    &self,
    caller: Option<Identity>,
  ) -> impl Future<Output = Result<Vec<VisitationView>, Self::Error>> + Send + '_;

  /// Edit a booking; the slot conflict scan excludes the booking's own id.
  /// Relatives may only edit their own bookings.
  fn update_visitation(
    &self,
    visitation_id: i64,
    input: VisitationInput,
    caller: Option<Identity>,
  ) -> impl Future<Output = Result<VisitationView, Self::Error>> + Send + '_;

  /// Cancel a booking. Relatives may only cancel their own.
  fn delete_visitation(
    &self,
    visitation_id: i64,
    caller: Option<Identity>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn list_time_slots(
    &self,
  ) -> impl Future<Output = Result<Vec<TimeSlot>, Self::Error>> + Send + '_;
}
