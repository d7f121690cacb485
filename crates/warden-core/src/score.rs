//! Behavior scores and their audit trail.
//!
//! The live score lives in a single [`ScoreRecord`] row per prisoner. Every
//! change through the adjustment path also appends an immutable
//! [`AdjustmentEntry`] snapshotting the transition; the two writes share one
//! transaction, so the ledger has no gaps: ordered by row id, each entry's
//! `new_score` is the next entry's `old_score`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The live aggregate score. One row per prisoner; never deleted while the
/// prisoner exists, backfilled at 0 if missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRecord {
  pub score_id:    i64,
  pub prisoner_id: i64,
  pub score:       i64,
}

/// An immutable audit row recording one score transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustmentEntry {
  pub adjustment_id:   i64,
  pub old_score:       i64,
  pub new_score:       i64,
  pub prisoner_id:     i64,
  pub score_record_id: i64,
  /// Member who made the change; absent when the request carried no
  /// identity and the payload named no actor.
  pub actor_member_id: Option<i64>,
  pub recorded_at:     DateTime<Utc>,
  pub remarks:         Option<String>,
}

/// Input to [`crate::store::FacilityStore::adjust_score`].
///
/// The caller resolves the actor before invoking the store: an explicit
/// payload actor wins, otherwise the session identity's member id is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustmentInput {
  pub prisoner_id:     i64,
  pub new_score:       i64,
  pub actor_member_id: Option<i64>,
  pub remarks:         Option<String>,
}

/// An adjustment joined with its prisoner, newest first, for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustmentView {
  #[serde(flatten)]
  pub entry:         AdjustmentEntry,
  pub inmate_code:   String,
  pub prisoner_name: String,
}

// ─── Evaluations ─────────────────────────────────────────────────────────────

/// A record-only annotation against a score record. Evaluations never change
/// the live score; the adjustment path is the only score mutator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorEvaluation {
  pub evaluation_id:   i64,
  pub score_record_id: i64,
  pub prisoner_id:     i64,
  pub criterion:       String,
  pub actor_member_id: Option<i64>,
  pub evaluated_on:    NaiveDate,
  pub notes:           Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationInput {
  pub prisoner_id:     i64,
  pub criterion:       String,
  pub actor_member_id: Option<i64>,
  pub evaluated_on:    NaiveDate,
  pub notes:           Option<String>,
}
