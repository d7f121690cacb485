//! Handlers for score, adjustment, and evaluation endpoints.
//!
//! Adjustments and evaluations record an actor. An explicit
//! `actor_member_id` in the payload wins; otherwise the session identity's
//! member id is used, and an anonymous request records no actor.

use std::sync::Arc;

use axum::{
  Extension, Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use warden_core::{
  identity::Identity,
  score::{
    AdjustmentInput, AdjustmentView, BehaviorEvaluation, EvaluationInput,
    ScoreRecord,
  },
  store::FacilityStore,
};

use crate::error::ApiError;

/// `GET /scores/:prisoner_id`
pub async fn get_score<S>(
  State(store): State<Arc<S>>,
  Path(prisoner_id): Path<i64>,
) -> Result<Json<ScoreRecord>, ApiError>
where
  S: FacilityStore,
{
  let record = store
    .score_for_prisoner(prisoner_id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("no score record for prisoner {prisoner_id}"))
    })?;
  Ok(Json(record))
}

/// `POST /adjustments` — sets the live score and appends the ledger entry in
/// one transaction; returns 201 + the entry.
pub async fn adjust<S>(
  State(store): State<Arc<S>>,
  identity: Option<Extension<Identity>>,
  Json(mut input): Json<AdjustmentInput>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FacilityStore,
{
  if input.actor_member_id.is_none() {
    input.actor_member_id = identity.map(|Extension(id)| id.member_id);
  }
  let entry = store.adjust_score(input).await.map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(entry)))
}

/// `GET /adjustments` — the full ledger, newest first.
pub async fn list_adjustments<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<AdjustmentView>>, ApiError>
where
  S: FacilityStore,
{
  let entries =
    store.list_adjustments().await.map_err(ApiError::from_store)?;
  Ok(Json(entries))
}

/// `POST /evaluations` — record-only; never changes the live score.
pub async fn record_evaluation<S>(
  State(store): State<Arc<S>>,
  identity: Option<Extension<Identity>>,
  Json(mut input): Json<EvaluationInput>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FacilityStore,
{
  if input.actor_member_id.is_none() {
    input.actor_member_id = identity.map(|Extension(id)| id.member_id);
  }
  let evaluation =
    store.record_evaluation(input).await.map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(evaluation)))
}

/// `GET /evaluations`
pub async fn list_evaluations<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<BehaviorEvaluation>>, ApiError>
where
  S: FacilityStore,
{
  let evaluations =
    store.list_evaluations().await.map_err(ApiError::from_store)?;
  Ok(Json(evaluations))
}
