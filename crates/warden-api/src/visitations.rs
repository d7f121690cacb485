//! Handlers for `/visitations` and `/timeslots` endpoints.
//!
//! The session identity (if any) is forwarded to the store: relative-ranked
//! callers see only their own bookings and may only edit or cancel those.

use std::sync::Arc;

use axum::{
  Extension, Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use warden_core::{
  identity::Identity,
  store::FacilityStore,
  visitation::{TimeSlot, VisitationInput, VisitationView},
};

use crate::error::ApiError;

fn caller(identity: Option<Extension<Identity>>) -> Option<Identity> {
  identity.map(|Extension(id)| id)
}

/// `GET /visitations`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  identity: Option<Extension<Identity>>,
) -> Result<Json<Vec<VisitationView>>, ApiError>
where
  S: FacilityStore,
{
  let visitations = store
    .list_visitations(caller(identity))
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(visitations))
}

/// `POST /visitations` — returns 201, or 409 when the (date, slot) pair is
/// taken.
pub async fn book<S>(
  State(store): State<Arc<S>>,
  Json(input): Json<VisitationInput>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FacilityStore,
{
  let view =
    store.book_visitation(input).await.map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(view)))
}

/// `PUT /visitations/:id` — 403 for a relative editing someone else's
/// booking.
pub async fn update<S>(
  State(store): State<Arc<S>>,
  identity: Option<Extension<Identity>>,
  Path(visitation_id): Path<i64>,
  Json(input): Json<VisitationInput>,
) -> Result<Json<VisitationView>, ApiError>
where
  S: FacilityStore,
{
  let view = store
    .update_visitation(visitation_id, input, caller(identity))
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(view))
}

/// `DELETE /visitations/:id`
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  identity: Option<Extension<Identity>>,
  Path(visitation_id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: FacilityStore,
{
  store
    .delete_visitation(visitation_id, caller(identity))
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /timeslots` — the fixed daily visiting windows.
pub async fn list_time_slots<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<TimeSlot>>, ApiError>
where
  S: FacilityStore,
{
  let slots = store.list_time_slots().await.map_err(ApiError::from_store)?;
  Ok(Json(slots))
}
