//! Handlers for `/prisoners` endpoints.
//!
//! Intake (`POST /prisoners`) accepts an empty `inmate_code` and assigns the
//! next code in the `P-NNNN` sequence; `GET /prisoners/next-code` previews
//! it for intake forms.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde_json::json;
use warden_core::{
  prisoner::{PrisonerInput, PrisonerView},
  store::FacilityStore,
};

use crate::error::ApiError;

/// `GET /prisoners`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<PrisonerView>>, ApiError>
where
  S: FacilityStore,
{
  let prisoners = store.list_prisoners().await.map_err(ApiError::from_store)?;
  Ok(Json(prisoners))
}

/// `GET /prisoners/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(prisoner_id): Path<i64>,
) -> Result<Json<PrisonerView>, ApiError>
where
  S: FacilityStore,
{
  let view = store
    .get_prisoner(prisoner_id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("prisoner not found: {prisoner_id}"))
    })?;
  Ok(Json(view))
}

/// `GET /prisoners/next-code`
pub async fn next_code<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: FacilityStore,
{
  let code = store.next_inmate_code().await.map_err(ApiError::from_store)?;
  Ok(Json(json!({ "inmate_code": code })))
}

/// `POST /prisoners` — returns 201 + the stored prisoner with their room.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(mut input): Json<PrisonerInput>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FacilityStore,
{
  if input.inmate_code.is_empty() {
    input.inmate_code =
      store.next_inmate_code().await.map_err(ApiError::from_store)?;
  }
  let view =
    store.create_prisoner(input).await.map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(view)))
}

/// `PUT /prisoners/:id`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(prisoner_id): Path<i64>,
  Json(input): Json<PrisonerInput>,
) -> Result<Json<PrisonerView>, ApiError>
where
  S: FacilityStore,
{
  let view = store
    .update_prisoner(prisoner_id, input)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(view))
}

/// `DELETE /prisoners/:id`
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  Path(prisoner_id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: FacilityStore,
{
  store
    .delete_prisoner(prisoner_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
