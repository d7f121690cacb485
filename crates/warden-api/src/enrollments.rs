//! Handlers for `/enrollments` endpoints.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use warden_core::{
  schedule::{Enrollment, EnrollmentInput, EnrollmentStatus},
  store::FacilityStore,
};

use crate::error::ApiError;

/// `POST /enrollments` — returns 201, or 409 for a duplicate
/// (schedule, prisoner) pair.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(input): Json<EnrollmentInput>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FacilityStore,
{
  let enrollment = store.enroll(input).await.map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(enrollment)))
}

/// JSON body accepted by `PUT /enrollments/:id/status`.
#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status:  EnrollmentStatus,
  pub remarks: Option<String>,
}

/// `PUT /enrollments/:id/status`
pub async fn set_status<S>(
  State(store): State<Arc<S>>,
  Path(enrollment_id): Path<i64>,
  Json(body): Json<StatusBody>,
) -> Result<Json<Enrollment>, ApiError>
where
  S: FacilityStore,
{
  let enrollment = store
    .set_enrollment_status(enrollment_id, body.status, body.remarks)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(enrollment))
}

/// `DELETE /enrollments/:id`
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  Path(enrollment_id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: FacilityStore,
{
  store
    .delete_enrollment(enrollment_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
