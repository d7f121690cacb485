//! Handlers for `/activities` and `/schedules` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/activities` | All activities, by name |
//! | `POST`   | `/activities` | Body: [`ActivityInput`]; returns 201 |
//! | `PUT`    | `/activities/:id` | Full replacement |
//! | `DELETE` | `/activities/:id` | 409 while schedules reference it |
//! | `GET`    | `/schedules` | Windows with activity, staff, enrollments |
//! | `POST`   | `/schedules` | Body: [`ScheduleInput`]; 409 on overlap |
//! | `PUT`    | `/schedules/:id` | Overlap scan excludes the window itself |
//! | `DELETE` | `/schedules/:id` | Cascades enrollments; may drop the activity |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use warden_core::{
  schedule::{Activity, ActivityInput, ScheduleInput, ScheduleView},
  store::FacilityStore,
};

use crate::error::ApiError;

// ─── Activities ───────────────────────────────────────────────────────────────

/// `GET /activities`
pub async fn list_activities<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Activity>>, ApiError>
where
  S: FacilityStore,
{
  let activities =
    store.list_activities().await.map_err(ApiError::from_store)?;
  Ok(Json(activities))
}

/// `POST /activities` — returns 201 + the stored activity.
pub async fn create_activity<S>(
  State(store): State<Arc<S>>,
  Json(input): Json<ActivityInput>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FacilityStore,
{
  let activity =
    store.create_activity(input).await.map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(activity)))
}

/// `PUT /activities/:id`
pub async fn update_activity<S>(
  State(store): State<Arc<S>>,
  Path(activity_id): Path<i64>,
  Json(input): Json<ActivityInput>,
) -> Result<Json<Activity>, ApiError>
where
  S: FacilityStore,
{
  let activity = store
    .update_activity(activity_id, input)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(activity))
}

/// `DELETE /activities/:id`
pub async fn delete_activity<S>(
  State(store): State<Arc<S>>,
  Path(activity_id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: FacilityStore,
{
  store
    .delete_activity(activity_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Schedules ────────────────────────────────────────────────────────────────

/// `GET /schedules`
pub async fn list_schedules<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<ScheduleView>>, ApiError>
where
  S: FacilityStore,
{
  let schedules = store.list_schedules().await.map_err(ApiError::from_store)?;
  Ok(Json(schedules))
}

/// `POST /schedules` — returns 201, or 409 when the window overlaps an
/// existing one for the same activity.
pub async fn create_schedule<S>(
  State(store): State<Arc<S>>,
  Json(input): Json<ScheduleInput>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FacilityStore,
{
  let view =
    store.create_schedule(input).await.map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(view)))
}

/// `PUT /schedules/:id`
pub async fn update_schedule<S>(
  State(store): State<Arc<S>>,
  Path(schedule_id): Path<i64>,
  Json(input): Json<ScheduleInput>,
) -> Result<Json<ScheduleView>, ApiError>
where
  S: FacilityStore,
{
  let view = store
    .update_schedule(schedule_id, input)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(view))
}

/// `DELETE /schedules/:id`
pub async fn delete_schedule<S>(
  State(store): State<Arc<S>>,
  Path(schedule_id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: FacilityStore,
{
  store
    .delete_schedule(schedule_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
