//! Handlers for `/rooms` and `/staff` endpoints.

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use warden_core::{
  room::Room,
  staff::{Staff, StaffInput},
  store::FacilityStore,
};

use crate::error::ApiError;

/// JSON body accepted by `POST /rooms`. Room names carry the gender prefix
/// (`M…` or `F…`) that gates prisoner assignment.
#[derive(Debug, Deserialize)]
pub struct RoomBody {
  pub name: String,
}

/// `GET /rooms`
pub async fn list_rooms<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Room>>, ApiError>
where
  S: FacilityStore,
{
  let rooms = store.list_rooms().await.map_err(ApiError::from_store)?;
  Ok(Json(rooms))
}

/// `POST /rooms` — returns 201 + the new (vacant) room.
pub async fn create_room<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<RoomBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FacilityStore,
{
  let room = store.add_room(body.name).await.map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(room)))
}

/// `GET /staff`
pub async fn list_staff<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Staff>>, ApiError>
where
  S: FacilityStore,
{
  let staff = store.list_staff().await.map_err(ApiError::from_store)?;
  Ok(Json(staff))
}

/// `POST /staff` — returns 201.
pub async fn create_staff<S>(
  State(store): State<Arc<S>>,
  Json(input): Json<StaffInput>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FacilityStore,
{
  let staff = store.add_staff(input).await.map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(staff)))
}
