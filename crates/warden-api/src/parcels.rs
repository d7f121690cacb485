//! Handlers for `/parcels` and `/operations` endpoints.
//!
//! Every parcel mutation appends to the operation ledger inside the store
//! transaction; the actor recorded is the session identity's member id,
//! or nothing for an anonymous request.

use std::sync::Arc;

use axum::{
  Extension, Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use warden_core::{
  identity::Identity,
  inventory::{OperationView, Parcel, ParcelInput},
  store::FacilityStore,
};

use crate::error::ApiError;

fn actor(identity: Option<Extension<Identity>>) -> Option<i64> {
  identity.map(|Extension(id)| id.member_id)
}

/// `GET /parcels`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Parcel>>, ApiError>
where
  S: FacilityStore,
{
  let parcels = store.list_parcels().await.map_err(ApiError::from_store)?;
  Ok(Json(parcels))
}

/// `POST /parcels` — returns 201, or 409 when the name is taken.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  identity: Option<Extension<Identity>>,
  Json(input): Json<ParcelInput>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FacilityStore,
{
  let parcel = store
    .create_parcel(input, actor(identity))
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(parcel)))
}

/// `PUT /parcels/:id` — the ledger entry snapshots the old and new name and
/// kind.
pub async fn update<S>(
  State(store): State<Arc<S>>,
  identity: Option<Extension<Identity>>,
  Path(parcel_id): Path<i64>,
  Json(input): Json<ParcelInput>,
) -> Result<Json<Parcel>, ApiError>
where
  S: FacilityStore,
{
  let parcel = store
    .update_parcel(parcel_id, input, actor(identity))
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(parcel))
}

/// JSON body accepted by the add/reduce endpoints.
#[derive(Debug, Deserialize)]
pub struct AmountBody {
  pub amount: i64,
}

/// `POST /parcels/:id/add`
pub async fn add_stock<S>(
  State(store): State<Arc<S>>,
  identity: Option<Extension<Identity>>,
  Path(parcel_id): Path<i64>,
  Json(body): Json<AmountBody>,
) -> Result<Json<Parcel>, ApiError>
where
  S: FacilityStore,
{
  let parcel = store
    .add_stock(parcel_id, body.amount, actor(identity))
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(parcel))
}

/// `POST /parcels/:id/reduce` — the stored quantity clamps at zero.
pub async fn reduce_stock<S>(
  State(store): State<Arc<S>>,
  identity: Option<Extension<Identity>>,
  Path(parcel_id): Path<i64>,
  Json(body): Json<AmountBody>,
) -> Result<Json<Parcel>, ApiError>
where
  S: FacilityStore,
{
  let parcel = store
    .reduce_stock(parcel_id, body.amount, actor(identity))
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(parcel))
}

/// `GET /operations` — the full ledger, newest first.
pub async fn list_operations<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<OperationView>>, ApiError>
where
  S: FacilityStore,
{
  let entries =
    store.list_operations().await.map_err(ApiError::from_store)?;
  Ok(Json(entries))
}
