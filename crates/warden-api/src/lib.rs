//! JSON REST API for the warden facility backend.
//!
//! Exposes an axum [`Router`] backed by any
//! [`warden_core::store::FacilityStore`]. Authentication is external: the
//! caller may attach a [`warden_core::identity::Identity`] as a request
//! extension (see `warden-server`), and handlers forward it to the store for
//! actor attribution and ownership filtering. TLS and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", warden_api::api_router(store.clone()))
//! ```

pub mod enrollments;
pub mod error;
pub mod parcels;
pub mod prisoners;
pub mod rooms;
pub mod schedules;
pub mod scores;
pub mod visitations;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use warden_core::store::FacilityStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: FacilityStore + 'static,
{
  Router::new()
    // Activities and schedules
    .route(
      "/activities",
      get(schedules::list_activities::<S>).post(schedules::create_activity::<S>),
    )
    .route(
      "/activities/{id}",
      put(schedules::update_activity::<S>).delete(schedules::delete_activity::<S>),
    )
    .route(
      "/schedules",
      get(schedules::list_schedules::<S>).post(schedules::create_schedule::<S>),
    )
    .route(
      "/schedules/{id}",
      put(schedules::update_schedule::<S>).delete(schedules::delete_schedule::<S>),
    )
    // Enrollments
    .route("/enrollments", post(enrollments::create::<S>))
    .route("/enrollments/{id}/status", put(enrollments::set_status::<S>))
    .route("/enrollments/{id}", axum::routing::delete(enrollments::delete::<S>))
    // Prisoners
    .route("/prisoners", get(prisoners::list::<S>).post(prisoners::create::<S>))
    .route("/prisoners/next-code", get(prisoners::next_code::<S>))
    .route(
      "/prisoners/{id}",
      get(prisoners::get_one::<S>)
        .put(prisoners::update::<S>)
        .delete(prisoners::delete::<S>),
    )
    // Rooms and staff
    .route("/rooms", get(rooms::list_rooms::<S>).post(rooms::create_room::<S>))
    .route("/staff", get(rooms::list_staff::<S>).post(rooms::create_staff::<S>))
    // Scores
    .route("/scores/{prisoner_id}", get(scores::get_score::<S>))
    .route(
      "/adjustments",
      get(scores::list_adjustments::<S>).post(scores::adjust::<S>),
    )
    .route(
      "/evaluations",
      get(scores::list_evaluations::<S>).post(scores::record_evaluation::<S>),
    )
    // Inventory
    .route("/parcels", get(parcels::list::<S>).post(parcels::create::<S>))
    .route("/parcels/{id}", put(parcels::update::<S>))
    .route("/parcels/{id}/add", post(parcels::add_stock::<S>))
    .route("/parcels/{id}/reduce", post(parcels::reduce_stock::<S>))
    .route("/operations", get(parcels::list_operations::<S>))
    // Visitations
    .route(
      "/visitations",
      get(visitations::list::<S>).post(visitations::book::<S>),
    )
    .route(
      "/visitations/{id}",
      put(visitations::update::<S>).delete(visitations::delete::<S>),
    )
    .route("/timeslots", get(visitations::list_time_slots::<S>))
    .with_state(store)
}
