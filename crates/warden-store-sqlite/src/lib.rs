//! SQLite-backed implementation of [`warden_core::store::FacilityStore`].
//!
//! The store owns a [`tokio_rusqlite::Connection`]; every operation runs as
//! one closure on the connection's worker thread, and every multi-row
//! mutation opens a [`rusqlite`] transaction inside that closure. Domain
//! rejections (conflicts, not-found, validation) leave the transaction
//! uncommitted, so a refused operation never writes anything.

mod error;
mod rows;
mod schema;
mod store;

#[cfg(test)]
mod tests;

pub use self::{
  error::{Error, Result},
  store::SqliteStore,
};
