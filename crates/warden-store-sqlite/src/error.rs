//! Error types for `warden-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A domain-level rejection (validation, not-found, conflict,
  /// authorization). The embedded [`warden_core::Error`] carries the
  /// classification the HTTP layer maps to a status code.
  #[error(transparent)]
  Domain(#[from] warden_core::Error),

  /// The database itself failed.
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),
}

impl warden_core::DomainError for Error {
  fn domain(&self) -> Option<&warden_core::Error> {
    match self {
      Self::Domain(e) => Some(e),
      Self::Database(_) => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
