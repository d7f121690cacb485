//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use warden_core::{DomainError, ErrorKind};

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a store error: domain rejections map onto 4xx responses via
  /// [`ErrorKind`], anything else is a 500.
  pub fn from_store<E>(err: E) -> Self
  where
    E: std::error::Error + DomainError + Send + Sync + 'static,
  {
    if let Some(domain) = err.domain() {
      let message = domain.to_string();
      return match domain.kind() {
        ErrorKind::Validation => Self::BadRequest(message),
        ErrorKind::NotFound => Self::NotFound(message),
        ErrorKind::Conflict => Self::Conflict(message),
        ErrorKind::Forbidden => Self::Forbidden(message),
      };
    }
    Self::Store(Box::new(err))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, m.clone()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
