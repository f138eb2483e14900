//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// The directory behind the core could not be reached.
  #[error("service unavailable: {0}")]
  Unavailable(String),
}

impl From<muni_core::Error> for ApiError {
  fn from(err: muni_core::Error) -> Self {
    match err {
      muni_core::Error::Validation(m) => ApiError::BadRequest(m),
      e @ muni_core::Error::NotFound { .. } => ApiError::NotFound(e.to_string()),
      e @ (muni_core::Error::DirectoryUnavailable(_)
      | muni_core::Error::InvalidRoleCodes(_)) => {
        tracing::error!(error = %e, "directory failure");
        ApiError::Unavailable(e.to_string())
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Unavailable(m) => (StatusCode::SERVICE_UNAVAILABLE, m.clone()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
