//! API error taxonomy and its status mapping.

use crate::util::EnvelopeError;
use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;

/// Everything a handler can fail with, one client-facing status each.
/// Handlers log the diagnostic detail at the call site; the response body
/// carries only a minimal message.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized,
  #[error("{0}")]
  Validation(&'static str),
  #[error("{0}")]
  NotFound(&'static str),
  #[error("error parsing email: {0}")]
  Envelope(#[from] EnvelopeError),
  #[error("storage error: {0}")]
  Storage(#[from] sqlx::Error),
  #[error("error deleting inbox")]
  DeleteFailed,
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized").into_response(),
      ApiError::Validation(msg) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
      }
      ApiError::NotFound(msg) => {
        (StatusCode::NOT_FOUND, Json(json!({ "error": msg }))).into_response()
      }
      ApiError::Envelope(_) => {
        (StatusCode::INTERNAL_SERVER_ERROR, "Error parsing email").into_response()
      }
      ApiError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "db error").into_response(),
      ApiError::DeleteFailed => (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "Error deleting inbox" })),
      )
        .into_response(),
    }
  }
}
