//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};
use worklyft_recording::Error as RecordingError;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("video provider error: {0}")]
  Provider(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<RecordingError> for ApiError {
  fn from(e: RecordingError) -> Self {
    match e {
      RecordingError::MeetingNotFound(id) => {
        ApiError::NotFound(format!("meeting {id} not found"))
      }
      RecordingError::Precondition(m) => ApiError::BadRequest(m.to_owned()),
      RecordingError::Event(e) => ApiError::BadRequest(e.to_string()),
      RecordingError::Provider(e) => {
        warn!(error = %e, "video provider call failed");
        ApiError::Provider(e.to_string())
      }
      RecordingError::Store(e) => ApiError::Store(e),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Provider(m) => (StatusCode::BAD_GATEWAY, m.clone()),
      ApiError::Store(e) => {
        error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
