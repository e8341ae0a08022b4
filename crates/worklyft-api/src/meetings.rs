//! Handlers for `/meetings` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/meetings` | Newest first; optional `?limit=` |
//! | `POST` | `/meetings` | Provisions a room; 201 |
//! | `GET`  | `/meetings/{id}` | 404 if not found |
//! | `POST` | `/meetings/{id}/recording/start` | |
//! | `POST` | `/meetings/{id}/recording/stop` | |
//! | `GET`  | `/meetings/{id}/transcription` | Polling view |
//! | `POST` | `/meetings/{id}/transcription/fetch` | Pull from the provider now |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;
use worklyft_core::{meeting::Meeting, provider::VideoProvider, store::MeetingStore};
use worklyft_recording::{
  CreateMeeting, RecordingService, RecordingStarted, RecordingStopped,
  TranscriptionView,
};

use crate::error::ApiError;

const DEFAULT_LIST_LIMIT: usize = 50;

// ─── Meetings ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub limit: Option<usize>,
}

/// `GET /meetings[?limit=<n>]`
pub async fn list<S: MeetingStore, P: VideoProvider>(
  State(service): State<RecordingService<S, P>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Meeting>>, ApiError> {
  let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT);
  Ok(Json(service.list_meetings(limit).await?))
}

/// `POST /meetings`, body: `{"name":..,"description":..,"transcription_enabled":true}`
pub async fn create<S: MeetingStore, P: VideoProvider>(
  State(service): State<RecordingService<S, P>>,
  Json(body): Json<CreateMeeting>,
) -> Result<impl IntoResponse, ApiError> {
  let meeting = service.create_meeting(body).await?;
  Ok((StatusCode::CREATED, Json(meeting)))
}

/// `GET /meetings/{id}`
pub async fn get_one<S: MeetingStore, P: VideoProvider>(
  State(service): State<RecordingService<S, P>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Meeting>, ApiError> {
  Ok(Json(service.get_meeting(id).await?))
}

// ─── Recording ───────────────────────────────────────────────────────────────

/// `POST /meetings/{id}/recording/start`
pub async fn start_recording<S: MeetingStore, P: VideoProvider>(
  State(service): State<RecordingService<S, P>>,
  Path(id): Path<Uuid>,
) -> Result<Json<RecordingStarted>, ApiError> {
  Ok(Json(service.start_recording(id).await?))
}

/// `POST /meetings/{id}/recording/stop`
pub async fn stop_recording<S: MeetingStore, P: VideoProvider>(
  State(service): State<RecordingService<S, P>>,
  Path(id): Path<Uuid>,
) -> Result<Json<RecordingStopped>, ApiError> {
  Ok(Json(service.stop_recording(id).await?))
}

// ─── Transcription ───────────────────────────────────────────────────────────

/// `GET /meetings/{id}/transcription`
pub async fn transcription<S: MeetingStore, P: VideoProvider>(
  State(service): State<RecordingService<S, P>>,
  Path(id): Path<Uuid>,
) -> Result<Json<TranscriptionView>, ApiError> {
  Ok(Json(service.transcription(id).await?))
}

/// `POST /meetings/{id}/transcription/fetch`
pub async fn fetch_transcription<S: MeetingStore, P: VideoProvider>(
  State(service): State<RecordingService<S, P>>,
  Path(id): Path<Uuid>,
) -> Result<Json<TranscriptionView>, ApiError> {
  Ok(Json(service.fetch_transcription_now(id).await?))
}
