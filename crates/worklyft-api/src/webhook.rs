//! Handlers for the provider callback.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/webhook` | Always 200; processing happens after the reply |
//! | `GET`  | `/webhook/test` | Reachability probe |

use axum::{Json, extract::State};
use bytes::Bytes;
use chrono::Utc;
use serde_json::{Value, json};
use tracing::debug;
use worklyft_core::{provider::VideoProvider, store::MeetingStore};
use worklyft_recording::RecordingService;

/// `POST /webhook`
///
/// The body is taken raw so that malformed JSON is still acknowledged; the
/// provider must never see a processing error.
pub async fn receive<S, P>(
  State(service): State<RecordingService<S, P>>,
  body: Bytes,
) -> Json<Value>
where
  S: MeetingStore + 'static,
  P: VideoProvider + 'static,
{
  debug!(bytes = body.len(), "webhook received");
  service.spawn_webhook(body);
  Json(json!({
    "success": true,
    "message": "Webhook received",
    "timestamp": Utc::now(),
  }))
}

/// `GET /webhook/test`
pub async fn probe() -> Json<Value> {
  Json(json!({
    "success": true,
    "message": "Webhook endpoint is accessible",
    "timestamp": Utc::now(),
  }))
}
