//! Router tests driven through `tower::ServiceExt::oneshot`.

use std::{sync::Arc, time::Duration};

use axum::{
  Router,
  body::{Body, to_bytes},
  http::{Request, StatusCode},
};
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;
use worklyft_core::{
  meeting::{NewMeeting, RecordingStatus},
  provider::{
    ProviderRecording, RecordingAsset, RecordingRequest, RecordingSession, Room,
    RoomCodes, VideoProvider,
  },
  store::MeetingStore,
};
use worklyft_recording::{RecordingConfig, RecordingService};
use worklyft_store_sqlite::SqliteStore;

use crate::api_router;

#[derive(Debug, thiserror::Error)]
#[error("provider unavailable")]
struct Unavailable;

/// Accepts room and recording commands; has no assets. Rooms named
/// `broken` are rejected.
struct StubProvider;

impl VideoProvider for StubProvider {
  type Error = Unavailable;

  async fn create_room(&self, name: &str, _: &str) -> Result<Room, Unavailable> {
    if name == "broken" {
      return Err(Unavailable);
    }
    Ok(Room { id: "room1".into() })
  }

  async fn room_codes(&self, _: &str) -> Result<RoomCodes, Unavailable> {
    Ok(RoomCodes {
      host:  Some("host-code".into()),
      guest: Some("guest-code".into()),
    })
  }

  async fn start_recording(
    &self,
    _: &str,
    _: &RecordingRequest,
  ) -> Result<RecordingSession, Unavailable> {
    Ok(RecordingSession {
      id:     "beam1".into(),
      status: None,
    })
  }

  async fn stop_recording(&self, _: &str) -> Result<(), Unavailable> { Ok(()) }

  async fn get_recording(&self, id: &str) -> Result<ProviderRecording, Unavailable> {
    Ok(ProviderRecording {
      id:       id.to_owned(),
      room_id:  None,
      status:   None,
      duration: None,
    })
  }

  async fn list_assets(&self, _: &str) -> Result<Vec<RecordingAsset>, Unavailable> {
    Ok(Vec::new())
  }

  async fn presigned_url(&self, _: &str) -> Result<String, Unavailable> {
    Err(Unavailable)
  }

  async fn fetch_asset(&self, _: &str) -> Result<String, Unavailable> { Err(Unavailable) }
}

type Service = RecordingService<SqliteStore, StubProvider>;

async fn setup() -> (Router, Service) {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  let service = RecordingService::new(store, Arc::new(StubProvider), RecordingConfig::default());
  (api_router(service.clone()), service)
}

async fn call(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let request = Request::builder()
    .method(method)
    .uri(uri)
    .header("content-type", "application/json");
  let request = match body {
    Some(b) => request.body(Body::from(b.to_string())),
    None => request.body(Body::empty()),
  }
  .unwrap();

  let response = router.clone().oneshot(request).await.unwrap();
  let status = response.status();
  let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

// ─── Webhook ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn webhook_acknowledges_even_malformed_bodies() {
  let (router, _) = setup().await;
  let request = Request::builder()
    .method("POST")
    .uri("/webhook")
    .body(Body::from("{not json"))
    .unwrap();
  let response = router.oneshot(request).await.unwrap();
  assert_eq!(response.status(), StatusCode::OK);

  let body: Value =
    serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await.unwrap()).unwrap();
  assert_eq!(body["success"], true);
  assert_eq!(body["message"], "Webhook received");
  assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn webhook_event_is_applied_in_background() {
  let (router, service) = setup().await;
  let mut input = NewMeeting::new("m", "d");
  input.room_id = Some("room1".into());
  let m = service.store().insert(input).await.unwrap();

  let (status, _) = call(
    &router,
    "POST",
    "/webhook",
    Some(json!({
      "type": "beam.started.success",
      "data": { "beam_id": "beam7", "room_id": "room1" }
    })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let mut started = false;
  for _ in 0..50 {
    let current = service.store().get(m.meeting_id).await.unwrap().unwrap();
    if current.recording_status == RecordingStatus::Started {
      started = true;
      break;
    }
    tokio::time::sleep(Duration::from_millis(10)).await;
  }
  assert!(started);
}

#[tokio::test]
async fn webhook_probe() {
  let (router, _) = setup().await;
  let (status, body) = call(&router, "GET", "/webhook/test", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["success"], true);
}

// ─── Meetings ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn meeting_lifecycle_over_http() {
  let (router, _) = setup().await;

  let (status, created) = call(
    &router,
    "POST",
    "/meetings",
    Some(json!({ "name": "Standup", "description": "daily", "transcription_enabled": true })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(created["room_id"], "room1");
  assert_eq!(created["status"], "active");
  assert_eq!(created["host_room_code"], "host-code");
  let id = created["meeting_id"].as_str().unwrap().to_owned();

  let (status, started) =
    call(&router, "POST", &format!("/meetings/{id}/recording/start"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(started, json!({ "recording_id": "beam1", "status": "started" }));

  let (status, stopped) =
    call(&router, "POST", &format!("/meetings/{id}/recording/stop"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(stopped, json!({ "status": "stopped" }));

  let (status, view) =
    call(&router, "GET", &format!("/meetings/{id}/transcription"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(view["recording"]["recording_status"], "stopped");
  assert_eq!(view["recording"]["recording_id"], "beam1");
  assert_eq!(view["transcription"]["status"], "processing");

  let (status, view) =
    call(&router, "POST", &format!("/meetings/{id}/transcription/fetch"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(view["transcription"]["status"], "processing");

  let (status, list) = call(&router, "GET", "/meetings?limit=5", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn error_statuses() {
  let (router, service) = setup().await;

  let (status, body) =
    call(&router, "GET", &format!("/meetings/{}", Uuid::new_v4()), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].is_string());

  let (status, _) = call(
    &router,
    "POST",
    "/meetings",
    Some(json!({ "name": "broken", "description": "x" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_GATEWAY);

  let (status, body) =
    call(&router, "POST", "/meetings", Some(json!({ "name": "x" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "name and description are required");

  let m = service.store().insert(NewMeeting::new("no room", "d")).await.unwrap();
  let (status, body) = call(
    &router,
    "POST",
    &format!("/meetings/{}/recording/start", m.meeting_id),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "meeting has no room");
}
