//! [`HmsClient`]: async HTTP client for the 100ms management API.

use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, warn};
use worklyft_core::provider::{
  ProviderRecording, RecordingAsset, RecordingRequest, RecordingSession, Room,
  RoomCodes, VideoProvider,
};

use crate::{
  Error, Result,
  token::management_token,
  wire::{
    AssetListResponse, CreateRoomBody, PresignedUrlResponse, RecordingResponse,
    RoomCodesResponse, RoomResponse, StartRecordingBody,
  },
};

fn default_api_base() -> String { "https://api.100ms.live/v2".to_owned() }

fn default_request_timeout_secs() -> u64 { 30 }

/// Connection settings for the 100ms API, deserialised from the `[hms]`
/// config table.
#[derive(Debug, Clone, Deserialize)]
pub struct HmsConfig {
  pub access_key:           String,
  pub secret:               String,
  /// Room template applied to newly created rooms.
  pub template_id:          Option<String>,
  #[serde(default = "default_api_base")]
  pub api_base:             String,
  #[serde(default = "default_request_timeout_secs")]
  pub request_timeout_secs: u64,
}

/// Async client for the 100ms REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HmsClient {
  client: Client,
  config: HmsConfig,
}

impl HmsClient {
  pub fn new(config: HmsConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.request_timeout_secs))
      .build()?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.api_base.trim_end_matches('/'), path)
  }

  fn auth(&self, req: RequestBuilder) -> Result<RequestBuilder> {
    let token =
      management_token(&self.config.access_key, &self.config.secret, Utc::now())?;
    Ok(req.bearer_auth(token))
  }

  /// Send an authenticated request and decode a JSON response.
  async fn call<T: DeserializeOwned>(
    &self,
    req: RequestBuilder,
    what: &str,
  ) -> Result<T> {
    let body = self.call_text(self.auth(req)?, what).await?;
    serde_json::from_str(&body).map_err(|source| Error::Decode {
      what: what.to_owned(),
      source,
    })
  }

  /// Send a request and return the body text, failing on non-2xx.
  async fn call_text(&self, req: RequestBuilder, what: &str) -> Result<String> {
    let resp = req.send().await?;
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
      warn!(%status, body = %body, "{what} failed");
      return Err(Error::Status {
        what: what.to_owned(),
        status,
        body,
      });
    }
    debug!(%status, "{what} ok");
    Ok(body)
  }
}

impl VideoProvider for HmsClient {
  type Error = Error;

  async fn create_room(&self, name: &str, description: &str) -> Result<Room> {
    // Room names must be unique per account.
    let body = CreateRoomBody {
      name: format!("{name}-{}", Utc::now().timestamp_millis()),
      description,
      template_id: self.config.template_id.as_deref(),
    };
    let room: RoomResponse = self
      .call(self.client.post(self.url("/rooms")).json(&body), "POST /rooms")
      .await?;
    Ok(Room { id: room.id })
  }

  async fn room_codes(&self, room_id: &str) -> Result<RoomCodes> {
    let resp: RoomCodesResponse = self
      .call(
        self
          .client
          .post(self.url(&format!("/room-codes/room/{room_id}")))
          .json(&serde_json::json!({})),
        "POST /room-codes",
      )
      .await?;
    Ok(resp.into())
  }

  async fn start_recording(
    &self,
    room_id: &str,
    request: &RecordingRequest,
  ) -> Result<RecordingSession> {
    let body = StartRecordingBody::from(request);
    let resp: RecordingResponse = self
      .call(
        self
          .client
          .post(self.url(&format!("/recordings/room/{room_id}/start")))
          .json(&body),
        "POST /recordings/start",
      )
      .await?;
    Ok(RecordingSession {
      id:     resp.id,
      status: resp.status,
    })
  }

  async fn stop_recording(&self, room_id: &str) -> Result<()> {
    let req = self
      .client
      .post(self.url(&format!("/recordings/room/{room_id}/stop")))
      .json(&serde_json::json!({}));
    self.call_text(self.auth(req)?, "POST /recordings/stop").await?;
    Ok(())
  }

  async fn get_recording(&self, recording_id: &str) -> Result<ProviderRecording> {
    let resp: RecordingResponse = self
      .call(
        self.client.get(self.url(&format!("/recordings/{recording_id}"))),
        "GET /recordings",
      )
      .await?;
    Ok(resp.into())
  }

  async fn list_assets(&self, recording_id: &str) -> Result<Vec<RecordingAsset>> {
    let resp: AssetListResponse = self
      .call(
        self
          .client
          .get(self.url("/recording-assets"))
          .query(&[("recording_id", recording_id)]),
        "GET /recording-assets",
      )
      .await?;
    Ok(resp.data.into_iter().map(RecordingAsset::from).collect())
  }

  async fn presigned_url(&self, asset_id: &str) -> Result<String> {
    let resp: PresignedUrlResponse = self
      .call(
        self
          .client
          .get(self.url(&format!("/recording-assets/{asset_id}/presigned-url"))),
        "GET /recording-assets/presigned-url",
      )
      .await?;
    Ok(resp.url)
  }

  async fn fetch_asset(&self, url: &str) -> Result<String> {
    // Presigned URLs carry their own authorisation.
    self.call_text(self.client.get(url), "GET presigned asset").await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn config() -> HmsConfig {
    serde_json::from_value(serde_json::json!({
      "access_key": "key",
      "secret": "secret",
      "api_base": "https://api.example.test/v2/",
    }))
    .unwrap()
  }

  #[test]
  fn config_defaults() {
    let cfg: HmsConfig = serde_json::from_value(serde_json::json!({
      "access_key": "key",
      "secret": "secret",
    }))
    .unwrap();
    assert_eq!(cfg.api_base, "https://api.100ms.live/v2");
    assert_eq!(cfg.request_timeout_secs, 30);
    assert!(cfg.template_id.is_none());
  }

  #[test]
  fn url_joins_without_double_slash() {
    let client = HmsClient::new(config()).unwrap();
    assert_eq!(
      client.url("/recordings/r1"),
      "https://api.example.test/v2/recordings/r1"
    );
  }
}
