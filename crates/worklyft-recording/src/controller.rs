//! Recording session controller: room provisioning and the client-driven
//! half of the recording lifecycle.
//!
//! Commands are issued to the provider first; local state is only changed
//! once the provider accepted them. Webhooks drive the rest (see
//! [`crate::dispatch`]).

use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
use worklyft_core::{
  event::AssetUrls,
  meeting::{
    Meeting, NewMeeting, RecordingStatus, RecordingView, Transcription,
    TranscriptionStatus,
  },
  provider::{AssetKind, RecordingAsset, RecordingRequest, VideoProvider},
  store::MeetingStore,
};

use crate::{
  Error, Result,
  assets::{self, AssetResolver},
  locks::MeetingLocks,
};

// ─── Configuration ───────────────────────────────────────────────────────────

fn default_asset_timeout_secs() -> u64 { assets::DEFAULT_FETCH_TIMEOUT.as_secs() }

/// Tunables of the recording pipeline, read from the `[recording]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordingConfig {
  /// Extra words passed to the provider's speech recogniser.
  #[serde(default)]
  pub custom_vocabulary:  Vec<String>,
  #[serde(default = "default_asset_timeout_secs")]
  pub asset_timeout_secs: u64,
}

impl Default for RecordingConfig {
  fn default() -> Self {
    Self {
      custom_vocabulary:  Vec::new(),
      asset_timeout_secs: default_asset_timeout_secs(),
    }
  }
}

// ─── Requests and views ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateMeeting {
  /// Missing and blank are both rejected by [`RecordingService::create_meeting`].
  #[serde(default)]
  pub name:                  String,
  #[serde(default)]
  pub description:           String,
  #[serde(default, rename = "type")]
  pub kind:                  Option<String>,
  #[serde(default)]
  pub server_id:             Option<String>,
  #[serde(default)]
  pub host_id:               Option<String>,
  #[serde(default)]
  pub transcription_enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordingStarted {
  pub recording_id: String,
  pub status:       RecordingStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordingStopped {
  pub status: RecordingStatus,
}

/// The polling view: recording sub-state plus the transcription document.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptionView {
  pub recording:     RecordingView,
  pub transcription: Transcription,
}

impl From<&Meeting> for TranscriptionView {
  fn from(m: &Meeting) -> Self {
    Self {
      recording:     m.recording(),
      transcription: m.transcription.clone(),
    }
  }
}

// ─── Service ─────────────────────────────────────────────────────────────────

/// Owns everything the recording pipeline needs. Cheap to clone; shared by
/// the HTTP handlers and the spawned webhook tasks.
pub struct RecordingService<S, P> {
  pub(crate) store:    Arc<S>,
  pub(crate) provider: Arc<P>,
  pub(crate) assets:   Arc<AssetResolver<P>>,
  pub(crate) locks:    MeetingLocks,
  pub(crate) config:   Arc<RecordingConfig>,
}

impl<S, P> Clone for RecordingService<S, P> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      provider: Arc::clone(&self.provider),
      assets:   Arc::clone(&self.assets),
      locks:    self.locks.clone(),
      config:   Arc::clone(&self.config),
    }
  }
}

impl<S: MeetingStore, P: VideoProvider> RecordingService<S, P> {
  pub fn new(store: Arc<S>, provider: Arc<P>, config: RecordingConfig) -> Self {
    let timeout = Duration::from_secs(config.asset_timeout_secs);
    Self {
      assets: Arc::new(AssetResolver::new(Arc::clone(&provider), timeout)),
      store,
      provider,
      locks: MeetingLocks::new(),
      config: Arc::new(config),
    }
  }

  pub fn store(&self) -> &S { &self.store }

  pub(crate) async fn load(&self, id: Uuid) -> Result<Meeting> {
    self
      .store
      .get(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::MeetingNotFound(id))
  }

  pub(crate) async fn save(&self, meeting: &Meeting) -> Result<Meeting> {
    self.store.save(meeting).await.map_err(Error::store)
  }

  /// Provision a room with the provider and persist a meeting for it.
  pub async fn create_meeting(&self, request: CreateMeeting) -> Result<Meeting> {
    if request.name.trim().is_empty() || request.description.trim().is_empty() {
      return Err(Error::Precondition("name and description are required"));
    }

    let room = self
      .provider
      .create_room(&request.name, &request.description)
      .await
      .map_err(Error::provider)?;
    let codes = self
      .provider
      .room_codes(&room.id)
      .await
      .map_err(Error::provider)?;

    let meeting = self
      .store
      .insert(NewMeeting {
        name:                  request.name,
        description:           request.description,
        kind:                  request.kind,
        server_id:             request.server_id,
        host_id:               request.host_id,
        host_room_code:        codes.host,
        guest_room_code:       codes.guest,
        status:                Some("active".to_owned()),
        room_id:               Some(room.id),
        transcription_enabled: request.transcription_enabled,
      })
      .await
      .map_err(Error::store)?;

    info!(meeting_id = %meeting.meeting_id, room_id = ?meeting.room_id, "meeting created");
    Ok(meeting)
  }

  pub async fn get_meeting(&self, id: Uuid) -> Result<Meeting> { self.load(id).await }

  pub async fn list_meetings(&self, limit: usize) -> Result<Vec<Meeting>> {
    self.store.list(limit).await.map_err(Error::store)
  }

  /// Start recording with transcription and the canonical summary sections.
  pub async fn start_recording(&self, id: Uuid) -> Result<RecordingStarted> {
    let _guard = self.locks.lock(id).await;
    let mut meeting = self.load(id).await?;
    let room_id = meeting
      .room_id
      .clone()
      .ok_or(Error::Precondition("meeting has no room"))?;

    let request =
      RecordingRequest::with_transcription(self.config.custom_vocabulary.clone());
    let session = self
      .provider
      .start_recording(&room_id, &request)
      .await
      .map_err(Error::provider)?;

    meeting.recording_id = Some(session.id.clone());
    meeting.recording_status = RecordingStatus::Started;
    meeting.transcription.status = TranscriptionStatus::NotStarted;
    self.save(&meeting).await?;

    info!(meeting_id = %id, recording_id = %session.id, "recording started");
    Ok(RecordingStarted {
      recording_id: session.id,
      status:       RecordingStatus::Started,
    })
  }

  pub async fn stop_recording(&self, id: Uuid) -> Result<RecordingStopped> {
    let _guard = self.locks.lock(id).await;
    let mut meeting = self.load(id).await?;
    if meeting.recording_id.is_none() {
      return Err(Error::Precondition("no active recording"));
    }
    let room_id = meeting
      .room_id
      .clone()
      .ok_or(Error::Precondition("meeting has no room"))?;

    self
      .provider
      .stop_recording(&room_id)
      .await
      .map_err(Error::provider)?;

    meeting.recording_status = RecordingStatus::Stopped;
    meeting.transcription.status = TranscriptionStatus::Processing;
    self.save(&meeting).await?;

    info!(meeting_id = %id, "recording stopped");
    Ok(RecordingStopped {
      status: RecordingStatus::Stopped,
    })
  }

  pub async fn transcription(&self, id: Uuid) -> Result<TranscriptionView> {
    let meeting = self.load(id).await?;
    Ok(TranscriptionView::from(&meeting))
  }

  /// Pull the transcription straight from the provider instead of waiting
  /// for its webhook. Applies the same rules as `transcription.success`.
  pub async fn fetch_transcription_now(&self, id: Uuid) -> Result<TranscriptionView> {
    let meeting = self.load(id).await?;
    let recording_id = meeting
      .recording_id
      .clone()
      .ok_or(Error::Precondition("no recording"))?;

    let recording = self
      .provider
      .get_recording(&recording_id)
      .await
      .map_err(Error::provider)?;
    let listed = self
      .provider
      .list_assets(&recording_id)
      .await
      .map_err(Error::provider)?;

    let urls = self.presign(&listed).await;
    if urls == AssetUrls::default() {
      info!(meeting_id = %id, %recording_id, "no transcription assets available yet");
      return Ok(TranscriptionView::from(&meeting));
    }

    let fetched = self.assets.fetch(&urls, recording.duration).await;

    let _guard = self.locks.lock(id).await;
    let mut meeting = self.load(id).await?;
    assets::apply_success(&mut meeting, &urls, fetched, recording.duration);
    let saved = self.save(&meeting).await?;
    Ok(TranscriptionView::from(&saved))
  }

  /// Presigned URLs for the transcript exports and the summary document.
  /// Assets whose URL cannot be obtained are skipped.
  async fn presign(&self, listed: &[RecordingAsset]) -> AssetUrls {
    let mut urls = AssetUrls::default();
    for asset in listed {
      let slot = match (asset.kind, asset.format.as_deref()) {
        (AssetKind::Transcript, Some("txt")) => &mut urls.transcript_txt,
        (AssetKind::Transcript, Some("srt")) => &mut urls.transcript_srt,
        (AssetKind::Transcript, Some("json")) => &mut urls.transcript_json,
        (AssetKind::Summary, _) => &mut urls.summary_json,
        _ => continue,
      };
      match self.provider.presigned_url(&asset.id).await {
        Ok(url) => *slot = Some(url),
        Err(e) => warn!(asset_id = %asset.id, error = %e, "presigned url unavailable"),
      }
    }
    urls
  }
}
