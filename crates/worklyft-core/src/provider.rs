//! The `VideoProvider` trait and the provider-neutral types it speaks.
//!
//! Implemented by `worklyft-hms` against 100ms.live; tests substitute an
//! in-memory fake.

use std::future::Future;

use serde::{Deserialize, Serialize};

// ─── Rooms ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
  pub id: String,
}

/// Join codes issued for a room, per role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomCodes {
  pub host:  Option<String>,
  pub guest: Option<String>,
}

// ─── Recording commands ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionFormat {
  Bullets,
  Paragraph,
}

/// One section the provider's summariser is asked to produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarySection {
  pub title:  String,
  pub format: SectionFormat,
}

/// Parameters for [`VideoProvider::start_recording`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingRequest {
  pub transcription:     bool,
  pub custom_vocabulary: Vec<String>,
  pub summary_sections:  Vec<SummarySection>,
}

impl RecordingRequest {
  /// Recording with transcription and the four canonical summary sections.
  pub fn with_transcription(custom_vocabulary: Vec<String>) -> Self {
    let section = |title: &str, format| SummarySection {
      title: title.to_owned(),
      format,
    };
    Self {
      transcription: true,
      custom_vocabulary,
      summary_sections: vec![
        section("Agenda", SectionFormat::Bullets),
        section("Key Points", SectionFormat::Bullets),
        section("Action Items", SectionFormat::Bullets),
        section("Short Summary", SectionFormat::Paragraph),
      ],
    }
  }
}

/// Returned synchronously by the provider when a recording starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingSession {
  pub id:     String,
  pub status: Option<String>,
}

// ─── Recordings and assets ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRecording {
  pub id:       String,
  pub room_id:  Option<String>,
  pub status:   Option<String>,
  /// Seconds.
  pub duration: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
  Transcript,
  Summary,
  Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingAsset {
  pub id:     String,
  pub kind:   AssetKind,
  /// Export format, e.g. `txt`, `srt`, `json`.
  pub format: Option<String>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the video provider's management API.
pub trait VideoProvider: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn create_room<'a>(
    &'a self,
    name: &'a str,
    description: &'a str,
  ) -> impl Future<Output = Result<Room, Self::Error>> + Send + 'a;

  fn room_codes<'a>(
    &'a self,
    room_id: &'a str,
  ) -> impl Future<Output = Result<RoomCodes, Self::Error>> + Send + 'a;

  fn start_recording<'a>(
    &'a self,
    room_id: &'a str,
    request: &'a RecordingRequest,
  ) -> impl Future<Output = Result<RecordingSession, Self::Error>> + Send + 'a;

  fn stop_recording<'a>(
    &'a self,
    room_id: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn get_recording<'a>(
    &'a self,
    recording_id: &'a str,
  ) -> impl Future<Output = Result<ProviderRecording, Self::Error>> + Send + 'a;

  fn list_assets<'a>(
    &'a self,
    recording_id: &'a str,
  ) -> impl Future<Output = Result<Vec<RecordingAsset>, Self::Error>> + Send + 'a;

  fn presigned_url<'a>(
    &'a self,
    asset_id: &'a str,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;

  /// Plain unauthenticated GET of a presigned URL, returning the body text.
  fn fetch_asset<'a>(
    &'a self,
    url: &'a str,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;
}
