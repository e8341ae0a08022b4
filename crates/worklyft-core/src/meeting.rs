//! Meeting: the document that carries a room's recording and transcription
//! state.
//!
//! A meeting is created when a room is provisioned with the video provider.
//! Its recording sub-state is set optimistically by the session controller
//! and then driven to a terminal value by provider webhooks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Statuses ────────────────────────────────────────────────────────────────

/// Recording lifecycle as last observed locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingStatus {
  #[default]
  NotStarted,
  Starting,
  Started,
  Running,
  Stopped,
  Failed,
  Completed,
}

impl RecordingStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::NotStarted => "not_started",
      Self::Starting => "starting",
      Self::Started => "started",
      Self::Running => "running",
      Self::Stopped => "stopped",
      Self::Failed => "failed",
      Self::Completed => "completed",
    }
  }
}

/// Transcription lifecycle as last observed locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptionStatus {
  #[default]
  NotStarted,
  Processing,
  Completed,
  Failed,
}

impl TranscriptionStatus {
  /// `Completed` and `Failed` are terminal; only authoritative events move a
  /// transcription out of them.
  pub fn is_terminal(&self) -> bool {
    matches!(self, Self::Completed | Self::Failed)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::NotStarted => "not_started",
      Self::Processing => "processing",
      Self::Completed => "completed",
      Self::Failed => "failed",
    }
  }
}

// ─── Transcription sub-document ──────────────────────────────────────────────

/// The canonical summary produced regardless of the provider's payload shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
  #[serde(default)]
  pub agenda:        Vec<String>,
  #[serde(default)]
  pub key_points:    Vec<String>,
  #[serde(default)]
  pub action_items:  Vec<String>,
  #[serde(default)]
  pub short_summary: String,
  #[serde(default)]
  pub speakers:      Vec<String>,
}

impl Summary {
  pub fn is_empty(&self) -> bool {
    self.agenda.is_empty()
      && self.key_points.is_empty()
      && self.action_items.is_empty()
      && self.short_summary.is_empty()
      && self.speakers.is_empty()
  }
}

/// Provider references for each transcript export format. Filled
/// independently; any subset may be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assets {
  pub txt:  Option<String>,
  pub srt:  Option<String>,
  pub json: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcription {
  /// Fixed when the meeting is created.
  pub enabled:          bool,
  pub status:           TranscriptionStatus,
  pub transcription_id: Option<String>,
  pub transcript:       Option<String>,
  #[serde(default)]
  pub summary:          Summary,
  /// The summary document exactly as the provider sent it.
  pub raw_summary:      Option<serde_json::Value>,
  #[serde(default)]
  pub assets:           Assets,
}

// ─── Meeting ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meeting {
  pub meeting_id:       Uuid,
  pub created_at:       DateTime<Utc>,
  pub updated_at:       DateTime<Utc>,
  pub name:             String,
  pub description:      String,
  /// Visibility, e.g. "public" or "private".
  #[serde(rename = "type")]
  pub kind:             Option<String>,
  /// The collaboration space (server) that owns the meeting.
  pub server_id:        Option<String>,
  pub host_id:          Option<String>,
  pub host_room_code:   Option<String>,
  pub guest_room_code:  Option<String>,
  /// Room lifecycle; independent of the recording status.
  pub status:           Option<String>,
  pub room_id:          Option<String>,
  pub recording_id:     Option<String>,
  pub recording_status: RecordingStatus,
  /// Final duration in seconds as reported by the provider.
  pub actual_duration:  Option<u64>,
  pub transcription:    Transcription,
}

impl Meeting {
  /// The recording half of the meeting, as returned by the read endpoints.
  pub fn recording(&self) -> RecordingView {
    RecordingView {
      room_id:          self.room_id.clone(),
      recording_id:     self.recording_id.clone(),
      recording_status: self.recording_status,
      actual_duration:  self.actual_duration,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingView {
  pub room_id:          Option<String>,
  pub recording_id:     Option<String>,
  pub recording_status: RecordingStatus,
  pub actual_duration:  Option<u64>,
}

// ─── NewMeeting ──────────────────────────────────────────────────────────────

/// Input to [`crate::store::MeetingStore::insert`]. Identity and timestamps
/// are assigned by the store.
#[derive(Debug, Clone, Default)]
pub struct NewMeeting {
  pub name:                  String,
  pub description:           String,
  pub kind:                  Option<String>,
  pub server_id:             Option<String>,
  pub host_id:               Option<String>,
  pub host_room_code:        Option<String>,
  pub guest_room_code:       Option<String>,
  pub status:                Option<String>,
  pub room_id:               Option<String>,
  pub transcription_enabled: bool,
}

impl NewMeeting {
  /// Convenience constructor with all optional fields unset.
  pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      description: description.into(),
      ..Self::default()
    }
  }

  /// Build the persisted document with the given identity.
  pub fn into_meeting(self, meeting_id: Uuid, now: DateTime<Utc>) -> Meeting {
    Meeting {
      meeting_id,
      created_at: now,
      updated_at: now,
      name: self.name,
      description: self.description,
      kind: self.kind,
      server_id: self.server_id,
      host_id: self.host_id,
      host_room_code: self.host_room_code,
      guest_room_code: self.guest_room_code,
      status: self.status,
      room_id: self.room_id,
      recording_id: None,
      recording_status: RecordingStatus::NotStarted,
      actual_duration: None,
      transcription: Transcription {
        enabled: self.transcription_enabled,
        ..Transcription::default()
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn statuses_serialize_snake_case() {
    let v = serde_json::to_value(RecordingStatus::NotStarted).unwrap();
    assert_eq!(v, "not_started");
    let v = serde_json::to_value(TranscriptionStatus::Processing).unwrap();
    assert_eq!(v, "processing");
  }

  #[test]
  fn new_meeting_defaults() {
    let mut input = NewMeeting::new("Standup", "Daily sync");
    input.transcription_enabled = true;
    let m = input.into_meeting(Uuid::nil(), Utc::now());
    assert_eq!(m.recording_status, RecordingStatus::NotStarted);
    assert_eq!(m.transcription.status, TranscriptionStatus::NotStarted);
    assert!(m.transcription.enabled);
    assert!(m.recording_id.is_none());
  }

  #[test]
  fn kind_is_serialized_as_type() {
    let mut input = NewMeeting::new("a", "b");
    input.kind = Some("private".into());
    let m = input.into_meeting(Uuid::nil(), Utc::now());
    let v = serde_json::to_value(&m).unwrap();
    assert_eq!(v["type"], "private");
  }
}
