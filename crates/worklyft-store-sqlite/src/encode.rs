//! Encoding helpers between domain types and SQLite column values.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`)
//! so that lexical order is chronological. UUIDs are stored as hyphenated
//! lowercase strings. The meeting itself is stored as compact JSON.

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;
use worklyft_core::meeting::Meeting;

use crate::Result;

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Column values written for a meeting on insert and save.
pub struct MeetingRow {
  pub meeting_id:            String,
  pub created_at:            String,
  pub updated_at:            String,
  pub room_id:               Option<String>,
  pub recording_id:          Option<String>,
  pub transcription_enabled: bool,
  pub document:              String,
}

impl MeetingRow {
  pub fn from_meeting(meeting: &Meeting) -> Result<Self> {
    Ok(Self {
      meeting_id:            encode_uuid(meeting.meeting_id),
      created_at:            encode_dt(meeting.created_at),
      updated_at:            encode_dt(meeting.updated_at),
      room_id:               meeting.room_id.clone(),
      recording_id:          meeting.recording_id.clone(),
      transcription_enabled: meeting.transcription.enabled,
      document:              serde_json::to_string(meeting)?,
    })
  }
}

pub fn decode_meeting(document: &str) -> Result<Meeting> {
  Ok(serde_json::from_str(document)?)
}
