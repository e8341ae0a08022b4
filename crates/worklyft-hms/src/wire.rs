//! Request and response bodies of the 100ms v2 REST API.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use worklyft_core::provider::{
  AssetKind, ProviderRecording, RecordingAsset, RecordingRequest, RoomCodes,
  SummarySection,
};

// ─── Rooms ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CreateRoomBody<'a> {
  pub name:        String,
  pub description: &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub template_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub struct RoomResponse {
  pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct RoomCodeEntry {
  pub code: String,
  pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct RoomCodesResponse {
  #[serde(default)]
  pub data: Vec<RoomCodeEntry>,
}

impl From<RoomCodesResponse> for RoomCodes {
  fn from(r: RoomCodesResponse) -> Self {
    let code_for = |role: &str| {
      r.data
        .iter()
        .find(|e| e.role == role)
        .map(|e| e.code.clone())
    };
    RoomCodes {
      host:  code_for("host"),
      guest: code_for("guest"),
    }
  }
}

// ─── Recording start ─────────────────────────────────────────────────────────

const OUTPUT_MODES: [&str; 3] = ["txt", "srt", "json"];
const SUMMARY_TEMPERATURE: f32 = 0.5;

#[derive(Debug, Serialize)]
pub struct SummaryBody<'a> {
  pub enabled:     bool,
  pub sections:    &'a [SummarySection],
  pub temperature: f32,
}

#[derive(Debug, Serialize)]
pub struct TranscriptionBody<'a> {
  pub enabled:           bool,
  pub output_modes:      [&'static str; 3],
  #[serde(skip_serializing_if = "<[String]>::is_empty")]
  pub custom_vocabulary: &'a [String],
  pub summary:           SummaryBody<'a>,
}

#[derive(Debug, Serialize)]
pub struct StartRecordingBody<'a> {
  pub transcription: TranscriptionBody<'a>,
}

impl<'a> From<&'a RecordingRequest> for StartRecordingBody<'a> {
  fn from(r: &'a RecordingRequest) -> Self {
    Self {
      transcription: TranscriptionBody {
        enabled:           r.transcription,
        output_modes:      OUTPUT_MODES,
        custom_vocabulary: &r.custom_vocabulary,
        summary:           SummaryBody {
          enabled:     r.transcription && !r.summary_sections.is_empty(),
          sections:    &r.summary_sections,
          temperature: SUMMARY_TEMPERATURE,
        },
      },
    }
  }
}

// ─── Recordings ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RecordingResponse {
  pub id:       String,
  pub room_id:  Option<String>,
  pub status:   Option<String>,
  /// Seconds; sometimes fractional.
  pub duration: Option<f64>,
}

impl From<RecordingResponse> for ProviderRecording {
  fn from(r: RecordingResponse) -> Self {
    ProviderRecording {
      id:       r.id,
      room_id:  r.room_id,
      status:   r.status,
      duration: r.duration.filter(|d| *d >= 0.0).map(|d| d.round() as u64),
    }
  }
}

// ─── Assets ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AssetEntry {
  pub id:       String,
  #[serde(rename = "type")]
  pub kind:     String,
  pub path:     Option<String>,
  pub metadata: Option<Value>,
}

impl From<AssetEntry> for RecordingAsset {
  fn from(a: AssetEntry) -> Self {
    let kind = match a.kind.as_str() {
      "transcript" => AssetKind::Transcript,
      "summary" => AssetKind::Summary,
      _ => AssetKind::Other,
    };
    // Prefer the declared output mode; fall back to the file extension.
    let format = a
      .metadata
      .as_ref()
      .and_then(|m| m.get("output_mode"))
      .and_then(Value::as_str)
      .map(str::to_owned)
      .or_else(|| {
        a.path
          .as_deref()
          .and_then(|p| p.rsplit_once('.'))
          .map(|(_, ext)| ext.to_ascii_lowercase())
      });
    RecordingAsset {
      id: a.id,
      kind,
      format,
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct AssetListResponse {
  #[serde(default)]
  pub data: Vec<AssetEntry>,
}

#[derive(Debug, Deserialize)]
pub struct PresignedUrlResponse {
  pub url: String,
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn start_body_requests_transcription_and_sections() {
    let request = RecordingRequest::with_transcription(vec!["WorkLyft".into()]);
    let body = serde_json::to_value(StartRecordingBody::from(&request)).unwrap();

    assert_eq!(body["transcription"]["enabled"], true);
    assert_eq!(body["transcription"]["output_modes"], json!(["txt", "srt", "json"]));
    assert_eq!(body["transcription"]["custom_vocabulary"], json!(["WorkLyft"]));
    let sections = &body["transcription"]["summary"]["sections"];
    assert_eq!(sections[1], json!({ "title": "Key Points", "format": "bullets" }));
    assert_eq!(sections[3], json!({ "title": "Short Summary", "format": "paragraph" }));
  }

  #[test]
  fn empty_vocabulary_is_omitted() {
    let request = RecordingRequest::with_transcription(vec![]);
    let body = serde_json::to_value(StartRecordingBody::from(&request)).unwrap();
    assert!(body["transcription"].get("custom_vocabulary").is_none());
  }

  #[test]
  fn room_codes_pick_roles() {
    let resp: RoomCodesResponse = serde_json::from_value(json!({
      "data": [
        { "code": "abc-host", "role": "host" },
        { "code": "abc-guest", "role": "guest" },
      ]
    }))
    .unwrap();
    let codes = RoomCodes::from(resp);
    assert_eq!(codes.host.as_deref(), Some("abc-host"));
    assert_eq!(codes.guest.as_deref(), Some("abc-guest"));
  }

  #[test]
  fn asset_format_from_metadata_or_path() {
    let with_meta: AssetEntry = serde_json::from_value(json!({
      "id": "a1", "type": "transcript", "path": "s3://b/x",
      "metadata": { "output_mode": "srt" }
    }))
    .unwrap();
    let asset = RecordingAsset::from(with_meta);
    assert_eq!(asset.kind, AssetKind::Transcript);
    assert_eq!(asset.format.as_deref(), Some("srt"));

    let from_path: AssetEntry = serde_json::from_value(json!({
      "id": "a2", "type": "summary", "path": "s3://b/summary.JSON"
    }))
    .unwrap();
    let asset = RecordingAsset::from(from_path);
    assert_eq!(asset.kind, AssetKind::Summary);
    assert_eq!(asset.format.as_deref(), Some("json"));
  }
}
