//! Provider webhook events.
//!
//! The provider posts `{"type": "<event name>", "data": {...}}`. Only the
//! recording and transcription events below are understood; anything else is
//! reported as unrecognised so the caller can log and drop it.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{Error, Result};

pub const BEAM_STARTED: &str = "beam.started.success";
pub const BEAM_STOPPED: &str = "beam.stopped.success";
pub const BEAM_RECORDING: &str = "beam.recording.success";
pub const TRANSCRIPTION_STARTED: &str = "transcription.started.success";
pub const TRANSCRIPTION_SUCCESS: &str = "transcription.success";
pub const TRANSCRIPTION_FAILURE: &str = "transcription.failure";
/// Older failure event; carries no assets worth salvaging.
pub const TRANSCRIPTION_FAILED: &str = "transcription.failed";

// ─── Envelope ────────────────────────────────────────────────────────────────

/// The outer shape of every webhook body. Both fields are optional here so
/// that a malformed body can be reported precisely.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Envelope {
  #[serde(rename = "type")]
  pub event_type: Option<String>,
  pub data:       Option<Value>,
}

// ─── Payloads ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BeamEvent {
  #[serde(default, deserialize_with = "non_empty")]
  pub beam_id: Option<String>,
  #[serde(default, deserialize_with = "non_empty")]
  pub room_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BeamRecordingEvent {
  /// The final recording id; may differ from the beam id used at start.
  #[serde(default, deserialize_with = "non_empty")]
  pub recording_id: Option<String>,
  #[serde(default, deserialize_with = "non_empty")]
  pub beam_id:      Option<String>,
  #[serde(default, deserialize_with = "non_empty")]
  pub room_id:      Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranscriptionStartedEvent {
  #[serde(default, deserialize_with = "non_empty")]
  pub recording_id:     Option<String>,
  #[serde(default, deserialize_with = "non_empty")]
  pub transcription_id: Option<String>,
  #[serde(default, deserialize_with = "non_empty")]
  pub room_id:          Option<String>,
}

/// Presigned URLs for the assets of a finished transcription.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetUrls {
  #[serde(
    rename = "transcript_txt_presigned_url",
    default,
    deserialize_with = "non_empty"
  )]
  pub transcript_txt: Option<String>,
  #[serde(
    rename = "transcript_srt_presigned_url",
    default,
    deserialize_with = "non_empty"
  )]
  pub transcript_srt: Option<String>,
  #[serde(
    rename = "transcript_json_presigned_url",
    default,
    deserialize_with = "non_empty"
  )]
  pub transcript_json: Option<String>,
  #[serde(
    rename = "summary_json_presigned_url",
    default,
    deserialize_with = "non_empty"
  )]
  pub summary_json: Option<String>,
}

impl AssetUrls {
  /// `true` if at least one asset would be fetched.
  pub fn has_fetchable(&self) -> bool {
    self.transcript_txt.is_some() || self.summary_json.is_some()
  }
}

/// Body of `transcription.success` and `transcription.failure`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranscriptionReport {
  #[serde(default, deserialize_with = "non_empty")]
  pub recording_id: Option<String>,
  #[serde(default, deserialize_with = "non_empty")]
  pub room_id:      Option<String>,
  /// Seconds.
  #[serde(default, deserialize_with = "lenient_seconds")]
  pub duration:     Option<u64>,
  #[serde(flatten)]
  pub assets:       AssetUrls,
  /// The untouched `data` object, kept for diagnostics.
  #[serde(skip)]
  pub raw:          Value,
}

/// Body of the legacy `transcription.failed` event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordingRef {
  #[serde(default, deserialize_with = "non_empty")]
  pub recording_id: Option<String>,
  #[serde(default, deserialize_with = "non_empty")]
  pub room_id:      Option<String>,
}

// ─── Event ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum WebhookEvent {
  BeamStarted(BeamEvent),
  BeamStopped(BeamEvent),
  BeamRecording(BeamRecordingEvent),
  TranscriptionStarted(TranscriptionStartedEvent),
  TranscriptionSucceeded(TranscriptionReport),
  TranscriptionFailure(TranscriptionReport),
  TranscriptionFailedLegacy(RecordingRef),
}

/// The identifiers an event carries for locating its meeting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrelationKeys {
  /// Recording or beam ids, in the order they should be tried.
  pub recording_ids:     Vec<String>,
  pub room_id:           Option<String>,
  /// The id written onto a meeting found by room or by fallback.
  pub heal_recording_id: Option<String>,
}

impl WebhookEvent {
  /// Decode an envelope. Returns `Ok(None)` for event types this service
  /// does not handle.
  pub fn from_envelope(envelope: Envelope) -> Result<Option<Self>> {
    let event_type = envelope.event_type.ok_or(Error::MissingField("type"))?;
    let data = match envelope.data {
      Some(Value::Null) | None => return Err(Error::MissingField("data")),
      Some(data) => data,
    };

    let event = match event_type.as_str() {
      BEAM_STARTED => Self::BeamStarted(serde_json::from_value(data)?),
      BEAM_STOPPED => Self::BeamStopped(serde_json::from_value(data)?),
      BEAM_RECORDING => Self::BeamRecording(serde_json::from_value(data)?),
      TRANSCRIPTION_STARTED => {
        Self::TranscriptionStarted(serde_json::from_value(data)?)
      }
      TRANSCRIPTION_SUCCESS => Self::TranscriptionSucceeded(report(data)?),
      TRANSCRIPTION_FAILURE => Self::TranscriptionFailure(report(data)?),
      TRANSCRIPTION_FAILED => {
        Self::TranscriptionFailedLegacy(serde_json::from_value(data)?)
      }
      _ => return Ok(None),
    };
    Ok(Some(event))
  }

  /// Decode a raw request body.
  pub fn from_slice(body: &[u8]) -> Result<Option<Self>> {
    let envelope: Envelope = serde_json::from_slice(body)?;
    Self::from_envelope(envelope)
  }

  pub fn name(&self) -> &'static str {
    match self {
      Self::BeamStarted(_) => BEAM_STARTED,
      Self::BeamStopped(_) => BEAM_STOPPED,
      Self::BeamRecording(_) => BEAM_RECORDING,
      Self::TranscriptionStarted(_) => TRANSCRIPTION_STARTED,
      Self::TranscriptionSucceeded(_) => TRANSCRIPTION_SUCCESS,
      Self::TranscriptionFailure(_) => TRANSCRIPTION_FAILURE,
      Self::TranscriptionFailedLegacy(_) => TRANSCRIPTION_FAILED,
    }
  }

  /// Whether an uncorrelated event may claim the most recent
  /// transcription-enabled meeting.
  pub fn allows_fallback(&self) -> bool {
    matches!(
      self,
      Self::BeamStarted(_)
        | Self::TranscriptionStarted(_)
        | Self::TranscriptionSucceeded(_)
        | Self::TranscriptionFailure(_)
    )
  }

  pub fn correlation(&self) -> CorrelationKeys {
    match self {
      // Beam ids are only written by the `beam.started` transition itself.
      Self::BeamStarted(e) | Self::BeamStopped(e) => CorrelationKeys {
        recording_ids:     e.beam_id.iter().cloned().collect(),
        room_id:           e.room_id.clone(),
        heal_recording_id: None,
      },
      // The stored id is still the beam id until this event lands; a
      // redelivery finds the final id instead.
      Self::BeamRecording(e) => CorrelationKeys {
        recording_ids:     e
          .beam_id
          .iter()
          .chain(e.recording_id.iter())
          .cloned()
          .collect(),
        room_id:           e.room_id.clone(),
        heal_recording_id: e.recording_id.clone(),
      },
      Self::TranscriptionStarted(e) => CorrelationKeys {
        recording_ids:     e.recording_id.iter().cloned().collect(),
        room_id:           e.room_id.clone(),
        heal_recording_id: e.recording_id.clone(),
      },
      Self::TranscriptionSucceeded(r) | Self::TranscriptionFailure(r) => {
        CorrelationKeys {
          recording_ids:     r.recording_id.iter().cloned().collect(),
          room_id:           r.room_id.clone(),
          heal_recording_id: r.recording_id.clone(),
        }
      }
      // Marks the meeting failed and nothing else.
      Self::TranscriptionFailedLegacy(r) => CorrelationKeys {
        recording_ids:     r.recording_id.iter().cloned().collect(),
        room_id:           r.room_id.clone(),
        heal_recording_id: None,
      },
    }
  }
}

fn report(data: Value) -> Result<TranscriptionReport> {
  let mut report: TranscriptionReport = serde_json::from_value(data.clone())?;
  report.raw = data;
  Ok(report)
}

// ─── Lenient field decoding ──────────────────────────────────────────────────

/// Strings and numbers become `Some(String)`; null and `""` become `None`.
fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(match Option::<Value>::deserialize(deserializer)? {
    Some(Value::String(s)) if !s.is_empty() => Some(s),
    Some(Value::Number(n)) => Some(n.to_string()),
    _ => None,
  })
}

/// Accepts integer, float, or numeric-string seconds. Anything else is
/// treated as unknown rather than failing the whole event.
fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(match Option::<Value>::deserialize(deserializer)? {
    Some(Value::Number(n)) => n
      .as_u64()
      .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64)),
    Some(Value::String(s)) => s
      .trim()
      .parse::<f64>()
      .ok()
      .filter(|f| *f >= 0.0)
      .map(|f| f.round() as u64),
    _ => None,
  })
}
