//! Asset resolution: fetch transcript and summary documents from presigned
//! URLs and fold them into a meeting.
//!
//! Fetching and applying are split so that the webhook path and the
//! on-demand pull share one set of transition rules. Each fetch is bounded
//! by a timeout and a failure only loses its own half; the transcript and
//! the summary are independent.

use std::{sync::Arc, time::Duration};

use serde_json::{Value, json};
use tracing::{debug, info, warn};
use worklyft_core::{
  event::{AssetUrls, TRANSCRIPTION_FAILURE},
  meeting::{Meeting, RecordingStatus, Summary, TranscriptionStatus},
  provider::VideoProvider,
  summary,
};

/// Default bound on a single presigned-URL fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// What could be fetched for one transcription outcome.
#[derive(Debug, Clone, Default)]
pub struct Fetched {
  pub transcript: Option<String>,
  /// Parsed summary document and its canonical form.
  pub summary:    Option<(Value, Summary)>,
}

impl Fetched {
  pub fn is_empty(&self) -> bool {
    self.transcript.is_none() && self.summary.is_none()
  }
}

pub struct AssetResolver<P> {
  provider: Arc<P>,
  timeout:  Duration,
}

impl<P: VideoProvider> AssetResolver<P> {
  pub fn new(provider: Arc<P>, timeout: Duration) -> Self { Self { provider, timeout } }

  /// Fetch the transcript text and the summary document, whichever are
  /// present. `duration` feeds the participants fallback of the summary.
  pub async fn fetch(&self, urls: &AssetUrls, duration: Option<u64>) -> Fetched {
    let transcript = match &urls.transcript_txt {
      Some(url) => self.fetch_text(url, "transcript").await,
      None => None,
    };
    let summary = match &urls.summary_json {
      Some(url) => self.fetch_summary(url, duration).await,
      None => None,
    };
    Fetched {
      transcript,
      summary,
    }
  }

  /// Fetch only the transcript; the failure path never reads a summary.
  pub async fn fetch_transcript(&self, urls: &AssetUrls) -> Option<String> {
    match &urls.transcript_txt {
      Some(url) => self.fetch_text(url, "transcript").await,
      None => None,
    }
  }

  async fn fetch_text(&self, url: &str, what: &'static str) -> Option<String> {
    match tokio::time::timeout(self.timeout, self.provider.fetch_asset(url)).await {
      Ok(Ok(body)) => {
        debug!(what, bytes = body.len(), "asset fetched");
        Some(body)
      }
      Ok(Err(e)) => {
        warn!(what, error = %e, "asset fetch failed");
        None
      }
      Err(_) => {
        warn!(what, timeout_secs = self.timeout.as_secs(), "asset fetch timed out");
        None
      }
    }
  }

  async fn fetch_summary(
    &self,
    url: &str,
    duration: Option<u64>,
  ) -> Option<(Value, Summary)> {
    let body = self.fetch_text(url, "summary").await?;
    let parsed = summary::parse_document(&body)
      .and_then(|doc| summary::normalize(&doc, duration).map(|s| (doc, s)));
    match parsed {
      Ok(pair) => Some(pair),
      Err(e) => {
        warn!(error = %e, "summary document rejected");
        None
      }
    }
  }
}

// ─── Transitions ─────────────────────────────────────────────────────────────

fn record_unfetched_assets(meeting: &mut Meeting, urls: &AssetUrls) {
  if let Some(url) = &urls.transcript_srt {
    meeting.transcription.assets.srt = Some(url.clone());
  }
  if let Some(url) = &urls.transcript_json {
    meeting.transcription.assets.json = Some(url.clone());
  }
}

fn record_duration(meeting: &mut Meeting, duration: Option<u64>) {
  if let Some(d) = duration.filter(|d| *d > 0) {
    meeting.actual_duration = Some(d);
  }
}

/// A transcription finished. Whatever was fetched replaces the stored half;
/// a half that could not be fetched keeps its previous value.
pub fn apply_success(
  meeting: &mut Meeting,
  urls: &AssetUrls,
  fetched: Fetched,
  duration: Option<u64>,
) {
  record_duration(meeting, duration);

  let attempted = urls.has_fetchable();
  let obtained = !fetched.is_empty();
  let holds_results = meeting.transcription.transcript.is_some()
    || !meeting.transcription.summary.is_empty();

  if let (Some(text), Some(url)) = (fetched.transcript, &urls.transcript_txt) {
    meeting.transcription.transcript = Some(text);
    meeting.transcription.assets.txt = Some(url.clone());
  }
  if let Some((raw, canonical)) = fetched.summary {
    meeting.transcription.summary = canonical;
    meeting.transcription.raw_summary = Some(raw);
  }
  record_unfetched_assets(meeting, urls);

  if obtained || !attempted {
    meeting.transcription.status = TranscriptionStatus::Completed;
  } else if !holds_results {
    meeting.transcription.status = TranscriptionStatus::Failed;
  }
  // Otherwise a redelivery whose URLs have expired keeps the stored outcome.
  meeting.recording_status = RecordingStatus::Completed;

  info!(
    meeting_id = %meeting.meeting_id,
    status = meeting.transcription.status.as_str(),
    "transcription results applied",
  );
}

/// The provider reported a failed transcription. The summary is reset; a
/// non-empty transcript that could still be fetched rescues the outcome.
pub fn apply_failure(
  meeting: &mut Meeting,
  urls: &AssetUrls,
  transcript: Option<String>,
  duration: Option<u64>,
  payload: &Value,
) {
  record_duration(meeting, duration);
  meeting.recording_status = RecordingStatus::Completed;
  meeting.transcription.status = TranscriptionStatus::Failed;

  if let (Some(text), Some(url)) = (transcript, &urls.transcript_txt) {
    if !text.trim().is_empty() {
      meeting.transcription.status = TranscriptionStatus::Completed;
    }
    meeting.transcription.transcript = Some(text);
    meeting.transcription.assets.txt = Some(url.clone());
  }
  record_unfetched_assets(meeting, urls);

  meeting.transcription.summary = Summary::default();
  meeting.transcription.raw_summary = Some(json!({
    "error": "Transcription processing failed",
    "originalData": payload,
    "failureType": TRANSCRIPTION_FAILURE,
  }));

  info!(
    meeting_id = %meeting.meeting_id,
    status = meeting.transcription.status.as_str(),
    "transcription failure applied",
  );
}

/// The older failure event: no salvage is attempted.
pub fn apply_legacy_failure(meeting: &mut Meeting) {
  meeting.transcription.status = TranscriptionStatus::Failed;
  meeting.transcription.summary = Summary::default();
}
