//! Webhook event dispatch.
//!
//! The HTTP layer acknowledges a webhook before anything here runs. Each
//! body is decoded, correlated to a meeting and applied in its own task;
//! failures stop at the task boundary and are only logged.
//!
//! Delivery may be duplicated or reordered. Every transition is written so
//! that replaying it, or applying it after a later event, leaves the
//! meeting where a single in-order delivery would.

use bytes::Bytes;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;
use worklyft_core::{
  event::WebhookEvent,
  meeting::{Meeting, RecordingStatus, TranscriptionStatus},
  provider::VideoProvider,
  store::MeetingStore,
};

use crate::{
  Result,
  assets::{self, Fetched},
  controller::RecordingService,
  correlate,
};

/// What became of one webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
  /// Event type this service does not handle.
  Ignored,
  /// No meeting matched; the event is dropped.
  Unmatched,
  /// Matched, but the meeting already reflected the event.
  Unchanged(Uuid),
  Applied(Uuid),
}

/// Assets fetched ahead of taking the meeting lock.
enum Prefetched {
  Nothing,
  Success(Fetched),
  Failure(Option<String>),
}

impl<S, P> RecordingService<S, P>
where
  S: MeetingStore + 'static,
  P: VideoProvider + 'static,
{
  /// Process `body` on a background task.
  pub fn spawn_webhook(&self, body: Bytes) -> JoinHandle<()> {
    let service = self.clone();
    tokio::spawn(async move {
      match service.handle_webhook(&body).await {
        Ok(outcome) => debug!(?outcome, "webhook processed"),
        Err(e) => error!(error = %e, "webhook processing failed"),
      }
    })
  }
}

impl<S: MeetingStore, P: VideoProvider> RecordingService<S, P> {
  /// Decode and apply one webhook body.
  pub async fn handle_webhook(&self, body: &[u8]) -> Result<Outcome> {
    match WebhookEvent::from_slice(body)? {
      Some(event) => self.apply_event(event).await,
      None => {
        debug!("ignoring unhandled webhook type");
        Ok(Outcome::Ignored)
      }
    }
  }

  pub async fn apply_event(&self, event: WebhookEvent) -> Result<Outcome> {
    let span = info_span!("webhook", event = event.name());
    self.apply_event_inner(event).instrument(span).await
  }

  async fn apply_event_inner(&self, event: WebhookEvent) -> Result<Outcome> {
    let keys = event.correlation();
    let Some(found) =
      correlate::resolve(self.store.as_ref(), &keys, event.allows_fallback()).await?
    else {
      warn!(
        recording_ids = ?keys.recording_ids,
        room_id = ?keys.room_id,
        "no meeting matches webhook; dropped",
      );
      return Ok(Outcome::Unmatched);
    };

    // Network fetches happen outside the lock.
    let prefetched = match &event {
      WebhookEvent::TranscriptionSucceeded(r) => {
        Prefetched::Success(self.assets.fetch(&r.assets, r.duration).await)
      }
      WebhookEvent::TranscriptionFailure(r) => {
        Prefetched::Failure(self.assets.fetch_transcript(&r.assets).await)
      }
      _ => Prefetched::Nothing,
    };

    let id = found.meeting_id;
    let _guard = self.locks.lock(id).await;
    // Re-read under the lock; another event may have landed meanwhile.
    let mut meeting = self.load(id).await?;

    let changed = transition(&mut meeting, &event, prefetched);
    // A rejected `beam.started` leaves the meeting exactly as it was.
    let rejected = !changed && matches!(event, WebhookEvent::BeamStarted(_));
    let healed = !rejected && found.heal(&mut meeting);
    if !(healed || changed) {
      debug!(meeting_id = %id, "meeting already up to date");
      return Ok(Outcome::Unchanged(id));
    }

    self.save(&meeting).await?;
    info!(
      meeting_id = %id,
      recording_status = meeting.recording_status.as_str(),
      transcription_status = meeting.transcription.status.as_str(),
      "webhook applied",
    );
    Ok(Outcome::Applied(id))
  }
}

/// Apply `event` to `meeting`. Returns `true` if anything changed.
fn transition(meeting: &mut Meeting, event: &WebhookEvent, prefetched: Prefetched) -> bool {
  match (event, prefetched) {
    (WebhookEvent::BeamStarted(e), _) => {
      if meeting.recording_status != RecordingStatus::NotStarted {
        return false;
      }
      meeting.recording_status = RecordingStatus::Started;
      if let Some(beam_id) = &e.beam_id {
        meeting.recording_id = Some(beam_id.clone());
      }
      true
    }

    (WebhookEvent::BeamStopped(_), _) => {
      let mut changed = false;
      if !matches!(
        meeting.recording_status,
        RecordingStatus::Stopped | RecordingStatus::Completed
      ) {
        meeting.recording_status = RecordingStatus::Stopped;
        changed = true;
      }
      if !meeting.transcription.status.is_terminal()
        && meeting.transcription.status != TranscriptionStatus::Processing
      {
        meeting.transcription.status = TranscriptionStatus::Processing;
        changed = true;
      }
      changed
    }

    (WebhookEvent::BeamRecording(e), _) => {
      let before = (meeting.recording_id.clone(), meeting.recording_status);
      if let Some(recording_id) = &e.recording_id {
        meeting.recording_id = Some(recording_id.clone());
      }
      meeting.recording_status = RecordingStatus::Completed;
      before != (meeting.recording_id.clone(), meeting.recording_status)
    }

    (WebhookEvent::TranscriptionStarted(e), _) => {
      let mut changed = false;
      if !meeting.transcription.status.is_terminal()
        && meeting.transcription.status != TranscriptionStatus::Processing
      {
        meeting.transcription.status = TranscriptionStatus::Processing;
        changed = true;
      }
      if let Some(tid) = &e.transcription_id
        && meeting.transcription.transcription_id.as_ref() != Some(tid)
      {
        meeting.transcription.transcription_id = Some(tid.clone());
        changed = true;
      }
      changed
    }

    (WebhookEvent::TranscriptionSucceeded(r), Prefetched::Success(fetched)) => {
      assets::apply_success(meeting, &r.assets, fetched, r.duration);
      true
    }

    (WebhookEvent::TranscriptionFailure(r), Prefetched::Failure(transcript)) => {
      assets::apply_failure(meeting, &r.assets, transcript, r.duration, &r.raw);
      true
    }

    (WebhookEvent::TranscriptionFailedLegacy(_), _) => {
      assets::apply_legacy_failure(meeting);
      true
    }

    // Outcome events always arrive with their prefetch.
    (WebhookEvent::TranscriptionSucceeded(_) | WebhookEvent::TranscriptionFailure(_), _) => {
      false
    }
  }
}
