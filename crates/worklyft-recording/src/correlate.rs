//! Meeting correlation: find the local meeting an asynchronous provider
//! event refers to.
//!
//! Precedence, first match wins:
//!
//! 1. any candidate recording id against the stored `recording_id`;
//! 2. the room id;
//! 3. when the event allows it, the most recently created meeting with
//!    transcription enabled.
//!
//! Matches by room or by fallback carry identifiers the meeting does not yet
//! hold; [`Correlation::heal`] writes them back.

use tracing::{debug, info};
use uuid::Uuid;
use worklyft_core::{event::CorrelationKeys, meeting::Meeting, store::MeetingStore};

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchedBy {
  RecordingId,
  RoomId,
  Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correlation {
  pub meeting_id: Uuid,
  pub matched_by: MatchedBy,
  pub keys:       CorrelationKeys,
}

impl Correlation {
  /// Write the event's identifiers onto `meeting`. Returns `true` if
  /// anything changed.
  pub fn heal(&self, meeting: &mut Meeting) -> bool {
    let mut changed = false;

    if self.matched_by == MatchedBy::Fallback
      && let Some(room_id) = &self.keys.room_id
      && meeting.room_id.as_ref() != Some(room_id)
    {
      meeting.room_id = Some(room_id.clone());
      changed = true;
    }

    if self.matched_by != MatchedBy::RecordingId
      && let Some(recording_id) = &self.keys.heal_recording_id
      && meeting.recording_id.as_ref() != Some(recording_id)
    {
      info!(
        meeting_id = %meeting.meeting_id,
        from = ?meeting.recording_id,
        to = %recording_id,
        "correcting recording id",
      );
      meeting.recording_id = Some(recording_id.clone());
      changed = true;
    }

    changed
  }
}

/// Locate the meeting for `keys`. `Ok(None)` means nothing matched and the
/// event should be dropped.
pub async fn resolve<S: MeetingStore>(
  store: &S,
  keys: &CorrelationKeys,
  allow_fallback: bool,
) -> Result<Option<Correlation>> {
  let found = |meeting: Meeting, matched_by: MatchedBy| {
    debug!(meeting_id = %meeting.meeting_id, ?matched_by, "correlated");
    Some(Correlation {
      meeting_id: meeting.meeting_id,
      matched_by,
      keys: keys.clone(),
    })
  };

  for id in &keys.recording_ids {
    if let Some(m) = store.find_by_recording_id(id).await.map_err(Error::store)? {
      return Ok(found(m, MatchedBy::RecordingId));
    }
  }

  if let Some(room_id) = &keys.room_id
    && let Some(m) = store.find_by_room_id(room_id).await.map_err(Error::store)?
  {
    return Ok(found(m, MatchedBy::RoomId));
  }

  if allow_fallback
    && let Some(m) =
      store.latest_transcription_enabled().await.map_err(Error::store)?
  {
    info!(
      meeting_id = %m.meeting_id,
      name = %m.name,
      "no id or room match; using most recent transcription-enabled meeting",
    );
    return Ok(found(m, MatchedBy::Fallback));
  }

  Ok(None)
}

#[cfg(test)]
mod tests {
  use worklyft_core::meeting::NewMeeting;
  use worklyft_store_sqlite::SqliteStore;

  use super::*;

  async fn store() -> SqliteStore { SqliteStore::open_in_memory().await.unwrap() }

  fn keys(recording: &[&str], room: Option<&str>) -> CorrelationKeys {
    CorrelationKeys {
      recording_ids:     recording.iter().map(|s| s.to_string()).collect(),
      room_id:           room.map(str::to_owned),
      heal_recording_id: recording.last().map(|s| s.to_string()),
    }
  }

  async fn insert(
    s: &SqliteStore,
    room: Option<&str>,
    recording: Option<&str>,
    enabled: bool,
  ) -> Meeting {
    let mut input = NewMeeting::new("m", "d");
    input.room_id = room.map(str::to_owned);
    input.transcription_enabled = enabled;
    let mut m = s.insert(input).await.unwrap();
    if recording.is_some() {
      m.recording_id = recording.map(str::to_owned);
      m = s.save(&m).await.unwrap();
    }
    m
  }

  #[tokio::test]
  async fn recording_id_beats_room() {
    let s = store().await;
    let by_room = insert(&s, Some("room1"), None, true).await;
    let by_rec = insert(&s, Some("room2"), Some("rec1"), true).await;

    let c = resolve(&s, &keys(&["rec1"], Some("room1")), true).await.unwrap().unwrap();
    assert_eq!(c.meeting_id, by_rec.meeting_id);
    assert_eq!(c.matched_by, MatchedBy::RecordingId);

    let c = resolve(&s, &keys(&["other"], Some("room1")), true).await.unwrap().unwrap();
    assert_eq!(c.meeting_id, by_room.meeting_id);
    assert_eq!(c.matched_by, MatchedBy::RoomId);
  }

  #[tokio::test]
  async fn any_candidate_id_matches() {
    let s = store().await;
    let m = insert(&s, None, Some("beam1"), false).await;
    let c = resolve(&s, &keys(&["beam1", "rec1"], None), false).await.unwrap().unwrap();
    assert_eq!(c.meeting_id, m.meeting_id);
  }

  #[tokio::test]
  async fn fallback_only_when_allowed() {
    let s = store().await;
    let m = insert(&s, Some("room-x"), None, true).await;
    insert(&s, None, None, false).await;

    let k = keys(&["rec9"], Some("room9"));
    assert!(resolve(&s, &k, false).await.unwrap().is_none());

    let c = resolve(&s, &k, true).await.unwrap().unwrap();
    assert_eq!(c.meeting_id, m.meeting_id);
    assert_eq!(c.matched_by, MatchedBy::Fallback);
  }

  #[tokio::test]
  async fn fallback_skips_disabled_meetings() {
    let s = store().await;
    insert(&s, None, None, false).await;
    assert!(resolve(&s, &keys(&["r"], Some("x")), true).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn heal_writes_room_and_recording_on_fallback() {
    let s = store().await;
    let mut m = insert(&s, Some("room-x"), None, true).await;
    let c = resolve(&s, &keys(&["rec9"], Some("room9")), true).await.unwrap().unwrap();

    assert!(c.heal(&mut m));
    assert_eq!(m.room_id.as_deref(), Some("room9"));
    assert_eq!(m.recording_id.as_deref(), Some("rec9"));
    assert!(!c.heal(&mut m));
  }

  #[tokio::test]
  async fn heal_on_room_match_keeps_room() {
    let s = store().await;
    let mut m = insert(&s, Some("room1"), Some("beam1"), true).await;
    let c = resolve(&s, &keys(&["rec1"], Some("room1")), false).await.unwrap().unwrap();

    assert!(c.heal(&mut m));
    assert_eq!(m.room_id.as_deref(), Some("room1"));
    assert_eq!(m.recording_id.as_deref(), Some("rec1"));
  }
}
