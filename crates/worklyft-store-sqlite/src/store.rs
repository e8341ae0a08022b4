//! [`SqliteStore`]: the SQLite implementation of [`MeetingStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use worklyft_core::{
  meeting::{Meeting, NewMeeting},
  store::MeetingStore,
};

use crate::{
  Error, Result,
  encode::{MeetingRow, decode_meeting, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A meeting record store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a query selecting `document` and decode the first row, if any.
  async fn query_one(
    &self,
    sql: &'static str,
    param: Option<String>,
  ) -> Result<Option<Meeting>> {
    let document: Option<String> = self
      .conn
      .call(move |conn| {
        let row: Option<String> = match param {
          Some(p) => conn
            .query_row(sql, rusqlite::params![p], |row| row.get(0))
            .optional()?,
          None => conn.query_row(sql, [], |row| row.get(0)).optional()?,
        };
        Ok(row)
      })
      .await?;

    document.as_deref().map(decode_meeting).transpose()
  }
}

// ─── MeetingStore impl ───────────────────────────────────────────────────────

impl MeetingStore for SqliteStore {
  type Error = Error;

  async fn insert(&self, input: NewMeeting) -> Result<Meeting> {
    let meeting = input.into_meeting(Uuid::new_v4(), Utc::now());
    let row = MeetingRow::from_meeting(&meeting)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO meetings (
             meeting_id, created_at, updated_at, room_id, recording_id,
             transcription_enabled, document
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            row.meeting_id,
            row.created_at,
            row.updated_at,
            row.room_id,
            row.recording_id,
            row.transcription_enabled,
            row.document,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(meeting)
  }

  async fn get(&self, id: Uuid) -> Result<Option<Meeting>> {
    self
      .query_one(
        "SELECT document FROM meetings WHERE meeting_id = ?1",
        Some(encode_uuid(id)),
      )
      .await
  }

  async fn save(&self, meeting: &Meeting) -> Result<Meeting> {
    let mut saved = meeting.clone();
    saved.updated_at = Utc::now();
    let row = MeetingRow::from_meeting(&saved)?;

    let updated: usize = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // Claim the recording id: no other meeting may keep it.
        if let Some(recording_id) = &row.recording_id {
          tx.execute(
            "UPDATE meetings
                SET recording_id = NULL,
                    document     = json_set(document, '$.recording_id', NULL)
              WHERE recording_id = ?1 AND meeting_id != ?2",
            rusqlite::params![recording_id, row.meeting_id],
          )?;
        }

        let n = tx.execute(
          "UPDATE meetings
              SET updated_at = ?2, room_id = ?3, recording_id = ?4,
                  transcription_enabled = ?5, document = ?6
            WHERE meeting_id = ?1",
          rusqlite::params![
            row.meeting_id,
            row.updated_at,
            row.room_id,
            row.recording_id,
            row.transcription_enabled,
            row.document,
          ],
        )?;

        tx.commit()?;
        Ok(n)
      })
      .await?;

    if updated == 0 {
      return Err(Error::MeetingNotFound(saved.meeting_id));
    }
    Ok(saved)
  }

  async fn find_by_recording_id(&self, id: &str) -> Result<Option<Meeting>> {
    self
      .query_one(
        "SELECT document FROM meetings WHERE recording_id = ?1
          ORDER BY created_at DESC, rowid DESC LIMIT 1",
        Some(id.to_owned()),
      )
      .await
  }

  async fn find_by_room_id(&self, id: &str) -> Result<Option<Meeting>> {
    self
      .query_one(
        "SELECT document FROM meetings WHERE room_id = ?1
          ORDER BY created_at DESC, rowid DESC LIMIT 1",
        Some(id.to_owned()),
      )
      .await
  }

  async fn latest_transcription_enabled(&self) -> Result<Option<Meeting>> {
    self
      .query_one(
        "SELECT document FROM meetings WHERE transcription_enabled = 1
          ORDER BY created_at DESC, rowid DESC LIMIT 1",
        None,
      )
      .await
  }

  async fn list(&self, limit: usize) -> Result<Vec<Meeting>> {
    let limit_val = limit as i64;

    let documents: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT document FROM meetings
            ORDER BY created_at DESC, rowid DESC LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![limit_val], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;

    documents.iter().map(|d| decode_meeting(d)).collect()
  }
}
