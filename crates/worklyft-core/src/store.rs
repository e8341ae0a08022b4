//! The `MeetingStore` trait.
//!
//! Implemented by storage backends (e.g. `worklyft-store-sqlite`). The
//! reconciliation engine and the API depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::meeting::{Meeting, NewMeeting};

/// Abstraction over the meeting record store.
///
/// Meetings are whole documents. Every mutation is a read-modify-write of one
/// document followed by a single [`MeetingStore::save`]; no cross-document
/// transactions are offered.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait MeetingStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Create and persist a new meeting. Identity and timestamps are assigned
  /// by the store.
  fn insert(
    &self,
    input: NewMeeting,
  ) -> impl Future<Output = Result<Meeting, Self::Error>> + Send + '_;

  /// Retrieve a meeting by id. Returns `None` if not found.
  fn get(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Meeting>, Self::Error>> + Send + '_;

  /// Overwrite the stored document with `meeting` and return it with a fresh
  /// `updated_at`.
  ///
  /// A non-null `recording_id` is unique across meetings: saving claims the
  /// id, clearing it from any other meeting that held it.
  fn save<'a>(
    &'a self,
    meeting: &'a Meeting,
  ) -> impl Future<Output = Result<Meeting, Self::Error>> + Send + 'a;

  /// The most recently created meeting whose `recording_id` equals `id`.
  fn find_by_recording_id<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Meeting>, Self::Error>> + Send + 'a;

  /// The most recently created meeting whose `room_id` equals `id`.
  fn find_by_room_id<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Meeting>, Self::Error>> + Send + 'a;

  /// The most recently created meeting with transcription enabled.
  fn latest_transcription_enabled(
    &self,
  ) -> impl Future<Output = Result<Option<Meeting>, Self::Error>> + Send + '_;

  /// Meetings ordered newest first.
  fn list(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Meeting>, Self::Error>> + Send + '_;
}
