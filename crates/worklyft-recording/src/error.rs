//! Error type for `worklyft-recording`.

use thiserror::Error;
use uuid::Uuid;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("meeting not found: {0}")]
  MeetingNotFound(Uuid),

  /// The meeting is not in a state that allows the operation.
  #[error("{0}")]
  Precondition(&'static str),

  #[error("video provider error: {0}")]
  Provider(#[source] BoxError),

  #[error("store error: {0}")]
  Store(#[source] BoxError),

  #[error("malformed webhook: {0}")]
  Event(#[from] worklyft_core::Error),
}

impl Error {
  pub(crate) fn provider(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Provider(Box::new(e))
  }

  pub(crate) fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
