//! Error type for `worklyft-hms`.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The provider answered with a non-success status. `body` is the raw
  /// response text, kept for logging.
  #[error("{what} failed with status {status}: {body}")]
  Status {
    what:   String,
    status: StatusCode,
    body:   String,
  },

  #[error("unexpected response from {what}: {source}")]
  Decode {
    what:   String,
    #[source]
    source: serde_json::Error,
  },

  #[error("token signing error: {0}")]
  Token(String),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
