//! Error types for `worklyft-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("webhook payload is missing `{0}`")]
  MissingField(&'static str),

  #[error("summary document is not a JSON object")]
  SummaryNotObject,

  #[error("summary `sections` is not a list")]
  SectionsNotList,

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
