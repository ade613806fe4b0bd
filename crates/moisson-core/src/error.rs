//! Error types for `moisson-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("unknown harvesting state: {0:?}")]
  UnknownState(String),

  #[error("unknown event type: {0:?}")]
  UnknownEventType(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
