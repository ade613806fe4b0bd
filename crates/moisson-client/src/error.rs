//! Engine error taxonomy.
//!
//! Submission and poll failures end the job; a detail-fetch failure is local
//! to its table row; an unavailable previous version is not an error at all
//! (it renders as a placeholder) and therefore has no variant here.

use thiserror::Error;

/// A failure that ends a retrieval job.
#[derive(Debug, Error)]
pub enum RetrievalError<E>
where
  E: std::error::Error + Send + Sync + 'static,
{
  /// The remote service rejected the submission; no job was created and the
  /// controller stays in `Idle`.
  #[error("submission failed: {0}")]
  Submission(#[source] E),

  /// A poll failed mid-job. Fatal to that job: polling stops, the last known
  /// state remains displayed, and the operator must resubmit.
  #[error("poll failed: {0}")]
  Poll(#[source] E),
}

/// A failure while assembling one row's detail pane. Local to that row;
/// clearing and re-expanding the row retries.
#[derive(Debug, Error)]
pub enum DetailError<E>
where
  E: std::error::Error + Send + Sync + 'static,
{
  #[error("detail fetch failed: {0}")]
  Fetch(#[source] E),

  #[error(transparent)]
  Encode(#[from] moisson_core::Error),
}
