//! The `HarvestApi` trait — the engine's view of the remote retrieval
//! service.
//!
//! The trait is implemented by [`crate::http::HttpApi`] for production and by
//! scripted fakes in tests, so the controller and views are exercised without
//! a network. All methods return `Send` futures.

use std::future::Future;

use serde::{Deserialize, Serialize};

use moisson_core::{
  event::ReferenceEvent,
  reference::Reference,
  retrieval::{Retrieval, RetrievalRequest},
};

/// Handle returned by a successful submission; polls go to `retrieval_url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalHandle {
  pub retrieval_id:  i64,
  pub retrieval_url: String,
}

/// Abstraction over the remote retrieval service's HTTP contract.
pub trait HarvestApi: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// `POST /references/retrieval` — submit a retrieval job.
  fn submit<'a>(
    &'a self,
    request: &'a RetrievalRequest,
  ) -> impl Future<Output = Result<RetrievalHandle, Self::Error>> + Send + 'a;

  /// `GET <retrieval_url>` — fetch the job's current aggregate state.
  fn harvesting_state<'a>(
    &'a self,
    handle: &'a RetrievalHandle,
  ) -> impl Future<Output = Result<Retrieval, Self::Error>> + Send + 'a;

  /// `GET /reference_events/{id}` — full detail for one reference event.
  fn reference_event(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<ReferenceEvent, Self::Error>> + Send + '_;

  /// `GET /references/by_id_and_version` — a specific prior version of a
  /// record. `Ok(None)` when the service has no record at that version.
  fn reference_by_version<'a>(
    &'a self,
    harvester: &'a str,
    source_identifier: &'a str,
    version: i64,
  ) -> impl Future<Output = Result<Option<Reference>, Self::Error>> + Send + 'a;

  /// `GET /retrievals/{id}` — historical retrieval detail, used by the
  /// history browser, never by the live controller.
  fn retrieval(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Retrieval, Self::Error>> + Send + '_;
}
