//! Route handlers for the mock retrieval service.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use moisson_core::{
  event::ReferenceEvent,
  reference::Reference,
  retrieval::{Retrieval, RetrievalRequest},
};

use crate::{error::ApiError, world::MockWorld};

/// `POST /references/retrieval`
pub async fn create_retrieval(
  State(world): State<Arc<MockWorld>>,
  Json(request): Json<RetrievalRequest>,
) -> Result<Json<Value>, ApiError> {
  if request.person.identifiers.is_empty() && request.person.name.is_none() {
    return Err(ApiError::BadRequest(
      "at least one identifier or a name must be provided".to_owned(),
    ));
  }
  let id = world.create_job();
  tracing::debug!(retrieval_id = id, "job created");
  Ok(Json(json!({
    "retrieval_id": id,
    "retrieval_url": format!("{}/references/retrieval/{id}", world.base_url()),
  })))
}

/// `GET /references/retrieval/{id}` — the poll endpoint.
pub async fn get_retrieval_state(
  State(world): State<Arc<MockWorld>>,
  Path(id): Path<i64>,
) -> Result<Json<Retrieval>, ApiError> {
  world
    .poll_job(id)
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("retrieval {id}")))
}

/// `GET /reference_events/{id}`
pub async fn get_reference_event(
  State(world): State<Arc<MockWorld>>,
  Path(id): Path<i64>,
) -> Result<Json<ReferenceEvent>, ApiError> {
  world
    .event(id)
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("reference event {id}")))
}

#[derive(Debug, Deserialize)]
pub struct VersionQuery {
  pub harvester:         String,
  pub source_identifier: String,
  pub version:           i64,
}

/// `GET /references/by_id_and_version`
pub async fn get_reference_by_version(
  State(world): State<Arc<MockWorld>>,
  Query(query): Query<VersionQuery>,
) -> Result<Json<Reference>, ApiError> {
  world
    .reference_by_version(
      &query.harvester,
      &query.source_identifier,
      query.version,
    )
    .map(Json)
    .ok_or_else(|| {
      ApiError::NotFound(format!(
        "{}/{} version {}",
        query.harvester, query.source_identifier, query.version
      ))
    })
}

/// `GET /retrievals/{id}` — read-only history lookup.
pub async fn get_retrieval_history(
  State(world): State<Arc<MockWorld>>,
  Path(id): Path<i64>,
) -> Result<Json<Retrieval>, ApiError> {
  world
    .history(id)
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("retrieval {id}")))
}
