//! In-process mock of the remote retrieval service.
//!
//! Serves the same JSON contract the engine consumes, backed by a scripted
//! [`MockWorld`]: each harvester follows a fixed sequence of states and every
//! poll advances the job one step. Tests drive exact state sequences
//! deterministically; the bin serves a small demo world for manual runs.

pub mod error;
pub mod handlers;
pub mod world;

pub use error::ApiError;
pub use world::{HarvesterScript, MockWorld, ScriptStep};

use std::{net::SocketAddr, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use tokio::{net::TcpListener, task::JoinHandle};

/// Build a fully-materialised router for `world`.
pub fn router(world: Arc<MockWorld>) -> Router<()> {
  Router::new()
    .route("/references/retrieval", post(handlers::create_retrieval))
    .route("/references/retrieval/{id}", get(handlers::get_retrieval_state))
    .route("/references/by_id_and_version", get(handlers::get_reference_by_version))
    .route("/reference_events/{id}", get(handlers::get_reference_event))
    .route("/retrievals/{id}", get(handlers::get_retrieval_history))
    .with_state(world)
}

/// Bind an ephemeral port, serve `world` on it, and return the bound address
/// together with the server task.
pub async fn spawn(world: MockWorld) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
  let listener = TcpListener::bind("127.0.0.1:0").await?;
  let address = listener.local_addr()?;
  let world = Arc::new(world.with_base_url(format!("http://{address}")));
  let app = router(world);
  let handle = tokio::spawn(async move {
    if let Err(error) = axum::serve(listener, app).await {
      tracing::error!(%error, "mock retrieval service stopped");
    }
  });
  Ok((address, handle))
}
