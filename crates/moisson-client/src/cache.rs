//! Process-lifetime cache of fetched reference-event detail.
//!
//! Keyed by `ReferenceEvent.id`, write-once-then-read. Concurrent fetches of
//! the same id are deduplicated through a per-id `OnceCell`: one caller runs
//! the fetch, the others await the same slot, and everybody observes the same
//! payload. A failed fetch leaves the slot empty so a later caller retries.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex, MutexGuard},
};

use tokio::sync::OnceCell;

use moisson_core::event::ReferenceEvent;

use crate::api::HarvestApi;

type Slot = Arc<OnceCell<Arc<ReferenceEvent>>>;

#[derive(Clone, Default)]
pub struct ResultCache {
  inner: Arc<Mutex<HashMap<i64, Slot>>>,
}

impl ResultCache {
  pub fn new() -> Self { Self::default() }

  fn lock(&self) -> MutexGuard<'_, HashMap<i64, Slot>> {
    // A poisoned lock only means a panic mid-insert; the map stays sound.
    self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  /// The cached detail for `id`, if a fetch already completed.
  pub fn peek(&self, id: i64) -> Option<Arc<ReferenceEvent>> {
    self.lock().get(&id).and_then(|slot| slot.get().cloned())
  }

  /// Return the cached detail for `id`, fetching it through `api` on a miss.
  ///
  /// A hit never touches the network; a miss with a fetch already in flight
  /// awaits that fetch instead of issuing a duplicate call.
  pub async fn get_or_fetch<A: HarvestApi>(
    &self,
    api: &A,
    id: i64,
  ) -> Result<Arc<ReferenceEvent>, A::Error> {
    let slot = self.lock().entry(id).or_default().clone();
    slot
      .get_or_try_init(|| async {
        tracing::debug!(event_id = id, "fetching reference event detail");
        api.reference_event(id).await.map(Arc::new)
      })
      .await
      .map(Arc::clone)
  }
}
