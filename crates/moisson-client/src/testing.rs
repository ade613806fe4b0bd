//! Scripted fakes and fixture builders shared by the unit tests.

use std::{
  collections::{HashMap, VecDeque},
  sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
  },
  time::Duration,
};

use thiserror::Error;

use moisson_core::{
  event::{EventType, ReferenceEvent},
  harvesting::{Harvesting, HarvestingState},
  reference::{LiteralField, Reference},
  retrieval::{Retrieval, RetrievalRequest},
};

use crate::{
  api::{HarvestApi, RetrievalHandle},
  controller::ViewSink,
  schedule::Delay,
};

#[derive(Debug, Error)]
#[error("{0}")]
pub struct TestError(pub String);

// ─── Fixture builders ────────────────────────────────────────────────────────

pub fn reference(harvester: &str, source_identifier: &str, version: i64) -> Reference {
  Reference {
    harvester: harvester.to_owned(),
    source_identifier: source_identifier.to_owned(),
    version,
    titles: vec![LiteralField {
      value:    format!("Title of {source_identifier}"),
      language: Some("en".to_owned()),
    }],
    subtitles: vec![],
    document_type: vec![],
    contributions: vec![],
    identifiers: vec![],
    issued: None,
  }
}

pub fn event(id: i64, harvester: &str, source_identifier: &str, version: i64) -> ReferenceEvent {
  ReferenceEvent {
    id,
    kind: EventType::Created,
    enhanced: false,
    reference: reference(harvester, source_identifier, version),
  }
}

pub fn updated_event(
  id: i64,
  harvester: &str,
  source_identifier: &str,
  version: i64,
) -> ReferenceEvent {
  ReferenceEvent {
    kind: EventType::Updated,
    ..event(id, harvester, source_identifier, version)
  }
}

pub fn harvesting(harvester: &str, state: HarvestingState) -> Harvesting {
  harvesting_with_events(harvester, state, vec![])
}

pub fn harvesting_with_events(
  harvester: &str,
  state: HarvestingState,
  reference_events: Vec<ReferenceEvent>,
) -> Harvesting {
  Harvesting {
    id: 0,
    harvester: harvester.to_owned(),
    state,
    reference_events,
    error: None,
  }
}

pub fn retrieval(harvestings: Vec<Harvesting>) -> Retrieval {
  Retrieval {
    id: 1,
    entity: None,
    harvestings,
    timestamp: None,
  }
}

// ─── Scripted API ────────────────────────────────────────────────────────────

#[derive(Default)]
struct Inner {
  submit_fails:  AtomicBool,
  states:        Mutex<VecDeque<Result<Retrieval, String>>>,
  events:        Mutex<HashMap<i64, ReferenceEvent>>,
  previous:      Mutex<HashMap<(String, String, i64), Reference>>,
  history:       Mutex<HashMap<i64, Retrieval>>,
  state_calls:   AtomicUsize,
  event_calls:   AtomicUsize,
  version_calls: AtomicUsize,
}

/// In-memory [`HarvestApi`] with scripted poll payloads and call counters.
#[derive(Clone, Default)]
pub struct ScriptedApi {
  inner: Arc<Inner>,
}

impl ScriptedApi {
  pub fn new() -> Self { Self::default() }

  pub fn fail_submit(&self) {
    self.inner.submit_fails.store(true, Ordering::SeqCst);
  }

  /// Queue the payload the next poll returns.
  pub fn push_state(&self, retrieval: Retrieval) {
    self.inner.states.lock().unwrap().push_back(Ok(retrieval));
  }

  /// Queue a poll failure.
  pub fn push_error(&self, message: &str) {
    self
      .inner
      .states
      .lock()
      .unwrap()
      .push_back(Err(message.to_owned()));
  }

  pub fn insert_event(&self, event: ReferenceEvent) {
    self.inner.events.lock().unwrap().insert(event.id, event);
  }

  pub fn insert_previous(&self, reference: Reference) {
    let key = (
      reference.harvester.clone(),
      reference.source_identifier.clone(),
      reference.version,
    );
    self.inner.previous.lock().unwrap().insert(key, reference);
  }

  pub fn state_calls(&self) -> usize {
    self.inner.state_calls.load(Ordering::SeqCst)
  }

  pub fn event_calls(&self) -> usize {
    self.inner.event_calls.load(Ordering::SeqCst)
  }

  pub fn version_calls(&self) -> usize {
    self.inner.version_calls.load(Ordering::SeqCst)
  }
}

impl HarvestApi for ScriptedApi {
  type Error = TestError;

  async fn submit(
    &self,
    _request: &RetrievalRequest,
  ) -> Result<RetrievalHandle, TestError> {
    if self.inner.submit_fails.load(Ordering::SeqCst) {
      return Err(TestError("submission rejected".to_owned()));
    }
    Ok(RetrievalHandle {
      retrieval_id:  1,
      retrieval_url: "test://retrievals/1".to_owned(),
    })
  }

  async fn harvesting_state(
    &self,
    _handle: &RetrievalHandle,
  ) -> Result<Retrieval, TestError> {
    self.inner.state_calls.fetch_add(1, Ordering::SeqCst);
    match self.inner.states.lock().unwrap().pop_front() {
      Some(Ok(retrieval)) => Ok(retrieval),
      Some(Err(message)) => Err(TestError(message)),
      None => Err(TestError("no scripted state left".to_owned())),
    }
  }

  async fn reference_event(&self, id: i64) -> Result<ReferenceEvent, TestError> {
    self.inner.event_calls.fetch_add(1, Ordering::SeqCst);
    self
      .inner
      .events
      .lock()
      .unwrap()
      .get(&id)
      .cloned()
      .ok_or_else(|| TestError(format!("no event {id}")))
  }

  async fn reference_by_version(
    &self,
    harvester: &str,
    source_identifier: &str,
    version: i64,
  ) -> Result<Option<Reference>, TestError> {
    self.inner.version_calls.fetch_add(1, Ordering::SeqCst);
    let key = (
      harvester.to_owned(),
      source_identifier.to_owned(),
      version,
    );
    Ok(self.inner.previous.lock().unwrap().get(&key).cloned())
  }

  async fn retrieval(&self, id: i64) -> Result<Retrieval, TestError> {
    self
      .inner
      .history
      .lock()
      .unwrap()
      .get(&id)
      .cloned()
      .ok_or_else(|| TestError(format!("no retrieval {id}")))
  }
}

// ─── Delay and view fakes ────────────────────────────────────────────────────

/// A delay that returns immediately but counts how often it was awaited.
#[derive(Clone, Default)]
pub struct InstantDelay {
  waits: Arc<AtomicUsize>,
}

impl InstantDelay {
  pub fn waits(&self) -> usize { self.waits.load(Ordering::SeqCst) }
}

impl Delay for InstantDelay {
  async fn wait(&self, _duration: Duration) {
    self.waits.fetch_add(1, Ordering::SeqCst);
  }
}

/// A view sink that records every applied payload, with an optional hook
/// fired on each apply (used to trigger cancellation mid-run).
#[derive(Default)]
pub struct CollectingView {
  pub applied:  Vec<Retrieval>,
  pub on_apply: Option<Box<dyn FnMut(&Retrieval) + Send>>,
}

impl ViewSink for CollectingView {
  fn apply(&mut self, retrieval: &Retrieval) {
    self.applied.push(retrieval.clone());
    if let Some(hook) = self.on_apply.as_mut() {
      hook(retrieval);
    }
  }
}
