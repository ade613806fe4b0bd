//! The scripted world behind the mock service.
//!
//! Configuration (scripts, event details, prior versions) is fixed before
//! serving; only the per-job poll counters mutate afterwards. Every poll of a
//! job advances each harvesting one step along its script, and the final
//! step is sticky, so a job converges no matter how often it is polled.

use std::{
  collections::HashMap,
  sync::{
    Mutex,
    atomic::{AtomicI64, Ordering},
  },
};

use moisson_core::{
  event::ReferenceEvent,
  harvesting::{Harvesting, HarvestingError, HarvestingState},
  reference::Reference,
  retrieval::{Person, Retrieval},
};

// ─── Scripts ─────────────────────────────────────────────────────────────────

/// One step of a harvester's progression, as exposed by a single poll.
#[derive(Debug, Clone)]
pub struct ScriptStep {
  pub state:  HarvestingState,
  /// Events visible at this step (cumulative lists work best: a real
  /// harvesting only ever grows its event list).
  pub events: Vec<ReferenceEvent>,
  pub errors: Vec<HarvestingError>,
}

impl ScriptStep {
  pub fn new(state: HarvestingState) -> Self {
    Self {
      state,
      events: vec![],
      errors: vec![],
    }
  }

  pub fn with_events(mut self, events: Vec<ReferenceEvent>) -> Self {
    self.events = events;
    self
  }

  pub fn with_error(mut self, name: &str, message: &str) -> Self {
    self.errors.push(HarvestingError {
      name:    name.to_owned(),
      message: message.to_owned(),
    });
    self
  }
}

/// The full scripted progression of one harvester.
#[derive(Debug, Clone)]
pub struct HarvesterScript {
  pub harvester: String,
  pub steps:     Vec<ScriptStep>,
}

impl HarvesterScript {
  pub fn new(harvester: &str, steps: Vec<ScriptStep>) -> Self {
    Self {
      harvester: harvester.to_owned(),
      steps,
    }
  }

  fn at(&self, step: usize) -> ScriptStep {
    let index = step.min(self.steps.len().saturating_sub(1));
    self
      .steps
      .get(index)
      .cloned()
      .unwrap_or_else(|| ScriptStep::new(HarvestingState::Completed))
  }
}

// ─── World ───────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockWorld {
  base_url: String,
  entity:   Option<Person>,
  scripts:  Vec<HarvesterScript>,
  events:   HashMap<i64, ReferenceEvent>,
  previous: HashMap<(String, String, i64), Reference>,
  next_id:  AtomicI64,
  /// Per-job poll counter; the only state that mutates while serving.
  jobs:     Mutex<HashMap<i64, usize>>,
}

impl MockWorld {
  pub fn new() -> Self {
    Self {
      next_id: AtomicI64::new(1),
      ..Self::default()
    }
  }

  pub fn with_base_url(mut self, base_url: String) -> Self {
    self.base_url = base_url;
    self
  }

  pub fn base_url(&self) -> &str { &self.base_url }

  pub fn set_entity(&mut self, entity: Person) { self.entity = Some(entity); }

  pub fn add_script(&mut self, script: HarvesterScript) {
    self.scripts.push(script);
  }

  /// Register the detail payload served for `GET /reference_events/{id}`.
  pub fn add_event(&mut self, event: ReferenceEvent) {
    self.events.insert(event.id, event);
  }

  /// Register a historical version served by the by-version lookup.
  pub fn add_previous(&mut self, reference: Reference) {
    let key = (
      reference.harvester.clone(),
      reference.source_identifier.clone(),
      reference.version,
    );
    self.previous.insert(key, reference);
  }

  // ── Serving ───────────────────────────────────────────────────────────

  /// Create a job and return its id.
  pub fn create_job(&self) -> i64 {
    let id = self.next_id.fetch_add(1, Ordering::SeqCst);
    self.jobs.lock().unwrap_or_else(|p| p.into_inner()).insert(id, 0);
    id
  }

  pub fn job_exists(&self, id: i64) -> bool {
    self
      .jobs
      .lock()
      .unwrap_or_else(|p| p.into_inner())
      .contains_key(&id)
  }

  /// The aggregate state of job `id` at its current step, advancing the
  /// step for the next poll.
  pub fn poll_job(&self, id: i64) -> Option<Retrieval> {
    let step = {
      let mut jobs = self.jobs.lock().unwrap_or_else(|p| p.into_inner());
      let counter = jobs.get_mut(&id)?;
      let step = *counter;
      *counter += 1;
      step
    };
    Some(self.snapshot(id, step))
  }

  /// The converged (final-step) view of job `id` for the history endpoint.
  pub fn history(&self, id: i64) -> Option<Retrieval> {
    if !self.job_exists(id) {
      return None;
    }
    Some(self.snapshot(id, usize::MAX))
  }

  pub fn event(&self, id: i64) -> Option<ReferenceEvent> {
    self.events.get(&id).cloned()
  }

  pub fn reference_by_version(
    &self,
    harvester: &str,
    source_identifier: &str,
    version: i64,
  ) -> Option<Reference> {
    let key = (harvester.to_owned(), source_identifier.to_owned(), version);
    self.previous.get(&key).cloned()
  }

  fn snapshot(&self, id: i64, step: usize) -> Retrieval {
    let harvestings = self
      .scripts
      .iter()
      .enumerate()
      .map(|(index, script)| {
        let current = script.at(step);
        Harvesting {
          id:               index as i64 + 1,
          harvester:        script.harvester.clone(),
          state:            current.state,
          reference_events: current.events,
          error:            (!current.errors.is_empty()).then_some(current.errors),
        }
      })
      .collect();
    Retrieval {
      id,
      entity: self.entity.clone(),
      harvestings,
      timestamp: None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use moisson_core::harvesting::HarvestingState::*;

  fn world() -> MockWorld {
    let mut world = MockWorld::new();
    world.add_script(HarvesterScript::new(
      "hal",
      vec![
        ScriptStep::new(Pending),
        ScriptStep::new(Running),
        ScriptStep::new(Completed),
      ],
    ));
    world
  }

  #[test]
  fn polls_advance_one_step_and_stick_at_the_end() {
    let world = world();
    let id = world.create_job();

    let states: Vec<_> = (0..5)
      .map(|_| world.poll_job(id).unwrap().harvestings[0].state)
      .collect();
    assert_eq!(states, [Pending, Running, Completed, Completed, Completed]);
  }

  #[test]
  fn jobs_progress_independently() {
    let world = world();
    let first = world.create_job();
    let second = world.create_job();

    world.poll_job(first);
    world.poll_job(first);
    assert_eq!(world.poll_job(first).unwrap().harvestings[0].state, Completed);
    assert_eq!(world.poll_job(second).unwrap().harvestings[0].state, Pending);
  }

  #[test]
  fn history_exposes_the_converged_state() {
    let world = world();
    let id = world.create_job();
    assert_eq!(world.history(id).unwrap().harvestings[0].state, Completed);
    assert!(world.history(999).is_none());
  }
}
