//! Retrieval jobs — the aggregate state polled from the remote service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  event::EventType,
  harvesting::Harvesting,
  reference::Identifier,
};

// ─── Submission ──────────────────────────────────────────────────────────────

/// The entity references are retrieved for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
  #[serde(default)]
  pub identifiers: Vec<Identifier>,
  #[serde(default)]
  pub name:        Option<String>,
}

/// Body of `POST /references/retrieval`.
///
/// `nullify` lists identifier types the operator explicitly cleared — the
/// service detaches them from the entity instead of matching on them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrievalRequest {
  pub person:     Person,
  #[serde(default)]
  pub nullify:    Vec<String>,
  #[serde(default)]
  pub events:     Vec<EventType>,
  #[serde(default)]
  pub harvesters: Vec<String>,
}

// ─── Poll payload ────────────────────────────────────────────────────────────

/// Aggregate state of one retrieval job — the poll payload, replaced
/// wholesale on every successful poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Retrieval {
  #[serde(default)]
  pub id:          i64,
  #[serde(default)]
  pub entity:      Option<Person>,
  #[serde(default)]
  pub harvestings: Vec<Harvesting>,
  #[serde(default)]
  pub timestamp:   Option<DateTime<Utc>>,
}

impl Retrieval {
  /// A job is finished once every harvesting has reached a terminal state.
  ///
  /// Polling alone only ever observes `completed`/`failed`; `canceled`
  /// harvestings count as terminal too so a server that reports them cannot
  /// wedge the poll loop.
  pub fn finished(&self) -> bool {
    self.harvestings.iter().all(|h| h.state.is_terminal())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::harvesting::HarvestingState;

  fn harvesting(harvester: &str, state: HarvestingState) -> Harvesting {
    Harvesting {
      id: 0,
      harvester: harvester.to_owned(),
      state,
      reference_events: vec![],
      error: None,
    }
  }

  fn retrieval(harvestings: Vec<Harvesting>) -> Retrieval {
    Retrieval {
      id: 1,
      entity: None,
      harvestings,
      timestamp: None,
    }
  }

  #[test]
  fn not_finished_while_any_harvesting_is_live() {
    let job = retrieval(vec![
      harvesting("hal", HarvestingState::Running),
      harvesting("idref", HarvestingState::Pending),
    ]);
    assert!(!job.finished());
  }

  #[test]
  fn finished_when_all_completed_or_failed() {
    let job = retrieval(vec![
      harvesting("hal", HarvestingState::Completed),
      harvesting("idref", HarvestingState::Failed),
    ]);
    assert!(job.finished());
  }

  #[test]
  fn one_live_harvesting_keeps_the_job_open() {
    let job = retrieval(vec![
      harvesting("hal", HarvestingState::Completed),
      harvesting("idref", HarvestingState::Running),
    ]);
    assert!(!job.finished());
  }

  #[test]
  fn server_reported_canceled_counts_as_terminal() {
    let job = retrieval(vec![
      harvesting("hal", HarvestingState::Canceled),
      harvesting("idref", HarvestingState::Completed),
    ]);
    assert!(job.finished());
  }

  #[test]
  fn empty_job_is_finished() {
    assert!(retrieval(vec![]).finished());
  }
}
