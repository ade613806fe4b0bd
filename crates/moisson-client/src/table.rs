//! The references table — one row per reference event across all
//! harvestings.
//!
//! Row identity is `ReferenceEvent.id`. The view owns the disclosure state:
//! rebuilding the table from a fresh poll preserves the open-row set (ids
//! that vanished are dropped silently), and per-row detail is resolved
//! through the shared result cache so polling and disclosure stay
//! independent.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use moisson_core::{
  event::EventType,
  harvesting::Harvesting,
  retrieval::Retrieval,
};

use crate::{
  api::HarvestApi,
  cache::ResultCache,
  controller::ViewSink,
  detail::{DetailPane, load_detail},
};

// ─── Row model ───────────────────────────────────────────────────────────────

/// What an open row currently shows below its summary line.
#[derive(Debug, Clone, Default)]
pub enum RowDetail {
  /// Row is collapsed; only summary fields are visible.
  #[default]
  Collapsed,
  /// Row is open and its detail fetch has not resolved yet.
  Loading,
  /// Row is open with full detail available.
  Loaded(Arc<DetailPane>),
  /// The detail fetch failed; shown inline, local to this row.
  Failed(String),
}

/// One row of the references table.
#[derive(Debug, Clone)]
pub struct ReferenceRow {
  pub event_id:          i64,
  /// Harvester name, capitalised for display ("Hal").
  pub source:            String,
  pub source_identifier: String,
  /// Event-type label with the enhanced marker ("Updated *").
  pub status:            String,
  pub title:             String,
  pub kind:              EventType,
  pub enhanced:          bool,
  pub open:              bool,
  pub detail:            RowDetail,
}

#[derive(Debug, Clone, Default)]
pub struct TableState {
  pub rows: Vec<ReferenceRow>,
}

/// Render target for the table; implemented by the UI layer.
pub trait TableSink {
  fn render(&mut self, state: &TableState);
}

// ─── View ────────────────────────────────────────────────────────────────────

/// The references-table reconciliation view.
pub struct TableView<S: TableSink> {
  sink:        S,
  cache:       ResultCache,
  harvestings: Vec<Harvesting>,
  open:        HashSet<i64>,
  loaded:      HashMap<i64, Arc<DetailPane>>,
  failed:      HashMap<i64, String>,
  state:       TableState,
}

impl<S: TableSink> TableView<S> {
  pub fn new(sink: S, cache: ResultCache) -> Self {
    Self {
      sink,
      cache,
      harvestings: Vec::new(),
      open: HashSet::new(),
      loaded: HashMap::new(),
      failed: HashMap::new(),
      state: TableState::default(),
    }
  }

  pub fn state(&self) -> &TableState { &self.state }

  pub fn is_open(&self, event_id: i64) -> bool { self.open.contains(&event_id) }

  /// Expand or collapse the row identified by `event_id`.
  ///
  /// Expanding a row whose detail is not cached fetches it through the
  /// result cache, rendering a loading placeholder while the fetch is in
  /// flight. A fetch failure is recorded inline on the row and cleared on
  /// collapse, so re-expanding retries.
  pub async fn toggle<A: HarvestApi>(&mut self, api: &A, event_id: i64) {
    if !self
      .state
      .rows
      .iter()
      .any(|row| row.event_id == event_id)
    {
      return;
    }

    if self.open.contains(&event_id) {
      self.open.remove(&event_id);
      self.failed.remove(&event_id);
      self.refresh();
      return;
    }

    self.open.insert(event_id);
    if self.loaded.contains_key(&event_id) {
      self.refresh();
      return;
    }

    // Show the placeholder before suspending on the fetch.
    self.refresh();
    match load_detail(api, &self.cache, event_id).await {
      Ok(pane) => {
        self.loaded.insert(event_id, Arc::new(pane));
      }
      Err(error) => {
        tracing::warn!(event_id, error = %error, "detail fetch failed");
        self.failed.insert(event_id, error.to_string());
      }
    }
    self.refresh();
  }

  /// Rebuild the row list from the stored harvestings and re-render.
  fn refresh(&mut self) {
    let mut present = HashSet::new();
    for harvesting in &self.harvestings {
      for event in &harvesting.reference_events {
        present.insert(event.id);
      }
    }
    // Disclosure state survives rebuilds; ids that no longer appear are
    // dropped silently.
    self.open.retain(|id| present.contains(id));
    self.failed.retain(|id, _| present.contains(id));

    let mut rows = Vec::new();
    for harvesting in &self.harvestings {
      for event in &harvesting.reference_events {
        let open = self.open.contains(&event.id);
        let detail = if !open {
          RowDetail::Collapsed
        } else if let Some(message) = self.failed.get(&event.id) {
          RowDetail::Failed(message.clone())
        } else if let Some(pane) = self.loaded.get(&event.id) {
          RowDetail::Loaded(pane.clone())
        } else {
          RowDetail::Loading
        };

        let marker = if event.enhanced { " *" } else { "" };
        rows.push(ReferenceRow {
          event_id:          event.id,
          source:            capitalize_first(&harvesting.harvester),
          source_identifier: event.reference.source_identifier.clone(),
          status:            format!("{}{}", event.kind.label(), marker),
          title:             event.reference.title().to_owned(),
          kind:              event.kind,
          enhanced:          event.enhanced,
          open,
          detail,
        });
      }
    }
    self.state.rows = rows;
    self.sink.render(&self.state);
  }
}

impl<S: TableSink> ViewSink for TableView<S> {
  fn apply(&mut self, retrieval: &Retrieval) {
    self.harvestings = retrieval.harvestings.clone();
    self.refresh();
  }
}

fn capitalize_first(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    None => String::new(),
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;
  use crate::testing::{
    ScriptedApi, event, harvesting, harvesting_with_events, retrieval,
    updated_event,
  };
  use moisson_core::harvesting::HarvestingState::*;

  #[derive(Clone, Default)]
  struct Recording {
    rendered: Rc<RefCell<Vec<TableState>>>,
  }

  impl TableSink for Recording {
    fn render(&mut self, state: &TableState) {
      self.rendered.borrow_mut().push(state.clone());
    }
  }

  fn two_harvester_payload() -> Retrieval {
    retrieval(vec![
      harvesting_with_events(
        "hal",
        Running,
        vec![event(1, "hal", "hal-01", 0), event(2, "hal", "hal-02", 0)],
      ),
      harvesting_with_events(
        "idref",
        Running,
        vec![event(3, "idref", "idref-03", 0)],
      ),
    ])
  }

  #[test]
  fn flattens_one_row_per_event_across_harvestings() {
    let mut view = TableView::new(Recording::default(), ResultCache::new());
    view.apply(&two_harvester_payload());

    let ids: Vec<_> = view.state().rows.iter().map(|r| r.event_id).collect();
    assert_eq!(ids, [1, 2, 3]);
    assert_eq!(view.state().rows[0].source, "Hal");
    assert_eq!(view.state().rows[2].source, "Idref");
    assert_eq!(view.state().rows[0].status, "Created");
  }

  #[test]
  fn enhanced_rows_carry_the_star_marker() {
    let mut enhanced = updated_event(4, "hal", "hal-04", 1);
    enhanced.enhanced = true;
    let mut view = TableView::new(Recording::default(), ResultCache::new());
    view.apply(&retrieval(vec![harvesting_with_events(
      "hal",
      Running,
      vec![enhanced],
    )]));

    assert_eq!(view.state().rows[0].status, "Updated *");
  }

  #[tokio::test]
  async fn open_rows_survive_rebuilds() {
    let api = ScriptedApi::new();
    api.insert_event(event(1, "hal", "hal-01", 0));

    let mut view = TableView::new(Recording::default(), ResultCache::new());
    view.apply(&two_harvester_payload());
    view.toggle(&api, 1).await;
    assert!(view.is_open(1));

    // Next poll adds an event; row 1 must stay open.
    view.apply(&retrieval(vec![
      harvesting_with_events(
        "hal",
        Completed,
        vec![
          event(1, "hal", "hal-01", 0),
          event(2, "hal", "hal-02", 0),
          event(5, "hal", "hal-05", 0),
        ],
      ),
      harvesting_with_events(
        "idref",
        Completed,
        vec![event(3, "idref", "idref-03", 0)],
      ),
    ]));

    assert!(view.is_open(1));
    let row = &view.state().rows[0];
    assert!(row.open);
    assert!(matches!(row.detail, RowDetail::Loaded(_)));
  }

  #[tokio::test]
  async fn vanished_ids_are_dropped_from_the_open_set() {
    let api = ScriptedApi::new();
    api.insert_event(event(3, "idref", "idref-03", 0));

    let mut view = TableView::new(Recording::default(), ResultCache::new());
    view.apply(&two_harvester_payload());
    view.toggle(&api, 3).await;
    assert!(view.is_open(3));

    // The next payload no longer contains event 3.
    view.apply(&retrieval(vec![harvesting_with_events(
      "hal",
      Completed,
      vec![event(1, "hal", "hal-01", 0)],
    )]));
    assert!(!view.is_open(3));
  }

  #[tokio::test]
  async fn expanding_renders_loading_then_loaded() {
    let api = ScriptedApi::new();
    api.insert_event(event(1, "hal", "hal-01", 0));

    let sink = Recording::default();
    let mut view = TableView::new(sink.clone(), ResultCache::new());
    view.apply(&two_harvester_payload());
    view.toggle(&api, 1).await;

    let rendered = sink.rendered.borrow();
    // apply, loading placeholder, loaded detail.
    assert_eq!(rendered.len(), 3);
    assert!(matches!(rendered[1].rows[0].detail, RowDetail::Loading));
    assert!(matches!(rendered[2].rows[0].detail, RowDetail::Loaded(_)));
  }

  #[tokio::test]
  async fn second_expand_hits_the_cache() {
    let api = ScriptedApi::new();
    api.insert_event(event(1, "hal", "hal-01", 0));

    let mut view = TableView::new(Recording::default(), ResultCache::new());
    view.apply(&two_harvester_payload());

    view.toggle(&api, 1).await; // expand: fetch
    view.toggle(&api, 1).await; // collapse
    view.toggle(&api, 1).await; // expand again: cache hit
    assert_eq!(api.event_calls(), 1);
  }

  #[tokio::test]
  async fn failed_detail_fetch_is_inline_and_retried_on_reexpand() {
    let api = ScriptedApi::new();
    // Event 2 is not registered: the first fetch fails.

    let mut view = TableView::new(Recording::default(), ResultCache::new());
    view.apply(&two_harvester_payload());
    view.toggle(&api, 2).await;

    let row = view
      .state()
      .rows
      .iter()
      .find(|r| r.event_id == 2)
      .unwrap();
    assert!(matches!(row.detail, RowDetail::Failed(_)));
    // Other rows are unaffected.
    assert!(matches!(
      view.state().rows[0].detail,
      RowDetail::Collapsed
    ));

    // Collapse clears the failure; re-expand retries and succeeds.
    view.toggle(&api, 2).await;
    api.insert_event(event(2, "hal", "hal-02", 0));
    view.toggle(&api, 2).await;
    let row = view
      .state()
      .rows
      .iter()
      .find(|r| r.event_id == 2)
      .unwrap();
    assert!(matches!(row.detail, RowDetail::Loaded(_)));
  }

  #[tokio::test]
  async fn toggling_an_unknown_row_is_a_no_op() {
    let api = ScriptedApi::new();
    let sink = Recording::default();
    let mut view = TableView::new(sink.clone(), ResultCache::new());
    view.apply(&retrieval(vec![harvesting("hal", Running)]));

    view.toggle(&api, 42).await;
    assert_eq!(sink.rendered.borrow().len(), 1);
    assert_eq!(api.event_calls(), 0);
  }
}
