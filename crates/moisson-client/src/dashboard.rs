//! Per-harvester progress dashboard.
//!
//! One widget per harvesting, sorted by harvester name so widget position is
//! stable across polls even as states change. Every applied payload replaces
//! the whole widget set; the harvester set does not change mid-job.

use moisson_core::{
  harvesting::{HarvestingError, HarvestingState},
  reference::Identifier,
  retrieval::Retrieval,
};

use crate::controller::ViewSink;

/// Display model for one harvester's progress widget.
#[derive(Debug, Clone, PartialEq)]
pub struct HarvesterWidget {
  pub harvester:   String,
  pub state:       HarvestingState,
  pub event_count: usize,
  /// Error detail attached to a `failed` harvesting. Domain data, rendered
  /// with the widget, never raised.
  pub errors:      Vec<HarvestingError>,
}

/// Everything the dashboard renders: the sorted widgets plus the entity
/// identifiers the service has resolved so far.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
  pub widgets:     Vec<HarvesterWidget>,
  pub identifiers: Vec<Identifier>,
}

/// Render target for the dashboard; implemented by the UI layer.
pub trait DashboardSink {
  fn render(&mut self, state: &DashboardState);
}

/// The dashboard reconciliation view.
pub struct DashboardView<S: DashboardSink> {
  sink:  S,
  state: DashboardState,
}

impl<S: DashboardSink> DashboardView<S> {
  pub fn new(sink: S) -> Self {
    Self {
      sink,
      state: DashboardState::default(),
    }
  }

  pub fn state(&self) -> &DashboardState { &self.state }
}

impl<S: DashboardSink> ViewSink for DashboardView<S> {
  fn apply(&mut self, retrieval: &Retrieval) {
    let mut widgets: Vec<HarvesterWidget> = retrieval
      .harvestings
      .iter()
      .map(|h| HarvesterWidget {
        harvester:   h.harvester.clone(),
        state:       h.state,
        event_count: h.reference_events.len(),
        errors:      h.errors().to_vec(),
      })
      .collect();
    // Ordinal comparison: widget order must not depend on any locale.
    widgets.sort_by(|a, b| a.harvester.cmp(&b.harvester));
    self.state.widgets = widgets;

    if let Some(entity) = &retrieval.entity {
      if !entity.identifiers.is_empty() {
        self.state.identifiers = entity.identifiers.clone();
      }
    }

    self.sink.render(&self.state);
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;
  use crate::testing::{harvesting, retrieval};
  use moisson_core::harvesting::HarvestingState::*;

  /// Sink that records every rendered state through a shared handle.
  #[derive(Clone, Default)]
  struct Recording {
    rendered: Rc<RefCell<Vec<DashboardState>>>,
  }

  impl DashboardSink for Recording {
    fn render(&mut self, state: &DashboardState) {
      self.rendered.borrow_mut().push(state.clone());
    }
  }

  #[test]
  fn widgets_are_sorted_by_harvester_name() {
    let sink = Recording::default();
    let mut view = DashboardView::new(sink.clone());
    view.apply(&retrieval(vec![
      harvesting("scanr", Running),
      harvesting("hal", Pending),
      harvesting("idref", Running),
    ]));

    let rendered = sink.rendered.borrow();
    let names: Vec<_> = rendered[0]
      .widgets
      .iter()
      .map(|w| w.harvester.clone())
      .collect();
    assert_eq!(names, ["hal", "idref", "scanr"]);
  }

  #[test]
  fn widget_positions_are_stable_across_polls() {
    let sink = Recording::default();
    let mut view = DashboardView::new(sink.clone());
    view.apply(&retrieval(vec![
      harvesting("idref", Running),
      harvesting("hal", Running),
    ]));
    // Second poll reports the harvestings in a different order and with
    // different states; widget order must not move.
    view.apply(&retrieval(vec![
      harvesting("hal", Completed),
      harvesting("idref", Failed),
    ]));

    let rendered = sink.rendered.borrow();
    for state in rendered.iter() {
      let names: Vec<_> =
        state.widgets.iter().map(|w| w.harvester.clone()).collect();
      assert_eq!(names, ["hal", "idref"]);
    }
    assert_eq!(rendered[1].widgets[0].state, Completed);
    assert_eq!(rendered[1].widgets[1].state, Failed);
  }

  #[test]
  fn each_apply_replaces_the_widget_set() {
    let mut view = DashboardView::new(Recording::default());
    view.apply(&retrieval(vec![harvesting("hal", Running)]));
    view.apply(&retrieval(vec![harvesting("hal", Completed)]));

    assert_eq!(view.state().widgets.len(), 1);
    assert_eq!(view.state().widgets[0].state, Completed);
  }

  #[test]
  fn entity_identifiers_are_kept_once_resolved() {
    use moisson_core::{reference::Identifier, retrieval::Person};

    let mut view = DashboardView::new(Recording::default());

    let mut with_entity = retrieval(vec![harvesting("hal", Running)]);
    with_entity.entity = Some(Person {
      identifiers: vec![Identifier {
        kind:  "idref".to_owned(),
        value: "123".to_owned(),
      }],
      name:        None,
    });
    view.apply(&with_entity);

    // A later payload without identifiers must not blank the echo.
    view.apply(&retrieval(vec![harvesting("hal", Completed)]));
    assert_eq!(view.state().identifiers.len(), 1);
  }
}
