//! Application state machine and event dispatcher.

use std::sync::{Arc, Mutex};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use moisson_client::{
  cache::ResultCache,
  controller::{CancelToken, RetrievalController, RunOutcome, ViewSink},
  dashboard::{DashboardSink, DashboardState, DashboardView},
  http::HttpApi,
  schedule::TokioDelay,
  table::{TableSink, TableState, TableView},
};
use moisson_core::{memory::FormMemory, retrieval::Retrieval};

use crate::form::FormState;

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  /// The operator form: identifiers, name, event types, harvesters.
  Form,
  /// The live watch: dashboard widgets plus the references table.
  Watch,
}

/// Which tab of the detail pane is showing for the selected row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailTab {
  Current,
  Previous,
  Diff,
}

impl DetailTab {
  pub fn next(self) -> Self {
    match self {
      Self::Current => Self::Previous,
      Self::Previous => Self::Diff,
      Self::Diff => Self::Current,
    }
  }
}

// ─── Shared render sinks ──────────────────────────────────────────────────────

/// Dashboard sink writing into a snapshot the draw loop reads each frame.
#[derive(Clone, Default)]
pub struct SharedDashboard(Arc<Mutex<DashboardState>>);

impl SharedDashboard {
  pub fn snapshot(&self) -> DashboardState {
    self.0.lock().unwrap_or_else(|p| p.into_inner()).clone()
  }

  fn reset(&self) {
    *self.0.lock().unwrap_or_else(|p| p.into_inner()) =
      DashboardState::default();
  }
}

impl DashboardSink for SharedDashboard {
  fn render(&mut self, state: &DashboardState) {
    *self.0.lock().unwrap_or_else(|p| p.into_inner()) = state.clone();
  }
}

/// Table sink writing into a snapshot the draw loop reads each frame.
#[derive(Clone, Default)]
pub struct SharedTable(Arc<Mutex<TableState>>);

impl SharedTable {
  pub fn snapshot(&self) -> TableState {
    self.0.lock().unwrap_or_else(|p| p.into_inner()).clone()
  }

  fn reset(&self) {
    *self.0.lock().unwrap_or_else(|p| p.into_inner()) = TableState::default();
  }
}

impl TableSink for SharedTable {
  fn render(&mut self, state: &TableState) {
    *self.0.lock().unwrap_or_else(|p| p.into_inner()) = state.clone();
  }
}

// ─── Controller task plumbing ─────────────────────────────────────────────────

/// Messages from the spawned controller task to the UI loop.
enum WatchEvent {
  /// A poll payload was applied by the controller.
  Update(Retrieval),
  /// The job ended (finished, canceled or failed); the status line to show.
  Done(String),
}

/// View sink that forwards applied payloads to the UI task, which owns the
/// real reconciliation views — disclosure state stays independent of polling.
struct ChannelSink {
  tx: mpsc::UnboundedSender<WatchEvent>,
}

impl ViewSink for ChannelSink {
  fn apply(&mut self, retrieval: &Retrieval) {
    let _ = self.tx.send(WatchEvent::Update(retrieval.clone()));
  }
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App<M: FormMemory> {
  /// Current screen / keyboard focus.
  pub screen:       Screen,
  pub form:         FormState,
  /// Cursor over form rows: 0 = name, then one row per identifier type,
  /// then the event-type row and the harvester row.
  pub form_cursor:  usize,
  /// Cursor within the references table.
  pub table_cursor: usize,
  pub detail_tab:   DetailTab,
  /// One-line status message shown in the status bar.
  pub status_msg:   String,
  /// Whether the controller task is still polling.
  pub running:      bool,

  pub dashboard_out: SharedDashboard,
  pub table_out:     SharedTable,

  memory:     M,
  api:        HttpApi,
  cache:      ResultCache,
  dashboard:  DashboardView<SharedDashboard>,
  table:      TableView<SharedTable>,
  rx:         Option<mpsc::UnboundedReceiver<WatchEvent>>,
  cancel:     Option<CancelToken>,
}

impl<M: FormMemory> App<M> {
  pub fn new(api: HttpApi, memory: M, harvesters: &[String]) -> Self {
    let dashboard_out = SharedDashboard::default();
    let table_out = SharedTable::default();
    let cache = ResultCache::new();
    Self {
      screen: Screen::Form,
      form: FormState::new(harvesters),
      form_cursor: 0,
      table_cursor: 0,
      detail_tab: DetailTab::Current,
      status_msg: String::new(),
      running: false,
      dashboard: DashboardView::new(dashboard_out.clone()),
      table: TableView::new(table_out.clone(), cache.clone()),
      dashboard_out,
      table_out,
      memory,
      api,
      cache,
      rx: None,
      cancel: None,
    }
  }

  /// Prefill the form from the form memory.
  pub async fn init(&mut self) {
    if let Err(error) = self.form.load(&self.memory).await {
      self.status_msg = format!("Form memory unavailable: {error}");
    }
  }

  /// Number of rows the form cursor can visit.
  pub fn form_rows(&self) -> usize {
    // name + identifier fields + events row + harvesters row
    1 + self.form.fields.len() + 2
  }

  pub fn events_row(&self) -> usize { 1 + self.form.fields.len() }

  pub fn harvesters_row(&self) -> usize { 2 + self.form.fields.len() }

  // ── Watch plumbing ────────────────────────────────────────────────────────

  /// Apply payloads and completion messages from the controller task.
  /// Called once per UI tick, before drawing.
  pub fn pump(&mut self) {
    let Some(rx) = self.rx.as_mut() else { return };
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
      events.push(event);
    }
    for event in events {
      match event {
        WatchEvent::Update(retrieval) => {
          self.dashboard.apply(&retrieval);
          self.table.apply(&retrieval);
        }
        WatchEvent::Done(message) => {
          self.running = false;
          self.status_msg = message;
        }
      }
    }
    // The table may have shrunk under the cursor.
    let rows = self.table_out.snapshot().rows.len();
    if rows > 0 && self.table_cursor >= rows {
      self.table_cursor = rows - 1;
    }
  }

  /// Save the form, spawn the controller task and switch to the watch
  /// screen.
  async fn submit(&mut self) {
    if !self.form.is_submittable() {
      self.status_msg =
        "Provide at least one identifier or a name".to_owned();
      return;
    }
    if let Err(error) = self.form.save(&self.memory).await {
      self.status_msg = format!("Could not persist form values: {error}");
    }

    // Fresh views per job; the result cache outlives jobs by design.
    self.dashboard_out.reset();
    self.table_out.reset();
    self.dashboard = DashboardView::new(self.dashboard_out.clone());
    self.table = TableView::new(self.table_out.clone(), self.cache.clone());
    self.table_cursor = 0;
    self.detail_tab = DetailTab::Current;

    let request = self.form.to_request();
    let (tx, rx) = mpsc::unbounded_channel();
    let mut controller =
      RetrievalController::new(self.api.clone(), TokioDelay);
    self.cancel = Some(controller.cancel_token());
    self.rx = Some(rx);
    self.running = true;
    self.status_msg = "Submitting…".to_owned();
    self.screen = Screen::Watch;

    tokio::spawn(async move {
      let mut sink = ChannelSink { tx: tx.clone() };
      let message = match controller.run(&request, &mut [&mut sink]).await {
        Ok(RunOutcome::Finished) => "Retrieval finished".to_owned(),
        Ok(RunOutcome::Canceled) => "Retrieval canceled".to_owned(),
        Err(error) => format!("Error: {error}"),
      };
      let _ = tx.send(WatchEvent::Done(message));
    });
  }

  /// Request cancellation of the running job. Idempotent; takes effect on
  /// the next poll tick.
  fn cancel_retrieval(&mut self) {
    if let Some(cancel) = &self.cancel {
      tracing::debug!("operator requested cancellation");
      cancel.cancel();
      self.status_msg = "Canceling…".to_owned();
    }
  }

  /// Leave the watch screen, canceling any job still running.
  fn back_to_form(&mut self) {
    if self.running {
      self.cancel_retrieval();
    }
    self.rx = None;
    self.screen = Screen::Form;
    self.status_msg = String::new();
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> bool {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL)
      && key.code == KeyCode::Char('c')
    {
      return false;
    }

    match self.screen {
      Screen::Form => self.handle_form_key(key).await,
      Screen::Watch => self.handle_watch_key(key).await,
    }
  }

  async fn handle_form_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Esc => return false,

      KeyCode::Up => {
        self.form_cursor = self.form_cursor.saturating_sub(1);
      }
      KeyCode::Down => {
        if self.form_cursor + 1 < self.form_rows() {
          self.form_cursor += 1;
        }
      }

      KeyCode::Enter => self.submit().await,

      KeyCode::Backspace => {
        if self.form_cursor == 0 {
          self.form.name.pop();
        } else if let Some(field) =
          self.form.fields.get_mut(self.form_cursor - 1)
        {
          field.value.pop();
        }
      }

      KeyCode::Char(c) => {
        if self.form_cursor == self.events_row() {
          if let Some(index) = digit_index(c) {
            if let Some((_, selected)) = self.form.events.get_mut(index) {
              *selected = !*selected;
            }
          }
        } else if self.form_cursor == self.harvesters_row() {
          if let Some(index) = digit_index(c) {
            if let Some((_, selected)) = self.form.harvesters.get_mut(index) {
              *selected = !*selected;
            }
          }
        } else if self.form_cursor == 0 {
          self.form.name.push(c);
        } else if let Some(field) =
          self.form.fields.get_mut(self.form_cursor - 1)
        {
          field.value.push(c);
        }
      }

      _ => {}
    }
    true
  }

  async fn handle_watch_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,

      // New search.
      KeyCode::Char('n') => self.back_to_form(),

      // Cancel the running retrieval.
      KeyCode::Char('c') => self.cancel_retrieval(),

      // Row navigation.
      KeyCode::Down | KeyCode::Char('j') => {
        let rows = self.table_out.snapshot().rows.len();
        if rows > 0 && self.table_cursor + 1 < rows {
          self.table_cursor += 1;
          self.detail_tab = DetailTab::Current;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        if self.table_cursor > 0 {
          self.table_cursor -= 1;
          self.detail_tab = DetailTab::Current;
        }
      }

      // Expand / collapse the selected row.
      KeyCode::Enter => {
        let id = self
          .table_out
          .snapshot()
          .rows
          .get(self.table_cursor)
          .map(|row| row.event_id);
        if let Some(id) = id {
          let api = self.api.clone();
          self.table.toggle(&api, id).await;
          self.detail_tab = DetailTab::Current;
        }
      }

      // Cycle current / previous / diff.
      KeyCode::Tab => {
        self.detail_tab = self.detail_tab.next();
      }

      _ => {}
    }
    true
  }
}

fn digit_index(c: char) -> Option<usize> {
  c.to_digit(10)
    .and_then(|d| (d >= 1).then(|| d as usize - 1))
}
