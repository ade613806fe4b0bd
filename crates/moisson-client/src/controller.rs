//! The retrieval controller — submit → poll → (cancel | finish).
//!
//! The controller owns the only scheduled operation in the engine: the fixed
//! 500 ms re-poll. Polls are strictly sequential (the next one is only
//! scheduled after the previous one resolves) and every applied payload
//! replaces the previous one wholesale; merging happens inside the views'
//! own disclosure and cache state, never here.

use std::{
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  },
  time::Duration,
};

use moisson_core::{
  harvesting::HarvestingState,
  retrieval::{Retrieval, RetrievalRequest},
};

use crate::{
  api::HarvestApi,
  error::RetrievalError,
  schedule::Delay,
};

/// Fixed re-poll interval.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

// ─── View sink ───────────────────────────────────────────────────────────────

/// Receiver of applied poll payloads — implemented by the reconciliation
/// views. The controller applies payloads to every sink, in the order the
/// caller listed them, before evaluating the finished-check, so the terminal
/// state is always visible.
pub trait ViewSink {
  fn apply(&mut self, retrieval: &Retrieval);
}

// ─── Cancellation ────────────────────────────────────────────────────────────

/// Shared cancellation flag consulted on each poll tick.
///
/// `cancel` is idempotent. It does not abort an in-flight request; it only
/// prevents the next poll from being scheduled and forces the terminal
/// rendering.
#[derive(Clone, Default)]
pub struct CancelToken {
  flag: Arc<AtomicBool>,
}

impl CancelToken {
  pub fn cancel(&self) { self.flag.store(true, Ordering::SeqCst); }

  pub fn is_requested(&self) -> bool { self.flag.load(Ordering::SeqCst) }

  fn reset(&self) { self.flag.store(false, Ordering::SeqCst); }
}

// ─── Controller ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
  Idle,
  Submitting,
  Polling,
  Finished,
  Canceled,
}

/// How a job run ended, short of a fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
  Finished,
  Canceled,
}

pub struct RetrievalController<A: HarvestApi, D: Delay> {
  api:          A,
  delay:        D,
  state:        ControllerState,
  cancel:       CancelToken,
  last_applied: Option<Retrieval>,
}

impl<A: HarvestApi, D: Delay> RetrievalController<A, D> {
  pub fn new(api: A, delay: D) -> Self {
    Self {
      api,
      delay,
      state: ControllerState::Idle,
      cancel: CancelToken::default(),
      last_applied: None,
    }
  }

  pub fn state(&self) -> ControllerState { self.state }

  /// A clone of the cancellation flag, to hand to whatever owns the cancel
  /// control. Reset on every new submission.
  pub fn cancel_token(&self) -> CancelToken { self.cancel.clone() }

  /// Submit `request` and poll until every harvesting reaches a terminal
  /// state, the operator cancels, or a poll fails.
  ///
  /// Errors are fatal to the job (no automatic retry anywhere): a failed
  /// submission leaves the controller `Idle` with no job created; a failed
  /// poll stops polling with the last applied state still on display.
  pub async fn run(
    &mut self,
    request: &RetrievalRequest,
    views: &mut [&mut (dyn ViewSink + Send)],
  ) -> Result<RunOutcome, RetrievalError<A::Error>> {
    self.cancel.reset();
    self.last_applied = None;

    self.state = ControllerState::Submitting;
    let handle = match self.api.submit(request).await {
      Ok(handle) => handle,
      Err(error) => {
        self.state = ControllerState::Idle;
        return Err(RetrievalError::Submission(error));
      }
    };
    tracing::info!(retrieval_id = handle.retrieval_id, "retrieval submitted");

    self.state = ControllerState::Polling;
    loop {
      if self.cancel.is_requested() {
        return Ok(self.finish_canceled(views));
      }

      let retrieval = match self.api.harvesting_state(&handle).await {
        Ok(retrieval) => retrieval,
        Err(error) => {
          self.state = ControllerState::Idle;
          tracing::warn!(
            retrieval_id = handle.retrieval_id,
            error = %error,
            "poll failed, giving up on job"
          );
          return Err(RetrievalError::Poll(error));
        }
      };

      // A cancel that arrived while the request was in flight wins: the
      // stale payload is discarded, never applied.
      if self.cancel.is_requested() {
        return Ok(self.finish_canceled(views));
      }

      for view in views.iter_mut() {
        view.apply(&retrieval);
      }
      let finished = retrieval.finished();
      self.last_applied = Some(retrieval);

      if finished {
        self.state = ControllerState::Finished;
        tracing::info!(retrieval_id = handle.retrieval_id, "retrieval finished");
        return Ok(RunOutcome::Finished);
      }
      self.delay.wait(POLL_INTERVAL).await;
    }
  }

  /// Render the forced-cancel state: every non-terminal harvesting in the
  /// last applied payload becomes `canceled`, in the rendered view only —
  /// nothing is sent to the server.
  fn finish_canceled(
    &mut self,
    views: &mut [&mut (dyn ViewSink + Send)],
  ) -> RunOutcome {
    if let Some(mut rendered) = self.last_applied.take() {
      for harvesting in &mut rendered.harvestings {
        if !harvesting.state.is_terminal() {
          harvesting.state = HarvestingState::Canceled;
        }
      }
      for view in views.iter_mut() {
        view.apply(&rendered);
      }
      self.last_applied = Some(rendered);
    }
    self.state = ControllerState::Canceled;
    tracing::info!("retrieval canceled by operator");
    RunOutcome::Canceled
  }
}
