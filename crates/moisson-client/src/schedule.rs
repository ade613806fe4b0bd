//! The polling delay seam.
//!
//! The controller is the only component with a timing concern; it waits
//! through this trait so tests substitute an instant (or counting) delay and
//! drive the poll loop without real timers.

use std::{future::Future, time::Duration};

pub trait Delay: Send + Sync {
  fn wait(&self, duration: Duration) -> impl Future<Output = ()> + Send + '_;
}

/// Production delay backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

impl Delay for TokioDelay {
  async fn wait(&self, duration: Duration) {
    tokio::time::sleep(duration).await;
  }
}
