//! Harvestings — the per-harvester execution unit within one retrieval job.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, event::ReferenceEvent};

// ─── State ───────────────────────────────────────────────────────────────────

/// Lifecycle state of a single harvesting.
///
/// States transition monotonically toward a terminal state. `Canceled` is
/// terminal as well but is only ever produced client-side by the controller's
/// forced-cancel rendering; the server reports `idle` (deserialised as
/// `Pending`), `running`, `completed` or `failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HarvestingState {
  #[serde(alias = "idle")]
  Pending,
  Running,
  Completed,
  Failed,
  Canceled,
}

impl HarvestingState {
  /// True when this harvesting will make no further progress.
  pub fn is_terminal(&self) -> bool {
    matches!(self, Self::Completed | Self::Failed | Self::Canceled)
  }

  /// Capitalised label for display ("Running", …).
  pub fn label(&self) -> &'static str {
    match self {
      Self::Pending => "Pending",
      Self::Running => "Running",
      Self::Completed => "Completed",
      Self::Failed => "Failed",
      Self::Canceled => "Canceled",
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Pending => "pending",
      Self::Running => "running",
      Self::Completed => "completed",
      Self::Failed => "failed",
      Self::Canceled => "canceled",
    }
  }
}

impl fmt::Display for HarvestingState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for HarvestingState {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "idle" | "pending" => Ok(Self::Pending),
      "running" => Ok(Self::Running),
      "completed" => Ok(Self::Completed),
      "failed" => Ok(Self::Failed),
      "canceled" => Ok(Self::Canceled),
      other => Err(Error::UnknownState(other.to_owned())),
    }
  }
}

// ─── Harvesting ──────────────────────────────────────────────────────────────

/// An error reported by a failed harvesting, rendered with the widget.
/// Domain data, never raised as a client error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestingError {
  pub name:    String,
  pub message: String,
}

/// The per-harvester execution unit within one retrieval job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Harvesting {
  #[serde(default)]
  pub id:               i64,
  pub harvester:        String,
  pub state:            HarvestingState,
  #[serde(default)]
  pub reference_events: Vec<ReferenceEvent>,
  /// Absent (or null) unless the harvesting failed.
  #[serde(default)]
  pub error:            Option<Vec<HarvestingError>>,
}

impl Harvesting {
  /// Attached error detail, empty when none was reported.
  pub fn errors(&self) -> &[HarvestingError] {
    self.error.as_deref().unwrap_or_default()
  }
}
