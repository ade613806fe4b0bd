//! Reference events — one reported change to a harvested record.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, reference::Reference};

// ─── Event type ──────────────────────────────────────────────────────────────

/// What happened to the record with respect to the previous harvest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
  Created,
  Updated,
  Deleted,
  Unchanged,
}

impl EventType {
  /// Capitalised label for display ("Created", …).
  pub fn label(&self) -> &'static str {
    match self {
      Self::Created => "Created",
      Self::Updated => "Updated",
      Self::Deleted => "Deleted",
      Self::Unchanged => "Unchanged",
    }
  }

  /// Wire name, as it appears in JSON payloads and query parameters.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Created => "created",
      Self::Updated => "updated",
      Self::Deleted => "deleted",
      Self::Unchanged => "unchanged",
    }
  }
}

impl fmt::Display for EventType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for EventType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "created" => Ok(Self::Created),
      "updated" => Ok(Self::Updated),
      "deleted" => Ok(Self::Deleted),
      "unchanged" => Ok(Self::Unchanged),
      other => Err(Error::UnknownEventType(other.to_owned())),
    }
  }
}

// ─── ReferenceEvent ──────────────────────────────────────────────────────────

/// One reported change to a harvested record. Immutable once received.
///
/// `id` is globally unique and stable across polls of the same job; it is the
/// key for both the result cache and the table disclosure state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceEvent {
  pub id:        i64,
  #[serde(rename = "type")]
  pub kind:      EventType,
  #[serde(default)]
  pub enhanced:  bool,
  pub reference: Reference,
}

impl ReferenceEvent {
  /// True when the detail pane should offer current/previous/diff tabs.
  pub fn has_version_history(&self) -> bool {
    self.kind == EventType::Updated || self.enhanced
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn event_type_round_trip() {
    for kind in [
      EventType::Created,
      EventType::Updated,
      EventType::Deleted,
      EventType::Unchanged,
    ] {
      assert_eq!(kind.as_str().parse::<EventType>().unwrap(), kind);
    }
  }

  #[test]
  fn unknown_event_type_is_rejected() {
    assert!("destroyed".parse::<EventType>().is_err());
  }
}
