//! Detail pane assembly: cache → fetch → canonicalize → (previous, diff).
//!
//! Expanding a table row resolves the event detail through the result cache,
//! canonicalizes the record for display, and — for `updated`/enhanced rows —
//! adds the previous version and a structural diff. A missing previous
//! version (version 0, pruned history, or a failed lookup) is expected, not
//! an error: it renders as the "no previous data" placeholder.

use std::sync::Arc;

use serde_json::Value;

use moisson_core::{
  canon::canonicalized,
  diff::{Delta, annotate, diff_references},
  event::ReferenceEvent,
  reference::Reference,
};

use crate::{api::HarvestApi, cache::ResultCache, error::DetailError};

/// Shown on the "previous version" and "diff" tabs when no predecessor
/// exists.
pub const NO_PREVIOUS_DATA: &str = "No previous data found";

/// The current/previous/diff triple for an `updated` or enhanced row.
#[derive(Debug, Clone)]
pub struct VersionComparison {
  /// Canonicalized previous version; `None` renders the placeholder.
  pub previous:  Option<Value>,
  /// Structural delta from previous to current; `None` when there is no
  /// previous version or the two versions are identical.
  pub delta:     Option<Delta>,
  /// Annotated rendering of the current record with changed paths marked;
  /// present whenever `previous` is.
  pub annotated: Option<String>,
}

impl VersionComparison {
  fn unavailable() -> Self {
    Self {
      previous:  None,
      delta:     None,
      annotated: None,
    }
  }
}

/// Fully-assembled detail for one expanded row.
#[derive(Debug, Clone)]
pub struct DetailPane {
  pub event:    Arc<ReferenceEvent>,
  /// Canonicalized current record, ready for display.
  pub current:  Value,
  /// Present for rows that offer the current/previous/diff tabs.
  pub versions: Option<VersionComparison>,
}

/// Assemble the detail pane for `event_id`, going through `cache` (a repeat
/// expand of a cached id issues no network call).
pub async fn load_detail<A: HarvestApi>(
  api: &A,
  cache: &ResultCache,
  event_id: i64,
) -> Result<DetailPane, DetailError<A::Error>> {
  let event = cache
    .get_or_fetch(api, event_id)
    .await
    .map_err(DetailError::Fetch)?;

  let current_reference = canonicalized(event.reference.clone());
  let current = serde_json::to_value(&current_reference)
    .map_err(moisson_core::Error::from)?;

  let versions = if event.has_version_history() {
    Some(load_versions(api, &current_reference, &current).await?)
  } else {
    None
  };

  Ok(DetailPane {
    event,
    current,
    versions,
  })
}

/// Fetch and diff the previous version of `current_reference`.
///
/// Never issues a lookup for a negative version: a record at version 0 has
/// no predecessor by definition.
async fn load_versions<A: HarvestApi>(
  api: &A,
  current_reference: &Reference,
  current: &Value,
) -> Result<VersionComparison, DetailError<A::Error>> {
  if !current_reference.has_previous_version() {
    return Ok(VersionComparison::unavailable());
  }

  let fetched = match api
    .reference_by_version(
      &current_reference.harvester,
      &current_reference.source_identifier,
      current_reference.version - 1,
    )
    .await
  {
    Ok(found) => found,
    Err(error) => {
      tracing::debug!(
        harvester = %current_reference.harvester,
        source_identifier = %current_reference.source_identifier,
        error = %error,
        "previous version lookup failed"
      );
      None
    }
  };

  let Some(previous_reference) = fetched else {
    return Ok(VersionComparison::unavailable());
  };

  let previous_reference = canonicalized(previous_reference);
  let delta = diff_references(&previous_reference, current_reference)?;
  let annotated = annotate(current, delta.as_ref());
  let previous = serde_json::to_value(&previous_reference)
    .map_err(moisson_core::Error::from)?;

  Ok(VersionComparison {
    previous: Some(previous),
    delta,
    annotated: Some(annotated),
  })
}
