//! Structural diff between two versions of a record.
//!
//! The differ is a pure function over canonicalized values: same inputs,
//! byte-identical output. Callers are expected to run [`crate::canon`] on
//! both sides first so the delta reflects data changes, not list-order
//! artifacts.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::{Result, reference::Reference};

// ─── Delta ───────────────────────────────────────────────────────────────────

/// A structural delta node.
///
/// Array entries are keyed by element index: `Changed`/nested deltas index
/// into both versions, `Added` into the current one, `Removed` into the
/// previous one. The three index ranges are disjoint by construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Delta {
  Added { value: Value },
  Removed { value: Value },
  Changed { from: Value, to: Value },
  Object { entries: BTreeMap<String, Delta> },
  Array { entries: BTreeMap<usize, Delta> },
}

/// Compute the delta from `previous` to `current`.
///
/// Returns `None` when the two values are identical, so
/// `diff(x, x).is_none()` holds for any `x`.
pub fn diff(previous: &Value, current: &Value) -> Option<Delta> {
  if previous == current {
    return None;
  }

  match (previous, current) {
    (Value::Object(prev), Value::Object(curr)) => {
      let mut entries = BTreeMap::new();
      for (key, prev_value) in prev {
        match curr.get(key) {
          Some(curr_value) => {
            if let Some(delta) = diff(prev_value, curr_value) {
              entries.insert(key.clone(), delta);
            }
          }
          None => {
            entries.insert(
              key.clone(),
              Delta::Removed {
                value: prev_value.clone(),
              },
            );
          }
        }
      }
      for (key, curr_value) in curr {
        if !prev.contains_key(key) {
          entries.insert(
            key.clone(),
            Delta::Added {
              value: curr_value.clone(),
            },
          );
        }
      }
      Some(Delta::Object { entries })
    }

    (Value::Array(prev), Value::Array(curr)) => {
      let mut entries = BTreeMap::new();
      let shared = prev.len().min(curr.len());
      for index in 0..shared {
        if let Some(delta) = diff(&prev[index], &curr[index]) {
          entries.insert(index, delta);
        }
      }
      for (index, value) in curr.iter().enumerate().skip(shared) {
        entries.insert(
          index,
          Delta::Added {
            value: value.clone(),
          },
        );
      }
      for (index, value) in prev.iter().enumerate().skip(shared) {
        entries.insert(
          index,
          Delta::Removed {
            value: value.clone(),
          },
        );
      }
      Some(Delta::Array { entries })
    }

    _ => Some(Delta::Changed {
      from: previous.clone(),
      to:   current.clone(),
    }),
  }
}

/// Diff two canonicalized references.
pub fn diff_references(
  previous: &Reference,
  current: &Reference,
) -> Result<Option<Delta>> {
  let prev_value = serde_json::to_value(previous)?;
  let curr_value = serde_json::to_value(current)?;
  Ok(diff(&prev_value, &curr_value))
}

// ─── Annotated rendering ─────────────────────────────────────────────────────

/// Render `current` as an indented tree with changed paths marked.
///
/// Each line starts with a two-character marker: `~ ` changed (with the old
/// value appended), `+ ` added, `- ` removed (shown at the position the
/// element held in the previous version), `  ` unchanged. Output is
/// deterministic: object keys follow `serde_json`'s sorted map order and
/// array elements keep their canonical positions.
pub fn annotate(current: &Value, delta: Option<&Delta>) -> String {
  let mut out = String::new();
  write_node(&mut out, 0, None, current, delta);
  out
}

fn write_node(
  out: &mut String,
  indent: usize,
  label: Option<&str>,
  value: &Value,
  delta: Option<&Delta>,
) {
  match delta {
    Some(Delta::Changed { from, .. }) => {
      push_line(
        out,
        "~ ",
        indent,
        label,
        &format!("{value} (was {from})"),
      );
      return;
    }
    Some(Delta::Added { .. }) => {
      push_line(out, "+ ", indent, label, &value.to_string());
      return;
    }
    _ => {}
  }

  match value {
    Value::Object(map) => {
      let entries = match delta {
        Some(Delta::Object { entries }) => Some(entries),
        _ => None,
      };
      let child_indent = match label {
        Some(_) => {
          push_line(out, "  ", indent, label, "");
          indent + 1
        }
        None => indent,
      };
      for (key, child) in map {
        let child_delta = entries.and_then(|e| e.get(key));
        write_node(out, child_indent, Some(key.as_str()), child, child_delta);
      }
      if let Some(entries) = entries {
        for (key, entry) in entries {
          if let Delta::Removed { value: old } = entry {
            if !map.contains_key(key) {
              push_line(
                out,
                "- ",
                child_indent,
                Some(key.as_str()),
                &old.to_string(),
              );
            }
          }
        }
      }
    }

    Value::Array(items) => {
      let entries = match delta {
        Some(Delta::Array { entries }) => Some(entries),
        _ => None,
      };
      let child_indent = match label {
        Some(_) => {
          push_line(out, "  ", indent, label, "");
          indent + 1
        }
        None => indent,
      };
      for (index, child) in items.iter().enumerate() {
        let child_delta = entries.and_then(|e| e.get(&index));
        let item_label = format!("[{index}]");
        write_node(
          out,
          child_indent,
          Some(item_label.as_str()),
          child,
          child_delta,
        );
      }
      if let Some(entries) = entries {
        for (index, entry) in entries {
          if let Delta::Removed { value: old } = entry {
            if *index >= items.len() {
              let item_label = format!("[{index}]");
              push_line(
                out,
                "- ",
                child_indent,
                Some(item_label.as_str()),
                &old.to_string(),
              );
            }
          }
        }
      }
    }

    scalar => {
      push_line(out, "  ", indent, label, &scalar.to_string());
    }
  }
}

fn push_line(
  out: &mut String,
  marker: &str,
  indent: usize,
  label: Option<&str>,
  text: &str,
) {
  out.push_str(marker);
  for _ in 0..indent {
    out.push_str("  ");
  }
  if let Some(label) = label {
    out.push_str(label);
    out.push(':');
    if !text.is_empty() {
      out.push(' ');
    }
  }
  out.push_str(text);
  out.push('\n');
}
