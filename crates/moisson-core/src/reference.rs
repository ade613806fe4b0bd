//! The versioned record content reported by harvesters.
//!
//! Shapes mirror the JSON the retrieval service emits. Repeating
//! substructures (identifiers, contributions, affiliations, document types)
//! arrive in arbitrary order; [`crate::canon`] puts them in canonical order
//! before any comparison or display.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Leaf types ──────────────────────────────────────────────────────────────

/// A typed external identifier, e.g. `{"type": "doi", "value": "10.1000/x"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
  #[serde(rename = "type")]
  pub kind:  String,
  pub value: String,
}

/// A language-tagged literal (titles, subtitles).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiteralField {
  pub value:    String,
  #[serde(default)]
  pub language: Option<String>,
}

/// A document type, identified by its vocabulary URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentType {
  pub uri:   String,
  #[serde(default)]
  pub label: Option<String>,
}

// ─── Contributions ───────────────────────────────────────────────────────────

/// The person or organisation behind a contribution.
///
/// `source_identifier` may be absent when the source knows the contributor
/// only by name; canonical ordering treats a missing identifier as the empty
/// string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
  #[serde(default)]
  pub source_identifier: Option<String>,
  #[serde(default)]
  pub name:              Option<String>,
}

/// An affiliation attached to a contribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affiliation {
  pub source_identifier: String,
  #[serde(default)]
  pub name:              Option<String>,
  #[serde(default)]
  pub identifiers:       Vec<Identifier>,
}

/// One contributor's part in the reference, with its optional rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
  #[serde(default)]
  pub rank:         Option<i64>,
  #[serde(default)]
  pub role:         Option<String>,
  pub contributor:  Contributor,
  #[serde(default)]
  pub affiliations: Vec<Affiliation>,
}

// ─── Reference ───────────────────────────────────────────────────────────────

/// A versioned harvested record.
///
/// Versions are monotonically increasing integers per
/// `(harvester, source_identifier)`; version `v`'s predecessor is `v - 1`,
/// and no predecessor exists below 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
  pub harvester:         String,
  pub source_identifier: String,
  pub version:           i64,
  #[serde(default)]
  pub titles:            Vec<LiteralField>,
  #[serde(default)]
  pub subtitles:         Vec<LiteralField>,
  #[serde(default)]
  pub document_type:     Vec<DocumentType>,
  #[serde(default)]
  pub contributions:     Vec<Contribution>,
  #[serde(default)]
  pub identifiers:       Vec<Identifier>,
  #[serde(default)]
  pub issued:            Option<DateTime<Utc>>,
}

impl Reference {
  /// First title value, or a fixed fallback when the source supplied none.
  pub fn title(&self) -> &str {
    self
      .titles
      .first()
      .map(|t| t.value.as_str())
      .unwrap_or("No title")
  }

  /// True if a previous version of this record can exist at all.
  pub fn has_previous_version(&self) -> bool { self.version > 0 }
}
