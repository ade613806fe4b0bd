//! The form-memory trait — the injected key-value collaborator that echoes
//! operator form values back across sessions.
//!
//! The trait is implemented by storage backends (e.g.
//! `moisson-store-sqlite`). The engine never touches ambient global state;
//! whoever owns the form decides where (or whether) values persist.

use std::future::Future;

/// Well-known keys under which the operator form persists its fields.
pub mod keys {
  /// Free-text entity name.
  pub const NAME: &str = "name";
  /// Comma-separated selected event types.
  pub const EVENT_TYPES: &str = "event_types";
  /// Comma-separated selected harvesters.
  pub const HARVESTERS: &str = "harvesters";

  /// Identifier types the form offers an input field for; each persists its
  /// last value under its own key.
  pub const IDENTIFIER_TYPES: [&str; 8] = [
    "id_hal_i",
    "id_hal_s",
    "idref",
    "orcid",
    "researcherid",
    "scopusid",
    "arxiv",
    "pubmed",
  ];
}

/// Abstraction over a small persistent key-value collaborator.
///
/// All methods return `Send` futures so the trait can be used from
/// multi-threaded async runtimes.
pub trait FormMemory: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch the stored value for `key`, if any.
  fn get<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  /// Store `value` under `key`, replacing any previous value.
  fn set<'a>(
    &'a self,
    key: &'a str,
    value: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Remove `key` if present.
  fn delete<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Remove every stored key.
  fn clear(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
