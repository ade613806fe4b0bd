//! Integration tests for `SqliteFormMemory` against an in-memory database.

use moisson_core::memory::{FormMemory, keys};

use crate::SqliteFormMemory;

async fn store() -> SqliteFormMemory {
  SqliteFormMemory::open_in_memory()
    .await
    .expect("in-memory store")
}

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  assert_eq!(s.get("nope").await.unwrap(), None);
}

#[tokio::test]
async fn set_then_get_round_trips() {
  let s = store().await;
  s.set(keys::NAME, "M. Dupont").await.unwrap();
  assert_eq!(
    s.get(keys::NAME).await.unwrap().as_deref(),
    Some("M. Dupont")
  );
}

#[tokio::test]
async fn set_replaces_the_previous_value() {
  let s = store().await;
  s.set("idref", "111").await.unwrap();
  s.set("idref", "222").await.unwrap();
  assert_eq!(s.get("idref").await.unwrap().as_deref(), Some("222"));
}

#[tokio::test]
async fn delete_removes_only_its_key() {
  let s = store().await;
  s.set("orcid", "0000-0001").await.unwrap();
  s.set("idref", "111").await.unwrap();
  s.delete("orcid").await.unwrap();

  assert_eq!(s.get("orcid").await.unwrap(), None);
  assert_eq!(s.get("idref").await.unwrap().as_deref(), Some("111"));
}

#[tokio::test]
async fn delete_missing_is_a_no_op() {
  let s = store().await;
  s.delete("ghost").await.unwrap();
}

#[tokio::test]
async fn clear_removes_everything() {
  let s = store().await;
  for key in keys::IDENTIFIER_TYPES {
    s.set(key, "x").await.unwrap();
  }
  s.clear().await.unwrap();
  for key in keys::IDENTIFIER_TYPES {
    assert_eq!(s.get(key).await.unwrap(), None);
  }
}
