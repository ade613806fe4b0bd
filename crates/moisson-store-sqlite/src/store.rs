//! [`SqliteFormMemory`] — the SQLite implementation of
//! [`moisson_core::memory::FormMemory`].

use std::path::Path;

use rusqlite::OptionalExtension as _;

use moisson_core::memory::FormMemory;

use crate::{Error, Result, schema::SCHEMA};

/// A form memory backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteFormMemory {
  conn: tokio_rusqlite::Connection,
}

impl SqliteFormMemory {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

impl FormMemory for SqliteFormMemory {
  type Error = Error;

  async fn get<'a>(&'a self, key: &'a str) -> Result<Option<String>> {
    let key = key.to_owned();
    let value = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT value FROM form_values WHERE key = ?1",
              rusqlite::params![key],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(value)
  }

  async fn set<'a>(&'a self, key: &'a str, value: &'a str) -> Result<()> {
    let key = key.to_owned();
    let value = value.to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO form_values (key, value) VALUES (?1, ?2)
           ON CONFLICT (key) DO UPDATE SET value = excluded.value",
          rusqlite::params![key, value],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn delete<'a>(&'a self, key: &'a str) -> Result<()> {
    let key = key.to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM form_values WHERE key = ?1",
          rusqlite::params![key],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn clear(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute("DELETE FROM form_values", [])?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
