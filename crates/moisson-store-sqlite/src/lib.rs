//! SQLite backend for the Moisson form memory.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Backs the operator form's prefill:
//! the last submitted values survive across runs of the TUI.

mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteFormMemory;

#[cfg(test)]
mod tests;
