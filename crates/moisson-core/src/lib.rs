//! Core types and pure logic for the Moisson harvest watcher.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod canon;
pub mod diff;
pub mod error;
pub mod event;
pub mod harvesting;
pub mod memory;
pub mod reference;
pub mod retrieval;

pub use error::{Error, Result};
