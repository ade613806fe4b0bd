//! The retrieval orchestration and reconciliation engine.
//!
//! Owns the submit → poll → (cancel | finish) lifecycle against the remote
//! retrieval service, merges out-of-order per-harvester results into stable
//! view state, lazily fetches per-result detail through a process-lifetime
//! cache, and assembles canonicalized version comparisons for display.
//!
//! Rendering is behind sink traits ([`dashboard::DashboardSink`],
//! [`table::TableSink`]); timing is behind [`schedule::Delay`]; transport is
//! behind [`api::HarvestApi`]. The engine itself never touches a terminal, a
//! timer or a socket directly.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
#![allow(async_fn_in_trait)]

pub mod api;
pub mod cache;
pub mod controller;
pub mod dashboard;
pub mod detail;
pub mod error;
pub mod http;
pub mod schedule;
pub mod table;

#[cfg(test)]
mod testing;

pub use error::{DetailError, RetrievalError};
