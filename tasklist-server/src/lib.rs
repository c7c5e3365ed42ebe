//! `TaskList` server library.
//!
//! Exposes the task API router and the JSON data file store for use in
//! tests and embedding.

pub mod api;
pub mod config;
pub mod store;
