//! Shared definitions for the `TaskList` server and client.

pub mod api;
pub mod task;
