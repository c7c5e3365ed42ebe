//! `TaskList`: personal task list client library.

pub mod config;
pub mod store;
pub mod tasks;
pub mod view;
