//! Storage engine for the to-do list
//!
//! Handles SQLite connection setup, schema migrations and the four
//! persistence operations the assistant can invoke.

mod connection;
mod migrations;
pub mod queries;

pub use connection::Storage;
pub use migrations::SCHEMA_VERSION;
