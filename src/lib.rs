//! todo-agent - conversational to-do list assistant
//!
//! A language model reads each user message, the current task list and the
//! dialogue so far, and answers with either a reply or a request to run one
//! of four store operations against a SQLite table.

pub mod agent;
pub mod error;
pub mod llm;
pub mod storage;
pub mod types;

pub use error::{AgentError, Result};
pub use storage::Storage;
pub use types::*;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
