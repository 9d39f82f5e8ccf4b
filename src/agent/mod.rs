//! Conversation-driven command loop and its action protocol
//!
//! - [`Conversation`]: append-only turn log replayed to the model
//! - [`Decision`]: strict parse of a model reply
//! - [`Tool`]: the four store operations a decision may name
//! - [`CommandLoop`]: reads input, asks for a decision, dispatches it

mod command_loop;
mod conversation;
mod decision;
pub mod prompt;
mod tools;

pub use command_loop::{CommandLoop, TurnOutcome, PROMPT};
pub use conversation::{Conversation, Role, Turn, TurnKind};
pub use decision::{Decision, Observation};
pub use tools::{invoke, Tool};
