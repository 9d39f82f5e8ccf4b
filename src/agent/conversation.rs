//! Conversation state: the dialogue replayed to the model every iteration

use serde::{Deserialize, Serialize};

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// What a turn carries: typed input or a model reply, or a tool result
/// fed back under the user role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnKind {
    #[default]
    Message,
    Observation,
}

/// One entry in the conversation log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub kind: TurnKind,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            kind: TurnKind::Message,
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            content: content.into(),
            kind: TurnKind::Message,
        }
    }

    /// A tool result, sent to the model as a user turn
    pub fn observation(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            kind: TurnKind::Observation,
        }
    }

    /// Typed by the user, as opposed to a tool result under the user role
    pub fn is_user_message(&self) -> bool {
        self.role == Role::User && self.kind == TurnKind::Message
    }
}

/// Append-only, ordered log of turns.
///
/// Nothing is ever removed or reordered. The log lives for the whole
/// process and is not bounded; [`Conversation::window`] only limits what
/// is sent, never what is kept.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Full ordered history
    pub fn snapshot(&self) -> &[Turn] {
        &self.turns
    }

    /// The most recent `limit` turns, narrowed so the slice starts on a
    /// user message; an observation is never sent without the action that
    /// produced it. `None` returns everything.
    pub fn window(&self, limit: Option<usize>) -> &[Turn] {
        let Some(limit) = limit else {
            return &self.turns;
        };

        let mut start = self.turns.len().saturating_sub(limit);
        while start < self.turns.len() && !self.turns[start].is_user_message() {
            start += 1;
        }
        &self.turns[start..]
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
