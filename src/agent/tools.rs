//! Tool registry: the closed set of store operations the model may call

use std::fmt;
use std::str::FromStr;

use serde_json::{json, Value};

use crate::error::{AgentError, Result};
use crate::storage::Storage;
use crate::types::TodoId;

/// A store operation the model can name in an action decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    GetAllTodos,
    CreateTodo,
    DeleteTodoById,
    SearchTodos,
}

impl Tool {
    pub const ALL: [Tool; 4] = [
        Tool::GetAllTodos,
        Tool::CreateTodo,
        Tool::DeleteTodoById,
        Tool::SearchTodos,
    ];

    /// Wire name used in decisions
    pub fn name(&self) -> &'static str {
        match self {
            Tool::GetAllTodos => "getAllTodos",
            Tool::CreateTodo => "createTodo",
            Tool::DeleteTodoById => "deleteTodoById",
            Tool::SearchTodos => "searchTodos",
        }
    }

    /// Run the bound store operation and return the observation value
    pub fn invoke(self, store: &Storage, input: &str) -> Result<Value> {
        match self {
            Tool::GetAllTodos => Ok(serde_json::to_value(store.list()?)?),
            Tool::CreateTodo => Ok(json!(store.create(input)?)),
            Tool::DeleteTodoById => {
                let id = parse_id(input)?;
                Ok(serde_json::to_value(store.delete_by_id(id)?)?)
            }
            Tool::SearchTodos => Ok(serde_json::to_value(store.search(input)?)?),
        }
    }
}

/// The model sends ids as strings; anything that is not an integer is
/// refused here instead of being handed to the database.
fn parse_id(input: &str) -> Result<TodoId> {
    input.trim().parse::<TodoId>().map_err(|_| {
        AgentError::InvalidInput(format!("deleteTodoById expects an integer id, got '{}'", input))
    })
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tool {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self> {
        Tool::ALL
            .into_iter()
            .find(|tool| tool.name() == s)
            .ok_or_else(|| AgentError::UnknownTool(s.to_string()))
    }
}

/// Resolve `name` and invoke it with `input`
pub fn invoke(store: &Storage, name: &str, input: &str) -> Result<(Tool, Value)> {
    let tool: Tool = name.parse()?;
    let observation = tool.invoke(store, input)?;
    Ok((tool, observation))
}
