//! Decision and observation wire formats
//!
//! A model reply must be exactly one of
//!
//! ```text
//! {"type":"action","function":"<name>","input":"<string>"}
//! {"type":"output","output":"<string>"}
//! ```
//!
//! Parsing is strict: the reply must be a JSON object whose key set is
//! exactly one of the two shapes above, with string values. Extra keys,
//! missing keys and non-string values are all rejected.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{AgentError, Result};

/// The model's parsed reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Show text to the user
    Output { output: String },
    /// Run a tool; `function` is checked against the tool set at dispatch
    Action { function: String, input: String },
}

/// Tool result fed back to the model as a user turn
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "observation")]
pub struct Observation {
    pub observation: Value,
}

impl Observation {
    pub fn new(observation: Value) -> Self {
        Self { observation }
    }

    pub fn to_message(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

fn malformed(reason: impl Into<String>) -> AgentError {
    AgentError::MalformedDecision(reason.into())
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Result<String> {
    match obj.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(malformed(format!(
            "field '{}' must be a string, got {}",
            key, other
        ))),
        None => Err(malformed(format!("missing field '{}'", key))),
    }
}

fn expect_keys(obj: &Map<String, Value>, expected: &[&str]) -> Result<()> {
    if let Some(extra) = obj.keys().find(|k| !expected.contains(&k.as_str())) {
        return Err(malformed(format!("unexpected field '{}'", extra)));
    }
    Ok(())
}

impl Decision {
    /// Parse a raw model reply
    pub fn parse(raw: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| malformed(format!("invalid JSON: {}", e)))?;

        let obj = value
            .as_object()
            .ok_or_else(|| malformed("reply is not a JSON object"))?;

        match string_field(obj, "type")?.as_str() {
            "output" => {
                expect_keys(obj, &["type", "output"])?;
                Ok(Decision::Output {
                    output: string_field(obj, "output")?,
                })
            }
            "action" => {
                expect_keys(obj, &["type", "function", "input"])?;
                Ok(Decision::Action {
                    function: string_field(obj, "function")?,
                    input: string_field(obj, "input")?,
                })
            }
            other => Err(malformed(format!("unknown decision type '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_output() {
        let decision = Decision::parse(r#"{"type":"output","output":"You have 2 tasks."}"#).unwrap();
        assert_eq!(
            decision,
            Decision::Output {
                output: "You have 2 tasks.".to_string()
            }
        );
    }

    #[test]
    fn test_parse_action_with_whitespace() {
        let raw = "\n{\n  \"type\": \"action\",\n  \"function\": \"createTodo\",\n  \"input\": \"Buy milk\"\n}\n";
        assert_eq!(
            Decision::parse(raw).unwrap(),
            Decision::Action {
                function: "createTodo".to_string(),
                input: "Buy milk".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_function_still_parses() {
        let decision =
            Decision::parse(r#"{"type":"action","function":"dropTable","input":""}"#).unwrap();
        assert!(matches!(decision, Decision::Action { ref function, .. } if function == "dropTable"));
    }

    #[test]
    fn test_rejects_non_json() {
        let err = Decision::parse("Sure! I added it.").unwrap_err();
        assert!(matches!(err, AgentError::MalformedDecision(_)));
    }

    #[test]
    fn test_rejects_code_fence() {
        assert!(Decision::parse("```json\n{\"type\":\"output\",\"output\":\"hi\"}\n```").is_err());
    }

    #[test]
    fn test_rejects_mixed_shapes() {
        assert!(
            Decision::parse(r#"{"type":"output","output":"hi","function":"getAllTodos"}"#)
                .is_err()
        );
        assert!(Decision::parse(
            r#"{"type":"action","function":"getAllTodos","input":"","output":"x"}"#
        )
        .is_err());
    }

    #[test]
    fn test_rejects_missing_or_mistyped_fields() {
        assert!(Decision::parse(r#"{"type":"action","function":"getAllTodos"}"#).is_err());
        assert!(Decision::parse(r#"{"type":"action","function":"deleteTodoById","input":3}"#).is_err());
        assert!(Decision::parse(r#"{"output":"hi"}"#).is_err());
        assert!(Decision::parse(r#"{"type":"observation","observation":1}"#).is_err());
        assert!(Decision::parse(r#"["output"]"#).is_err());
    }

    #[test]
    fn test_observation_message() {
        let observation = Observation::new(json!(7));
        assert_eq!(
            observation.to_message().unwrap(),
            r#"{"type":"observation","observation":7}"#
        );
    }
}
