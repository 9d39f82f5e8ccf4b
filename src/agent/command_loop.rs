//! The interactive command loop
//!
//! Each iteration reads one line, snapshots the store for context, asks
//! the model for a decision and then either shows the reply or runs a tool
//! and feeds its result back as an observation. Every fault is logged and
//! ends only the current iteration.

use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use super::conversation::{Conversation, Turn};
use super::decision::{Decision, Observation};
use super::prompt::system_instruction;
use super::tools::{self, Tool};
use crate::error::{AgentError, Result};
use crate::llm::{ChatModel, ChatRequest};
use crate::storage::Storage;

/// Console prompt shown before each read
pub const PROMPT: &str = "User: ";

/// What one iteration did
#[derive(Debug)]
pub enum TurnOutcome {
    /// Blank input; nothing recorded
    Skipped,
    /// The model answered directly
    Replied(String),
    /// A tool ran and its result was appended as an observation
    Observed { tool: Tool, observation: Value },
    /// The reply was not a valid decision and was dropped
    Rejected { raw: String, reason: String },
    /// A backend fault or dispatch error aborted the iteration
    Failed(AgentError),
}

/// Drives the conversation between the user, the model and the store
pub struct CommandLoop {
    store: Storage,
    model: Arc<dyn ChatModel>,
    conversation: Conversation,
    history_window: Option<usize>,
}

impl CommandLoop {
    pub fn new(store: Storage, model: Arc<dyn ChatModel>) -> Self {
        Self {
            store,
            model,
            conversation: Conversation::new(),
            history_window: None,
        }
    }

    /// Send at most `window` recent turns to the model. The log itself is
    /// never trimmed.
    pub fn with_history_window(mut self, window: Option<usize>) -> Self {
        self.history_window = window.filter(|w| *w > 0);
        self
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn store(&self) -> &Storage {
        &self.store
    }

    /// Prompt, read and handle lines until `input` is exhausted
    pub async fn run<R, W>(&mut self, input: R, mut output: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();

        loop {
            output.write_all(PROMPT.as_bytes()).await?;
            output.flush().await?;

            let Some(line) = lines.next_line().await? else {
                tracing::info!("Input closed, leaving command loop");
                break;
            };

            if let TurnOutcome::Replied(text) = self.handle_line(&line).await {
                output
                    .write_all(format!("Assistant: {}\n", text).as_bytes())
                    .await?;
                output.flush().await?;
            }
        }

        Ok(())
    }

    /// Handle one line of user input. Never fails; faults are logged and
    /// reported as [`TurnOutcome::Failed`].
    pub async fn handle_line(&mut self, line: &str) -> TurnOutcome {
        match self.process(line).await {
            Ok(outcome) => outcome,
            Err(e) => {
                match &e {
                    AgentError::UnknownTool(name) => {
                        tracing::error!(function = %name, "Invalid tool function: unknown tool");
                    }
                    other if other.is_backend_fault() => {
                        tracing::error!(error = %other, "Backend fault, iteration aborted");
                    }
                    other => tracing::error!(error = %other, "Iteration aborted"),
                }
                TurnOutcome::Failed(e)
            }
        }
    }

    async fn process(&mut self, line: &str) -> Result<TurnOutcome> {
        if line.trim().is_empty() {
            return Ok(TurnOutcome::Skipped);
        }

        self.conversation.append(Turn::user(line));

        let todos = self.store.list()?;
        let request = ChatRequest {
            system: system_instruction(&todos)?,
            turns: self.conversation.window(self.history_window).to_vec(),
        };

        tracing::debug!(
            model = self.model.model_name(),
            turns = request.turns.len(),
            todos = todos.len(),
            "Requesting decision"
        );
        let raw = self.model.generate(&request).await?;
        tracing::info!(
            "\n\n -------------START AI----------\n{}\n\n -------------END AI----------",
            raw
        );

        let decision = match Decision::parse(&raw) {
            Ok(decision) => decision,
            Err(e) => {
                tracing::warn!(raw = %raw, error = %e, "Invalid AI JSON response");
                return Ok(TurnOutcome::Rejected {
                    raw,
                    reason: e.to_string(),
                });
            }
        };

        self.conversation.append(Turn::model(raw));

        match decision {
            Decision::Output { output } => Ok(TurnOutcome::Replied(output)),
            Decision::Action { function, input } => {
                let (tool, observation) = tools::invoke(&self.store, &function, &input)?;
                tracing::info!("Tool [{}] observation: {}", tool, observation);

                let message = Observation::new(observation.clone()).to_message()?;
                self.conversation.append(Turn::observation(message));

                Ok(TurnOutcome::Observed { tool, observation })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    struct Scripted {
        replies: Mutex<VecDeque<String>>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl Scripted {
        fn new(replies: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ChatModel for Scripted {
        async fn generate(&self, request: &ChatRequest) -> Result<String> {
            self.requests.lock().push(request.clone());
            self.replies
                .lock()
                .pop_front()
                .ok_or_else(|| AgentError::Model("script exhausted".to_string()))
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    #[tokio::test]
    async fn test_blank_line_is_skipped() {
        let model = Scripted::new(&[]);
        let mut agent = CommandLoop::new(Storage::open_in_memory().unwrap(), model.clone());

        assert!(matches!(agent.handle_line("   ").await, TurnOutcome::Skipped));
        assert!(agent.conversation().is_empty());
        assert!(model.requests.lock().is_empty());
    }

    #[tokio::test]
    async fn test_context_reflects_store() {
        let store = Storage::open_in_memory().unwrap();
        store.create("Feed cat").unwrap();
        let model = Scripted::new(&[r#"{"type":"output","output":"hi"}"#]);
        let mut agent = CommandLoop::new(store, model.clone());

        agent.handle_line("what's on my list?").await;

        let requests = model.requests.lock();
        assert!(requests[0].system.contains("\"todo\":\"Feed cat\""));
        assert_eq!(requests[0].turns, vec![Turn::user("what's on my list?")]);
    }

    #[tokio::test]
    async fn test_model_failure_keeps_user_turn_only() {
        let model = Scripted::new(&[]);
        let mut agent = CommandLoop::new(Storage::open_in_memory().unwrap(), model);

        let outcome = agent.handle_line("hello").await;
        assert!(matches!(outcome, TurnOutcome::Failed(AgentError::Model(_))));
        assert_eq!(agent.conversation().len(), 1);
    }

    #[tokio::test]
    async fn test_history_window_limits_request() {
        let model = Scripted::new(&[
            r#"{"type":"output","output":"one"}"#,
            r#"{"type":"output","output":"two"}"#,
        ]);
        let mut agent = CommandLoop::new(Storage::open_in_memory().unwrap(), model.clone())
            .with_history_window(Some(1));

        agent.handle_line("first").await;
        agent.handle_line("second").await;

        assert_eq!(agent.conversation().len(), 4);
        let requests = model.requests.lock();
        assert_eq!(requests[1].turns, vec![Turn::user("second")]);
    }

    #[tokio::test]
    async fn test_run_prints_prompt_and_reply() {
        let model = Scripted::new(&[r#"{"type":"output","output":"Nothing to do!"}"#]);
        let mut agent = CommandLoop::new(Storage::open_in_memory().unwrap(), model);

        let input: &[u8] = b"anything today?\n";
        let mut output = Vec::new();
        agent.run(input, &mut output).await.unwrap();

        let printed = String::from_utf8(output).unwrap();
        assert_eq!(printed, "User: Assistant: Nothing to do!\nUser: ");
    }
}
