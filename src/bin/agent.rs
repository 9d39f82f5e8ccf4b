//! todo-agent CLI
//!
//! Run with: todo-agent (reads GEMINI_API_KEY from the environment or .env)

use std::sync::Arc;

use clap::Parser;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use todo_agent::agent::CommandLoop;
use todo_agent::error::{AgentError, Result};
use todo_agent::llm::{ChatModel, GeminiClient};
use todo_agent::storage::Storage;
use todo_agent::types::*;

#[derive(Parser, Debug)]
#[command(name = "todo-agent")]
#[command(about = "Manage a to-do list by chatting with a language model")]
#[command(version)]
struct Args {
    /// Database path
    #[arg(
        long,
        env = "TODO_AGENT_DB_PATH",
        default_value = "~/.local/share/todo-agent/todos.db"
    )]
    db_path: String,

    /// Storage mode (local or cloud-safe)
    #[arg(long, env = "TODO_AGENT_STORAGE_MODE", default_value = "local")]
    storage_mode: String,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Gemini model name
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_GEMINI_MODEL)]
    model: String,

    /// Gemini API base URL
    #[arg(long, env = "GEMINI_API_BASE", default_value = DEFAULT_GEMINI_API_BASE)]
    api_base: String,

    /// Most recent turns sent to the model (0 = whole conversation)
    #[arg(long, env = "TODO_AGENT_HISTORY_WINDOW", default_value = "0")]
    history_window: usize,

    /// Model request timeout in seconds (0 = no timeout)
    #[arg(long, env = "TODO_AGENT_REQUEST_TIMEOUT", default_value = "0")]
    request_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env may set RUST_LOG as well as the API key, so load it first
    let dotenv_result = dotenv::dotenv();

    // Logs go to stderr so the conversation on stdout stays readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = dotenv_result {
        tracing::debug!(error = %e, "No .env file loaded");
    }

    let args = Args::parse();

    let storage_mode: StorageMode = args.storage_mode.parse().map_err(AgentError::Config)?;
    let storage = Storage::open(StorageConfig {
        db_path: shellexpand::tilde(&args.db_path).to_string(),
        storage_mode,
    })?;
    tracing::info!(db_path = storage.db_path(), "Opened to-do store");

    let model_config = ModelConfig {
        api_key: args.api_key,
        model: args.model,
        api_base: args.api_base,
        request_timeout_secs: Some(args.request_timeout_secs).filter(|s| *s > 0),
    };
    let model: Arc<dyn ChatModel> = Arc::new(GeminiClient::new(&model_config)?);
    tracing::info!(model = model.model_name(), "Using Gemini model");

    let window = Some(args.history_window).filter(|w| *w > 0);
    let mut command_loop = CommandLoop::new(storage, model).with_history_window(window);

    command_loop
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await
}
