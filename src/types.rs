//! Core types for the to-do agent

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a to-do item
pub type TodoId = i64;

/// A to-do item as stored in the `todos` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    /// Identifier assigned by the store, never reused
    pub id: TodoId,
    /// Free text of the task
    pub todo: String,
    /// When the item was created
    pub created_at: DateTime<Utc>,
    /// When the item was last updated
    pub updated_at: DateTime<Utc>,
}

/// Outcome of a delete; zero rows is a valid result, not an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub deleted: usize,
}

/// Configuration for the storage engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to SQLite database
    pub db_path: String,
    /// Storage mode (local or cloud-safe)
    #[serde(default)]
    pub storage_mode: StorageMode,
}

impl StorageConfig {
    pub fn in_memory() -> Self {
        Self {
            db_path: ":memory:".to_string(),
            storage_mode: StorageMode::Local,
        }
    }
}

/// Storage mode for SQLite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StorageMode {
    /// WAL journal, for a database on local disk
    #[default]
    Local,
    /// DELETE journal, for a database inside a synced folder
    CloudSafe,
}

impl std::str::FromStr for StorageMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(StorageMode::Local),
            "cloud-safe" | "cloud_safe" => Ok(StorageMode::CloudSafe),
            _ => Err(format!("Unknown storage mode: {}", s)),
        }
    }
}

/// Configuration for the Gemini model client
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub api_key: String,
    /// Model name, e.g. "gemini-1.5-pro"
    pub model: String,
    /// API base URL without trailing slash
    pub api_base: String,
    /// Per-request timeout in seconds (None = wait indefinitely)
    pub request_timeout_secs: Option<u64>,
}

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-pro";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

impl ModelConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            request_timeout_secs: None,
        }
    }
}
