// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Parley chatbot service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Parley configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ParleyConfig {
    /// Agent identity and behavior settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// OpenAI API settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Telegram bot integration settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Memory system settings.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Event webhook settings.
    #[serde(default)]
    pub webhook: WebhookConfig,
}

/// Agent identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the agent.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// System instruction prepended to every prompt.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            system_prompt: default_system_prompt(),
        }
    }
}

fn default_agent_name() -> String {
    "parley".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_system_prompt() -> String {
    "You are a concise, helpful QA assistant. Answer the user's question \
     clearly and accurately. If you are unsure, say that you don't know."
        .to_string()
}

/// OpenAI API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// OpenAI API key. `None` requires the environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Chat completion model.
    #[serde(default = "default_model")]
    pub model: String,

    /// Embedding model used for semantic memory.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// API base URL. Overridable for proxies and tests.
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            embedding_model: default_embedding_model(),
            api_base: default_api_base(),
        }
    }
}

fn default_model() -> String {
    "gpt-4.1-nano".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("parley").join("parley.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("parley.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Telegram bot integration configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. `None` disables Telegram integration.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// List of allowed Telegram user IDs or usernames.
    /// An empty list allows all senders.
    #[serde(default)]
    pub allowed_users: Vec<String>,
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bearer token for API auth. `None` disables authentication.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
            bearer_token: None,
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    8000
}

/// Memory system configuration.
///
/// Controls the short-term sliding window and long-term semantic Q&A store.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Enable the semantic memory system. When false, no retrieval or
    /// storage of Q&A pairs occurs; the sliding window still applies.
    #[serde(default = "default_memory_enabled")]
    pub enabled: bool,

    /// Token budget for recent conversation history in the prompt.
    #[serde(default = "default_max_history_tokens")]
    pub max_history_tokens: usize,

    /// Token budget for retrieved Q&A pairs in the prompt.
    #[serde(default = "default_max_qa_tokens")]
    pub max_qa_tokens: usize,

    /// Number of nearest Q&A pairs to retrieve per query.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Minimum word count for a question to be worth remembering.
    #[serde(default = "default_min_question_words")]
    pub min_question_words: usize,

    /// Minimum word count for an answer to be worth remembering.
    #[serde(default = "default_min_answer_words")]
    pub min_answer_words: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: default_memory_enabled(),
            max_history_tokens: default_max_history_tokens(),
            max_qa_tokens: default_max_qa_tokens(),
            top_k: default_top_k(),
            min_question_words: default_min_question_words(),
            min_answer_words: default_min_answer_words(),
        }
    }
}

fn default_memory_enabled() -> bool {
    true
}

fn default_max_history_tokens() -> usize {
    1200
}

fn default_max_qa_tokens() -> usize {
    800
}

fn default_top_k() -> usize {
    5
}

fn default_min_question_words() -> usize {
    4
}

fn default_min_answer_words() -> usize {
    6
}

/// Event webhook configuration.
///
/// When a URL is set, every answered question is POSTed to it as JSON
/// (fire-and-forget; failures are logged, never fatal).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WebhookConfig {
    /// Webhook endpoint URL. `None` disables event delivery.
    #[serde(default)]
    pub url: Option<String>,
}
