// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Parley workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Author of a message turn. Closed two-value set enforced by the database
/// CHECK constraint and by this enum at the API boundary.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Storage representation, matching the SQL CHECK constraint values.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A chat session grouping an ordered sequence of messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Opaque string key, immutable once created.
    pub conversation_id: String,
    /// Display title. Promoted from the first user message when left at the default.
    pub title: String,
    /// ISO 8601 creation timestamp, never updated after insert.
    pub created_at: String,
    /// ISO 8601 timestamp bumped on every write touching the conversation.
    pub updated_at: String,
}

/// One turn in a conversation, authored by the end user or the assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Server-assigned auto-increment identity.
    pub id: i64,
    /// Owning conversation. A message never outlives its conversation.
    pub conversation_id: String,
    pub role: Role,
    pub content: String,
    /// ISO 8601 creation timestamp.
    pub created_at: String,
}

/// A role + content pair as sent to the LLM provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Provider,
    Storage,
    Embedding,
}

/// An inbound message received from a channel adapter.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Channel-native message identifier.
    pub id: String,
    /// Conversation this message belongs to (e.g. a Telegram chat id).
    pub conversation_id: String,
    /// Originating channel name ("telegram", "api").
    pub channel: String,
    /// Channel-native sender identifier.
    pub sender_id: String,
    /// Message text.
    pub content: String,
    /// ISO 8601 receive timestamp.
    pub timestamp: String,
}

/// An outbound message to be sent via a channel adapter.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    /// Conversation to deliver into (e.g. a Telegram chat id).
    pub conversation_id: String,
    /// Message text.
    pub content: String,
}

/// A request to an LLM provider.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub model: String,
    /// Full message list including any system turns, in prompt order.
    pub messages: Vec<ChatTurn>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

/// A response from an LLM provider.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub id: String,
    /// Assistant answer text, whitespace-trimmed.
    pub content: String,
    pub model: String,
    pub usage: TokenUsage,
}

/// Token usage reported by a provider call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// Input for an embedding adapter.
#[derive(Debug, Clone)]
pub struct EmbeddingInput {
    pub texts: Vec<String>,
}

/// Output from an embedding adapter.
#[derive(Debug, Clone)]
pub struct EmbeddingOutput {
    pub embeddings: Vec<Vec<f32>>,
    pub dimensions: usize,
}
