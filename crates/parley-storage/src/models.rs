// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `parley-core::types` for use across
//! adapter trait boundaries. This module re-exports them and provides the
//! timestamp helper used for explicit inserts.

pub use parley_core::types::{Conversation, Message, Role};

/// Current UTC time in the millisecond ISO 8601 format used throughout the
/// schema (`strftime('%Y-%m-%dT%H:%M:%fZ', 'now')`).
pub fn now_timestamp() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

/// Build a new conversation stamped with the current time.
pub fn new_conversation(conversation_id: impl Into<String>, title: impl Into<String>) -> Conversation {
    let now = now_timestamp();
    Conversation {
        conversation_id: conversation_id.into(),
        title: title.into(),
        created_at: now.clone(),
        updated_at: now,
    }
}
