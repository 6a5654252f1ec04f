// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message filtering and content extraction for the Telegram channel.
//!
//! Determines whether an incoming Telegram message should be processed,
//! then maps it into a channel-agnostic [`InboundMessage`] whose
//! conversation id is the Telegram chat id.

use parley_core::types::InboundMessage;
use teloxide::prelude::*;
use teloxide::types::ChatKind;

/// Checks whether the message sender is authorized.
///
/// An empty `allowed_users` list allows everyone. Otherwise authorization
/// passes when the sender's user ID (as string) or username matches any
/// entry. Messages without a sender (e.g. channel posts) are rejected
/// whenever a list is configured.
pub fn is_authorized(msg: &Message, allowed_users: &[String]) -> bool {
    if allowed_users.is_empty() {
        return true;
    }

    let user = match msg.from.as_ref() {
        Some(u) => u,
        None => return false,
    };

    let user_id_str = user.id.0.to_string();

    for allowed in allowed_users {
        // Match by user ID
        if *allowed == user_id_str {
            return true;
        }
        // Match by username (with or without @ prefix)
        if let Some(ref username) = user.username {
            let allowed_clean = allowed.strip_prefix('@').unwrap_or(allowed);
            if username.eq_ignore_ascii_case(allowed_clean) {
                return true;
            }
        }
    }

    false
}

/// Checks whether the message is from a private (DM) chat.
///
/// Group, supergroup, and channel messages return `false`.
pub fn is_dm(msg: &Message) -> bool {
    matches!(msg.chat.kind, ChatKind::Private(_))
}

/// Whether the message text is the /start command (optionally with a bot
/// mention suffix, as Telegram sends in some clients).
pub fn is_start_command(text: &str) -> bool {
    text == "/start" || text.starts_with("/start@") || text.starts_with("/start ")
}

/// Converts a Telegram text message into an [`InboundMessage`].
///
/// The chat id becomes the conversation id, so each Telegram chat maps to
/// exactly one conversation.
pub fn to_inbound_message(msg: &Message, text: &str) -> InboundMessage {
    let sender_id = msg
        .from
        .as_ref()
        .map(|u| u.id.0.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    InboundMessage {
        id: msg.id.0.to_string(),
        conversation_id: msg.chat.id.0.to_string(),
        channel: "telegram".to_string(),
        sender_id,
        content: text.to_string(),
        timestamp: chrono::DateTime::to_rfc3339(&msg.date),
    }
}
