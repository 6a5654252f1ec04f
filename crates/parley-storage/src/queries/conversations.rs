// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation CRUD operations.

use parley_core::ParleyError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{Conversation, now_timestamp};

fn row_to_conversation(row: &rusqlite::Row) -> Result<Conversation, rusqlite::Error> {
    Ok(Conversation {
        conversation_id: row.get(0)?,
        title: row.get(1)?,
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
    })
}

/// Create a new conversation.
///
/// Fails with [`ParleyError::Constraint`] when the id already exists.
pub async fn create_conversation(
    db: &Database,
    conversation: &Conversation,
) -> Result<(), ParleyError> {
    let conversation = conversation.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO conversations (conversation_id, title, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    conversation.conversation_id,
                    conversation.title,
                    conversation.created_at,
                    conversation.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Create the conversation if it does not exist yet (lazy create).
///
/// Used when a channel-native id (e.g. a Telegram chat id) arrives for the
/// first time. Existing conversations are left untouched.
pub async fn ensure_conversation(
    db: &Database,
    id: &str,
    default_title: &str,
) -> Result<(), ParleyError> {
    let id = id.to_string();
    let title = default_title.to_string();
    let now = now_timestamp();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO conversations (conversation_id, title, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?3)",
                params![id, title, now],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a conversation by id.
pub async fn get_conversation(
    db: &Database,
    id: &str,
) -> Result<Option<Conversation>, ParleyError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT conversation_id, title, created_at, updated_at
                 FROM conversations WHERE conversation_id = ?1",
            )?;
            let result = stmt.query_row(params![id], row_to_conversation);
            match result {
                Ok(conversation) => Ok(Some(conversation)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List conversations that contain at least one message, most recently
/// updated first.
pub async fn list_conversations(db: &Database) -> Result<Vec<Conversation>, ParleyError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT c.conversation_id, c.title, c.created_at, c.updated_at
                 FROM conversations c
                 JOIN messages m ON c.conversation_id = m.conversation_id
                 ORDER BY c.updated_at DESC",
            )?;
            let rows = stmt.query_map([], row_to_conversation)?;
            let mut conversations = Vec::new();
            for row in rows {
                conversations.push(row?);
            }
            Ok(conversations)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete a conversation. All its messages are removed by the
/// `ON DELETE CASCADE` clause.
///
/// Returns whether a row was deleted.
pub async fn delete_conversation(db: &Database, id: &str) -> Result<bool, ParleyError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let affected = conn.execute(
                "DELETE FROM conversations WHERE conversation_id = ?1",
                params![id],
            )?;
            Ok(affected > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Bump a conversation's `updated_at` timestamp.
pub async fn touch_conversation(db: &Database, id: &str) -> Result<(), ParleyError> {
    let id = id.to_string();
    let now = now_timestamp();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE conversations SET updated_at = ?1 WHERE conversation_id = ?2",
                params![now, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Set a conversation's title. `updated_at` is bumped by the update trigger.
pub async fn set_title(db: &Database, id: &str, title: &str) -> Result<(), ParleyError> {
    let id = id.to_string();
    let title = title.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE conversations SET title = ?1 WHERE conversation_id = ?2",
                params![title, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
