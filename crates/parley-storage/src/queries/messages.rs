// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message append and list operations.
//!
//! Messages are an append-only log: no update or single-row delete exists.
//! Rows disappear only when their conversation is deleted (cascade).

use std::str::FromStr;

use parley_core::ParleyError;
use parley_core::types::Role;
use rusqlite::params;

use crate::database::Database;
use crate::models::{Message, now_timestamp};

/// Titles promoted from the first user message are capped at this many characters.
const TITLE_MAX_CHARS: usize = 50;

fn row_to_message(row: &rusqlite::Row) -> Result<Message, rusqlite::Error> {
    let role_str: String = row.get(2)?;
    let role = Role::from_str(&role_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Message {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        role,
        content: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Append a message to a conversation's log.
///
/// The row id and timestamp are server-assigned. Within the same
/// transaction the parent conversation's `updated_at` is bumped, and when
/// this is the conversation's first user message its content (truncated to
/// 50 characters) is promoted to the conversation title.
///
/// Fails with [`ParleyError::Constraint`] when the conversation does not
/// exist (foreign key violation).
pub async fn append_message(
    db: &Database,
    conversation_id: &str,
    role: Role,
    content: &str,
) -> Result<Message, ParleyError> {
    let conversation_id = conversation_id.to_string();
    let content = content.to_string();
    let now = now_timestamp();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            tx.execute(
                "INSERT INTO messages (conversation_id, role, content) VALUES (?1, ?2, ?3)",
                params![conversation_id, role.as_str(), content],
            )?;
            let id = tx.last_insert_rowid();

            tx.execute(
                "UPDATE conversations SET updated_at = ?1 WHERE conversation_id = ?2",
                params![now, conversation_id],
            )?;

            if role == Role::User {
                let count: i64 = tx.query_row(
                    "SELECT COUNT(*) FROM messages WHERE conversation_id = ?1",
                    params![conversation_id],
                    |row| row.get(0),
                )?;
                if count == 1 {
                    tx.execute(
                        "UPDATE conversations SET title = ?1 WHERE conversation_id = ?2",
                        params![promote_title(&content), conversation_id],
                    )?;
                }
            }

            let message = tx.query_row(
                "SELECT id, conversation_id, role, content, created_at
                 FROM messages WHERE id = ?1",
                params![id],
                row_to_message,
            )?;

            tx.commit()?;
            Ok(message)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List messages for a conversation, oldest first.
///
/// `since` restricts the result to messages with an id strictly greater
/// than the given one, making incremental re-reads restartable.
pub async fn list_messages(
    db: &Database,
    conversation_id: &str,
    since: Option<i64>,
) -> Result<Vec<Message>, ParleyError> {
    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut messages = Vec::new();
            match since {
                Some(after) => {
                    let mut stmt = conn.prepare(
                        "SELECT id, conversation_id, role, content, created_at
                         FROM messages WHERE conversation_id = ?1 AND id > ?2
                         ORDER BY id ASC",
                    )?;
                    let rows = stmt.query_map(params![conversation_id, after], row_to_message)?;
                    for row in rows {
                        messages.push(row?);
                    }
                }
                None => {
                    let mut stmt = conn.prepare(
                        "SELECT id, conversation_id, role, content, created_at
                         FROM messages WHERE conversation_id = ?1
                         ORDER BY id ASC",
                    )?;
                    let rows = stmt.query_map(params![conversation_id], row_to_message)?;
                    for row in rows {
                        messages.push(row?);
                    }
                }
            }
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Truncate message content into a conversation title.
fn promote_title(content: &str) -> String {
    if content.chars().count() > TITLE_MAX_CHARS {
        let truncated: String = content.chars().take(TITLE_MAX_CHARS).collect();
        format!("{truncated}...")
    } else {
        content.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::conversations::{
        create_conversation, delete_conversation, get_conversation,
    };
    use tempfile::tempdir;

    async fn setup_db_with_conversation() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        let conversation = parley_core::types::Conversation {
            conversation_id: "c-1".to_string(),
            title: "New Chat".to_string(),
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
            updated_at: "2026-01-01T00:00:00.000Z".to_string(),
        };
        create_conversation(&db, &conversation).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn append_assigns_increasing_ids_and_list_preserves_order() {
        let (db, _dir) = setup_db_with_conversation().await;

        let m1 = append_message(&db, "c-1", Role::User, "what is the capital of france")
            .await
            .unwrap();
        let m2 = append_message(&db, "c-1", Role::Assistant, "Paris.")
            .await
            .unwrap();
        let m3 = append_message(&db, "c-1", Role::User, "and of italy?")
            .await
            .unwrap();

        assert!(m1.id < m2.id && m2.id < m3.id);

        let messages = list_messages(&db, "c-1", None).await.unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].id, m1.id);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[2].content, "and of italy?");

        // Ordering invariant: non-decreasing id and timestamp.
        for pair in messages.windows(2) {
            assert!(pair[0].id < pair[1].id);
            assert!(pair[0].created_at <= pair[1].created_at);
        }

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn append_to_missing_conversation_is_a_constraint_violation() {
        let (db, _dir) = setup_db_with_conversation().await;

        let result = append_message(&db, "no-such-conversation", Role::User, "hello").await;
        assert!(matches!(result, Err(ParleyError::Constraint { .. })));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn role_outside_enumeration_is_a_constraint_violation() {
        let (db, _dir) = setup_db_with_conversation().await;

        // The typed API cannot produce an invalid role; exercise the CHECK
        // constraint directly.
        let result = db
            .connection()
            .call(|conn| {
                conn.execute(
                    "INSERT INTO messages (conversation_id, role, content)
                     VALUES ('c-1', 'system', 'not allowed')",
                    [],
                )?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err);

        assert!(matches!(result, Err(ParleyError::Constraint { .. })));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delete_conversation_cascades_to_messages() {
        let (db, _dir) = setup_db_with_conversation().await;

        append_message(&db, "c-1", Role::User, "first").await.unwrap();
        append_message(&db, "c-1", Role::Assistant, "second").await.unwrap();
        assert_eq!(list_messages(&db, "c-1", None).await.unwrap().len(), 2);

        assert!(delete_conversation(&db, "c-1").await.unwrap());
        assert!(list_messages(&db, "c-1", None).await.unwrap().is_empty());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_with_since_returns_only_newer_messages() {
        let (db, _dir) = setup_db_with_conversation().await;

        let first = append_message(&db, "c-1", Role::User, "one").await.unwrap();
        append_message(&db, "c-1", Role::Assistant, "two").await.unwrap();
        append_message(&db, "c-1", Role::User, "three").await.unwrap();

        let newer = list_messages(&db, "c-1", Some(first.id)).await.unwrap();
        assert_eq!(newer.len(), 2);
        assert_eq!(newer[0].content, "two");
        assert_eq!(newer[1].content, "three");

        // Re-querying reproduces the same result set.
        let again = list_messages(&db, "c-1", Some(first.id)).await.unwrap();
        assert_eq!(again.len(), 2);
        assert_eq!(again[0].id, newer[0].id);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn first_user_message_promotes_conversation_title() {
        let (db, _dir) = setup_db_with_conversation().await;

        append_message(&db, "c-1", Role::User, "how do rust lifetimes work")
            .await
            .unwrap();

        let conv = get_conversation(&db, "c-1").await.unwrap().unwrap();
        assert_eq!(conv.title, "how do rust lifetimes work");

        // Later user messages leave the title alone.
        append_message(&db, "c-1", Role::Assistant, "they bound borrows")
            .await
            .unwrap();
        append_message(&db, "c-1", Role::User, "another question entirely")
            .await
            .unwrap();
        let conv = get_conversation(&db, "c-1").await.unwrap().unwrap();
        assert_eq!(conv.title, "how do rust lifetimes work");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn long_first_message_is_truncated_with_ellipsis() {
        let (db, _dir) = setup_db_with_conversation().await;

        let long = "x".repeat(80);
        append_message(&db, "c-1", Role::User, &long).await.unwrap();

        let conv = get_conversation(&db, "c-1").await.unwrap().unwrap();
        assert_eq!(conv.title, format!("{}...", "x".repeat(50)));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn assistant_first_message_does_not_set_title() {
        let (db, _dir) = setup_db_with_conversation().await;

        append_message(&db, "c-1", Role::Assistant, "greetings, human")
            .await
            .unwrap();

        let conv = get_conversation(&db, "c-1").await.unwrap().unwrap();
        assert_eq!(conv.title, "New Chat");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn append_bumps_conversation_updated_at() {
        let (db, _dir) = setup_db_with_conversation().await;

        append_message(&db, "c-1", Role::Assistant, "hello").await.unwrap();

        let conv = get_conversation(&db, "c-1").await.unwrap().unwrap();
        assert_eq!(conv.created_at, "2026-01-01T00:00:00.000Z");
        assert_ne!(conv.updated_at, "2026-01-01T00:00:00.000Z");

        db.close().await.unwrap();
    }

    #[test]
    fn promote_title_is_char_boundary_safe() {
        let multibyte = "é".repeat(60);
        let title = promote_title(&multibyte);
        assert!(title.ends_with("..."));
        assert_eq!(title.chars().count(), 53);
    }

    #[test]
    fn promote_title_keeps_short_content_verbatim() {
        assert_eq!(promote_title("short question"), "short question");
    }
}
