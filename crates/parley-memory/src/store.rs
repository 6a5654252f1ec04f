// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed Q&A memory store with vector BLOB storage.

use parley_core::error::ParleyError;
use tokio_rusqlite::Connection;

use crate::types::{QaPair, blob_to_vec, l2_normalize, vec_to_blob};

/// Helper to convert tokio_rusqlite errors into ParleyError::Storage.
fn storage_err(e: tokio_rusqlite::Error) -> ParleyError {
    ParleyError::Storage {
        source: Box::new(e),
    }
}

/// Persistent store for Q&A memories in SQLite.
///
/// Embeddings are L2-normalized on save and stored as little-endian f32
/// BLOBs, so retrieval can score candidates with a plain dot product.
pub struct QaMemoryStore {
    conn: Connection,
}

impl QaMemoryStore {
    /// Creates a new QaMemoryStore wrapping an existing connection.
    ///
    /// The connection should already have the `qa_memories` migration applied.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Save a Q&A pair to the store. The embedding is normalized first.
    pub async fn save(&self, pair: &QaPair) -> Result<(), ParleyError> {
        let id = pair.id.clone();
        let question = pair.question.clone();
        let answer = pair.answer.clone();
        let mut embedding = pair.embedding.clone();
        l2_normalize(&mut embedding);
        let embedding_blob = vec_to_blob(&embedding);
        let conversation_id = pair.conversation_id.clone();
        let created_at = pair.created_at.clone();

        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO qa_memories (id, question, answer, embedding, conversation_id, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    rusqlite::params![id, question, answer, embedding_blob, conversation_id, created_at],
                )?;
                Ok(())
            })
            .await
            .map_err(storage_err)
    }

    /// Number of stored Q&A pairs.
    pub async fn count(&self) -> Result<usize, ParleyError> {
        self.conn
            .call(|conn| {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM qa_memories", [], |row| row.get(0))?;
                Ok(count as usize)
            })
            .await
            .map_err(storage_err)
    }

    /// Whether the store holds no memories yet.
    pub async fn is_empty(&self) -> Result<bool, ParleyError> {
        Ok(self.count().await? == 0)
    }

    /// Get all embeddings (lightweight, no question/answer text).
    ///
    /// Returns (id, embedding) pairs for vector search.
    pub async fn all_embeddings(&self) -> Result<Vec<(String, Vec<f32>)>, ParleyError> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare("SELECT id, embedding FROM qa_memories")?;
                let results = stmt
                    .query_map([], |row| {
                        let id: String = row.get(0)?;
                        let blob: Vec<u8> = row.get(1)?;
                        Ok((id, blob_to_vec(&blob)))
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(results)
            })
            .await
            .map_err(storage_err)
    }

    /// Get Q&A pairs by IDs (batch retrieval after vector search).
    pub async fn get_by_ids(&self, ids: &[String]) -> Result<Vec<QaPair>, ParleyError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let ids = ids.to_vec();
        self.conn
            .call(move |conn| {
                // Build parameterized query for IN clause
                let placeholders: Vec<String> = (1..=ids.len()).map(|i| format!("?{i}")).collect();
                let sql = format!(
                    "SELECT id, question, answer, embedding, conversation_id, created_at
                     FROM qa_memories WHERE id IN ({})",
                    placeholders.join(", ")
                );
                let mut stmt = conn.prepare(&sql)?;

                let params: Vec<&dyn rusqlite::types::ToSql> =
                    ids.iter().map(|id| id as &dyn rusqlite::types::ToSql).collect();
                let pairs = stmt
                    .query_map(params.as_slice(), |row| {
                        let blob: Vec<u8> = row.get(3)?;
                        Ok(QaPair {
                            id: row.get(0)?,
                            question: row.get(1)?,
                            answer: row.get(2)?,
                            embedding: blob_to_vec(&blob),
                            conversation_id: row.get(4)?,
                            created_at: row.get(5)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(pairs)
            })
            .await
            .map_err(storage_err)
    }
}
