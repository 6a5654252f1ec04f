// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use parley_core::ParleyError;
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::migrations;

/// Handle to the single SQLite connection used by all query modules.
///
/// Opening a database applies the connection PRAGMAs (WAL journaling,
/// enforced foreign keys, busy timeout) and runs all pending migrations.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at `path`, configure it, and migrate.
    pub async fn open(path: &str) -> Result<Self, ParleyError> {
        let conn = Connection::open(path.to_string())
            .await
            .map_err(map_tr_err)?;
        Self::setup(conn, true).await
    }

    /// Open an in-memory database. Used by tests.
    pub async fn open_in_memory() -> Result<Self, ParleyError> {
        let conn = Connection::open_in_memory().await.map_err(map_tr_err)?;
        // WAL is meaningless for in-memory databases.
        Self::setup(conn, false).await
    }

    async fn setup(conn: Connection, wal: bool) -> Result<Self, ParleyError> {
        conn.call(move |conn| {
            if wal {
                conn.pragma_update(None, "journal_mode", "WAL")?;
                conn.pragma_update(None, "synchronous", "NORMAL")?;
            }
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.busy_timeout(std::time::Duration::from_secs(5))?;
            migrations::run_migrations(conn)
                .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        debug!("database opened and migrated");
        Ok(Self { conn })
    }

    /// Returns the underlying tokio-rusqlite connection handle.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Checkpoint the WAL and close the connection.
    pub async fn close(&self) -> Result<(), ParleyError> {
        self.conn
            .call(|conn| {
                // Checkpoint is a no-op outside WAL mode.
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

/// Map a tokio-rusqlite error into a [`ParleyError`].
///
/// Constraint failures (duplicate primary key, orphaned foreign key,
/// NOT NULL, CHECK) surface as [`ParleyError::Constraint`] so callers can
/// distinguish them from infrastructure failures.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error) -> ParleyError {
    if let tokio_rusqlite::Error::Rusqlite(ref inner) = e
        && is_constraint_violation(inner)
    {
        return ParleyError::Constraint {
            message: inner.to_string(),
        };
    }
    ParleyError::Storage {
        source: Box::new(e),
    }
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(f, _)
            if f.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_file_and_runs_migrations() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("open.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        assert!(db_path.exists());

        // Migrated tables are queryable.
        db.connection()
            .call(|conn| {
                conn.execute_batch("SELECT count(*) FROM conversations; SELECT count(*) FROM messages; SELECT count(*) FROM qa_memories;")?;
                Ok(())
            })
            .await
            .unwrap();

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn open_is_idempotent_across_restarts() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("reopen.db");
        let path = db_path.to_str().unwrap();

        let db = Database::open(path).await.unwrap();
        db.close().await.unwrap();
        drop(db);

        // Re-opening re-runs the migration runner against an already
        // migrated database without error.
        let db = Database::open(path).await.unwrap();
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let db = Database::open_in_memory().await.unwrap();
        let result = db
            .connection()
            .call(|conn| {
                conn.execute(
                    "INSERT INTO messages (conversation_id, role, content) VALUES ('ghost', 'user', 'hi')",
                    [],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err);

        assert!(matches!(result, Err(ParleyError::Constraint { .. })));
    }
}
