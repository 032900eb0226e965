// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All statements run on tokio-rusqlite's single background thread, so the
//! [`Database`] handle is the only writer. Query modules take `&Database`.

use std::path::Path;

use draftloom_core::DraftloomError;
use tracing::debug;

use crate::migrations::run_migrations;

/// Convert a tokio-rusqlite error into `DraftloomError::Storage`.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> DraftloomError {
    DraftloomError::Storage {
        source: Box::new(e),
    }
}

pub(crate) fn storage_err<E>(e: E) -> DraftloomError
where
    E: std::error::Error + Send + Sync + 'static,
{
    DraftloomError::Storage {
        source: Box::new(e),
    }
}

/// Handle to the local SQLite database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
    path: String,
}

impl Database {
    /// Open (or create) the database at `path`, apply migrations, and set
    /// per-connection PRAGMAs.
    pub async fn open(path: &str) -> Result<Self, DraftloomError> {
        Self::open_with(path, true).await
    }

    /// Like [`Database::open`], choosing the journal mode explicitly.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, DraftloomError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(storage_err)?;
            }
        }

        // Schema setup runs once on a short-lived blocking connection.
        let setup_path = path.to_string();
        tokio::task::spawn_blocking(move || -> Result<(), DraftloomError> {
            let mut conn = rusqlite::Connection::open(&setup_path).map_err(storage_err)?;
            let mode = if wal_mode { "WAL" } else { "DELETE" };
            let applied: String = conn
                .pragma_update_and_check(None, "journal_mode", mode, |row| row.get(0))
                .map_err(storage_err)?;
            debug!(journal_mode = %applied, "journal mode set");
            run_migrations(&mut conn)
        })
        .await
        .map_err(|e| DraftloomError::Internal(format!("database setup task failed: {e}")))??;

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(storage_err)?;
        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch(
                "PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;",
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        debug!(path, wal_mode, "database opened");
        Ok(Self {
            conn,
            path: path.to_string(),
        })
    }

    /// The underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Checkpoint the WAL into the main database file.
    pub async fn checkpoint(&self) -> Result<(), DraftloomError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Checkpoint and close the connection.
    pub async fn close(self) -> Result<(), DraftloomError> {
        self.checkpoint().await?;
        self.conn.close().await.map_err(storage_err)?;
        debug!(path = %self.path, "database closed");
        Ok(())
    }
}
