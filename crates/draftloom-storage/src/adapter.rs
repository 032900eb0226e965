// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the local fallback store.

use async_trait::async_trait;
use draftloom_config::model::StorageConfig;
use draftloom_core::{
    AdapterType, DraftloomError, GenerationRecord, HealthStatus, OfflineFlagStore, PluginAdapter,
    RecordBackend, RecordQuery,
};
use tracing::debug;

use crate::database::{Database, map_tr_err};
use crate::queries;

const OFFLINE_FLAG_KEY: &str = "offline_mode";

/// Local record store and offline-flag home backed by one SQLite file.
///
/// Serves the same create/fetch/replace/remove/query surface as the remote
/// store so readers cannot tell which one held a record.
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Open the database named in `config`, applying migrations.
    pub async fn open(config: &StorageConfig) -> Result<Self, DraftloomError> {
        let db = Database::open_with(&config.database_path, config.wal_mode).await?;
        debug!(path = %config.database_path, "SQLite fallback store ready");
        Ok(Self { db })
    }

    pub fn from_database(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// The local reference assigned to a record.
    pub fn local_ref(record: &GenerationRecord) -> String {
        format!("local/{}/{}", record.owner_id, record.id)
    }

    fn with_local_ref(record: &GenerationRecord) -> GenerationRecord {
        let mut stored = record.clone();
        stored.local_ref = Some(Self::local_ref(record));
        stored
    }
}

#[async_trait]
impl PluginAdapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::LocalStore
    }

    async fn health_check(&self) -> Result<HealthStatus, DraftloomError> {
        self.db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), DraftloomError> {
        self.db.checkpoint().await?;
        debug!("shutdown: WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl RecordBackend for SqliteStore {
    async fn create(&self, record: &GenerationRecord) -> Result<String, DraftloomError> {
        let stored = Self::with_local_ref(record);
        queries::records::insert_record(&self.db, &stored).await?;
        debug!(record_id = %record.id, "record stored locally");
        Ok(Self::local_ref(record))
    }

    async fn fetch(&self, id: &str) -> Result<Option<GenerationRecord>, DraftloomError> {
        queries::records::get_record(&self.db, id).await
    }

    async fn replace(&self, record: &GenerationRecord) -> Result<(), DraftloomError> {
        queries::records::upsert_record(&self.db, &Self::with_local_ref(record)).await
    }

    async fn remove(&self, id: &str) -> Result<(), DraftloomError> {
        let removed = queries::records::delete_record(&self.db, id).await?;
        debug!(record_id = %id, removed, "local delete");
        Ok(())
    }

    async fn query(&self, query: &RecordQuery) -> Result<Vec<GenerationRecord>, DraftloomError> {
        queries::records::list_records(&self.db, query).await
    }
}

#[async_trait]
impl OfflineFlagStore for SqliteStore {
    async fn load_offline_flag(&self) -> Result<bool, DraftloomError> {
        let value = queries::settings::get_setting(&self.db, OFFLINE_FLAG_KEY).await?;
        Ok(value.as_deref() == Some("true"))
    }

    async fn store_offline_flag(&self, offline: bool) -> Result<(), DraftloomError> {
        let value = if offline { "true" } else { "false" };
        queries::settings::set_setting(&self.db, OFFLINE_FLAG_KEY, value).await
    }
}

#[cfg(test)]
mod tests {
    use draftloom_core::{ContentKind, GenerationRequest, GenerationResult, ReportSection};

    use super::*;

    async fn store() -> (SqliteStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            database_path: dir.path().join("local.db").display().to_string(),
            wal_mode: true,
        };
        (SqliteStore::open(&config).await.unwrap(), dir)
    }

    fn report_record(id: &str) -> GenerationRecord {
        GenerationRecord::new(
            id.into(),
            "alice".into(),
            "2026-02-01T10:00:00.000Z".into(),
            GenerationRequest::new(ContentKind::Report, "channel audit", "youtube"),
            GenerationResult::Report {
                sections: vec![ReportSection {
                    title: "Executive Summary".into(),
                    content: "Grow shorts.".into(),
                    ideas: vec![],
                    sources: vec![],
                }],
            },
        )
    }

    #[tokio::test]
    async fn create_assigns_local_ref_and_fetch_returns_it() {
        let (store, _dir) = store().await;
        let record = report_record("r1");

        let reference = store.create(&record).await.unwrap();
        assert_eq!(reference, "local/alice/r1");

        let fetched = store.fetch("r1").await.unwrap().unwrap();
        assert_eq!(fetched.local_ref.as_deref(), Some("local/alice/r1"));
        assert_eq!(fetched.result, record.result);
    }

    #[tokio::test]
    async fn replace_upserts_and_remove_tolerates_missing() {
        let (store, _dir) = store().await;
        let mut record = report_record("r1");
        store.replace(&record).await.unwrap();
        record.tags = vec!["q1".into()];
        store.replace(&record).await.unwrap();

        assert_eq!(store.fetch("r1").await.unwrap().unwrap().tags, vec!["q1"]);
        store.remove("r1").await.unwrap();
        store.remove("r1").await.unwrap();
        assert!(store.fetch("r1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn offline_flag_defaults_false_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            database_path: dir.path().join("flag.db").display().to_string(),
            wal_mode: true,
        };

        let store = SqliteStore::open(&config).await.unwrap();
        assert!(!store.load_offline_flag().await.unwrap());
        store.store_offline_flag(true).await.unwrap();
        store.shutdown().await.unwrap();
        drop(store);

        let reopened = SqliteStore::open(&config).await.unwrap();
        assert!(reopened.load_offline_flag().await.unwrap());
    }

    #[tokio::test]
    async fn health_check_reports_healthy() {
        let (store, _dir) = store().await;
        assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);
        assert_eq!(store.adapter_type(), AdapterType::LocalStore);
    }
}
