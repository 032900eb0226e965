// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generation record CRUD.

use draftloom_core::{DraftloomError, GenerationRecord, RecordQuery};
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::{RecordRow, decode_payload};

/// Insert a new record. Fails if the id already exists.
pub async fn insert_record(
    db: &Database,
    record: &GenerationRecord,
) -> Result<(), DraftloomError> {
    write_row(db, RecordRow::from_record(record)?, "INSERT").await
}

/// Insert or overwrite a record.
pub async fn upsert_record(
    db: &Database,
    record: &GenerationRecord,
) -> Result<(), DraftloomError> {
    write_row(db, RecordRow::from_record(record)?, "INSERT OR REPLACE").await
}

async fn write_row(
    db: &Database,
    row: RecordRow,
    verb: &'static str,
) -> Result<(), DraftloomError> {
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                &format!(
                    "{verb} INTO generation_records
                     (id, owner_id, content_kind, created_at, is_favorite, is_archived, payload)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
                ),
                params![
                    row.id,
                    row.owner_id,
                    row.content_kind,
                    row.created_at,
                    row.is_favorite,
                    row.is_archived,
                    row.payload,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a record by id.
pub async fn get_record(
    db: &Database,
    id: &str,
) -> Result<Option<GenerationRecord>, DraftloomError> {
    let id = id.to_string();
    let payload = db
        .connection()
        .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
            match conn.query_row(
                "SELECT payload FROM generation_records WHERE id = ?1",
                params![id],
                |row| row.get(0),
            ) {
                Ok(payload) => Ok(Some(payload)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)?;
    payload.as_deref().map(decode_payload).transpose()
}

/// Delete a record. Returns whether a row was removed.
pub async fn delete_record(db: &Database, id: &str) -> Result<bool, DraftloomError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let n = conn.execute("DELETE FROM generation_records WHERE id = ?1", params![id])?;
            Ok(n > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// List records matching `query`, newest-first.
pub async fn list_records(
    db: &Database,
    query: &RecordQuery,
) -> Result<Vec<GenerationRecord>, DraftloomError> {
    let owner_id = query.owner_id.clone();
    let kind = query.kind.map(|k| k.to_string());
    let favorites_only = query.favorites_only;
    let include_archived = query.include_archived;
    let limit = i64::try_from(query.limit).unwrap_or(i64::MAX);

    let payloads = db
        .connection()
        .call(move |conn| -> Result<Vec<String>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT payload FROM generation_records
                 WHERE owner_id = ?1
                   AND (?2 IS NULL OR content_kind = ?2)
                   AND (?3 = 0 OR is_favorite = 1)
                   AND (?4 = 1 OR is_archived = 0)
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?5",
            )?;
            let rows = stmt.query_map(
                params![owner_id, kind, favorites_only, include_archived, limit],
                |row| row.get::<_, String>(0),
            )?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)?;

    payloads
        .iter()
        .map(String::as_str)
        .map(decode_payload)
        .collect()
}

#[cfg(test)]
mod tests {
    use draftloom_core::{ContentKind, GenerationRequest, GenerationResult};

    use super::*;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path().join("test.db").to_str().unwrap())
            .await
            .unwrap();
        (db, dir)
    }

    fn make_record(id: &str, owner: &str, created_at: &str) -> GenerationRecord {
        GenerationRecord::new(
            id.to_string(),
            owner.to_string(),
            created_at.to_string(),
            GenerationRequest::new(ContentKind::Text, "write a hook", "linkedin"),
            GenerationResult::Text {
                content: format!("content for {id}"),
                grounding_sources: Vec::new(),
            },
        )
    }

    #[tokio::test]
    async fn insert_and_get_roundtrips() {
        let (db, _dir) = setup_db().await;
        let record = make_record("r1", "alice", "2026-01-01T00:00:00.000Z");

        insert_record(&db, &record).await.unwrap();
        assert_eq!(get_record(&db, "r1").await.unwrap(), Some(record));
        assert_eq!(get_record(&db, "nope").await.unwrap(), None);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_insert_fails_but_upsert_overwrites() {
        let (db, _dir) = setup_db().await;
        let mut record = make_record("r1", "alice", "2026-01-01T00:00:00.000Z");
        insert_record(&db, &record).await.unwrap();
        assert!(insert_record(&db, &record).await.is_err());

        record.is_favorite = true;
        upsert_record(&db, &record).await.unwrap();
        assert!(get_record(&db, "r1").await.unwrap().unwrap().is_favorite);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_filters_orders_and_limits() {
        let (db, _dir) = setup_db().await;
        insert_record(&db, &make_record("old", "alice", "2026-01-01T00:00:00.000Z"))
            .await
            .unwrap();
        insert_record(&db, &make_record("new", "alice", "2026-01-03T00:00:00.000Z"))
            .await
            .unwrap();
        let mut archived = make_record("arch", "alice", "2026-01-02T00:00:00.000Z");
        archived.is_archived = true;
        insert_record(&db, &archived).await.unwrap();
        let mut image = make_record("img", "alice", "2026-01-04T00:00:00.000Z");
        image.request.content_kind = ContentKind::Image;
        image.result = GenerationResult::Image {
            pixel_data: "AAAA".into(),
            mime_type: "image/png".into(),
        };
        image.is_favorite = true;
        insert_record(&db, &image).await.unwrap();
        insert_record(&db, &make_record("bob1", "bob", "2026-01-05T00:00:00.000Z"))
            .await
            .unwrap();

        let ids = |records: Vec<GenerationRecord>| -> Vec<String> {
            records.into_iter().map(|r| r.id).collect()
        };

        let all = list_records(&db, &RecordQuery::for_owner("alice", 10)).await.unwrap();
        assert_eq!(ids(all), vec!["img", "new", "old"]);

        let mut with_archived = RecordQuery::for_owner("alice", 10);
        with_archived.include_archived = true;
        let listed = list_records(&db, &with_archived).await.unwrap();
        assert_eq!(ids(listed), vec!["img", "new", "arch", "old"]);

        let mut texts = RecordQuery::for_owner("alice", 1);
        texts.kind = Some(ContentKind::Text);
        assert_eq!(ids(list_records(&db, &texts).await.unwrap()), vec!["new"]);

        let mut favorites = RecordQuery::for_owner("alice", 10);
        favorites.favorites_only = true;
        assert_eq!(ids(list_records(&db, &favorites).await.unwrap()), vec!["img"]);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_existed() {
        let (db, _dir) = setup_db().await;
        insert_record(&db, &make_record("r1", "alice", "2026-01-01T00:00:00.000Z"))
            .await
            .unwrap();
        assert!(delete_record(&db, "r1").await.unwrap());
        assert!(!delete_record(&db, "r1").await.unwrap());
        db.close().await.unwrap();
    }
}
