// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generation history: create, read, list, update, delete.
//!
//! Every operation addressed by id checks ownership before any side effect,
//! whichever store served the record.

use std::sync::Arc;

use draftloom_core::{
    Caller, ContentKind, DraftloomError, Feedback, GenerationRecord, Rating, RecordQuery,
    StorageLocation, now_iso,
};
use tracing::{debug, warn};

use crate::gateway::{Origin, PersistenceGateway};

/// Partial metadata change. `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataUpdate {
    pub favorite: Option<bool>,
    pub archived: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub exported_formats: Option<Vec<String>>,
}

impl MetadataUpdate {
    fn is_empty(&self) -> bool {
        self.favorite.is_none()
            && self.archived.is_none()
            && self.tags.is_none()
            && self.exported_formats.is_none()
    }

    fn apply(self, record: &mut GenerationRecord) {
        if let Some(favorite) = self.favorite {
            record.is_favorite = favorite;
        }
        if let Some(archived) = self.archived {
            record.is_archived = archived;
        }
        if let Some(tags) = self.tags {
            record.tags = dedup(tags);
        }
        if let Some(formats) = self.exported_formats {
            record.exported_formats = dedup(formats);
        }
    }
}

fn dedup(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let value = value.trim().to_string();
        if !value.is_empty() && !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

pub struct GenerationRecordStore {
    gateway: Arc<PersistenceGateway>,
}

impl GenerationRecordStore {
    pub fn new(gateway: Arc<PersistenceGateway>) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Arc<PersistenceGateway> {
        &self.gateway
    }

    /// Persist a freshly generated record owned by `caller`.
    pub async fn create(
        &self,
        caller: &Caller,
        record: &GenerationRecord,
    ) -> Result<StorageLocation, DraftloomError> {
        ensure_owner(caller, record)?;
        self.gateway.save(caller, record).await
    }

    /// Fetch a record the caller owns.
    ///
    /// Remote reads bump the access counter and timestamp; local reads do
    /// not, since local counters are not authoritative.
    pub async fn get(
        &self,
        caller: &Caller,
        id: &str,
    ) -> Result<Option<GenerationRecord>, DraftloomError> {
        let Some((mut record, origin)) = self.gateway.load(caller, id).await? else {
            return Ok(None);
        };
        ensure_owner(caller, &record)?;

        if origin == Origin::Remote {
            record.access_count += 1;
            record.last_accessed_at = Some(now_iso());
            if let Err(e) = self.gateway.update(caller, &record, origin).await {
                warn!(record_id = %id, error = %e, "failed to record access");
            }
        }
        Ok(Some(record))
    }

    /// The owner's records, newest-first.
    pub async fn list_by_owner(
        &self,
        caller: &Caller,
        owner_id: &str,
        limit: usize,
        include_archived: bool,
    ) -> Result<Vec<GenerationRecord>, DraftloomError> {
        let mut query = self.owner_query(caller, owner_id, limit)?;
        query.include_archived = include_archived;
        self.gateway.query(caller, &query).await
    }

    pub async fn list_by_kind(
        &self,
        caller: &Caller,
        owner_id: &str,
        kind: ContentKind,
        limit: usize,
    ) -> Result<Vec<GenerationRecord>, DraftloomError> {
        let mut query = self.owner_query(caller, owner_id, limit)?;
        query.kind = Some(kind);
        self.gateway.query(caller, &query).await
    }

    pub async fn list_favorites(
        &self,
        caller: &Caller,
        owner_id: &str,
        limit: usize,
    ) -> Result<Vec<GenerationRecord>, DraftloomError> {
        let mut query = self.owner_query(caller, owner_id, limit)?;
        query.favorites_only = true;
        self.gateway.query(caller, &query).await
    }

    pub async fn update_feedback(
        &self,
        caller: &Caller,
        id: &str,
        rating: Rating,
        comment: Option<String>,
    ) -> Result<GenerationRecord, DraftloomError> {
        let (mut record, origin) = self.load_owned(caller, id).await?;
        record.feedback = Some(Feedback {
            rating,
            comment: comment.filter(|c| !c.trim().is_empty()),
            rated_at: now_iso(),
        });
        self.gateway.update(caller, &record, origin).await?;
        debug!(record_id = %id, rating = i8::from(rating), "feedback recorded");
        Ok(record)
    }

    pub async fn update_metadata(
        &self,
        caller: &Caller,
        id: &str,
        update: MetadataUpdate,
    ) -> Result<GenerationRecord, DraftloomError> {
        if update.is_empty() {
            return Err(DraftloomError::Validation(
                "metadata update changes nothing".into(),
            ));
        }
        let (mut record, origin) = self.load_owned(caller, id).await?;
        update.apply(&mut record);
        self.gateway.update(caller, &record, origin).await?;
        Ok(record)
    }

    pub async fn delete(&self, caller: &Caller, id: &str) -> Result<(), DraftloomError> {
        self.load_owned(caller, id).await?;
        self.gateway.delete(caller, id).await?;
        debug!(record_id = %id, "record deleted");
        Ok(())
    }

    async fn load_owned(
        &self,
        caller: &Caller,
        id: &str,
    ) -> Result<(GenerationRecord, Origin), DraftloomError> {
        let (record, origin) = self
            .gateway
            .load(caller, id)
            .await?
            .ok_or_else(|| DraftloomError::NotFound { id: id.to_string() })?;
        ensure_owner(caller, &record)?;
        Ok((record, origin))
    }

    fn owner_query(
        &self,
        caller: &Caller,
        owner_id: &str,
        limit: usize,
    ) -> Result<RecordQuery, DraftloomError> {
        if caller.user_id != owner_id {
            return Err(DraftloomError::Unauthorized {
                record_id: format!("history of {owner_id}"),
                caller_id: caller.user_id.clone(),
            });
        }
        Ok(RecordQuery::for_owner(owner_id, limit))
    }
}

fn ensure_owner(caller: &Caller, record: &GenerationRecord) -> Result<(), DraftloomError> {
    if record.owner_id == caller.user_id {
        Ok(())
    } else {
        Err(DraftloomError::Unauthorized {
            record_id: record.id.clone(),
            caller_id: caller.user_id.clone(),
        })
    }
}
