// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row shape of the `generation_records` table.

use draftloom_core::{DraftloomError, GenerationRecord};

use crate::database::storage_err;

/// A record flattened for SQLite: filter columns plus the JSON payload.
#[derive(Debug, Clone)]
pub struct RecordRow {
    pub id: String,
    pub owner_id: String,
    pub content_kind: String,
    pub created_at: String,
    pub is_favorite: bool,
    pub is_archived: bool,
    pub payload: String,
}

impl RecordRow {
    pub fn from_record(record: &GenerationRecord) -> Result<Self, DraftloomError> {
        Ok(Self {
            id: record.id.clone(),
            owner_id: record.owner_id.clone(),
            content_kind: record.kind().to_string(),
            created_at: record.created_at.clone(),
            is_favorite: record.is_favorite,
            is_archived: record.is_archived,
            payload: serde_json::to_string(record).map_err(storage_err)?,
        })
    }
}

/// Decode a stored payload back into a record.
pub fn decode_payload(payload: &str) -> Result<GenerationRecord, DraftloomError> {
    serde_json::from_str(payload).map_err(storage_err)
}
