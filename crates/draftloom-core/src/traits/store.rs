// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record store traits shared by the remote document store and the local
//! fallback store.

use async_trait::async_trait;

use crate::error::DraftloomError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{GenerationRecord, RecordQuery};

/// Document-oriented CRUD and query over generation records.
///
/// Both the remote store and the local fallback store implement this trait,
/// so records read back identically regardless of which one served them.
#[async_trait]
pub trait RecordBackend: PluginAdapter {
    /// Insert a record. Returns the store-specific reference.
    ///
    /// The stored copy carries that reference in its `remote_ref` or
    /// `local_ref` field.
    async fn create(&self, record: &GenerationRecord) -> Result<String, DraftloomError>;

    /// Fetch a record by id, or `None` if this store does not hold it.
    async fn fetch(&self, id: &str) -> Result<Option<GenerationRecord>, DraftloomError>;

    /// Insert or overwrite a record.
    async fn replace(&self, record: &GenerationRecord) -> Result<(), DraftloomError>;

    /// Delete a record. Deleting a missing record is not an error.
    async fn remove(&self, id: &str) -> Result<(), DraftloomError>;

    /// List records matching `query`, newest-first, at most `query.limit`.
    async fn query(&self, query: &RecordQuery) -> Result<Vec<GenerationRecord>, DraftloomError>;
}

/// Whether the environment allows remote access at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteAccess {
    Enabled,
    /// Remote access is structurally impossible (e.g. a sandboxed embed).
    Disabled,
}

/// The primary remote document store.
#[async_trait]
pub trait RemoteStore: RecordBackend {
    /// Lightweight reachability check.
    async fn ping(&self) -> Result<(), DraftloomError>;

    /// Whether this environment permits remote access.
    fn access(&self) -> RemoteAccess {
        RemoteAccess::Enabled
    }
}
