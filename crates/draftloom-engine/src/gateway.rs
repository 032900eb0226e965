// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dual-store persistence: remote first, local fallback.
//!
//! Remote writes go through the [`OperationQueue`]. Connectivity-class
//! failures set the sticky offline flag and degrade to the local store;
//! anything else is returned to the caller. Readers see one merged view and
//! cannot tell which store served a record.

use std::collections::HashMap;
use std::sync::Arc;

use draftloom_core::{
    Caller, DraftloomError, ErrorClass, GenerationRecord, RecordBackend, RecordQuery,
    RemoteStore, StorageLocation,
};
use draftloom_resilience::{ConnectivityMonitor, OperationQueue};
use tracing::{debug, info, warn};

/// Which store a record was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Remote,
    Local,
}

pub struct PersistenceGateway {
    remote: Arc<dyn RemoteStore>,
    local: Arc<dyn RecordBackend>,
    monitor: Arc<ConnectivityMonitor>,
    queue: Arc<OperationQueue>,
}

impl PersistenceGateway {
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        local: Arc<dyn RecordBackend>,
        monitor: Arc<ConnectivityMonitor>,
        queue: Arc<OperationQueue>,
    ) -> Self {
        Self {
            remote,
            local,
            monitor,
            queue,
        }
    }

    pub fn monitor(&self) -> &Arc<ConnectivityMonitor> {
        &self.monitor
    }

    /// Persist a new record.
    ///
    /// Offline or unauthenticated callers go straight to the local store
    /// without touching the remote one.
    pub async fn save(
        &self,
        caller: &Caller,
        record: &GenerationRecord,
    ) -> Result<StorageLocation, DraftloomError> {
        if self.monitor.is_offline(caller) {
            debug!(record_id = %record.id, "offline, saving locally");
            return self.save_local(record).await;
        }

        let remote = Arc::clone(&self.remote);
        let queued = record.clone();
        let outcome = self
            .queue
            .enqueue(move || async move { remote.create(&queued).await })
            .await;

        match outcome {
            Ok(remote_ref) => {
                debug!(record_id = %record.id, remote_ref = %remote_ref, "saved remotely");
                Ok(StorageLocation::Remote(remote_ref))
            }
            Err(e) => {
                self.degrade(e).await?;
                self.save_local(record).await
            }
        }
    }

    async fn save_local(&self, record: &GenerationRecord) -> Result<StorageLocation, DraftloomError> {
        let local_ref = self.local.create(record).await?;
        Ok(StorageLocation::Local(local_ref))
    }

    /// Returns `Ok` when `error` means the remote store is unusable, after
    /// setting the sticky flag. Any other error is handed back.
    async fn degrade(&self, error: DraftloomError) -> Result<(), DraftloomError> {
        if error.class() == ErrorClass::Connectivity {
            self.monitor.force_offline(&error).await;
            Ok(())
        } else {
            warn!(error = %error, "remote store rejected the operation");
            Err(error)
        }
    }

    /// Fetch a record by id from whichever store holds it.
    pub async fn load(
        &self,
        caller: &Caller,
        id: &str,
    ) -> Result<Option<(GenerationRecord, Origin)>, DraftloomError> {
        if !self.monitor.is_offline(caller) {
            match self.remote.fetch(id).await {
                Ok(Some(record)) => return Ok(Some((record, Origin::Remote))),
                Ok(None) => {}
                Err(e) => self.degrade(e).await?,
            }
        }
        Ok(self.local.fetch(id).await?.map(|r| (r, Origin::Local)))
    }

    /// Records matching `query` across both stores, newest-first.
    ///
    /// When both stores hold a record, the remote copy wins.
    pub async fn query(
        &self,
        caller: &Caller,
        query: &RecordQuery,
    ) -> Result<Vec<GenerationRecord>, DraftloomError> {
        let mut merged: HashMap<String, GenerationRecord> = self
            .local
            .query(query)
            .await?
            .into_iter()
            .map(|r| (r.id.clone(), r))
            .collect();

        if !self.monitor.is_offline(caller) {
            match self.remote.query(query).await {
                Ok(remote) => {
                    for record in remote {
                        merged.insert(record.id.clone(), record);
                    }
                }
                Err(e) => self.degrade(e).await?,
            }
        }

        let mut records: Vec<GenerationRecord> = merged.into_values().collect();
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        records.truncate(query.limit);
        Ok(records)
    }

    /// Write back a modified record to the store it was read from.
    ///
    /// A remote write that fails for connectivity reasons lands locally.
    pub async fn update(
        &self,
        caller: &Caller,
        record: &GenerationRecord,
        origin: Origin,
    ) -> Result<(), DraftloomError> {
        if origin == Origin::Remote && !self.monitor.is_offline(caller) {
            let remote = Arc::clone(&self.remote);
            let queued = record.clone();
            let outcome = self
                .queue
                .enqueue(move || async move { remote.replace(&queued).await })
                .await;
            match outcome {
                Ok(()) => return Ok(()),
                Err(e) => self.degrade(e).await?,
            }
        }
        self.local.replace(record).await
    }

    /// Delete a record. Offline, only the local copy is removed.
    pub async fn delete(&self, caller: &Caller, id: &str) -> Result<(), DraftloomError> {
        self.local.remove(id).await?;
        if self.monitor.is_offline(caller) {
            info!(record_id = %id, "offline, remote copy (if any) left in place");
            return Ok(());
        }

        let remote = Arc::clone(&self.remote);
        let queued = id.to_string();
        let outcome = self
            .queue
            .enqueue(move || async move { remote.remove(&queued).await })
            .await;
        match outcome {
            Ok(()) => Ok(()),
            Err(e) => self.degrade(e).await,
        }
    }
}
