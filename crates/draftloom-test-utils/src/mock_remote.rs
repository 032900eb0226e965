// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory remote store.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use draftloom_core::{
    AdapterType, DraftloomError, GenerationRecord, HealthStatus, PluginAdapter,
    RecordBackend, RecordQuery, RemoteAccess, RemoteErrorKind, RemoteStore,
};

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Default)]
struct Counters {
    creates: AtomicUsize,
    fetches: AtomicUsize,
    replaces: AtomicUsize,
    removes: AtomicUsize,
    queries: AtomicUsize,
    pings: AtomicUsize,
}

/// A remote store backed by a `HashMap`.
///
/// Every call is counted. Writes, reads, and pings can be made to fail with a
/// chosen [`RemoteErrorKind`], and writes can be slowed down to observe
/// overlap.
pub struct MockRemoteStore {
    records: Mutex<HashMap<String, GenerationRecord>>,
    counters: Counters,
    access: RemoteAccess,
    write_failure: Mutex<Option<RemoteErrorKind>>,
    read_failure: Mutex<Option<RemoteErrorKind>>,
    pings: Mutex<VecDeque<Result<(), RemoteErrorKind>>>,
    write_latency: Mutex<Option<Duration>>,
    writes_in_flight: AtomicUsize,
    max_writes_in_flight: AtomicUsize,
}

impl Default for MockRemoteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRemoteStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            counters: Counters::default(),
            access: RemoteAccess::Enabled,
            write_failure: Mutex::new(None),
            read_failure: Mutex::new(None),
            pings: Mutex::new(VecDeque::new()),
            write_latency: Mutex::new(None),
            writes_in_flight: AtomicUsize::new(0),
            max_writes_in_flight: AtomicUsize::new(0),
        }
    }

    /// A store in an environment where remote access is structurally disabled.
    pub fn disabled() -> Self {
        Self {
            access: RemoteAccess::Disabled,
            ..Self::new()
        }
    }

    /// Fail every subsequent create/replace/remove with `kind` (`None` heals).
    pub fn fail_writes(&self, kind: Option<RemoteErrorKind>) {
        *lock(&self.write_failure) = kind;
    }

    /// Fail every subsequent fetch/query with `kind` (`None` heals).
    pub fn fail_reads(&self, kind: Option<RemoteErrorKind>) {
        *lock(&self.read_failure) = kind;
    }

    /// Script the next ping outcomes; unscripted pings succeed.
    pub fn script_pings(&self, outcomes: Vec<Result<(), RemoteErrorKind>>) {
        lock(&self.pings).extend(outcomes);
    }

    pub fn set_write_latency(&self, latency: Duration) {
        *lock(&self.write_latency) = Some(latency);
    }

    /// Put a record straight into the store, bypassing counters.
    pub fn seed(&self, record: GenerationRecord) {
        lock(&self.records).insert(record.id.clone(), record);
    }

    /// Direct read of the stored copy, bypassing counters.
    pub fn stored(&self, id: &str) -> Option<GenerationRecord> {
        lock(&self.records).get(id).cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn create_calls(&self) -> usize {
        self.counters.creates.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.counters.fetches.load(Ordering::SeqCst)
    }

    pub fn replace_calls(&self) -> usize {
        self.counters.replaces.load(Ordering::SeqCst)
    }

    pub fn remove_calls(&self) -> usize {
        self.counters.removes.load(Ordering::SeqCst)
    }

    pub fn query_calls(&self) -> usize {
        self.counters.queries.load(Ordering::SeqCst)
    }

    pub fn ping_calls(&self) -> usize {
        self.counters.pings.load(Ordering::SeqCst)
    }

    /// Create, replace, and remove calls combined.
    pub fn write_calls(&self) -> usize {
        self.create_calls() + self.replace_calls() + self.remove_calls()
    }

    /// Highest number of writes observed running at the same time.
    pub fn max_writes_in_flight(&self) -> usize {
        self.max_writes_in_flight.load(Ordering::SeqCst)
    }

    fn check_access(&self) -> Result<(), DraftloomError> {
        match self.access {
            RemoteAccess::Enabled => Ok(()),
            RemoteAccess::Disabled => Err(DraftloomError::RemoteAccessDisabled),
        }
    }

    fn injected(slot: &Mutex<Option<RemoteErrorKind>>) -> Result<(), DraftloomError> {
        match *lock(slot) {
            Some(kind) => Err(DraftloomError::remote(kind, "injected failure")),
            None => Ok(()),
        }
    }

    async fn write<T>(
        &self,
        apply: impl FnOnce(&mut HashMap<String, GenerationRecord>) -> T,
    ) -> Result<T, DraftloomError> {
        self.check_access()?;
        let in_flight = self.writes_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_writes_in_flight.fetch_max(in_flight, Ordering::SeqCst);

        let latency = *lock(&self.write_latency);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        let outcome = Self::injected(&self.write_failure).map(|()| apply(&mut lock(&self.records)));

        self.writes_in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}

#[async_trait]
impl PluginAdapter for MockRemoteStore {
    fn name(&self) -> &str {
        "mock-remote"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::RemoteStore
    }

    async fn health_check(&self) -> Result<HealthStatus, DraftloomError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), DraftloomError> {
        Ok(())
    }
}

#[async_trait]
impl RecordBackend for MockRemoteStore {
    async fn create(&self, record: &GenerationRecord) -> Result<String, DraftloomError> {
        self.counters.creates.fetch_add(1, Ordering::SeqCst);
        let remote_ref = format!("mock/{}", record.id);
        let mut stored = record.clone();
        stored.remote_ref = Some(remote_ref.clone());
        self.write(move |records| {
            records.insert(stored.id.clone(), stored);
        })
        .await?;
        Ok(remote_ref)
    }

    async fn fetch(&self, id: &str) -> Result<Option<GenerationRecord>, DraftloomError> {
        self.counters.fetches.fetch_add(1, Ordering::SeqCst);
        self.check_access()?;
        Self::injected(&self.read_failure)?;
        Ok(lock(&self.records).get(id).cloned())
    }

    async fn replace(&self, record: &GenerationRecord) -> Result<(), DraftloomError> {
        self.counters.replaces.fetch_add(1, Ordering::SeqCst);
        let stored = record.clone();
        self.write(move |records| {
            records.insert(stored.id.clone(), stored);
        })
        .await
    }

    async fn remove(&self, id: &str) -> Result<(), DraftloomError> {
        self.counters.removes.fetch_add(1, Ordering::SeqCst);
        let id = id.to_string();
        self.write(move |records| {
            records.remove(&id);
        })
        .await
    }

    async fn query(&self, query: &RecordQuery) -> Result<Vec<GenerationRecord>, DraftloomError> {
        self.counters.queries.fetch_add(1, Ordering::SeqCst);
        self.check_access()?;
        Self::injected(&self.read_failure)?;
        let mut matched: Vec<GenerationRecord> = lock(&self.records)
            .values()
            .filter(|r| query.matches(r))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        matched.truncate(query.limit);
        Ok(matched)
    }
}

#[async_trait]
impl RemoteStore for MockRemoteStore {
    async fn ping(&self) -> Result<(), DraftloomError> {
        self.counters.pings.fetch_add(1, Ordering::SeqCst);
        self.check_access()?;
        let scripted = lock(&self.pings).pop_front();
        match scripted {
            Some(Err(kind)) => Err(DraftloomError::remote(kind, "scripted ping failure")),
            Some(Ok(())) | None => Ok(()),
        }
    }

    fn access(&self) -> RemoteAccess {
        self.access
    }
}

#[cfg(test)]
mod tests {
    use draftloom_core::{ContentKind, GenerationRequest, GenerationResult};

    use super::*;

    fn record(id: &str, owner: &str, created_at: &str) -> GenerationRecord {
        GenerationRecord::new(
            id.into(),
            owner.into(),
            created_at.into(),
            GenerationRequest::new(ContentKind::Text, "x", "blog"),
            GenerationResult::Text {
                content: "c".into(),
                grounding_sources: Vec::new(),
            },
        )
    }

    #[tokio::test]
    async fn injected_write_failure_leaves_store_untouched() {
        let store = MockRemoteStore::new();
        store.fail_writes(Some(RemoteErrorKind::PermissionDenied));
        let err = store.create(&record("a", "u", "1")).await.unwrap_err();
        assert_eq!(err.remote_kind(), Some(RemoteErrorKind::PermissionDenied));
        assert!(store.is_empty());
        assert_eq!(store.create_calls(), 1);
    }

    #[tokio::test]
    async fn query_is_newest_first_and_limited() {
        let store = MockRemoteStore::new();
        for (id, ts) in [("a", "2026-01-01"), ("b", "2026-03-01"), ("c", "2026-02-01")] {
            store.seed(record(id, "u", ts));
        }
        store.seed(record("z", "other", "2026-04-01"));
        let found = store.query(&RecordQuery::for_owner("u", 2)).await.unwrap();
        let ids: Vec<_> = found.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn disabled_store_refuses_everything() {
        let store = MockRemoteStore::disabled();
        assert!(matches!(
            store.ping().await,
            Err(DraftloomError::RemoteAccessDisabled)
        ));
        assert_eq!(store.access(), RemoteAccess::Disabled);
    }
}
