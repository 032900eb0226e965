// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Caller-facing facade over orchestration, history, and connectivity.

use std::sync::Arc;

use draftloom_core::{
    Caller, ContentKind, DraftloomError, GenerationBackend, GenerationRecord, GenerationRequest,
    Rating, RecordBackend, RemoteStore,
};
use draftloom_resilience::{
    ConnectivityMonitor, ConnectivitySnapshot, OperationQueue, ReconnectOutcome,
};
use tracing::info;

use crate::gateway::PersistenceGateway;
use crate::orchestrator::{GenerationOrchestrator, GenerationOutcome};
use crate::records::{GenerationRecordStore, MetadataUpdate};

/// Collaborators the studio is assembled from.
pub struct StudioParts {
    pub backend: Arc<dyn GenerationBackend>,
    pub remote: Arc<dyn RemoteStore>,
    pub local: Arc<dyn RecordBackend>,
    pub monitor: Arc<ConnectivityMonitor>,
    pub queue: Arc<OperationQueue>,
}

pub struct ContentStudio {
    orchestrator: GenerationOrchestrator,
    records: Arc<GenerationRecordStore>,
    monitor: Arc<ConnectivityMonitor>,
}

impl ContentStudio {
    pub fn new(parts: StudioParts) -> Self {
        let gateway = Arc::new(PersistenceGateway::new(
            parts.remote,
            parts.local,
            Arc::clone(&parts.monitor),
            parts.queue,
        ));
        let records = Arc::new(GenerationRecordStore::new(gateway));
        Self {
            orchestrator: GenerationOrchestrator::new(parts.backend, Arc::clone(&records)),
            records,
            monitor: parts.monitor,
        }
    }

    pub fn records(&self) -> &GenerationRecordStore {
        &self.records
    }

    pub async fn generate(
        &self,
        caller: &Caller,
        request: GenerationRequest,
    ) -> Result<GenerationOutcome, DraftloomError> {
        self.orchestrator.generate(caller, request).await
    }

    pub async fn get(
        &self,
        caller: &Caller,
        id: &str,
    ) -> Result<Option<GenerationRecord>, DraftloomError> {
        self.records.get(caller, id).await
    }

    pub async fn rate(
        &self,
        caller: &Caller,
        id: &str,
        rating: Rating,
        comment: Option<String>,
    ) -> Result<GenerationRecord, DraftloomError> {
        self.records.update_feedback(caller, id, rating, comment).await
    }

    pub async fn toggle_favorite(
        &self,
        caller: &Caller,
        id: &str,
        favorite: bool,
    ) -> Result<GenerationRecord, DraftloomError> {
        self.records
            .update_metadata(
                caller,
                id,
                MetadataUpdate {
                    favorite: Some(favorite),
                    ..MetadataUpdate::default()
                },
            )
            .await
    }

    pub async fn update_metadata(
        &self,
        caller: &Caller,
        id: &str,
        update: MetadataUpdate,
    ) -> Result<GenerationRecord, DraftloomError> {
        self.records.update_metadata(caller, id, update).await
    }

    /// The caller's own history, newest-first.
    pub async fn history(
        &self,
        caller: &Caller,
        limit: usize,
        include_archived: bool,
    ) -> Result<Vec<GenerationRecord>, DraftloomError> {
        self.records
            .list_by_owner(caller, &caller.user_id, limit, include_archived)
            .await
    }

    pub async fn history_by_kind(
        &self,
        caller: &Caller,
        kind: ContentKind,
        limit: usize,
    ) -> Result<Vec<GenerationRecord>, DraftloomError> {
        self.records
            .list_by_kind(caller, &caller.user_id, kind, limit)
            .await
    }

    pub async fn favorites(
        &self,
        caller: &Caller,
        limit: usize,
    ) -> Result<Vec<GenerationRecord>, DraftloomError> {
        self.records
            .list_favorites(caller, &caller.user_id, limit)
            .await
    }

    pub async fn delete(&self, caller: &Caller, id: &str) -> Result<(), DraftloomError> {
        self.records.delete(caller, id).await
    }

    /// Initial reachability check; run once at startup.
    pub async fn connect(&self) -> bool {
        let online = self.monitor.probe().await;
        info!(online, "initial connectivity check");
        online
    }

    pub async fn reconnect(&self) -> ReconnectOutcome {
        self.monitor.manual_reconnect().await
    }

    pub fn status(&self) -> ConnectivitySnapshot {
        self.monitor.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use draftloom_core::{GenerationResult, RemoteErrorKind};
    use draftloom_resilience::ProbeState;
    use draftloom_test_utils::{MockRemoteStore, TestHarness};

    use super::*;

    fn studio(h: &TestHarness) -> ContentStudio {
        ContentStudio::new(StudioParts {
            backend: h.backend.clone(),
            remote: h.remote.clone(),
            local: h.local.clone(),
            monitor: h.monitor.clone(),
            queue: h.queue.clone(),
        })
    }

    #[tokio::test]
    async fn generate_rate_favorite_history() {
        let h = TestHarness::online().await.unwrap();
        let studio = studio(&h);
        let alice = Caller::authenticated("alice");

        let outcome = studio
            .generate(&alice, GenerationRequest::new(ContentKind::Text, "x", "blog"))
            .await
            .unwrap();
        studio
            .rate(&alice, &outcome.record_id, Rating::Positive, None)
            .await
            .unwrap();
        studio
            .toggle_favorite(&alice, &outcome.record_id, true)
            .await
            .unwrap();

        let history = studio.history(&alice, 10, false).await.unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[0].is_favorite);
        assert_eq!(history[0].feedback.as_ref().unwrap().rating, Rating::Positive);
        assert_eq!(studio.favorites(&alice, 10).await.unwrap().len(), 1);
        assert!(matches!(history[0].result, GenerationResult::Text { .. }));
    }

    #[tokio::test]
    async fn reconnect_clears_sticky_flag() {
        let h = TestHarness::online().await.unwrap();
        let studio = studio(&h);
        h.monitor
            .force_offline(&DraftloomError::remote(RemoteErrorKind::PermissionDenied, "no"))
            .await;
        assert!(studio.status().offline_flag);

        assert_eq!(studio.reconnect().await, ReconnectOutcome::Online);
        let status = studio.status();
        assert!(!status.offline_flag);
        assert_eq!(status.probe, ProbeState::Online);
    }

    #[tokio::test]
    async fn reconnect_is_distinct_when_remote_disabled() {
        let h = TestHarness::builder()
            .with_remote(MockRemoteStore::disabled())
            .without_initial_probe()
            .build()
            .await
            .unwrap();
        let studio = studio(&h);
        assert!(!studio.connect().await);
        assert_eq!(studio.reconnect().await, ReconnectOutcome::Disabled);
        assert_eq!(h.remote.ping_calls(), 0);
    }
}
