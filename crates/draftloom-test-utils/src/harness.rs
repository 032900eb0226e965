// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the collaborator side of the pipeline: a mock
//! backend, an in-memory remote store, a temp SQLite fallback store (which
//! also persists the offline flag), a connectivity monitor, and the write
//! queue.

use std::sync::Arc;
use std::time::Duration;

use draftloom_config::model::{DraftloomConfig, StorageConfig};
use draftloom_core::DraftloomError;
use draftloom_resilience::{BackoffPolicy, ConnectivityMonitor, OperationQueue};
use draftloom_storage::SqliteStore;

use crate::mock_backend::{MockBackend, MockReply};
use crate::mock_remote::MockRemoteStore;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    replies: Vec<MockReply>,
    remote: Option<MockRemoteStore>,
    initial_probe: bool,
    max_reconnect_attempts: u32,
    backend_delay: Option<Duration>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            replies: Vec::new(),
            remote: None,
            initial_probe: true,
            max_reconnect_attempts: 3,
            backend_delay: None,
        }
    }

    /// Script backend replies.
    pub fn with_replies(mut self, replies: Vec<MockReply>) -> Self {
        self.replies = replies;
        self
    }

    /// Use a preconfigured remote store (e.g. [`MockRemoteStore::disabled`]).
    pub fn with_remote(mut self, remote: MockRemoteStore) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Skip the startup probe, leaving the monitor in its pending state.
    pub fn without_initial_probe(mut self) -> Self {
        self.initial_probe = false;
        self
    }

    pub fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    pub fn with_backend_delay(mut self, delay: Duration) -> Self {
        self.backend_delay = Some(delay);
        self
    }

    /// Build the harness. Must run inside a Tokio runtime.
    pub async fn build(self) -> Result<TestHarness, DraftloomError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| DraftloomError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let mut config = DraftloomConfig::default();
        config.storage = StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        };
        config.connectivity.max_reconnect_attempts = self.max_reconnect_attempts;
        config.connectivity.queue_spacing_ms = 0;

        let local = Arc::new(SqliteStore::open(&config.storage).await?);
        let remote = Arc::new(self.remote.unwrap_or_default());
        let mut backend = MockBackend::with_replies(self.replies);
        if let Some(delay) = self.backend_delay {
            backend = backend.with_delay(delay);
        }
        let backend = Arc::new(backend);

        let monitor = ConnectivityMonitor::new(
            remote.clone(),
            local.clone(),
            BackoffPolicy::new(
                config.connectivity.base_delay(),
                config.connectivity.max_delay(),
            ),
            config.connectivity.max_reconnect_attempts,
        )
        .await;
        if self.initial_probe {
            monitor.probe().await;
        }
        let queue = Arc::new(OperationQueue::new(config.connectivity.queue_spacing()));

        Ok(TestHarness {
            backend,
            remote,
            local,
            monitor,
            queue,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete collaborator environment with mock adapters and temp storage.
pub struct TestHarness {
    /// The mock generation backend.
    pub backend: Arc<MockBackend>,
    /// The in-memory remote store.
    pub remote: Arc<MockRemoteStore>,
    /// SQLite fallback store (temp DB, cleaned up on drop).
    pub local: Arc<SqliteStore>,
    pub monitor: Arc<ConnectivityMonitor>,
    pub queue: Arc<OperationQueue>,
    pub config: DraftloomConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// A harness with an online remote store and no scripted replies.
    pub async fn online() -> Result<Self, DraftloomError> {
        Self::builder().build().await
    }
}
