// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assembles the studio from configuration.

use std::sync::Arc;

use async_trait::async_trait;
use draftloom_config::DraftloomConfig;
use draftloom_core::traits::{ImageOutput, ImageParams, TextOutput, TextParams};
use draftloom_core::{
    AdapterType, Caller, DraftloomError, GenerationBackend, HealthStatus, PluginAdapter,
};
use draftloom_engine::{ContentStudio, StudioParts};
use draftloom_gemini::GeminiBackend;
use draftloom_remote::HttpRemoteStore;
use draftloom_resilience::{BackoffPolicy, ConnectivityMonitor, OperationQueue};
use draftloom_storage::SqliteStore;
use tracing::{info, warn};

pub struct App {
    pub studio: ContentStudio,
    local: Arc<SqliteStore>,
    remote_credentials: bool,
}

impl App {
    pub async fn build(config: &DraftloomConfig) -> Result<Self, DraftloomError> {
        let local = Arc::new(SqliteStore::open(&config.storage).await?);
        let remote = Arc::new(HttpRemoteStore::new(&config.remote)?);
        let remote_credentials = remote.has_credentials();

        let backend: Arc<dyn GenerationBackend> = match GeminiBackend::new(&config.backend) {
            Ok(backend) => Arc::new(backend),
            Err(e) => {
                warn!(error = %e, "generation backend unavailable; history commands still work");
                Arc::new(UnconfiguredBackend {
                    reason: e.to_string(),
                })
            }
        };

        let connectivity = &config.connectivity;
        let monitor = ConnectivityMonitor::new(
            remote.clone(),
            local.clone(),
            BackoffPolicy::new(connectivity.base_delay(), connectivity.max_delay()),
            connectivity.max_reconnect_attempts,
        )
        .await;
        let queue = Arc::new(OperationQueue::new(connectivity.queue_spacing()));

        let studio = ContentStudio::new(StudioParts {
            backend,
            remote,
            local: local.clone(),
            monitor,
            queue,
        });
        info!(app = %config.app.name, "studio assembled");

        Ok(Self {
            studio,
            local,
            remote_credentials,
        })
    }

    /// `--user` acts as an authenticated caller; otherwise the guest id is used.
    pub fn caller(&self, user: Option<&str>, guest_id: &str) -> Caller {
        caller_for(user, guest_id, self.remote_credentials)
    }

    pub async fn shutdown(&self) -> Result<(), DraftloomError> {
        self.local.shutdown().await
    }
}

fn caller_for(user: Option<&str>, guest_id: &str, remote_credentials: bool) -> Caller {
    match user.map(str::trim).filter(|u| !u.is_empty()) {
        Some(user) => Caller {
            user_id: user.to_string(),
            authenticated: true,
            remote_credentials,
        },
        None => Caller::guest(guest_id),
    }
}

/// Stands in when no API key is configured, so non-generating commands run.
struct UnconfiguredBackend {
    reason: String,
}

impl UnconfiguredBackend {
    fn error(&self) -> DraftloomError {
        DraftloomError::Config(self.reason.clone())
    }
}

#[async_trait]
impl PluginAdapter for UnconfiguredBackend {
    fn name(&self) -> &str {
        "unconfigured"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Backend
    }

    async fn health_check(&self) -> Result<HealthStatus, DraftloomError> {
        Ok(HealthStatus::Unhealthy(self.reason.clone()))
    }

    async fn shutdown(&self) -> Result<(), DraftloomError> {
        Ok(())
    }
}

#[async_trait]
impl GenerationBackend for UnconfiguredBackend {
    async fn generate_text(&self, _params: TextParams) -> Result<TextOutput, DraftloomError> {
        Err(self.error())
    }

    async fn generate_image(&self, _params: ImageParams) -> Result<ImageOutput, DraftloomError> {
        Err(self.error())
    }
}
