// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide view of whether the remote store is usable.
//!
//! The [`ConnectivityMonitor`] owns the only cross-request mutable state in
//! the pipeline: the probe outcome, the reconnect counter, and the sticky
//! offline flag. Counter and flag live behind one mutex so concurrent probes
//! cannot double-increment.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use draftloom_core::{Caller, DraftloomError, OfflineFlagStore, RemoteAccess, RemoteStore};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::backoff::BackoffPolicy;

/// Outcome of the most recent probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProbeState {
    /// No probe has completed since start or since the last manual reconnect.
    #[default]
    Pending,
    Online,
    Failed,
}

#[derive(Debug, Default)]
struct ConnectivityState {
    probe: ProbeState,
    reconnect_attempts: u32,
    offline_flag: bool,
}

/// Point-in-time copy of the monitor's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectivitySnapshot {
    pub probe: ProbeState,
    pub reconnect_attempts: u32,
    pub max_reconnect_attempts: u32,
    pub offline_flag: bool,
    pub remote_access: RemoteAccess,
}

impl ConnectivitySnapshot {
    pub fn is_online(&self) -> bool {
        self.probe == ProbeState::Online && !self.offline_flag
    }
}

/// Result of [`ConnectivityMonitor::manual_reconnect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectOutcome {
    /// The probe succeeded.
    Online,
    /// The probe ran and failed.
    Offline,
    /// Remote access is structurally unavailable; nothing was attempted.
    Disabled,
}

/// Tracks remote reachability with capped exponential backoff.
pub struct ConnectivityMonitor {
    remote: Arc<dyn RemoteStore>,
    flag_store: Arc<dyn OfflineFlagStore>,
    policy: BackoffPolicy,
    max_attempts: u32,
    state: Mutex<ConnectivityState>,
    retry: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectivityMonitor {
    /// Build a monitor, restoring the persisted offline flag.
    pub async fn new(
        remote: Arc<dyn RemoteStore>,
        flag_store: Arc<dyn OfflineFlagStore>,
        policy: BackoffPolicy,
        max_attempts: u32,
    ) -> Arc<Self> {
        let offline_flag = match flag_store.load_offline_flag().await {
            Ok(flag) => flag,
            Err(e) => {
                warn!(error = %e, "could not load persisted offline flag, assuming online");
                false
            }
        };
        if offline_flag {
            info!("offline mode restored from previous session");
        }

        Arc::new(Self {
            remote,
            flag_store,
            policy,
            max_attempts: max_attempts.max(1),
            state: Mutex::new(ConnectivityState {
                offline_flag,
                ..ConnectivityState::default()
            }),
            retry: Mutex::new(None),
        })
    }

    fn state(&self) -> MutexGuard<'_, ConnectivityState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn retry_slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.retry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Check remote reachability and update state.
    ///
    /// Network-class failures set the sticky flag at once. Other failures are
    /// retried in the background with backoff until `max_attempts` is reached,
    /// after which the flag becomes sticky.
    ///
    /// While the sticky flag is set nothing is pinged; only
    /// [`manual_reconnect`](Self::manual_reconnect) clears it.
    pub async fn probe(self: &Arc<Self>) -> bool {
        if self.remote.access() == RemoteAccess::Disabled {
            debug!("remote access disabled, staying offline");
            self.go_offline().await;
            return false;
        }
        if self.state().offline_flag {
            debug!("offline flag set, skipping probe");
            return false;
        }

        match self.remote.ping().await {
            Ok(()) => {
                {
                    let mut state = self.state();
                    // The flag may have been forced while the ping was in flight.
                    if state.offline_flag {
                        return false;
                    }
                    state.probe = ProbeState::Online;
                    state.reconnect_attempts = 0;
                }
                info!("remote store reachable");
                true
            }
            Err(e) if is_network_failure(&e) => {
                debug!(error = %e, "remote store unreachable, entering offline mode");
                self.go_offline().await;
                false
            }
            Err(e) => {
                let next_attempt = {
                    let mut state = self.state();
                    if state.offline_flag {
                        return false;
                    }
                    state.probe = ProbeState::Failed;
                    state.reconnect_attempts += 1;
                    if state.reconnect_attempts < self.max_attempts {
                        Some(state.reconnect_attempts)
                    } else {
                        state.offline_flag = true;
                        None
                    }
                };
                match next_attempt {
                    Some(attempt) => {
                        let delay = self.policy.delay(attempt);
                        warn!(
                            error = %e,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            "remote probe failed, retrying"
                        );
                        self.schedule_retry(delay);
                    }
                    None => {
                        warn!(
                            error = %e,
                            attempts = self.max_attempts,
                            "remote probe failed, giving up until manual reconnect"
                        );
                        self.persist_flag(true).await;
                    }
                }
                false
            }
        }
    }

    fn probe_boxed(self: Arc<Self>) -> Pin<Box<dyn Future<Output = bool> + Send>> {
        Box::pin(async move { self.probe().await })
    }

    fn schedule_retry(self: &Arc<Self>, delay: Duration) {
        let monitor = Arc::clone(self);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Detach our own handle so a rescheduled retry does not abort us.
            drop(monitor.retry_slot().take());
            monitor.probe_boxed().await;
        });
        if let Some(previous) = self.retry_slot().replace(handle) {
            previous.abort();
        }
    }

    /// Whether remote operations should be skipped for `caller`.
    pub fn is_offline(&self, caller: &Caller) -> bool {
        let state = self.state();
        if state.offline_flag || !caller.authenticated {
            return true;
        }
        if caller.remote_credentials {
            return false;
        }
        state.probe == ProbeState::Failed
    }

    /// Set the sticky flag after an operation proved the remote unusable.
    pub async fn force_offline(&self, cause: &DraftloomError) {
        warn!(error = %cause, "remote store unusable for this session, switching to local storage");
        self.go_offline().await;
    }

    async fn go_offline(&self) {
        if let Some(pending) = self.retry_slot().take() {
            pending.abort();
        }
        let changed = {
            let mut state = self.state();
            let changed = !state.offline_flag;
            state.probe = ProbeState::Failed;
            state.offline_flag = true;
            changed
        };
        if changed {
            self.persist_flag(true).await;
        }
    }

    /// Clear the flag and counter, then probe again.
    pub async fn manual_reconnect(self: &Arc<Self>) -> ReconnectOutcome {
        if self.remote.access() == RemoteAccess::Disabled {
            info!("reconnect requested but remote access is disabled here");
            return ReconnectOutcome::Disabled;
        }

        if let Some(pending) = self.retry_slot().take() {
            pending.abort();
        }
        {
            let mut state = self.state();
            state.probe = ProbeState::Pending;
            state.reconnect_attempts = 0;
            state.offline_flag = false;
        }
        self.persist_flag(false).await;

        if self.probe().await {
            ReconnectOutcome::Online
        } else {
            ReconnectOutcome::Offline
        }
    }

    pub fn snapshot(&self) -> ConnectivitySnapshot {
        let state = self.state();
        ConnectivitySnapshot {
            probe: state.probe,
            reconnect_attempts: state.reconnect_attempts,
            max_reconnect_attempts: self.max_attempts,
            offline_flag: state.offline_flag,
            remote_access: self.remote.access(),
        }
    }

    async fn persist_flag(&self, offline: bool) {
        if let Err(e) = self.flag_store.store_offline_flag(offline).await {
            warn!(error = %e, offline, "failed to persist offline flag");
        }
    }
}

fn is_network_failure(error: &DraftloomError) -> bool {
    match error {
        DraftloomError::Timeout { .. } | DraftloomError::RemoteAccessDisabled => true,
        other => other.remote_kind().is_some_and(|kind| kind.is_network()),
    }
}
