// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence for the sticky offline flag.

use async_trait::async_trait;

use crate::error::DraftloomError;

/// Durable home for the sticky offline flag, so it survives restarts.
#[async_trait]
pub trait OfflineFlagStore: Send + Sync + 'static {
    /// Load the persisted flag. Missing state reads as `false`.
    async fn load_offline_flag(&self) -> Result<bool, DraftloomError>;

    /// Persist the flag.
    async fn store_offline_flag(&self, offline: bool) -> Result<(), DraftloomError>;
}
