// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the Draftloom collaborator seams.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod backend;
pub mod flag;
pub mod store;

pub use adapter::PluginAdapter;
pub use backend::{GenerationBackend, ImageOutput, ImageParams, TextOutput, TextParams};
pub use flag::OfflineFlagStore;
pub use store::{RecordBackend, RemoteAccess, RemoteStore};
