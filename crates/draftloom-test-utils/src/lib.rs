// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Draftloom integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic tests without external services.
//!
//! # Components
//!
//! - [`MockBackend`] - generation backend with scripted replies
//! - [`MockRemoteStore`] - in-memory remote store with call counters and failure injection
//! - [`TestHarness`] - mocks plus a temp SQLite fallback store and connectivity monitor

pub mod harness;
pub mod mock_backend;
pub mod mock_remote;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_backend::{MockBackend, MockReply};
pub use mock_remote::MockRemoteStore;
