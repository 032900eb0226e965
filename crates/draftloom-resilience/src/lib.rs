// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connectivity tracking, backoff, and write serialization for Draftloom.
//!
//! - [`BackoffPolicy`]: the single capped exponential backoff utility.
//! - [`ConnectivityMonitor`]: probe outcome, reconnect counter, sticky offline flag.
//! - [`OperationQueue`]: one-at-a-time lane for remote store writes.

pub mod backoff;
pub mod connectivity;
pub mod queue;

pub use backoff::BackoffPolicy;
pub use connectivity::{ConnectivityMonitor, ConnectivitySnapshot, ProbeState, ReconnectOutcome};
pub use queue::OperationQueue;
