// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generation orchestration and resilient dual-store persistence.
//!
//! - [`GenerationOrchestrator`]: routes a request to the backend, absorbs
//!   transient failures with a placeholder, parses specialized output.
//! - [`PersistenceGateway`]: remote-first writes through the operation queue,
//!   degrading to the local store on connectivity failures.
//! - [`GenerationRecordStore`]: owner-checked history operations.
//! - [`ContentStudio`]: the caller-facing surface.

pub mod fallback;
pub mod gateway;
pub mod orchestrator;
pub mod prompt;
pub mod records;
pub mod studio;

pub use gateway::{Origin, PersistenceGateway};
pub use orchestrator::{GenerationOrchestrator, GenerationOutcome, Persistence};
pub use records::{GenerationRecordStore, MetadataUpdate};
pub use studio::{ContentStudio, StudioParts};
