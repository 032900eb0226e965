// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request -> backend -> parser -> persistence.
//!
//! Transient backend failures are absorbed by substituting a same-shaped
//! placeholder. Any other backend failure is returned and nothing is
//! persisted. Persistence failures never fail a generation; they are
//! reported in [`Persistence`].

use std::sync::Arc;

use draftloom_core::traits::TextOutput;
use draftloom_core::{
    Caller, ContentKind, DraftloomError, ErrorClass, GenerationBackend, GenerationRecord,
    GenerationRequest, GenerationResult, StorageLocation, now_iso,
};
use draftloom_parser::{REPORT_HEADINGS, parse_sectioned_report, parse_trend_items};
use tracing::{debug, info, warn};

use crate::fallback;
use crate::prompt;
use crate::records::GenerationRecordStore;

/// What happened to the result after generation.
#[derive(Debug)]
pub enum Persistence {
    /// The request asked not to persist.
    NotRequested,
    Stored(StorageLocation),
    /// Both stores refused; the result is still returned.
    Failed { error: DraftloomError },
}

/// The caller-facing outcome of [`GenerationOrchestrator::generate`].
#[derive(Debug)]
pub struct GenerationOutcome {
    /// Id of the record built for this generation.
    pub record_id: String,
    pub result: GenerationResult,
    /// True when the result is a local placeholder.
    pub substituted: bool,
    pub persistence: Persistence,
}

impl GenerationOutcome {
    pub fn saved_remotely(&self) -> bool {
        matches!(&self.persistence, Persistence::Stored(location) if location.saved_remotely())
    }

    pub fn location(&self) -> Option<&StorageLocation> {
        match &self.persistence {
            Persistence::Stored(location) => Some(location),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct GenerationOrchestrator {
    backend: Arc<dyn GenerationBackend>,
    records: Arc<GenerationRecordStore>,
}

impl GenerationOrchestrator {
    pub fn new(backend: Arc<dyn GenerationBackend>, records: Arc<GenerationRecordStore>) -> Self {
        Self { backend, records }
    }

    /// Generate content for `request` and persist it if asked.
    ///
    /// The work runs on its own task: a caller that stops waiting does not
    /// cancel the backend call or the queued save.
    pub async fn generate(
        &self,
        caller: &Caller,
        request: GenerationRequest,
    ) -> Result<GenerationOutcome, DraftloomError> {
        request.validate()?;
        let this = self.clone();
        let caller = caller.clone();
        tokio::spawn(async move { this.run(&caller, request).await })
            .await
            .map_err(|e| DraftloomError::Internal(format!("generation task failed: {e}")))?
    }

    async fn run(
        &self,
        caller: &Caller,
        request: GenerationRequest,
    ) -> Result<GenerationOutcome, DraftloomError> {
        let kind = request.content_kind;
        debug!(%kind, owner = %caller.user_id, "dispatching generation");

        let (result, substituted) = match self.produce(&request).await {
            Ok(result) => (result, false),
            Err(e) if e.class() == ErrorClass::Transient => {
                warn!(%kind, error = %e, "backend transiently unavailable, using placeholder");
                (fallback::placeholder(&request), true)
            }
            Err(e) => {
                warn!(%kind, error = %e, "generation failed");
                return Err(e);
            }
        };

        let record_id = uuid::Uuid::new_v4().to_string();
        let persistence = if request.persist {
            let record = GenerationRecord::new(
                record_id.clone(),
                caller.user_id.clone(),
                now_iso(),
                request,
                result.clone(),
            );
            match self.records.create(caller, &record).await {
                Ok(location) => {
                    info!(
                        record_id = %record_id,
                        remote = location.saved_remotely(),
                        "generation persisted"
                    );
                    Persistence::Stored(location)
                }
                Err(error) => {
                    warn!(record_id = %record_id, error = %error, "generation not persisted");
                    Persistence::Failed { error }
                }
            }
        } else {
            Persistence::NotRequested
        };

        Ok(GenerationOutcome {
            record_id,
            result,
            substituted,
            persistence,
        })
    }

    /// Call the backend for `request` and shape its output.
    async fn produce(&self, request: &GenerationRequest) -> Result<GenerationResult, DraftloomError> {
        match request.content_kind {
            ContentKind::Image => {
                let output = self
                    .backend
                    .generate_image(prompt::image_params(request))
                    .await?;
                Ok(GenerationResult::Image {
                    pixel_data: output.pixel_data,
                    mime_type: output.mime_type,
                })
            }
            ContentKind::Text => {
                let TextOutput { content, sources } = self
                    .backend
                    .generate_text(prompt::text_params(request))
                    .await?;
                Ok(GenerationResult::Text {
                    content,
                    grounding_sources: sources,
                })
            }
            ContentKind::Report => {
                let output = self
                    .backend
                    .generate_text(prompt::text_params(request))
                    .await?;
                Ok(GenerationResult::Report {
                    sections: parse_sectioned_report(&output.content, REPORT_HEADINGS, &output.sources),
                })
            }
            ContentKind::Trends => {
                let output = self
                    .backend
                    .generate_text(prompt::text_params(request))
                    .await?;
                Ok(parse_trend_items(
                    &output.content,
                    request.user_input.trim(),
                    &output.sources,
                ))
            }
        }
    }
}
