// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generation backend trait for text and image models.

use async_trait::async_trait;

use crate::error::DraftloomError;
use crate::traits::adapter::PluginAdapter;
use crate::types::Source;

/// Parameters for a text generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextParams {
    /// Fully assembled prompt.
    pub prompt: String,
    /// Optional system instruction.
    pub system_instruction: Option<String>,
    /// Ask the backend to ground the answer in web search results.
    pub grounded: bool,
    /// Number of variations the prompt asks for.
    pub variations: u32,
}

/// Raw text returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextOutput {
    pub content: String,
    pub sources: Vec<Source>,
}

/// Parameters for an image generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageParams {
    pub prompt: String,
    pub aspect_ratio: Option<String>,
    pub negative_prompt: Option<String>,
}

/// Image bytes returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageOutput {
    /// Base64-encoded pixel data.
    pub pixel_data: String,
    pub mime_type: String,
}

/// Adapter for the external generative backend.
///
/// Failures are reported as [`DraftloomError::Backend`] carrying the
/// backend's machine-readable status so the pipeline can classify them.
#[async_trait]
pub trait GenerationBackend: PluginAdapter {
    /// Generate text for a prompt.
    async fn generate_text(&self, params: TextParams) -> Result<TextOutput, DraftloomError>;

    /// Generate a single image for a prompt.
    async fn generate_image(&self, params: ImageParams) -> Result<ImageOutput, DraftloomError>;
}
