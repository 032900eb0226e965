// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gemini-style generation backend for Draftloom.
//!
//! Implements [`GenerationBackend`] over the `generateContent` endpoint for
//! text (optionally grounded in web search) and the `predict` endpoint for
//! images.

pub mod client;
pub mod types;

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use draftloom_config::model::BackendConfig;
use draftloom_core::traits::{ImageOutput, ImageParams, TextOutput, TextParams};
use draftloom_core::{
    AdapterType, DraftloomError, GenerationBackend, HealthStatus, PluginAdapter, Source,
};
use tracing::{debug, info};

use crate::client::GeminiClient;
use crate::types::{
    Content, GenerateContentRequest, GenerateContentResponse, GoogleSearch, PredictInstance,
    PredictParameters, PredictRequest, PredictResponse, Tool,
};

const DEFAULT_IMAGE_MIME: &str = "image/png";

/// Generation backend implementing [`GenerationBackend`].
///
/// API key resolution order: config -> `GEMINI_API_KEY` env var -> error.
pub struct GeminiBackend {
    client: GeminiClient,
    text_model: String,
    image_model: String,
}

impl GeminiBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, DraftloomError> {
        let api_key = resolve_api_key(&config.api_key)?;
        let client = GeminiClient::new(
            &api_key,
            &config.base_url,
            Duration::from_secs(config.timeout_secs),
            config.max_retries,
        )?;

        info!(
            text_model = %config.text_model,
            image_model = %config.image_model,
            "generation backend initialized"
        );

        Ok(Self::with_client(
            client,
            config.text_model.clone(),
            config.image_model.clone(),
        ))
    }

    /// Creates a backend around an existing client.
    pub fn with_client(client: GeminiClient, text_model: String, image_model: String) -> Self {
        Self {
            client,
            text_model,
            image_model,
        }
    }

    fn to_content_request(params: &TextParams) -> GenerateContentRequest {
        let tools = if params.grounded {
            vec![Tool {
                google_search: GoogleSearch::default(),
            }]
        } else {
            Vec::new()
        };
        GenerateContentRequest {
            contents: vec![Content::user(params.prompt.clone())],
            system_instruction: params.system_instruction.clone().map(Content::system),
            tools,
        }
    }
}

/// Flatten the first candidate into text plus deduplicated web sources.
fn to_text_output(response: GenerateContentResponse) -> Result<TextOutput, DraftloomError> {
    let candidate = response.candidates.into_iter().next().ok_or_else(|| {
        DraftloomError::backend("EMPTY_RESPONSE", "backend returned no candidates")
    })?;

    let content: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    let mut seen = HashSet::new();
    let sources = candidate
        .grounding_metadata
        .map(|m| m.grounding_chunks)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|chunk| chunk.web)
        .filter_map(|web| {
            let uri = web.uri?;
            let title = web.title.unwrap_or_else(|| uri.clone());
            Some(Source { title, uri })
        })
        .filter(|s| seen.insert(s.uri.clone()))
        .collect();

    Ok(TextOutput { content, sources })
}

#[async_trait]
impl PluginAdapter for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Backend
    }

    async fn health_check(&self) -> Result<HealthStatus, DraftloomError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), DraftloomError> {
        Ok(())
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    async fn generate_text(&self, params: TextParams) -> Result<TextOutput, DraftloomError> {
        let request = Self::to_content_request(&params);
        debug!(
            model = %self.text_model,
            grounded = params.grounded,
            variations = params.variations,
            "generating text"
        );
        let response: GenerateContentResponse = self
            .client
            .call(&self.text_model, "generateContent", &request)
            .await?;
        to_text_output(response)
    }

    async fn generate_image(&self, params: ImageParams) -> Result<ImageOutput, DraftloomError> {
        let request = PredictRequest {
            instances: vec![PredictInstance {
                prompt: params.prompt,
            }],
            parameters: PredictParameters {
                sample_count: 1,
                aspect_ratio: params.aspect_ratio,
                negative_prompt: params.negative_prompt,
            },
        };
        debug!(model = %self.image_model, "generating image");
        let response: PredictResponse = self
            .client
            .call(&self.image_model, "predict", &request)
            .await?;

        let prediction = response
            .predictions
            .into_iter()
            .find(|p| p.bytes_base64_encoded.is_some())
            .ok_or_else(|| DraftloomError::backend("EMPTY_RESPONSE", "backend returned no image"))?;

        Ok(ImageOutput {
            pixel_data: prediction.bytes_base64_encoded.unwrap_or_default(),
            mime_type: prediction
                .mime_type
                .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string()),
        })
    }
}

/// Resolves the API key from config or the `GEMINI_API_KEY` environment variable.
fn resolve_api_key(config_key: &Option<String>) -> Result<String, DraftloomError> {
    if let Some(key) = config_key.as_ref().filter(|k| !k.is_empty()) {
        return Ok(key.clone());
    }

    std::env::var("GEMINI_API_KEY").map_err(|_| {
        DraftloomError::Config(
            "backend API key not found. Set backend.api_key in config or GEMINI_API_KEY environment variable.".into(),
        )
    })
}

#[cfg(test)]
mod tests {
    use draftloom_core::ErrorClass;
    use draftloom_resilience::BackoffPolicy;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn backend_for(server: &MockServer, max_retries: u32) -> GeminiBackend {
        let client = GeminiClient::new("k", &server.uri(), Duration::from_secs(5), max_retries)
            .unwrap()
            .with_backoff(BackoffPolicy::new(
                Duration::from_millis(1),
                Duration::from_millis(1),
            ));
        GeminiBackend::with_client(client, "text-m".into(), "image-m".into())
    }

    fn text_params(grounded: bool) -> TextParams {
        TextParams {
            prompt: "write a hook".into(),
            system_instruction: Some("be brief".into()),
            grounded,
            variations: 1,
        }
    }

    #[test]
    fn resolve_api_key_from_config() {
        assert_eq!(resolve_api_key(&Some("abc".into())).unwrap(), "abc");
    }

    #[test]
    fn resolve_api_key_empty_config_falls_back_to_env() {
        let result = resolve_api_key(&Some(String::new()));
        // Depends on GEMINI_API_KEY in the test environment.
        match result {
            Ok(key) => assert!(!key.is_empty()),
            Err(e) => assert!(e.to_string().contains("API key not found")),
        }
    }

    #[test]
    fn grounded_request_declares_search_tool() {
        let request = GeminiBackend::to_content_request(&text_params(true));
        let json = serde_json::to_value(&request).unwrap();
        assert!(json["tools"][0].get("googleSearch").is_some());
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "be brief");

        let plain = serde_json::to_value(GeminiBackend::to_content_request(&text_params(false)))
            .unwrap();
        assert!(plain.get("tools").is_none());
    }

    #[tokio::test]
    async fn generate_text_joins_parts_and_dedupes_sources() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/text-m:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "Hello "}, {"text": "world"}]},
                    "groundingMetadata": {"groundingChunks": [
                        {"web": {"uri": "https://a.example", "title": "A"}},
                        {"web": {"uri": "https://a.example", "title": "A again"}},
                        {"web": {"uri": "https://b.example"}},
                        {}
                    ]}
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let out = backend_for(&server, 0)
            .generate_text(text_params(true))
            .await
            .unwrap();
        assert_eq!(out.content, "Hello world");
        assert_eq!(out.sources.len(), 2);
        assert_eq!(out.sources[0].title, "A");
        assert_eq!(out.sources[1].title, "https://b.example");
    }

    #[tokio::test]
    async fn no_candidates_is_a_backend_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let err = backend_for(&server, 0)
            .generate_text(text_params(false))
            .await
            .unwrap_err();
        assert!(matches!(err, DraftloomError::Backend { ref status, .. } if status == "EMPTY_RESPONSE"));
    }

    #[tokio::test]
    async fn generate_text_retries_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "ok"}]}}]
            })))
            .mount(&server)
            .await;

        let out = backend_for(&server, 1)
            .generate_text(text_params(false))
            .await
            .unwrap();
        assert_eq!(out.content, "ok");
    }

    #[tokio::test]
    async fn unavailable_body_classifies_transient() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({
                "error": {"code": 503, "message": "try later", "status": "UNAVAILABLE"}
            })))
            .mount(&server)
            .await;

        let err = backend_for(&server, 0)
            .generate_text(text_params(false))
            .await
            .unwrap_err();
        assert_eq!(err.class(), ErrorClass::Transient);
    }

    #[tokio::test]
    async fn generate_image_returns_first_prediction() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/image-m:predict"))
            .and(body_partial_json(serde_json::json!({
                "parameters": {"sampleCount": 1, "aspectRatio": "16:9"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "predictions": [{"bytesBase64Encoded": "aGVsbG8="}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let out = backend_for(&server, 0)
            .generate_image(ImageParams {
                prompt: "a lighthouse".into(),
                aspect_ratio: Some("16:9".into()),
                negative_prompt: None,
            })
            .await
            .unwrap();
        assert_eq!(out.pixel_data, "aGVsbG8=");
        assert_eq!(out.mime_type, "image/png");
    }
}
