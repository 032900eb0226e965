// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the generation API.
//!
//! Provides [`GeminiClient`] which handles authentication, JSON encoding,
//! retry of transient HTTP statuses, and conversion of API error bodies into
//! [`DraftloomError::Backend`] carrying the API's status name.

use std::time::Duration;

use draftloom_core::DraftloomError;
use draftloom_resilience::BackoffPolicy;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::types::ApiErrorResponse;

/// Status reported when the request never produced an HTTP response.
pub const TRANSPORT_STATUS: &str = "TRANSPORT";

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
    backoff: BackoffPolicy,
}

impl GeminiClient {
    pub fn new(
        api_key: &str,
        base_url: &str,
        timeout: Duration,
        max_retries: u32,
    ) -> Result<Self, DraftloomError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(api_key)
                .map_err(|e| DraftloomError::Config(format!("invalid API key header value: {e}")))?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| DraftloomError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries,
            backoff: BackoffPolicy::default(),
        })
    }

    /// Overrides the backoff between retries.
    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Pause before retry number `attempt` (1-based): the base delay first,
    /// doubling up to the ceiling.
    fn retry_delay(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt.saturating_sub(1))
    }

    /// POST `body` to `{base}/models/{model}:{method}` and decode the reply.
    ///
    /// Retries 429/500/503/529 up to `max_retries` times.
    pub async fn call<Req, Resp>(
        &self,
        model: &str,
        method: &str,
        body: &Req,
    ) -> Result<Resp, DraftloomError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = format!("{}/models/{model}:{method}", self.base_url);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.retry_delay(attempt);
                warn!(
                    attempt,
                    model,
                    method,
                    delay_ms = delay.as_millis() as u64,
                    "retrying request after transient error"
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&url)
                .json(body)
                .send()
                .await
                .map_err(|e| DraftloomError::backend(TRANSPORT_STATUS, e.to_string()))?;

            let status = response.status();
            debug!(status = %status, attempt, model, method, "generation response received");

            if status.is_success() {
                let text = response
                    .text()
                    .await
                    .map_err(|e| DraftloomError::backend(TRANSPORT_STATUS, e.to_string()))?;
                return serde_json::from_str(&text).map_err(|e| {
                    DraftloomError::backend("INVALID_RESPONSE", format!("failed to parse API response: {e}"))
                });
            }

            let body = response.text().await.unwrap_or_default();
            let error = api_error(status, &body);
            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, error = %error, "transient error, will retry");
                last_error = Some(error);
                continue;
            }
            return Err(error);
        }

        Err(last_error.unwrap_or_else(|| {
            DraftloomError::backend("UNKNOWN", "generation request failed after retries")
        }))
    }
}

/// Convert a non-success response into a backend error.
///
/// The API's status name (`UNAVAILABLE`, `RESOURCE_EXHAUSTED`, ...) is kept
/// when present; otherwise the HTTP status code stands in.
fn api_error(status: reqwest::StatusCode, body: &str) -> DraftloomError {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(parsed) => DraftloomError::backend(
            parsed
                .error
                .status
                .unwrap_or_else(|| status.as_u16().to_string()),
            parsed.error.message,
        ),
        Err(_) => DraftloomError::backend(status.as_u16().to_string(), body.to_string()),
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503 | 529)
}
