// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock generation backend for deterministic testing.
//!
//! Replies are popped from a FIFO queue. When the queue is empty, a default
//! text or image is returned.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use draftloom_core::traits::{ImageOutput, ImageParams, TextOutput, TextParams};
use draftloom_core::{
    AdapterType, DraftloomError, GenerationBackend, HealthStatus, PluginAdapter, Source,
};

/// Base64 of "mock image".
pub const MOCK_PIXEL_DATA: &str = "bW9jayBpbWFnZQ==";

/// One scripted backend reply.
#[derive(Debug)]
pub enum MockReply {
    Text {
        content: String,
        sources: Vec<Source>,
    },
    Image {
        pixel_data: String,
        mime_type: String,
    },
    Fail(DraftloomError),
}

impl MockReply {
    pub fn text(content: impl Into<String>) -> Self {
        MockReply::Text {
            content: content.into(),
            sources: Vec::new(),
        }
    }

    /// A backend error with a machine-readable status.
    pub fn fail(status: &str, message: &str) -> Self {
        MockReply::Fail(DraftloomError::backend(status, message))
    }
}

/// A generation backend that returns pre-configured replies.
#[derive(Default)]
pub struct MockBackend {
    replies: Mutex<VecDeque<MockReply>>,
    delay: Option<Duration>,
    text_calls: AtomicUsize,
    image_calls: AtomicUsize,
    last_text: Mutex<Option<TextParams>>,
    last_image: Mutex<Option<ImageParams>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from(replies)),
            ..Self::default()
        }
    }

    /// Sleep before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push(&self, reply: MockReply) {
        lock(&self.replies).push_back(reply);
    }

    pub fn text_calls(&self) -> usize {
        self.text_calls.load(Ordering::SeqCst)
    }

    pub fn image_calls(&self) -> usize {
        self.image_calls.load(Ordering::SeqCst)
    }

    pub fn last_text_params(&self) -> Option<TextParams> {
        lock(&self.last_text).clone()
    }

    pub fn last_image_params(&self) -> Option<ImageParams> {
        lock(&self.last_image).clone()
    }

    async fn next_reply(&self) -> Option<MockReply> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        lock(&self.replies).pop_front()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl PluginAdapter for MockBackend {
    fn name(&self) -> &str {
        "mock-backend"
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
impl GenerationBackend for MockBackend {
    async fn generate_text(&self, params: TextParams) -> Result<TextOutput, DraftloomError> {
        self.text_calls.fetch_add(1, Ordering::SeqCst);
        *lock(&self.last_text) = Some(params);
        match self.next_reply().await {
            None => Ok(TextOutput {
                content: "mock response".to_string(),
                sources: Vec::new(),
            }),
            Some(MockReply::Text { content, sources }) => Ok(TextOutput { content, sources }),
            Some(MockReply::Fail(e)) => Err(e),
            Some(MockReply::Image { .. }) => Err(DraftloomError::Internal(
                "mock backend scripted an image for a text call".to_string(),
            )),
        }
    }

    async fn generate_image(&self, params: ImageParams) -> Result<ImageOutput, DraftloomError> {
        self.image_calls.fetch_add(1, Ordering::SeqCst);
        *lock(&self.last_image) = Some(params);
        match self.next_reply().await {
            None => Ok(ImageOutput {
                pixel_data: MOCK_PIXEL_DATA.to_string(),
                mime_type: "image/png".to_string(),
            }),
            Some(MockReply::Image {
                pixel_data,
                mime_type,
            }) => Ok(ImageOutput {
                pixel_data,
                mime_type,
            }),
            Some(MockReply::Fail(e)) => Err(e),
            Some(MockReply::Text { .. }) => Err(DraftloomError::Internal(
                "mock backend scripted text for an image call".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> TextParams {
        TextParams {
            prompt: "p".into(),
            system_instruction: None,
            grounded: false,
            variations: 1,
        }
    }

    #[tokio::test]
    async fn replies_are_fifo_then_default() {
        let backend = MockBackend::with_replies(vec![
            MockReply::text("first"),
            MockReply::fail("UNAVAILABLE", "busy"),
        ]);
        assert_eq!(backend.generate_text(params()).await.unwrap().content, "first");
        assert!(backend.generate_text(params()).await.is_err());
        assert_eq!(
            backend.generate_text(params()).await.unwrap().content,
            "mock response"
        );
        assert_eq!(backend.text_calls(), 3);
        assert_eq!(backend.last_text_params().unwrap().prompt, "p");
    }
}
