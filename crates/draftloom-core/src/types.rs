// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across adapter traits and the generation pipeline.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::DraftloomError;

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Backend,
    RemoteStore,
    LocalStore,
}

/// What the caller wants generated.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ContentKind {
    /// Free-form text content.
    Text,
    /// A single generated image.
    Image,
    /// A sectioned analysis report.
    Report,
    /// A list of trend items for a query.
    Trends,
}

impl ContentKind {
    /// Specialized kinds run their raw backend text through an output parser.
    pub fn is_specialized(&self) -> bool {
        matches!(self, ContentKind::Report | ContentKind::Trends)
    }
}

/// Reference to a persona the content should be written as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaRef {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
}

/// Image-specific guidance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageGuidance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
}

/// An immutable generation request, constructed by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub user_input: String,
    pub content_kind: ContentKind,
    pub platform_context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<PersonaRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageGuidance>,
    /// Whether the result should be persisted after generation.
    #[serde(default = "default_persist")]
    pub persist: bool,
}

fn default_persist() -> bool {
    true
}

impl GenerationRequest {
    /// Create a request with only the required fields set.
    pub fn new(
        content_kind: ContentKind,
        user_input: impl Into<String>,
        platform_context: impl Into<String>,
    ) -> Self {
        Self {
            user_input: user_input.into(),
            content_kind,
            platform_context: platform_context.into(),
            audience: None,
            batch_count: None,
            persona: None,
            language: None,
            image: None,
            persist: true,
        }
    }

    /// Check the request's own invariants.
    pub fn validate(&self) -> Result<(), DraftloomError> {
        if self.user_input.trim().is_empty() {
            return Err(DraftloomError::Validation(
                "user_input must not be empty".into(),
            ));
        }
        if self.batch_count == Some(0) {
            return Err(DraftloomError::Validation(
                "batch_count must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Number of variations requested, defaulting to one.
    pub fn variations(&self) -> u32 {
        self.batch_count.unwrap_or(1).max(1)
    }
}

/// An external source backing generated content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub uri: String,
}

/// One titled section of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSection {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ideas: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Source>,
}

/// Where a trend item was observed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TrendSourceType {
    News,
    Discussion,
    Topic,
    Video,
}

/// A single trend item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendItem {
    pub title: String,
    pub snippet: String,
    pub source_type: TrendSourceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// The typed outcome of a generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GenerationResult {
    Text {
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        grounding_sources: Vec<Source>,
    },
    Image {
        /// Base64-encoded pixel data as delivered by the backend.
        pixel_data: String,
        mime_type: String,
    },
    Report {
        sections: Vec<ReportSection>,
    },
    Trends {
        query: String,
        items: Vec<TrendItem>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        sources: Vec<Source>,
    },
}

impl GenerationResult {
    /// The content kind this result variant answers.
    pub fn kind(&self) -> ContentKind {
        match self {
            GenerationResult::Text { .. } => ContentKind::Text,
            GenerationResult::Image { .. } => ContentKind::Image,
            GenerationResult::Report { .. } => ContentKind::Report,
            GenerationResult::Trends { .. } => ContentKind::Trends,
        }
    }
}

/// A thumbs-down / neutral / thumbs-up rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Rating {
    Negative,
    Neutral,
    Positive,
}

impl TryFrom<i8> for Rating {
    type Error = DraftloomError;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Rating::Negative),
            0 => Ok(Rating::Neutral),
            1 => Ok(Rating::Positive),
            other => Err(DraftloomError::Validation(format!(
                "rating must be -1, 0 or 1, got {other}"
            ))),
        }
    }
}

impl From<Rating> for i8 {
    fn from(rating: Rating) -> Self {
        match rating {
            Rating::Negative => -1,
            Rating::Neutral => 0,
            Rating::Positive => 1,
        }
    }
}

/// Caller feedback on a generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub rating: Rating,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// ISO 8601 timestamp of the rating.
    pub rated_at: String,
}

/// A persisted generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub id: String,
    pub owner_id: String,
    /// ISO 8601 creation timestamp.
    pub created_at: String,
    pub request: GenerationRequest,
    pub result: GenerationResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Feedback>,
    #[serde(default)]
    pub access_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_accessed_at: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub exported_formats: Vec<String>,
}

impl GenerationRecord {
    /// Build a fresh record for a completed generation.
    pub fn new(
        id: String,
        owner_id: String,
        created_at: String,
        request: GenerationRequest,
        result: GenerationResult,
    ) -> Self {
        Self {
            id,
            owner_id,
            created_at,
            request,
            result,
            remote_ref: None,
            local_ref: None,
            feedback: None,
            access_count: 0,
            last_accessed_at: None,
            tags: Vec::new(),
            is_favorite: false,
            is_archived: false,
            exported_formats: Vec::new(),
        }
    }

    /// The content kind of the stored result.
    pub fn kind(&self) -> ContentKind {
        self.request.content_kind
    }
}

/// Filter, order, and limit for record listings. Results are newest-first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordQuery {
    pub owner_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ContentKind>,
    #[serde(default)]
    pub favorites_only: bool,
    #[serde(default)]
    pub include_archived: bool,
    pub limit: usize,
}

impl RecordQuery {
    /// All non-archived records for an owner.
    pub fn for_owner(owner_id: impl Into<String>, limit: usize) -> Self {
        Self {
            owner_id: owner_id.into(),
            kind: None,
            favorites_only: false,
            include_archived: false,
            limit,
        }
    }

    /// Returns true if `record` satisfies the filters (ignoring the limit).
    pub fn matches(&self, record: &GenerationRecord) -> bool {
        record.owner_id == self.owner_id
            && self.kind.is_none_or(|k| record.kind() == k)
            && (!self.favorites_only || record.is_favorite)
            && (self.include_archived || !record.is_archived)
    }
}

/// Which store holds a persisted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageLocation {
    /// Written to the primary remote store.
    Remote(String),
    /// Degraded to the local fallback store.
    Local(String),
}

impl StorageLocation {
    pub fn saved_remotely(&self) -> bool {
        matches!(self, StorageLocation::Remote(_))
    }

    /// The store-specific reference.
    pub fn reference(&self) -> &str {
        match self {
            StorageLocation::Remote(r) | StorageLocation::Local(r) => r,
        }
    }
}

/// Who is making a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub authenticated: bool,
    /// The session holds credentials the remote store accepts.
    pub remote_credentials: bool,
}

impl Caller {
    /// An authenticated caller with valid remote credentials.
    pub fn authenticated(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            authenticated: true,
            remote_credentials: true,
        }
    }

    /// An unauthenticated caller; records are kept locally under `guest_id`.
    pub fn guest(guest_id: impl Into<String>) -> Self {
        Self {
            user_id: guest_id.into(),
            authenticated: false,
            remote_credentials: false,
        }
    }
}
