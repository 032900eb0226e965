// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Draftloom configuration.
///
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DraftloomConfig {
    /// Application identity and logging.
    #[serde(default)]
    pub app: AppConfig,

    /// Generation backend settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Remote document store settings.
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Local fallback store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Reconnect backoff and write serialization settings.
    #[serde(default)]
    pub connectivity: ConnectivityConfig,
}

/// Application identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Display name of the application.
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Owner id used for records created by unauthenticated callers.
    #[serde(default = "default_guest_user_id")]
    pub guest_user_id: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
            guest_user_id: default_guest_user_id(),
        }
    }
}

fn default_app_name() -> String {
    "draftloom".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_guest_user_id() -> String {
    "guest".to_string()
}

/// Generation backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// API key. `None` requires the environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the generation API.
    #[serde(default = "default_backend_base_url")]
    pub base_url: String,

    /// Model used for text, report, and trend generation.
    #[serde(default = "default_text_model")]
    pub text_model: String,

    /// Model used for image generation.
    #[serde(default = "default_image_model")]
    pub image_model: String,

    /// Retries on transient HTTP statuses before surfacing the error.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Per-request timeout in seconds.
    #[serde(default = "default_backend_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_backend_base_url(),
            text_model: default_text_model(),
            image_model: default_image_model(),
            max_retries: default_max_retries(),
            timeout_secs: default_backend_timeout_secs(),
        }
    }
}

fn default_backend_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_text_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_image_model() -> String {
    "imagen-4.0-generate-001".to_string()
}

fn default_max_retries() -> u32 {
    1
}

fn default_backend_timeout_secs() -> u64 {
    120
}

/// Remote document store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteConfig {
    /// `false` means remote access is structurally unavailable here.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Base URL of the document store API.
    #[serde(default = "default_remote_base_url")]
    pub base_url: String,

    /// Bearer token presented to the store.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Collection holding generation records.
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_remote_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_remote_base_url(),
            api_token: None,
            collection: default_collection(),
            timeout_secs: default_remote_timeout_secs(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_remote_base_url() -> String {
    "http://127.0.0.1:8787/v1".to_string()
}

fn default_collection() -> String {
    "generations".to_string()
}

fn default_remote_timeout_secs() -> u64 {
    15
}

/// Local fallback store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: true,
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("draftloom").join("draftloom.db"))
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "draftloom.db".to_string())
}

/// Reconnect backoff and write serialization configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectivityConfig {
    /// Probe failures tolerated before the offline flag becomes sticky.
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,

    /// Base delay for exponential backoff, in milliseconds.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Backoff ceiling, in milliseconds.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Pause between consecutive queued remote writes, in milliseconds.
    #[serde(default = "default_queue_spacing_ms")]
    pub queue_spacing_ms: u64,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            max_reconnect_attempts: default_max_reconnect_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            queue_spacing_ms: default_queue_spacing_ms(),
        }
    }
}

impl ConnectivityConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    pub fn queue_spacing(&self) -> Duration {
        Duration::from_millis(self.queue_spacing_ms)
    }
}

fn default_max_reconnect_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    10_000
}

fn default_queue_spacing_ms() -> u64 {
    10
}
