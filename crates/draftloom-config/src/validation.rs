// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes.

use crate::diagnostic::ConfigError;
use crate::model::DraftloomConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &DraftloomConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.app.guest_user_id.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "app.guest_user_id must not be empty".to_string(),
        });
    }

    if config.backend.text_model.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "backend.text_model must not be empty".to_string(),
        });
    }

    if config.backend.image_model.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "backend.image_model must not be empty".to_string(),
        });
    }

    if config.backend.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "backend.timeout_secs must be at least 1".to_string(),
        });
    }

    if config.remote.enabled && config.remote.base_url.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "remote.base_url must not be empty when remote.enabled = true".to_string(),
        });
    }

    if config.remote.collection.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "remote.collection must not be empty".to_string(),
        });
    }

    if config.connectivity.max_reconnect_attempts == 0 {
        errors.push(ConfigError::Validation {
            message: "connectivity.max_reconnect_attempts must be at least 1".to_string(),
        });
    }

    if config.connectivity.base_delay_ms > config.connectivity.max_delay_ms {
        errors.push(ConfigError::Validation {
            message: format!(
                "connectivity.base_delay_ms ({}) must not exceed connectivity.max_delay_ms ({})",
                config.connectivity.base_delay_ms, config.connectivity.max_delay_ms
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
