// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./draftloom.toml` > `~/.config/draftloom/draftloom.toml`
//! > `/etc/draftloom/draftloom.toml`, with `DRAFTLOOM_` environment overrides.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::DraftloomConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/draftloom/draftloom.toml`
/// 3. `~/.config/draftloom/draftloom.toml`
/// 4. `./draftloom.toml`
/// 5. `DRAFTLOOM_*` environment variables
pub fn load_config() -> Result<DraftloomConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<DraftloomConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DraftloomConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<DraftloomConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DraftloomConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(DraftloomConfig::default()))
        .merge(Toml::file("/etc/draftloom/draftloom.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("draftloom/draftloom.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("draftloom.toml"))
        .merge(env_provider())
}

/// Environment provider with explicit section mapping.
///
/// `Env::split("_")` would turn `DRAFTLOOM_REMOTE_API_TOKEN` into
/// `remote.api.token`; only the first underscore after the section name
/// is a separator.
fn env_provider() -> Env {
    Env::prefixed("DRAFTLOOM_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("app_", "app.", 1)
            .replacen("backend_", "backend.", 1)
            .replacen("remote_", "remote.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("connectivity_", "connectivity.", 1);
        mapped.into()
    })
}
