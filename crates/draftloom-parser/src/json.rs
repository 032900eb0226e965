// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON that may arrive wrapped in a markdown code fence.

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::preview;

const FENCE: &str = "```";

/// Strip one leading and trailing code fence (with optional language tag).
///
/// Text without a leading fence is returned trimmed and otherwise untouched.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix(FENCE) else {
        return trimmed;
    };
    let body = match rest.split_once('\n') {
        Some((tag, body))
            if tag
                .trim()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') =>
        {
            body
        }
        _ => rest,
    };
    let body = body.trim_end();
    body.strip_suffix(FENCE).unwrap_or(body).trim()
}

/// Parse `raw` as `T`, returning `None` (and logging the input) on failure.
pub fn parse_json<T: DeserializeOwned>(raw: &str) -> Option<T> {
    match serde_json::from_str(strip_code_fence(raw)) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(error = %e, raw = preview(raw), "generated output is not valid JSON");
            None
        }
    }
}
