// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delimited trend blocks into a [`GenerationResult::Trends`].
//!
//! The backend is asked to emit one block per trend:
//!
//! ```text
//! --- Trend Item Start ---
//! Title: ...
//! Snippet: ...
//! Source Type: news | discussion | topic | video
//! Link: ...            (optional)
//! --- Trend Item End ---
//! ```

use std::str::FromStr;
use std::sync::LazyLock;

use draftloom_core::{GenerationResult, Source, TrendItem, TrendSourceType};
use regex::Regex;
use tracing::{debug, warn};

use crate::preview;

pub const TREND_ITEM_START: &str = "--- Trend Item Start ---";
pub const TREND_ITEM_END: &str = "--- Trend Item End ---";

static FIELDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)Title:\s*(?P<title>.*?)\s*Snippet:\s*(?P<snippet>.*?)\s*Source Type:\s*(?P<source>[a-z]+)(?:\s*Link:\s*(?P<link>\S+))?",
    )
    .unwrap()
});

/// Parse every well-formed trend block in `raw`.
///
/// Blocks missing their end marker, a field, or a known source type are
/// skipped.
pub fn parse_trend_items(raw: &str, query: &str, sources: &[Source]) -> GenerationResult {
    let items = extract_items(raw);
    if items.is_empty() && !raw.trim().is_empty() {
        warn!(raw = preview(raw), "no well-formed trend items in output");
    }
    GenerationResult::Trends {
        query: query.to_string(),
        items,
        sources: sources.to_vec(),
    }
}

pub(crate) fn extract_items(raw: &str) -> Vec<TrendItem> {
    raw.split(TREND_ITEM_START)
        .skip(1)
        .filter_map(|chunk| match chunk.split_once(TREND_ITEM_END) {
            Some((block, _)) => parse_block(block),
            None => {
                debug!("trend block without end marker skipped");
                None
            }
        })
        .collect()
}

fn parse_block(block: &str) -> Option<TrendItem> {
    let caps = FIELDS.captures(block)?;
    let title = caps.name("title")?.as_str().trim();
    let snippet = caps.name("snippet")?.as_str().trim();
    if title.is_empty() {
        return None;
    }
    let source_type = TrendSourceType::from_str(caps.name("source")?.as_str()).ok()?;
    let link = caps
        .name("link")
        .map(|m| m.as_str().trim())
        .filter(|l| !l.is_empty() && !l.eq_ignore_ascii_case("n/a") && !l.eq_ignore_ascii_case("none"))
        .map(str::to_string);

    Some(TrendItem {
        title: title.to_string(),
        snippet: snippet.to_string(),
        source_type,
        link,
    })
}
