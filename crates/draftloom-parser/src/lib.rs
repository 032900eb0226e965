// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Output parsers for raw backend text.
//!
//! Every parser is total: malformed input yields `None`, an empty list, or a
//! fallback-shaped structure, and is logged at `warn` for diagnosis. Nothing
//! here returns an error or panics.

pub mod json;
pub mod report;
pub mod trends;

pub use json::{parse_json, strip_code_fence};
pub use report::{GENERAL_ANALYSIS, Heading, REPORT_HEADINGS, parse_sectioned_report};
pub use trends::{TREND_ITEM_END, TREND_ITEM_START, parse_trend_items};

/// Longest prefix of raw input included in diagnostic logs.
const LOG_PREVIEW_CHARS: usize = 500;

/// Truncate `raw` on a char boundary for logging.
pub(crate) fn preview(raw: &str) -> &str {
    match raw.char_indices().nth(LOG_PREVIEW_CHARS) {
        Some((idx, _)) => &raw[..idx],
        None => raw,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn preview_respects_char_boundaries() {
        let raw = "é".repeat(LOG_PREVIEW_CHARS + 10);
        assert_eq!(preview(&raw).chars().count(), LOG_PREVIEW_CHARS);
        assert_eq!(preview("short"), "short");
    }

    proptest! {
        #[test]
        fn parsers_never_panic(raw in "\\PC*") {
            let _ = parse_json::<serde_json::Value>(&raw);
            let _ = parse_sectioned_report(&raw, REPORT_HEADINGS, &[]);
            let _ = parse_trend_items(&raw, "q", &[]);
        }

        #[test]
        fn trend_parser_never_panics_on_marker_soup(
            parts in proptest::collection::vec(
                prop_oneof![
                    Just(TREND_ITEM_START.to_string()),
                    Just(TREND_ITEM_END.to_string()),
                    Just("Title: t".to_string()),
                    Just("Snippet: s".to_string()),
                    Just("Source Type: news".to_string()),
                    "[a-z ]{0,8}",
                ],
                0..20,
            )
        ) {
            let raw = parts.join("\n");
            let items = trends::extract_items(&raw);
            prop_assert!(items.len() <= parts.len());
        }
    }
}
