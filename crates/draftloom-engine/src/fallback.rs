// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic local stand-ins used when the backend is transiently
//! unavailable.
//!
//! Each placeholder has the same [`GenerationResult`] variant the request
//! would have produced, so persistence and display never special-case a
//! missing result.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use draftloom_core::{ContentKind, GenerationRequest, GenerationResult, ReportSection};
use draftloom_parser::REPORT_HEADINGS;

/// A 1x1 transparent PNG.
const PLACEHOLDER_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

const BUSY_NOTE: &str = "The generation service is busy, so this is a placeholder. Try again shortly.";

/// Build the placeholder for `request`.
pub fn placeholder(request: &GenerationRequest) -> GenerationResult {
    let topic = request.user_input.trim();
    match request.content_kind {
        ContentKind::Text => GenerationResult::Text {
            content: text_placeholder(request, topic),
            grounding_sources: Vec::new(),
        },
        ContentKind::Image => GenerationResult::Image {
            pixel_data: STANDARD.encode(PLACEHOLDER_PNG),
            mime_type: "image/png".to_string(),
        },
        ContentKind::Report => GenerationResult::Report {
            sections: REPORT_HEADINGS
                .iter()
                .enumerate()
                .map(|(i, heading)| ReportSection {
                    title: heading.title.to_string(),
                    content: if i == 0 {
                        format!("Analysis of \"{topic}\" is pending. {BUSY_NOTE}")
                    } else {
                        String::new()
                    },
                    ideas: Vec::new(),
                    sources: Vec::new(),
                })
                .collect(),
        },
        ContentKind::Trends => GenerationResult::Trends {
            query: topic.to_string(),
            items: Vec::new(),
            sources: Vec::new(),
        },
    }
}

fn text_placeholder(request: &GenerationRequest, topic: &str) -> String {
    let platform = if request.platform_context.is_empty() {
        "your channel"
    } else {
        request.platform_context.as_str()
    };
    let drafts: Vec<String> = (1..=request.variations())
        .map(|n| format!("Draft {n}: {topic} for {platform}."))
        .collect();
    format!("{}\n\n{BUSY_NOTE}", drafts.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_matches_requested_variant() {
        for kind in [
            ContentKind::Text,
            ContentKind::Image,
            ContentKind::Report,
            ContentKind::Trends,
        ] {
            let request = GenerationRequest::new(kind, "spring menu", "Instagram");
            assert_eq!(placeholder(&request).kind(), kind);
        }
    }

    #[test]
    fn text_placeholder_is_non_empty_and_deterministic() {
        let mut request = GenerationRequest::new(ContentKind::Text, "x", "");
        request.batch_count = Some(2);
        let first = placeholder(&request);
        assert_eq!(first, placeholder(&request));
        match first {
            GenerationResult::Text { content, .. } => {
                assert!(content.contains("Draft 2: x for your channel."));
            }
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn image_placeholder_is_a_png() {
        let GenerationResult::Image { pixel_data, .. } =
            placeholder(&GenerationRequest::new(ContentKind::Image, "x", "y"))
        else {
            panic!("expected image");
        };
        let bytes = STANDARD.decode(pixel_data).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    fn report_placeholder_has_every_heading() {
        let GenerationResult::Report { sections } =
            placeholder(&GenerationRequest::new(ContentKind::Report, "x", "y"))
        else {
            panic!("expected report");
        };
        assert_eq!(sections.len(), REPORT_HEADINGS.len());
        assert!(!sections[0].content.is_empty());
    }
}
