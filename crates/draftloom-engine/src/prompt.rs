// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request fields into backend call parameters.
//!
//! Deterministic: the same request always yields the same parameters.

use std::fmt::Write;

use draftloom_core::traits::{ImageParams, TextParams};
use draftloom_core::{ContentKind, GenerationRequest};
use draftloom_parser::{REPORT_HEADINGS, TREND_ITEM_END, TREND_ITEM_START};

/// Parameters for a text, report, or trends request.
pub fn text_params(request: &GenerationRequest) -> TextParams {
    let mut prompt = context_lines(request);
    match request.content_kind {
        ContentKind::Report => push_report_format(&mut prompt),
        ContentKind::Trends => push_trend_format(&mut prompt),
        ContentKind::Text | ContentKind::Image => {
            let variations = request.variations();
            if variations > 1 {
                let _ = writeln!(prompt, "Produce {variations} distinct variations.");
            }
        }
    }
    let _ = write!(prompt, "\nRequest: {}", request.user_input.trim());

    TextParams {
        prompt,
        system_instruction: persona_instruction(request),
        grounded: request.content_kind.is_specialized(),
        variations: request.variations(),
    }
}

/// Parameters for an image request.
pub fn image_params(request: &GenerationRequest) -> ImageParams {
    let guidance = request.image.clone().unwrap_or_default();
    let mut prompt = request.user_input.trim().to_string();
    if !request.platform_context.is_empty() {
        let _ = write!(prompt, ". Styled for {}", request.platform_context);
    }
    ImageParams {
        prompt,
        aspect_ratio: guidance.aspect_ratio,
        negative_prompt: guidance.negative_prompt,
    }
}

fn context_lines(request: &GenerationRequest) -> String {
    let mut out = String::new();
    if !request.platform_context.is_empty() {
        let _ = writeln!(out, "Platform: {}", request.platform_context);
    }
    if let Some(audience) = &request.audience {
        let _ = writeln!(out, "Audience: {audience}");
    }
    if let Some(language) = &request.language {
        let _ = writeln!(out, "Language: {language}");
    }
    out
}

fn persona_instruction(request: &GenerationRequest) -> Option<String> {
    request.persona.as_ref().map(|persona| match &persona.voice {
        Some(voice) => format!("Write as {}. Voice: {voice}", persona.name),
        None => format!("Write as {}.", persona.name),
    })
}

fn push_report_format(prompt: &mut String) {
    prompt.push_str("Structure the answer under these headings, in order:\n");
    for heading in REPORT_HEADINGS {
        let _ = writeln!(prompt, "## {}", heading.title);
        if let Some(prefix) = heading.idea_prefix {
            let _ = writeln!(prompt, "  (one bullet per item, starting with \"{prefix}\")");
        }
    }
}

fn push_trend_format(prompt: &mut String) {
    let _ = writeln!(
        prompt,
        "List each trend as a block:\n{TREND_ITEM_START}\nTitle: ...\nSnippet: ...\nSource Type: news|discussion|topic|video\nLink: ...\n{TREND_ITEM_END}"
    );
}

#[cfg(test)]
mod tests {
    use draftloom_core::{ImageGuidance, PersonaRef};

    use super::*;

    #[test]
    fn text_prompt_carries_context_and_variations() {
        let mut request = GenerationRequest::new(ContentKind::Text, "  launch post ", "LinkedIn");
        request.audience = Some("founders".into());
        request.batch_count = Some(3);
        let params = text_params(&request);

        assert!(params.prompt.contains("Platform: LinkedIn"));
        assert!(params.prompt.contains("Audience: founders"));
        assert!(params.prompt.contains("Produce 3 distinct variations."));
        assert!(params.prompt.ends_with("Request: launch post"));
        assert_eq!(params.variations, 3);
        assert!(!params.grounded);
        assert!(params.system_instruction.is_none());
    }

    #[test]
    fn persona_becomes_system_instruction() {
        let mut request = GenerationRequest::new(ContentKind::Text, "x", "blog");
        request.persona = Some(PersonaRef {
            id: "p1".into(),
            name: "Ada".into(),
            voice: Some("dry wit".into()),
        });
        assert_eq!(
            text_params(&request).system_instruction.as_deref(),
            Some("Write as Ada. Voice: dry wit")
        );
    }

    #[test]
    fn specialized_prompts_are_grounded_and_describe_format() {
        let report = text_params(&GenerationRequest::new(ContentKind::Report, "cooking", "YouTube"));
        assert!(report.grounded);
        assert!(report.prompt.contains("## Executive Summary"));
        assert!(report.prompt.contains("- Video Idea:"));

        let trends = text_params(&GenerationRequest::new(ContentKind::Trends, "ai", "news"));
        assert!(trends.grounded);
        assert!(trends.prompt.contains(TREND_ITEM_START));
    }

    #[test]
    fn image_params_copy_guidance() {
        let mut request = GenerationRequest::new(ContentKind::Image, "a fox", "Instagram");
        request.image = Some(ImageGuidance {
            aspect_ratio: Some("1:1".into()),
            negative_prompt: Some("text".into()),
        });
        let params = image_params(&request);
        assert_eq!(params.prompt, "a fox. Styled for Instagram");
        assert_eq!(params.aspect_ratio.as_deref(), Some("1:1"));
        assert_eq!(params.negative_prompt.as_deref(), Some("text"));
    }

    #[test]
    fn same_request_same_params() {
        let request = GenerationRequest::new(ContentKind::Trends, "q", "x");
        assert_eq!(text_params(&request), text_params(&request));
    }
}
