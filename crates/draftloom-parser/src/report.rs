// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heading-delimited report text into [`ReportSection`]s.

use draftloom_core::{ReportSection, Source};
use regex::Regex;
use tracing::{debug, warn};

use crate::preview;

/// A known report heading, optionally carrying bullet ideas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Heading<'a> {
    pub title: &'a str,
    /// Bullet prefix whose lines are collected into `ideas`.
    pub idea_prefix: Option<&'a str>,
}

impl<'a> Heading<'a> {
    pub const fn plain(title: &'a str) -> Self {
        Self {
            title,
            idea_prefix: None,
        }
    }

    pub const fn with_ideas(title: &'a str, idea_prefix: &'a str) -> Self {
        Self {
            title,
            idea_prefix: Some(idea_prefix),
        }
    }
}

/// Headings of a content strategy report, in the order the backend is asked
/// to emit them.
pub const REPORT_HEADINGS: &[Heading<'static>] = &[
    Heading::plain("Executive Summary"),
    Heading::plain("Audience Insights"),
    Heading::with_ideas("Video Ideas", "- Video Idea:"),
    Heading::with_ideas("Content Gaps", "- Content Gap:"),
    Heading::plain("Engagement Strategy"),
];

/// Title of the catch-all section emitted when no heading matched.
pub const GENERAL_ANALYSIS: &str = "General Analysis";

/// Markdown left around headings: `## Title`, `**Title:**`.
const DEBRIS: &[char] = &['#', '*', ':'];

/// Split `raw` into sections by the known `headings`.
///
/// A heading counts only at the start of a line, optionally wrapped in
/// markdown markup, and followed by a colon or the end of the line. A
/// section runs from the end of its heading to the start of the nearest
/// other known heading that follows it in the text. Headings absent from the
/// text are skipped. When none occur, non-empty text becomes one
/// [`GENERAL_ANALYSIS`] section. `sources` go to the first section titled
/// with "Engagement" or "Summary", else to the last section.
pub fn parse_sectioned_report(
    raw: &str,
    headings: &[Heading<'_>],
    sources: &[Source],
) -> Vec<ReportSection> {
    let spans: Vec<Option<(usize, usize)>> = headings
        .iter()
        .map(|h| find_heading(raw, h.title))
        .collect();

    let mut sections = Vec::new();
    for (i, heading) in headings.iter().enumerate() {
        let Some((_, body_start)) = spans[i] else {
            debug!(heading = heading.title, "report heading not present");
            continue;
        };
        let end = spans
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .filter_map(|(_, span)| span.map(|(start, _)| start))
            .filter(|&start| start >= body_start)
            .min()
            .unwrap_or(raw.len());

        let fragment = &raw[body_start..end];
        let content = clean(fragment);
        let ideas = heading
            .idea_prefix
            .map(|prefix| extract_ideas(fragment, prefix))
            .unwrap_or_default();
        sections.push(ReportSection {
            title: heading.title.to_string(),
            content: content.to_string(),
            ideas,
            sources: Vec::new(),
        });
    }

    if sections.is_empty() {
        let whole = raw.trim();
        if whole.is_empty() {
            return sections;
        }
        warn!(raw = preview(raw), "no known report headings found, keeping whole text");
        sections.push(ReportSection {
            title: GENERAL_ANALYSIS.to_string(),
            content: whole.to_string(),
            ideas: Vec::new(),
            sources: Vec::new(),
        });
    }

    if !sources.is_empty() {
        let target = sections
            .iter()
            .position(|s| s.title.contains("Engagement") || s.title.contains("Summary"))
            .unwrap_or(sections.len() - 1);
        sections[target].sources = sources.to_vec();
    }

    sections
}

/// Byte span of the first line that is `title` as a heading.
fn find_heading(raw: &str, title: &str) -> Option<(usize, usize)> {
    let pattern = format!(
        r"(?im)^[ \t#*]*(?:\d+[.)][ \t]*)?{}[ \t*]*(?::[ \t*]*|\r?$)",
        regex::escape(title)
    );
    match Regex::new(&pattern) {
        Ok(re) => re.find(raw).map(|m| (m.start(), m.end())),
        Err(e) => {
            warn!(heading = title, error = %e, "unusable report heading");
            None
        }
    }
}

fn clean(fragment: &str) -> &str {
    fragment
        .trim_start_matches(|c: char| c.is_whitespace() || DEBRIS.contains(&c))
        .trim_end_matches(|c: char| c.is_whitespace() || c == '#' || c == '*')
}

fn extract_ideas(content: &str, prefix: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| line.trim_start().strip_prefix(prefix))
        .map(|idea| idea.trim().trim_matches('*').trim().to_string())
        .filter(|idea| !idea.is_empty())
        .collect()
}
