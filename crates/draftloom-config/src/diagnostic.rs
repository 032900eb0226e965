// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration diagnostics rendered through miette.
//!
//! Figment extraction errors become [`ConfigError`]s. Unknown keys carry a
//! "did you mean?" suggestion (Jaro-Winkler via `strsim`) and, when the
//! offending file is known, a labelled source span.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use figment::error::Kind;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity score to suggest a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration error.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key not present in the config model.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(code(draftloom::config::unknown_key), help("{help}"))]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        help: String,
        #[label("not a recognized key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value of the wrong type.
    #[error("invalid type for `{key}`: found {found}")]
    #[diagnostic(code(draftloom::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        found: String,
        expected: String,
    },

    /// A required key is absent.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(draftloom::config::missing_key),
        help("add `{key} = <value>` to draftloom.toml")
    )]
    MissingKey { key: String },

    /// A semantic constraint failed after deserialization.
    #[error("validation error: {message}")]
    #[diagnostic(code(draftloom::config::validation))]
    Validation { message: String },

    /// Anything else figment reports.
    #[error("configuration error: {0}")]
    #[diagnostic(code(draftloom::config::other))]
    Other(String),
}

/// Convert a `figment::Error` (which may hold several errors) into diagnostics.
///
/// `toml_sources` is a list of `(path, content)` pairs used to attach source
/// spans to unknown-key errors.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| match &error.kind {
            Kind::UnknownField(field, expected) => {
                let suggestion = suggest_key(field, expected);
                let help = match &suggestion {
                    Some(s) => format!("did you mean `{s}`? valid keys: {}", expected.join(", ")),
                    None => format!("valid keys: {}", expected.join(", ")),
                };
                let section: Vec<String> = error.path.iter().map(|s| s.to_string()).collect();
                let (span, src) = source_for(&error, toml_sources)
                    .and_then(|(path, content)| {
                        find_key_offset(content, &section, field).map(|offset| {
                            (
                                SourceSpan::new(offset.into(), field.len()),
                                NamedSource::new(path, content.to_string()),
                            )
                        })
                    })
                    .map_or((None, None), |(span, src)| (Some(span), Some(src)));
                ConfigError::UnknownKey {
                    key: field.clone(),
                    suggestion,
                    help,
                    span,
                    src,
                }
            }
            Kind::MissingField(field) => ConfigError::MissingKey {
                key: dotted(&error.path, field),
            },
            Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
                key: error.path.join("."),
                found: actual.to_string(),
                expected: expected.clone(),
            },
            _ => ConfigError::Other(error.to_string()),
        })
        .collect()
}

fn dotted(path: &[String], field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else {
        format!("{}.{field}", path.join("."))
    }
}

/// The `(path, content)` pair for the file an error originated in.
///
/// Errors from inline strings carry no file origin; they resolve to the sole
/// source when exactly one was supplied.
fn source_for<'a>(
    error: &figment::Error,
    toml_sources: &'a [(String, String)],
) -> Option<(&'a str, &'a str)> {
    let origin = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|source| match source {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });
    let found = match origin {
        Some(origin) => toml_sources.iter().find(|(p, _)| *p == origin),
        None if toml_sources.len() == 1 => toml_sources.first(),
        None => None,
    };
    found.map(|(p, content)| (p.as_str(), content.as_str()))
}

/// Byte offset of `field` at the start of a line inside the `[path[0]]` table,
/// or from the top of the file when `path` is empty.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let start = match path.first() {
        Some(section) => {
            let header = format!("[{section}]");
            content.find(&header)? + header.len()
        }
        None => 0,
    };

    let mut offset = start;
    for line in content[start..].split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') {
            return None;
        }
        if let Some(rest) = trimmed.strip_prefix(field) {
            if rest.trim_start().starts_with('=') {
                return Some(offset + (line.len() - trimmed.len()));
            }
        }
        offset += line.len();
    }
    None
}

/// Suggest the closest valid key, if any is similar enough.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Render diagnostics to stderr using miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        match handler.render_report(&mut buf, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{buf}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggest_colection_for_collection() {
        let valid = &["enabled", "base_url", "api_token", "collection", "timeout_secs"];
        assert_eq!(
            suggest_key("colection", valid),
            Some("collection".to_string())
        );
    }

    #[test]
    fn suggest_max_reconect_attempts() {
        let valid = &[
            "max_reconnect_attempts",
            "base_delay_ms",
            "max_delay_ms",
            "queue_spacing_ms",
        ];
        assert_eq!(
            suggest_key("max_reconect_attempts", valid),
            Some("max_reconnect_attempts".to_string())
        );
    }

    #[test]
    fn no_suggestion_for_distant_typo() {
        let valid = &["name", "log_level", "guest_user_id"];
        assert_eq!(suggest_key("zzzzzz", valid), None);
    }

    #[test]
    fn find_key_offset_in_section() {
        let content = "[app]\nname = \"x\"\n\n[remote]\ncolection = \"docs\"\n";
        let path = vec!["remote".to_string()];
        let o = find_key_offset(content, &path, "colection").unwrap();
        assert_eq!(&content[o..o + 9], "colection");
    }

    #[test]
    fn find_key_offset_stops_at_next_table() {
        let content = "[app]\nname = \"x\"\n[remote]\ncolection = 1\n";
        let path = vec!["app".to_string()];
        assert_eq!(find_key_offset(content, &path, "colection"), None);
    }

    #[test]
    fn unknown_key_error_carries_suggestion() {
        use figment::providers::{Format, Serialized, Toml};

        let err = figment::Figment::new()
            .merge(Serialized::defaults(crate::model::DraftloomConfig::default()))
            .merge(Toml::string("[remote]\ncolection = \"docs\"\n"))
            .extract::<crate::model::DraftloomConfig>()
            .unwrap_err();
        let errors = figment_to_config_errors(err, &[]);
        assert_eq!(errors.len(), 1);
        match &errors[0] {
            ConfigError::UnknownKey {
                key, suggestion, ..
            } => {
                assert_eq!(key, "colection");
                assert_eq!(suggestion.as_deref(), Some("collection"));
            }
            other => panic!("expected UnknownKey, got {other:?}"),
        }
    }
}
