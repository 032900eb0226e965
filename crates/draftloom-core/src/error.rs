// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types and the failure classifier for the Draftloom pipeline.
//!
//! Every adapter returns [`DraftloomError`]. Behavioral branches (substitute a
//! fallback result, degrade to local storage, surface to the caller) are
//! decided exclusively on [`ErrorClass`], produced by [`DraftloomError::class`].

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The primary error type used across all Draftloom adapter traits and core operations.
#[derive(Debug, Error)]
pub enum DraftloomError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// A request or update failed input validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// The generation backend rejected or failed a call.
    ///
    /// `status` is the machine-readable code reported by the backend
    /// (HTTP status, gRPC-style status name, or transport signature).
    #[error("backend error ({status}): {message}")]
    Backend { status: String, message: String },

    /// The remote document store failed an operation.
    #[error("remote store error ({kind}): {message}")]
    Remote {
        kind: RemoteErrorKind,
        message: String,
    },

    /// Local storage errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The caller does not own the record it tried to access.
    #[error("caller {caller_id} is not authorized to access record {record_id}")]
    Unauthorized {
        record_id: String,
        caller_id: String,
    },

    /// A record addressed by id does not exist in any store.
    #[error("record not found: {id}")]
    NotFound { id: String },

    /// Generated output could not be interpreted.
    #[error("malformed output: {0}")]
    Malformed(String),

    /// Remote access is structurally disabled in this environment.
    #[error("remote access is disabled in this environment")]
    RemoteAccessDisabled,

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Failure classes that drive the pipeline's behavioral branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Backend overload, rate limiting, or temporary unavailability.
    Transient,
    /// The remote store is unreachable or the session lacks grants for it.
    Connectivity,
    /// Ownership mismatch on record access.
    Authorization,
    /// Generated output could not be parsed.
    Malformed,
    /// Anything else: propagated unchanged.
    Fatal,
}

/// Closed set of remote store failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemoteErrorKind {
    /// The store refused the operation for this session.
    PermissionDenied,
    /// Credentials are missing or expired.
    Unauthenticated,
    /// The store reported itself unavailable.
    Unavailable,
    /// Transport failed before a response arrived (DNS, connect, CORS, reset).
    Network,
    /// The addressed document does not exist.
    NotFound,
    /// The store rejected the document shape or query.
    InvalidArgument,
    /// Any other store-side failure.
    Internal,
}

impl RemoteErrorKind {
    /// Returns true for failures that say nothing about the request itself,
    /// only about reaching the store.
    pub fn is_network(&self) -> bool {
        matches!(self, RemoteErrorKind::Network | RemoteErrorKind::Unavailable)
    }

    /// Map a store status name (`PERMISSION_DENIED`, `UNAVAILABLE`, ...) to a kind.
    pub fn from_status(status: &str) -> Self {
        match status.trim().to_ascii_uppercase().as_str() {
            "PERMISSION_DENIED" | "PERMISSION-DENIED" => RemoteErrorKind::PermissionDenied,
            "UNAUTHENTICATED" => RemoteErrorKind::Unauthenticated,
            "UNAVAILABLE" | "DEADLINE_EXCEEDED" => RemoteErrorKind::Unavailable,
            "NOT_FOUND" => RemoteErrorKind::NotFound,
            "INVALID_ARGUMENT" | "FAILED_PRECONDITION" => RemoteErrorKind::InvalidArgument,
            _ => RemoteErrorKind::Internal,
        }
    }
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RemoteErrorKind::PermissionDenied => "permission-denied",
            RemoteErrorKind::Unauthenticated => "unauthenticated",
            RemoteErrorKind::Unavailable => "unavailable",
            RemoteErrorKind::Network => "network",
            RemoteErrorKind::NotFound => "not-found",
            RemoteErrorKind::InvalidArgument => "invalid-argument",
            RemoteErrorKind::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// HTTP status codes the generation backend uses for overload and throttling.
const TRANSIENT_STATUS_CODES: &[&str] = &["429", "503", "529"];

/// Status names and message fragments signalling overload, quota exhaustion,
/// or temporary unavailability.
const TRANSIENT_SIGNALS: &[&str] = &[
    "resource_exhausted",
    "resource exhausted",
    "unavailable",
    "overloaded",
    "rate limit",
    "rate_limit",
    "too many requests",
];

/// Transport-level read-conflict signatures seen when overlapping requests
/// share one connection.
const READ_CONFLICT_SIGNALS: &[&str] = &["stream conflict", "err_http2_stream", "read conflict"];

/// Classify a raw backend status code and message.
///
/// This is the only place raw backend error text is inspected.
pub fn classify_backend_signal(status: &str, message: &str) -> ErrorClass {
    if TRANSIENT_STATUS_CODES.contains(&status.trim()) {
        return ErrorClass::Transient;
    }
    let status = status.to_ascii_lowercase();
    let message = message.to_ascii_lowercase();
    let matches_any = |signals: &[&str]| {
        signals
            .iter()
            .any(|s| status.contains(s) || message.contains(s))
    };
    if matches_any(TRANSIENT_SIGNALS) || matches_any(READ_CONFLICT_SIGNALS) {
        ErrorClass::Transient
    } else {
        ErrorClass::Fatal
    }
}

impl DraftloomError {
    /// Classify this error into the closed [`ErrorClass`] set.
    pub fn class(&self) -> ErrorClass {
        match self {
            DraftloomError::Backend { status, message } => {
                classify_backend_signal(status, message)
            }
            DraftloomError::Remote { kind, .. } => match kind {
                RemoteErrorKind::PermissionDenied
                | RemoteErrorKind::Unauthenticated
                | RemoteErrorKind::Unavailable
                | RemoteErrorKind::Network => ErrorClass::Connectivity,
                RemoteErrorKind::NotFound
                | RemoteErrorKind::InvalidArgument
                | RemoteErrorKind::Internal => ErrorClass::Fatal,
            },
            DraftloomError::Timeout { .. } | DraftloomError::RemoteAccessDisabled => {
                ErrorClass::Connectivity
            }
            DraftloomError::Unauthorized { .. } => ErrorClass::Authorization,
            DraftloomError::Malformed(_) => ErrorClass::Malformed,
            DraftloomError::Config(_)
            | DraftloomError::Validation(_)
            | DraftloomError::Storage { .. }
            | DraftloomError::NotFound { .. }
            | DraftloomError::Internal(_) => ErrorClass::Fatal,
        }
    }

    /// Returns the remote failure kind, if this is a remote store error.
    pub fn remote_kind(&self) -> Option<RemoteErrorKind> {
        match self {
            DraftloomError::Remote { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Shorthand for a remote error.
    pub fn remote(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        DraftloomError::Remote {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for a backend error.
    pub fn backend(status: impl Into<String>, message: impl Into<String>) -> Self {
        DraftloomError::Backend {
            status: status.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_overload_signals_are_transient() {
        for (status, message) in [
            ("UNAVAILABLE", "The model is overloaded"),
            ("RESOURCE_EXHAUSTED", "quota"),
            ("429", "Too Many Requests"),
            ("503", "Service Unavailable"),
            ("INTERNAL", "stream conflict while reading response"),
            ("TRANSPORT", "ERR_HTTP2_STREAM_ERROR"),
        ] {
            let err = DraftloomError::backend(status, message);
            assert_eq!(err.class(), ErrorClass::Transient, "{status}: {message}");
        }
    }

    #[test]
    fn backend_request_errors_are_fatal() {
        let err = DraftloomError::backend("INVALID_ARGUMENT", "prompt blocked by safety filter");
        assert_eq!(err.class(), ErrorClass::Fatal);
        let err = DraftloomError::backend("400", "bad request");
        assert_eq!(err.class(), ErrorClass::Fatal);
    }

    #[test]
    fn remote_reachability_errors_are_connectivity() {
        for kind in [
            RemoteErrorKind::PermissionDenied,
            RemoteErrorKind::Unauthenticated,
            RemoteErrorKind::Unavailable,
            RemoteErrorKind::Network,
        ] {
            assert_eq!(
                DraftloomError::remote(kind, "x").class(),
                ErrorClass::Connectivity
            );
        }
        assert_eq!(
            DraftloomError::RemoteAccessDisabled.class(),
            ErrorClass::Connectivity
        );
        assert_eq!(
            DraftloomError::remote(RemoteErrorKind::InvalidArgument, "bad doc").class(),
            ErrorClass::Fatal
        );
    }

    #[test]
    fn ownership_and_parse_errors_have_their_own_classes() {
        let unauthorized = DraftloomError::Unauthorized {
            record_id: "r1".into(),
            caller_id: "bob".into(),
        };
        assert_eq!(unauthorized.class(), ErrorClass::Authorization);
        assert_eq!(
            DraftloomError::Malformed("no json".into()).class(),
            ErrorClass::Malformed
        );
        assert_eq!(
            DraftloomError::Internal("bug".into()).class(),
            ErrorClass::Fatal
        );
    }

    #[test]
    fn remote_kind_from_status_names() {
        assert_eq!(
            RemoteErrorKind::from_status("PERMISSION_DENIED"),
            RemoteErrorKind::PermissionDenied
        );
        assert_eq!(
            RemoteErrorKind::from_status("unavailable"),
            RemoteErrorKind::Unavailable
        );
        assert_eq!(
            RemoteErrorKind::from_status("whatever"),
            RemoteErrorKind::Internal
        );
        assert!(RemoteErrorKind::Network.is_network());
        assert!(!RemoteErrorKind::PermissionDenied.is_network());
    }

    mod props {
        use proptest::prelude::*;

        use super::super::*;

        proptest! {
            #[test]
            fn transient_status_wins_over_any_message(
                status in prop::sample::select(TRANSIENT_STATUS_CODES),
                message in "\\PC*",
            ) {
                prop_assert_eq!(classify_backend_signal(status, &message), ErrorClass::Transient);
            }

            #[test]
            fn classification_ignores_case(message in "[a-z ]{0,12}") {
                let lower = classify_backend_signal("x", &message);
                let upper = classify_backend_signal("X", &message.to_ascii_uppercase());
                prop_assert_eq!(lower, upper);
            }
        }
    }
}
