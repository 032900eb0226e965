// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Draftloom generation pipeline.
//!
//! This crate provides the error taxonomy, the domain types, and the adapter
//! traits for the external collaborators: the generation backend, the remote
//! document store, and the local fallback store.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{DraftloomError, ErrorClass, RemoteErrorKind, classify_backend_signal};
pub use types::{
    AdapterType, Caller, ContentKind, Feedback, GenerationRecord, GenerationRequest,
    GenerationResult, HealthStatus, ImageGuidance, PersonaRef, Rating, RecordQuery,
    ReportSection, Source, StorageLocation, TrendItem, TrendSourceType,
};

pub use traits::{
    GenerationBackend, OfflineFlagStore, PluginAdapter, RecordBackend, RemoteAccess, RemoteStore,
};

/// Current UTC time as an ISO 8601 string with millisecond precision.
///
/// Lexicographic order of these strings matches chronological order.
pub fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_type_round_trips_through_strings() {
        use std::str::FromStr;

        for variant in [
            AdapterType::Backend,
            AdapterType::RemoteStore,
            AdapterType::LocalStore,
        ] {
            let s = variant.to_string();
            let parsed = AdapterType::from_str(&s).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn now_iso_is_utc_millis() {
        let ts = now_iso();
        assert!(ts.ends_with('Z'), "got {ts}");
        assert_eq!(ts.len(), "2026-01-01T00:00:00.000Z".len());
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_backend<T: GenerationBackend>() {}
        fn _assert_record_backend<T: RecordBackend>() {}
        fn _assert_remote_store<T: RemoteStore>() {}
        fn _assert_flag_store<T: OfflineFlagStore>() {}
    }
}
