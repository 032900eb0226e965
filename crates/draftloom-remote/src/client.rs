// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the document store, with typed error mapping.
//!
//! Every failure leaves this module as [`DraftloomError::Remote`] with a
//! [`RemoteErrorKind`], so callers never inspect HTTP details.

use std::time::Duration;

use draftloom_core::{DraftloomError, RemoteErrorKind};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::types::ApiErrorResponse;

/// Everything outside the RFC 3986 unreserved set is escaped in a path segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Thin wrapper over `reqwest::Client` bound to one collection.
#[derive(Debug, Clone)]
pub struct DocumentClient {
    client: reqwest::Client,
    base_url: String,
    collection: String,
    api_token: Option<String>,
}

impl DocumentClient {
    pub fn new(
        base_url: &str,
        collection: &str,
        api_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, DraftloomError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DraftloomError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            collection: collection.to_string(),
            api_token,
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn has_credentials(&self) -> bool {
        self.api_token.is_some()
    }

    pub(crate) fn documents_url(&self) -> String {
        format!("{}/collections/{}/documents", self.base_url, self.collection)
    }

    /// The id is always a single path segment, whatever characters it holds.
    ///
    /// URL parsing collapses `.` and `..` even when escaped, so those ids are
    /// rejected.
    pub(crate) fn document_url(&self, id: &str) -> Result<String, DraftloomError> {
        if id.is_empty() || id == "." || id == ".." {
            return Err(DraftloomError::remote(
                RemoteErrorKind::InvalidArgument,
                format!("invalid document id {id:?}"),
            ));
        }
        let segment = utf8_percent_encode(id, SEGMENT);
        Ok(format!("{}/{segment}", self.documents_url()))
    }

    pub(crate) fn query_url(&self) -> String {
        format!("{}:query", self.documents_url())
    }

    pub(crate) fn ping_url(&self) -> String {
        format!("{}/ping", self.base_url)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and return the response if its status is a success.
    ///
    /// With `allow_not_found`, a 404 yields `Ok(None)`.
    pub(crate) async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
        allow_not_found: bool,
    ) -> Result<Option<Response>, DraftloomError> {
        let mut builder = self.request(method.clone(), url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status();
        debug!(%method, url, status = %status, "document store response");

        if status.is_success() {
            return Ok(Some(response));
        }
        if allow_not_found && status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = response.text().await.unwrap_or_default();
        Err(map_status_error(status, &body))
    }

    /// Decode a success response body.
    pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, DraftloomError> {
        response.json::<T>().await.map_err(|e| {
            DraftloomError::remote(
                RemoteErrorKind::Internal,
                format!("unexpected document store response: {e}"),
            )
        })
    }
}

/// Map a failure before any response arrived.
pub(crate) fn map_transport_error(e: reqwest::Error) -> DraftloomError {
    let kind = if e.is_connect() || e.is_timeout() || e.is_request() {
        RemoteErrorKind::Network
    } else {
        RemoteErrorKind::Internal
    };
    DraftloomError::remote(kind, e.to_string())
}

/// Map a non-success status, preferring the store's own status name.
pub(crate) fn map_status_error(status: StatusCode, body: &str) -> DraftloomError {
    let envelope = serde_json::from_str::<ApiErrorResponse>(body).ok();
    let from_body = envelope
        .as_ref()
        .and_then(|e| e.error.status.as_deref())
        .map(RemoteErrorKind::from_status)
        .filter(|kind| *kind != RemoteErrorKind::Internal);

    let kind = from_body.unwrap_or_else(|| match status.as_u16() {
        401 => RemoteErrorKind::Unauthenticated,
        403 => RemoteErrorKind::PermissionDenied,
        404 => RemoteErrorKind::NotFound,
        400 | 409 | 412 | 422 => RemoteErrorKind::InvalidArgument,
        429 | 502 | 503 | 504 => RemoteErrorKind::Unavailable,
        _ => RemoteErrorKind::Internal,
    });

    let message = match envelope {
        Some(e) if !e.error.message.is_empty() => e.error.message,
        _ if body.is_empty() => status.to_string(),
        _ => format!("{status}: {body}"),
    };
    DraftloomError::remote(kind, message)
}
