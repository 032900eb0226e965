// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types of the document store API.

use draftloom_core::GenerationRecord;
use serde::{Deserialize, Serialize};

/// Body of `POST /collections/{c}/documents:query`.
#[derive(Debug, Deserialize, Serialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub documents: Vec<GenerationRecord>,
}

/// Body of a create response.
#[derive(Debug, Deserialize, Serialize)]
pub struct CreateResponse {
    pub id: String,
}

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Deserialize, Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: String,
}
