// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP document store adapter for Draftloom.
//!
//! Implements [`RemoteStore`] against a REST document API:
//!
//! | operation | request |
//! |---|---|
//! | ping | `GET {base}/ping` |
//! | create | `POST {base}/collections/{c}/documents` |
//! | fetch / replace / remove | `GET` / `PUT` / `DELETE {base}/collections/{c}/documents/{id}` |
//! | query | `POST {base}/collections/{c}/documents:query` |

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use draftloom_config::model::RemoteConfig;
use draftloom_core::{
    AdapterType, DraftloomError, GenerationRecord, HealthStatus, PluginAdapter, RecordBackend,
    RecordQuery, RemoteAccess, RemoteStore,
};
use reqwest::Method;
use tracing::{debug, info};

use crate::client::DocumentClient;
use crate::types::{CreateResponse, QueryResponse};

/// Remote record store speaking the document API over HTTP.
pub struct HttpRemoteStore {
    client: DocumentClient,
    access: RemoteAccess,
}

impl HttpRemoteStore {
    pub fn new(config: &RemoteConfig) -> Result<Self, DraftloomError> {
        let client = DocumentClient::new(
            &config.base_url,
            &config.collection,
            config.api_token.clone(),
            Duration::from_secs(config.timeout_secs),
        )?;
        let access = if config.enabled {
            RemoteAccess::Enabled
        } else {
            RemoteAccess::Disabled
        };
        info!(
            base_url = %config.base_url,
            collection = %config.collection,
            enabled = config.enabled,
            "remote document store configured"
        );
        Ok(Self { client, access })
    }

    /// Whether a bearer token is configured.
    pub fn has_credentials(&self) -> bool {
        self.client.has_credentials()
    }

    /// The remote reference for a record id.
    pub fn remote_ref(&self, id: &str) -> String {
        format!("{}/{id}", self.client.collection())
    }

    fn ensure_enabled(&self) -> Result<(), DraftloomError> {
        match self.access {
            RemoteAccess::Enabled => Ok(()),
            RemoteAccess::Disabled => Err(DraftloomError::RemoteAccessDisabled),
        }
    }
}

#[async_trait]
impl PluginAdapter for HttpRemoteStore {
    fn name(&self) -> &str {
        "http-document-store"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::RemoteStore
    }

    async fn health_check(&self) -> Result<HealthStatus, DraftloomError> {
        if self.access == RemoteAccess::Disabled {
            return Ok(HealthStatus::Degraded("remote access disabled".into()));
        }
        match self.ping().await {
            Ok(()) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), DraftloomError> {
        Ok(())
    }
}

#[async_trait]
impl RecordBackend for HttpRemoteStore {
    async fn create(&self, record: &GenerationRecord) -> Result<String, DraftloomError> {
        self.ensure_enabled()?;
        let mut stored = record.clone();
        stored.remote_ref = Some(self.remote_ref(&record.id));

        let url = self.client.documents_url();
        let response = self
            .client
            .send(Method::POST, &url, Some(&stored), false)
            .await?;
        // A server that echoes a different id is honored.
        let id = match response {
            Some(response) => DocumentClient::decode::<CreateResponse>(response)
                .await
                .map(|created| created.id)
                .unwrap_or_else(|_| record.id.clone()),
            None => record.id.clone(),
        };
        debug!(record_id = %id, "record stored remotely");
        Ok(self.remote_ref(&id))
    }

    async fn fetch(&self, id: &str) -> Result<Option<GenerationRecord>, DraftloomError> {
        self.ensure_enabled()?;
        let url = self.client.document_url(id)?;
        match self.client.send::<()>(Method::GET, &url, None, true).await? {
            Some(response) => Ok(Some(DocumentClient::decode(response).await?)),
            None => Ok(None),
        }
    }

    async fn replace(&self, record: &GenerationRecord) -> Result<(), DraftloomError> {
        self.ensure_enabled()?;
        let mut stored = record.clone();
        stored.remote_ref = Some(self.remote_ref(&record.id));
        let url = self.client.document_url(&record.id)?;
        self.client
            .send(Method::PUT, &url, Some(&stored), false)
            .await?;
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), DraftloomError> {
        self.ensure_enabled()?;
        let url = self.client.document_url(id)?;
        self.client.send::<()>(Method::DELETE, &url, None, true).await?;
        Ok(())
    }

    async fn query(&self, query: &RecordQuery) -> Result<Vec<GenerationRecord>, DraftloomError> {
        self.ensure_enabled()?;
        let url = self.client.query_url();
        let response = self
            .client
            .send(Method::POST, &url, Some(query), false)
            .await?;
        let mut documents = match response {
            Some(response) => DocumentClient::decode::<QueryResponse>(response).await?.documents,
            None => Vec::new(),
        };
        // Re-apply the contract locally in case the server is lax about it.
        documents.retain(|r| query.matches(r));
        documents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        documents.truncate(query.limit);
        Ok(documents)
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn ping(&self) -> Result<(), DraftloomError> {
        self.ensure_enabled()?;
        let url = self.client.ping_url();
        self.client.send::<()>(Method::GET, &url, None, false).await?;
        Ok(())
    }

    fn access(&self) -> RemoteAccess {
        self.access
    }
}

#[cfg(test)]
mod tests {
    use draftloom_core::{ContentKind, GenerationRequest, GenerationResult, RemoteErrorKind};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn config(base_url: &str) -> RemoteConfig {
        RemoteConfig {
            enabled: true,
            base_url: format!("{base_url}/v1"),
            api_token: Some("secret-token".into()),
            collection: "generations".into(),
            timeout_secs: 5,
        }
    }

    fn record(id: &str, created_at: &str) -> GenerationRecord {
        GenerationRecord::new(
            id.into(),
            "alice".into(),
            created_at.into(),
            GenerationRequest::new(ContentKind::Text, "launch post", "x"),
            GenerationResult::Text {
                content: "We shipped!".into(),
                grounding_sources: vec![],
            },
        )
    }

    #[tokio::test]
    async fn create_posts_document_with_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/collections/generations/documents"))
            .and(header("authorization", "Bearer secret-token"))
            .and(body_partial_json(serde_json::json!({
                "id": "r1",
                "remote_ref": "generations/r1"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": "r1"})))
            .expect(1)
            .mount(&server)
            .await;

        let store = HttpRemoteStore::new(&config(&server.uri())).unwrap();
        let reference = store
            .create(&record("r1", "2026-03-01T00:00:00.000Z"))
            .await
            .unwrap();
        assert_eq!(reference, "generations/r1");
    }

    #[tokio::test]
    async fn fetch_returns_none_on_404() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/collections/generations/documents/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let store = HttpRemoteStore::new(&config(&server.uri())).unwrap();
        assert!(store.fetch("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn fetch_decodes_document() {
        let server = MockServer::start().await;
        let stored = record("r2", "2026-03-01T00:00:00.000Z");
        Mock::given(method("GET"))
            .and(path("/v1/collections/generations/documents/r2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&stored))
            .mount(&server)
            .await;

        let store = HttpRemoteStore::new(&config(&server.uri())).unwrap();
        assert_eq!(store.fetch("r2").await.unwrap(), Some(stored));
    }

    #[tokio::test]
    async fn record_ids_cannot_escape_the_collection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/ping"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/collections/generations/documents/..%2Fping"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let store = HttpRemoteStore::new(&config(&server.uri())).unwrap();
        assert!(store.fetch("../ping").await.unwrap().is_none());
        let err = store.remove("..").await.unwrap_err();
        assert_eq!(err.remote_kind(), Some(RemoteErrorKind::InvalidArgument));
    }

    #[tokio::test]
    async fn permission_denied_body_is_mapped() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "error": {"code": 403, "status": "PERMISSION_DENIED", "message": "no grants"}
            })))
            .mount(&server)
            .await;

        let store = HttpRemoteStore::new(&config(&server.uri())).unwrap();
        let err = store
            .replace(&record("r1", "2026-03-01T00:00:00.000Z"))
            .await
            .unwrap_err();
        assert_eq!(err.remote_kind(), Some(RemoteErrorKind::PermissionDenied));
    }

    #[tokio::test]
    async fn unreachable_store_is_a_network_error() {
        // Nothing listens on this port once the server is dropped.
        let uri = {
            let server = MockServer::start().await;
            server.uri()
        };
        let store = HttpRemoteStore::new(&config(&uri)).unwrap();
        let err = store.ping().await.unwrap_err();
        assert_eq!(err.remote_kind(), Some(RemoteErrorKind::Network));
    }

    #[tokio::test]
    async fn query_sorts_filters_and_truncates() {
        let server = MockServer::start().await;
        let mut other_owner = record("b1", "2026-03-09T00:00:00.000Z");
        other_owner.owner_id = "bob".into();
        Mock::given(method("POST"))
            .and(path("/v1/collections/generations/documents:query"))
            .and(body_partial_json(serde_json::json!({"owner_id": "alice", "limit": 2})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "documents": [
                    record("a1", "2026-03-01T00:00:00.000Z"),
                    other_owner,
                    record("a3", "2026-03-03T00:00:00.000Z"),
                    record("a2", "2026-03-02T00:00:00.000Z"),
                ]
            })))
            .mount(&server)
            .await;

        let store = HttpRemoteStore::new(&config(&server.uri())).unwrap();
        let ids: Vec<String> = store
            .query(&RecordQuery::for_owner("alice", 2))
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["a3", "a2"]);
    }

    #[tokio::test]
    async fn remove_tolerates_missing_documents() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let store = HttpRemoteStore::new(&config(&server.uri())).unwrap();
        store.remove("gone").await.unwrap();
    }

    #[tokio::test]
    async fn disabled_store_refuses_without_network() {
        let mut cfg = config("http://127.0.0.1:9");
        cfg.enabled = false;
        let store = HttpRemoteStore::new(&cfg).unwrap();

        assert_eq!(store.access(), RemoteAccess::Disabled);
        assert!(matches!(
            store.ping().await,
            Err(DraftloomError::RemoteAccessDisabled)
        ));
        assert!(matches!(
            store.health_check().await,
            Ok(HealthStatus::Degraded(_))
        ));
    }
}
