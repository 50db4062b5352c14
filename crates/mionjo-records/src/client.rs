//! HTTP client for the activity-record backend.
//!
//! Wire-faithful to the backend's existing routes: attachment metadata is
//! persisted with a multipart POST to `/fichier/{id}/upload` (field names
//! `lien_fichier` and `fichier_nom` must match exactly), record deletion is
//! `GET /supprimer_information/{id}`, and the full listing is `GET /list0`.
//!
//! Authorization is an explicit optional bearer token passed at
//! construction, not ambient session state.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, info};

use mionjo_core::{defaults, ActivityRecord, Error, RecordStore, Result};

/// Client for the record backend's HTTP API.
pub struct HttpRecordStore {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpRecordStore {
    /// Create a client for the backend at `base_url`.
    ///
    /// `auth_token`, when present, is sent as a bearer header on every
    /// request.
    pub fn new(base_url: String, auth_token: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(defaults::REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        info!(base_url = %base_url, "Initializing record backend client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token,
        }
    }

    /// Create from environment variables.
    ///
    /// Requires `MIONJO_API_BASE`; `MIONJO_API_TOKEN` is optional.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("MIONJO_API_BASE")
            .map_err(|_| Error::Config("MIONJO_API_BASE is not set".into()))?;
        let auth_token = std::env::var("MIONJO_API_TOKEN").ok();
        Ok(Self::new(base_url, auth_token))
    }

    fn with_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn check(response: reqwest::Response, record_id: i64) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::NOT_FOUND {
            Err(Error::RecordNotFound(record_id))
        } else {
            Err(Error::Persist(format!("{}: {}", status, body)))
        }
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn update_attachment(&self, record_id: i64, url: &str, file_name: &str) -> Result<()> {
        debug!(record_id, file_name = %file_name, "records: update_attachment");

        let form = reqwest::multipart::Form::new()
            .text("lien_fichier", url.to_string())
            .text("fichier_nom", file_name.to_string());

        let response = self
            .with_auth(
                self.client
                    .post(format!("{}/fichier/{}/upload", self.base_url, record_id)),
            )
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Persist(format!("update_attachment failed: {}", e)))?;

        Self::check(response, record_id).await?;
        Ok(())
    }

    async fn delete_record(&self, record_id: i64) -> Result<()> {
        debug!(record_id, "records: delete_record");

        let response = self
            .with_auth(self.client.get(format!(
                "{}/supprimer_information/{}",
                self.base_url, record_id
            )))
            .send()
            .await
            .map_err(|e| Error::Persist(format!("delete_record failed: {}", e)))?;

        Self::check(response, record_id).await?;
        Ok(())
    }

    async fn fetch_records(&self) -> Result<Vec<ActivityRecord>> {
        let response = self
            .with_auth(self.client.get(format!("{}/list0", self.base_url)))
            .send()
            .await
            .map_err(|e| Error::Persist(format!("fetch_records failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Persist(format!("{}: {}", status, body)));
        }

        let records: Vec<ActivityRecord> = response.json().await?;
        debug!(count = records.len(), "records: fetched");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn records(server: &MockServer, token: Option<&str>) -> HttpRecordStore {
        HttpRecordStore::new(server.uri(), token.map(str::to_string))
    }

    #[tokio::test]
    async fn test_update_attachment_posts_multipart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/fichier/42/upload"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        records(&server, None)
            .update_attachment(42, "https://x/rapport_42_1.pdf", "rapport.pdf")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_record_unknown_id_is_record_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/supprimer_information/99"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = records(&server, None).delete_record(99).await.unwrap_err();
        assert!(matches!(err, Error::RecordNotFound(99)));
    }

    #[tokio::test]
    async fn test_delete_record_server_error_is_persist() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/supprimer_information/7"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = records(&server, None).delete_record(7).await.unwrap_err();
        assert!(matches!(err, Error::Persist(_)));
    }

    #[tokio::test]
    async fn test_auth_token_sent_as_bearer_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/supprimer_information/1"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        records(&server, Some("secret")).delete_record(1).await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_records_parses_backend_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/list0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
                "id_inf": 3,
                "nom_resp": "N. Rakoto",
                "mail_resp": "n.rakoto@example.org",
                "raison": "Suivi budget",
                "statut": "En cours",
                "datelimite": "2026-02-01T09:00",
                "lien_fichier": null,
                "fichier_nom": null
            }])))
            .mount(&server)
            .await;

        let list = records(&server, None).fetch_records().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, 3);
        assert!(!list[0].has_attachment());
    }
}
