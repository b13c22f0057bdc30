//! PosCatalogClient — HTTP client for the external POS catalog service

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::MirrorError;
use crate::core::config::PosConfig;
use shared::pos::{
    BatchDeleteRequest, BatchDeleteResponse, BatchRetrieveRequest, BatchRetrieveResponse,
    BatchUpsertRequest, BatchUpsertResponse, CatalogErrorResponse,
};

/// Batch endpoints of the POS catalog service
#[async_trait]
pub trait PosCatalogClient: Send + Sync {
    async fn batch_upsert(
        &self,
        request: BatchUpsertRequest,
    ) -> Result<BatchUpsertResponse, MirrorError>;

    async fn batch_retrieve(
        &self,
        request: BatchRetrieveRequest,
    ) -> Result<BatchRetrieveResponse, MirrorError>;

    async fn batch_delete(
        &self,
        request: BatchDeleteRequest,
    ) -> Result<BatchDeleteResponse, MirrorError>;
}

/// reqwest-backed implementation
pub struct HttpPosClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPosClient {
    /// Build the client with the configured timeout and bearer token.
    /// Timeouts surface as `MirrorError::Transport` like any other failure.
    pub fn new(config: &PosConfig) -> Result<Self, MirrorError> {
        let mut headers = reqwest::header::HeaderMap::new();
        let auth = format!("Bearer {}", config.access_token);
        let mut auth_value = reqwest::header::HeaderValue::from_str(&auth)
            .map_err(|e| MirrorError::Transport(format!("invalid access token: {e}")))?;
        auth_value.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth_value);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| MirrorError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, MirrorError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| MirrorError::Transport(format!("POST {path}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            // The POS reports structured errors; fall back to the raw body
            if let Ok(parsed) = serde_json::from_str::<CatalogErrorResponse>(&text)
                && !parsed.errors.is_empty()
            {
                return Err(MirrorError::Api(parsed.errors));
            }
            return Err(MirrorError::Transport(format!(
                "POST {path} returned {status}: {text}"
            )));
        }

        response
            .json::<Resp>()
            .await
            .map_err(|e| MirrorError::Protocol(format!("POST {path}: {e}")))
    }
}

#[async_trait]
impl PosCatalogClient for HttpPosClient {
    async fn batch_upsert(
        &self,
        request: BatchUpsertRequest,
    ) -> Result<BatchUpsertResponse, MirrorError> {
        self.post("/catalog/batch-upsert", &request).await
    }

    async fn batch_retrieve(
        &self,
        request: BatchRetrieveRequest,
    ) -> Result<BatchRetrieveResponse, MirrorError> {
        self.post("/catalog/batch-retrieve", &request).await
    }

    async fn batch_delete(
        &self,
        request: BatchDeleteRequest,
    ) -> Result<BatchDeleteResponse, MirrorError> {
        self.post("/catalog/batch-delete", &request).await
    }
}
