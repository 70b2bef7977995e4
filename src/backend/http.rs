//! reqwestによるバックエンド実装

use super::{MaterialBackend, TranslationReply, TranslationResponse};
use crate::config::Config;
use crate::error::{MaterialSyncError, Result};
use async_trait::async_trait;
use material_sync_common::{Client, Material, MaterialId};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

/// 全エンドポイント共通の `{success, error}` 部分
#[derive(Debug, Default, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClientsResponse {
    #[serde(default)]
    clients: Vec<Client>,
}

#[derive(Debug, Deserialize)]
struct MaterialsResponse {
    #[serde(default)]
    materials: Vec<Material>,
}

#[derive(Debug, Deserialize)]
struct DeleteResponse {
    #[serde(default)]
    deleted_count: usize,
}

impl HttpBackend {
    pub fn new(config: &Config, token: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| MaterialSyncError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response.text().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "backend response");

        let envelope: Envelope = serde_json::from_str(&body).unwrap_or_default();
        if !status.is_success() || envelope.success == Some(false) {
            let message = envelope.error.unwrap_or_default();
            warn!(status = status.as_u16(), error = %message, "backend request failed");
            return Err(MaterialSyncError::Server {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| MaterialSyncError::Decode(e.to_string()))
    }
}

#[async_trait]
impl MaterialBackend for HttpBackend {
    async fn fetch_clients(&self) -> Result<Vec<Client>> {
        let response: ClientsResponse = self.send(self.client.get(self.url("/api/clients"))).await?;
        Ok(response.clients)
    }

    async fn fetch_materials(&self, client_id: &str) -> Result<Vec<Material>> {
        let url = self.url(&format!("/api/clients/{}/materials", client_id));
        let response: MaterialsResponse = self.send(self.client.get(url)).await?;
        Ok(response.materials)
    }

    async fn start_translation(&self, client_id: &str) -> Result<TranslationReply> {
        let url = self.url(&format!("/api/clients/{}/materials/translate", client_id));
        let response: TranslationResponse = self.send(self.client.post(url)).await?;
        if let Some(message) = &response.message {
            debug!(client_id, %message, "translation finished on server");
        }
        Ok(response.into())
    }

    async fn delete_materials(&self, client_id: &str, ids: &[MaterialId]) -> Result<usize> {
        let url = self.url(&format!("/api/clients/{}/materials/cancel", client_id));
        let request = self.client.post(url).json(&json!({ "material_ids": ids }));
        let response: DeleteResponse = self.send(request).await?;
        Ok(response.deleted_count)
    }

    async fn delete_material(&self, id: &str) -> Result<()> {
        let url = self.url(&format!("/api/materials/{}", id));
        let _: serde_json::Value = self.send(self.client.delete(url)).await?;
        Ok(())
    }
}
