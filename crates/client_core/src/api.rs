//! Remote infographic API: the trait the core depends on and its HTTP implementation.

use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::InfographicId,
    error::ApiError,
    protocol::{InfographicRecord, NewInfographicPayload, UploadResponse},
};
use tracing::debug;

use crate::{
    config::ClientConfig,
    error::{ClientError, Result},
    upload::{UploadFile, UploadResult},
};

#[async_trait]
pub trait InfographicApi: Send + Sync {
    async fn list(&self) -> Result<Vec<InfographicRecord>>;
    async fn upload(&self, file: &UploadFile) -> Result<UploadResult>;
    async fn create(&self, payload: &NewInfographicPayload) -> Result<()>;
    async fn delete(&self, id: InfographicId) -> Result<()>;
}

pub struct HttpInfographicApi {
    http: Client,
    config: ClientConfig,
}

impl HttpInfographicApi {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: ClientConfig, http: Client) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait]
impl InfographicApi for HttpInfographicApi {
    async fn list(&self) -> Result<Vec<InfographicRecord>> {
        let url = self.config.endpoint("infographics");
        debug!(%url, "fetching infographics");
        let response = ensure_success(self.http.get(url).send().await?).await?;
        let records: Option<Vec<InfographicRecord>> = decode_json(response).await?;
        Ok(records.unwrap_or_default())
    }

    async fn upload(&self, file: &UploadFile) -> Result<UploadResult> {
        let url = self.config.endpoint("upload");
        debug!(%url, file_name = %file.file_name, size = file.bytes.len(), "uploading file");

        let mut part =
            multipart::Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
        if let Some(mime_type) = &file.mime_type {
            part = part.mime_str(mime_type).map_err(|e| {
                ClientError::validation(format!("invalid mime type '{mime_type}': {e}"))
            })?;
        }
        let form = multipart::Form::new().part("file", part);

        let response = ensure_success(self.http.post(url).multipart(form).send().await?).await?;
        let body: UploadResponse = decode_json(response).await?;
        Ok(UploadResult { url: body.url })
    }

    async fn create(&self, payload: &NewInfographicPayload) -> Result<()> {
        let url = self.config.endpoint("infographics");
        debug!(%url, title = %payload.title, "creating infographic");
        let response = self.http.post(url).json(payload).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn delete(&self, id: InfographicId) -> Result<()> {
        let url = self.config.endpoint(&format!("infographics/{id}"));
        debug!(%url, "deleting infographic");
        let response = self.http.delete(url).send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.bytes().await.unwrap_or_else(|e| {
        debug!(%status, error = %e, "failed to read error response body");
        Default::default()
    });
    let message = ApiError::from_body(&body)
        .map(|err| err.error)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        });
    Err(ClientError::HttpStatus {
        status: status.as_u16(),
        message,
    })
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response
        .bytes()
        .await
        .map_err(|e| ClientError::Network(e.to_string()))?;
    Ok(serde_json::from_slice(&body)?)
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
