//! Test doubles for the remote API: an in-memory recorder and an axum mock server.

use std::{
    collections::HashMap,
    path::Path as FsPath,
    sync::{Arc, Mutex as StdMutex},
};

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{TimeZone, Utc};
use shared::{
    domain::InfographicId,
    error::ApiError,
    protocol::{InfographicRecord, NewInfographicPayload, UploadResponse},
};
use tokio::{net::TcpListener, sync::Mutex};

use crate::{
    api::InfographicApi,
    config::ClientConfig,
    error::{ClientError, Result},
    upload::{UploadFile, UploadResult},
};

pub fn record(id: i64, title: &str) -> InfographicRecord {
    InfographicRecord {
        id: InfographicId(id),
        title: title.to_string(),
        description: None,
        thumbnail_url: format!("/uploads/{id}.png"),
        page_url: format!("/uploads/{id}.html"),
        category: None,
        category_color: None,
        created_at: Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp"),
    }
}

pub fn file(name: &str) -> UploadFile {
    UploadFile::new(name, None, format!("contents of {name}").into_bytes())
}

pub fn listed_ids(records: &[InfographicRecord]) -> Vec<i64> {
    records.iter().map(|r| r.id.0).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    List,
    Upload(String),
    Create(NewInfographicPayload),
    Delete(InfographicId),
}

/// In-memory API that records every call in order.
#[derive(Default)]
pub struct RecordingApi {
    calls: StdMutex<Vec<ApiCall>>,
    records: StdMutex<Vec<InfographicRecord>>,
    upload_urls: StdMutex<HashMap<String, String>>,
    upload_failures: StdMutex<HashMap<String, ClientError>>,
    create_failure: StdMutex<Option<ClientError>>,
    delete_failure: StdMutex<Option<ClientError>>,
}

impl RecordingApi {
    pub fn with_records(records: Vec<InfographicRecord>) -> Arc<Self> {
        let api = Self::default();
        *api.records.lock().expect("records") = records;
        Arc::new(api)
    }

    pub fn upload_returns(&self, file_name: &str, url: &str) {
        self.upload_urls
            .lock()
            .expect("urls")
            .insert(file_name.to_string(), url.to_string());
    }

    pub fn fail_upload(&self, file_name: &str, err: ClientError) {
        self.upload_failures
            .lock()
            .expect("failures")
            .insert(file_name.to_string(), err);
    }

    pub fn fail_create(&self, err: ClientError) {
        *self.create_failure.lock().expect("create failure") = Some(err);
    }

    pub fn fail_delete(&self, err: ClientError) {
        *self.delete_failure.lock().expect("delete failure") = Some(err);
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().expect("calls").clone()
    }

    pub fn mutating_calls(&self) -> Vec<ApiCall> {
        self.calls()
            .into_iter()
            .filter(|call| *call != ApiCall::List)
            .collect()
    }

    pub fn list_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| **call == ApiCall::List)
            .count()
    }

    fn record_call(&self, call: ApiCall) {
        self.calls.lock().expect("calls").push(call);
    }
}

#[async_trait]
impl InfographicApi for RecordingApi {
    async fn list(&self) -> Result<Vec<InfographicRecord>> {
        self.record_call(ApiCall::List);
        Ok(self.records.lock().expect("records").clone())
    }

    async fn upload(&self, file: &UploadFile) -> Result<UploadResult> {
        self.record_call(ApiCall::Upload(file.file_name.clone()));
        if let Some(err) = self.upload_failures.lock().expect("failures").get(&file.file_name) {
            return Err(err.clone());
        }
        let url = self
            .upload_urls
            .lock()
            .expect("urls")
            .get(&file.file_name)
            .cloned()
            .unwrap_or_else(|| format!("/uploads/{}", file.file_name));
        Ok(UploadResult { url })
    }

    async fn create(&self, payload: &NewInfographicPayload) -> Result<()> {
        self.record_call(ApiCall::Create(payload.clone()));
        if let Some(err) = self.create_failure.lock().expect("create failure").clone() {
            return Err(err);
        }
        let mut records = self.records.lock().expect("records");
        let next_id = records.iter().map(|r| r.id.0).max().unwrap_or(0) + 1;
        let mut created = record(next_id, &payload.title);
        created.thumbnail_url = payload.thumbnail_url.clone();
        created.page_url = payload.page_url.clone();
        records.insert(0, created);
        Ok(())
    }

    async fn delete(&self, id: InfographicId) -> Result<()> {
        self.record_call(ApiCall::Delete(id));
        if let Some(err) = self.delete_failure.lock().expect("delete failure").clone() {
            return Err(err);
        }
        self.records.lock().expect("records").retain(|r| r.id != id);
        Ok(())
    }
}

/// State behind the mock HTTP API.
#[derive(Clone, Default)]
pub struct MockServerState {
    pub records: Arc<Mutex<Vec<InfographicRecord>>>,
    pub created: Arc<Mutex<Vec<serde_json::Value>>>,
    pub uploads: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
    pub deleted: Arc<Mutex<Vec<i64>>>,
    pub fail_uploads: Arc<Mutex<bool>>,
    pub fail_create: Arc<Mutex<bool>>,
    pub list_body: Arc<Mutex<Option<String>>>,
    pub upload_body: Arc<Mutex<Option<String>>>,
}

async fn mock_list(State(state): State<MockServerState>) -> impl IntoResponse {
    if let Some(raw) = state.list_body.lock().await.clone() {
        return (
            StatusCode::OK,
            [("content-type", "application/json")],
            raw,
        )
            .into_response();
    }
    Json(state.records.lock().await.clone()).into_response()
}

async fn mock_create(
    State(state): State<MockServerState>,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    state.created.lock().await.push(body.clone());
    if *state.fail_create.lock().await {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError::new("insert failed")),
        )
            .into_response();
    }
    let payload: NewInfographicPayload = match serde_json::from_value(body) {
        Ok(payload) => payload,
        Err(_) => {
            return (StatusCode::BAD_REQUEST, Json(ApiError::new("bad json"))).into_response()
        }
    };

    let mut records = state.records.lock().await;
    let next_id = records.iter().map(|r| r.id.0).max().unwrap_or(0) + 1;
    let mut created = record(next_id, &payload.title);
    created.description = payload.description;
    created.thumbnail_url = payload.thumbnail_url;
    created.page_url = payload.page_url;
    created.category = payload.category;
    created.category_color = payload.category_color;
    records.insert(0, created.clone());
    (StatusCode::CREATED, Json(created)).into_response()
}

async fn mock_delete(
    State(state): State<MockServerState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let mut records = state.records.lock().await;
    let before = records.len();
    records.retain(|r| r.id.0 != id);
    if records.len() == before {
        return (StatusCode::NOT_FOUND, Json(ApiError::new("no such infographic")))
            .into_response();
    }
    state.deleted.lock().await.push(id);
    StatusCode::NO_CONTENT.into_response()
}

async fn mock_upload(
    State(state): State<MockServerState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut received = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        if let Ok(bytes) = field.bytes().await {
            received = Some((file_name, bytes.to_vec()));
        }
        break;
    }

    let Some((file_name, bytes)) = received else {
        return (StatusCode::BAD_REQUEST, Json(ApiError::new("file field missing")))
            .into_response();
    };
    if *state.fail_uploads.lock().await {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError::new("storage unavailable")),
        )
            .into_response();
    }
    if let Some(raw) = state.upload_body.lock().await.clone() {
        return (
            StatusCode::OK,
            [("content-type", "application/json")],
            raw,
        )
            .into_response();
    }

    let ext = FsPath::new(&file_name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    state.uploads.lock().await.push((file_name, bytes));
    Json(UploadResponse {
        url: format!("/uploads/{}{ext}", uuid::Uuid::new_v4()),
    })
    .into_response()
}

/// Serves the remote API under `/api` on an ephemeral port.
pub async fn spawn_api_server(state: MockServerState) -> AnyResult<ClientConfig> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = Router::new()
        .route("/api/infographics", get(mock_list).post(mock_create))
        .route("/api/infographics/:id", delete(mock_delete))
        .route("/api/upload", post(mock_upload))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(ClientConfig::new(&format!("http://{addr}/api"))?)
}
