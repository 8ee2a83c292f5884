use std::{path::Path, sync::Arc};

use tracing::{debug, warn};

use crate::{
    api::InfographicApi,
    error::{ClientError, Result},
};

/// A file picked by the user, ready to be sent as the `file` multipart field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, mime_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type,
            bytes,
        }
    }

    /// Reads a file from disk, guessing its MIME type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                ClientError::validation(format!("'{}' is not a file path", path.display()))
            })?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ClientError::local_file(path, &e))?;
        let mime_type = mime_guess::from_path(path)
            .first()
            .map(|mime| mime.essence_str().to_string());

        Ok(Self::new(file_name, mime_type, bytes))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub url: String,
}

/// Uploads files one after another, stopping at the first failure.
///
/// Files uploaded before a failure are left on the server.
pub struct UploadPipeline {
    api: Arc<dyn InfographicApi>,
}

impl UploadPipeline {
    pub fn new(api: Arc<dyn InfographicApi>) -> Self {
        Self { api }
    }

    pub async fn run(&self, files: &[&UploadFile]) -> Result<Vec<UploadResult>> {
        let mut uploaded = Vec::with_capacity(files.len());

        for file in files {
            match self.api.upload(file).await {
                Ok(result) => {
                    debug!(file_name = %file.file_name, url = %result.url, "file uploaded");
                    uploaded.push(result);
                }
                Err(cause) => {
                    if !uploaded.is_empty() {
                        let orphaned: Vec<&str> =
                            uploaded.iter().map(|r: &UploadResult| r.url.as_str()).collect();
                        warn!(
                            file_name = %file.file_name,
                            ?orphaned,
                            "upload failed; earlier uploads are left orphaned"
                        );
                    }
                    return Err(ClientError::upload(file.file_name.clone(), cause));
                }
            }
        }

        Ok(uploaded)
    }
}

#[cfg(test)]
#[path = "tests/upload_tests.rs"]
mod tests;
