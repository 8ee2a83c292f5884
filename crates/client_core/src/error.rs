//! Client-side error taxonomy and its mapping from transport failures.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Transport failure before any response was received.
    #[error("network error: {0}")]
    Network(String),
    #[error("request failed with status {status}: {message}")]
    HttpStatus { status: u16, message: String },
    #[error("{0}")]
    Validation(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    /// Carries its cause in the message; no separate `source`.
    #[error("failed to upload \"{file_name}\": {cause}")]
    Upload {
        file_name: String,
        cause: Box<ClientError>,
    },
    /// A picked file could not be read from local disk.
    #[error("failed to read '{path}' ({kind}): {message}")]
    LocalFile {
        path: String,
        kind: std::io::ErrorKind,
        message: String,
    },
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn upload(file_name: impl Into<String>, cause: ClientError) -> Self {
        Self::Upload {
            file_name: file_name.into(),
            cause: Box::new(cause),
        }
    }

    pub fn local_file(path: &std::path::Path, err: &std::io::Error) -> Self {
        Self::LocalFile {
            path: path.display().to_string(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            Self::Upload { cause, .. } => cause.status(),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::HttpStatus {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
            };
        }
        if err.is_decode() {
            return Self::MalformedResponse(err.to_string());
        }
        Self::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;
