//! User-facing notifications produced by submissions and mutations.

use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Warning,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Failure,
            message: message.into(),
        }
    }

    /// Validation problems are warnings the user can fix; everything else is a failure.
    pub fn from_error(err: &ClientError) -> Self {
        let level = if err.is_validation() {
            NotificationLevel::Warning
        } else {
            NotificationLevel::Failure
        };
        Self {
            level,
            message: err.to_string(),
        }
    }
}
