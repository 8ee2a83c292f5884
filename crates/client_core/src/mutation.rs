use std::sync::Arc;

use async_trait::async_trait;
use shared::{domain::InfographicId, protocol::InfographicRecord};
use tracing::{debug, info, warn};

use crate::{
    api::InfographicApi,
    error::{ClientError, Result},
    notify::Notification,
    resource::Resource,
};

/// Asks the user to confirm a destructive action.
#[async_trait]
pub trait ConfirmationPrompt: Send + Sync {
    async fn confirm(&self, message: &str) -> bool;
}

/// Confirms everything. For headless callers that confirmed up front.
pub struct AutoConfirm;

#[async_trait]
impl ConfirmationPrompt for AutoConfirm {
    async fn confirm(&self, _message: &str) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Cancelled,
    Deleted(InfographicId),
    Failed(ClientError),
}

impl MutationOutcome {
    /// `None` when the user declined; nothing happened and nothing is shown.
    pub fn notification(&self) -> Option<Notification> {
        match self {
            Self::Cancelled => None,
            Self::Deleted(id) => Some(Notification::success(format!("deleted infographic {id}"))),
            Self::Failed(err) => Some(Notification::failure(format!("delete failed: {err}"))),
        }
    }

    pub fn into_result(self) -> Result<()> {
        match self {
            Self::Cancelled | Self::Deleted(_) => Ok(()),
            Self::Failed(err) => Err(err),
        }
    }
}

pub struct MutationExecutor {
    api: Arc<dyn InfographicApi>,
    prompt: Arc<dyn ConfirmationPrompt>,
    listing: Resource<Vec<InfographicRecord>>,
}

impl MutationExecutor {
    pub fn new(
        api: Arc<dyn InfographicApi>,
        prompt: Arc<dyn ConfirmationPrompt>,
        listing: Resource<Vec<InfographicRecord>>,
    ) -> Self {
        Self {
            api,
            prompt,
            listing,
        }
    }

    pub async fn delete(&self, id: InfographicId) -> MutationOutcome {
        let question = format!("Really delete infographic {id}?");
        if !self.prompt.confirm(&question).await {
            debug!(%id, "delete declined");
            return MutationOutcome::Cancelled;
        }

        match self.api.delete(id).await {
            Ok(()) => {
                info!(%id, "infographic deleted");
                self.listing.invalidate();
                MutationOutcome::Deleted(id)
            }
            Err(err) => {
                warn!(%id, error = %err, "delete failed");
                MutationOutcome::Failed(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/mutation_tests.rs"]
mod tests;
