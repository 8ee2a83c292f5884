//! Per-page state bundles, created when a page mounts and dropped when it unmounts.

use std::sync::Arc;

use shared::{domain::InfographicId, protocol::InfographicRecord};

use crate::{
    api::InfographicApi,
    mutation::{ConfirmationPrompt, MutationExecutor, MutationOutcome},
    resource::Resource,
    submission::{SubmissionOrchestrator, SubmissionOutcome},
};

pub type Listing = Resource<Vec<InfographicRecord>>;

pub fn observe_listing(api: Arc<dyn InfographicApi>) -> Listing {
    Resource::observe(move || {
        let api = Arc::clone(&api);
        async move { api.list().await }
    })
}

/// Public gallery: read-only view of the listing.
pub struct GallerySession {
    listing: Listing,
}

impl GallerySession {
    pub fn mount(api: Arc<dyn InfographicApi>) -> Self {
        Self {
            listing: observe_listing(api),
        }
    }

    pub fn listing(&self) -> &Listing {
        &self.listing
    }
}

/// Admin page: listing plus the create form and delete action sharing it.
pub struct AdminSession {
    listing: Listing,
    submissions: SubmissionOrchestrator,
    mutations: MutationExecutor,
}

impl AdminSession {
    pub fn mount(api: Arc<dyn InfographicApi>, prompt: Arc<dyn ConfirmationPrompt>) -> Self {
        let listing = observe_listing(Arc::clone(&api));
        Self {
            submissions: SubmissionOrchestrator::new(Arc::clone(&api), listing.clone()),
            mutations: MutationExecutor::new(api, prompt, listing.clone()),
            listing,
        }
    }

    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    pub fn submissions(&self) -> &SubmissionOrchestrator {
        &self.submissions
    }

    pub async fn submit(&self) -> SubmissionOutcome {
        self.submissions.submit().await
    }

    pub async fn delete(&self, id: InfographicId) -> MutationOutcome {
        self.mutations.delete(id).await
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
