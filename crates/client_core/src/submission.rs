//! Admin form submission: two uploads followed by the metadata create.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shared::{
    domain::CategoryStyle,
    protocol::{InfographicRecord, NewInfographicPayload},
};
use tracing::{debug, info, warn};

use crate::{
    api::InfographicApi,
    error::{ClientError, Result},
    notify::Notification,
    resource::Resource,
    upload::{UploadFile, UploadPipeline, UploadResult},
};

/// Client-side state of the "new infographic" form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftForm {
    pub title: String,
    pub description: String,
    pub thumbnail: Option<UploadFile>,
    pub page: Option<UploadFile>,
    pub category: String,
    pub category_color: String,
    submitting: bool,
}

impl Default for DraftForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            thumbnail: None,
            page: None,
            category: String::new(),
            category_color: CategoryStyle::default_style().token.to_string(),
            submitting: false,
        }
    }
}

impl DraftForm {
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Empties every field, style token included. The submitting flag is left alone.
    pub fn clear(&mut self) {
        self.title.clear();
        self.description.clear();
        self.thumbnail = None;
        self.page = None;
        self.category.clear();
        self.category_color.clear();
    }

    pub fn to_payload(&self, thumbnail_url: String, page_url: String) -> NewInfographicPayload {
        NewInfographicPayload {
            title: self.title.clone(),
            description: non_empty(&self.description),
            thumbnail_url,
            page_url,
            category: non_empty(&self.category),
            category_color: non_empty(&self.category_color),
        }
    }

    fn check_ready(&self) -> Result<()> {
        if self.thumbnail.is_none() || self.page.is_none() {
            return Err(ClientError::validation(
                "select both a thumbnail and a page file",
            ));
        }
        if self.title.trim().is_empty() {
            return Err(ClientError::validation("title is required"));
        }
        Ok(())
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Created,
    /// Refused before any network call.
    Rejected(ClientError),
    Failed(ClientError),
}

impl SubmissionOutcome {
    pub fn notification(&self) -> Notification {
        match self {
            Self::Created => Notification::success("infographic registered"),
            Self::Rejected(err) | Self::Failed(err) => Notification::from_error(err),
        }
    }

    pub fn into_result(self) -> Result<()> {
        match self {
            Self::Created => Ok(()),
            Self::Rejected(err) | Self::Failed(err) => Err(err),
        }
    }
}

/// Releases the draft's submitting flag when the submission ends, however it ends.
struct SubmittingGuard<'a> {
    draft: &'a Mutex<DraftForm>,
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        lock(self.draft).submitting = false;
    }
}

fn lock(draft: &Mutex<DraftForm>) -> MutexGuard<'_, DraftForm> {
    draft.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct SubmissionOrchestrator {
    api: Arc<dyn InfographicApi>,
    uploads: UploadPipeline,
    listing: Resource<Vec<InfographicRecord>>,
    draft: Mutex<DraftForm>,
}

impl SubmissionOrchestrator {
    pub fn new(api: Arc<dyn InfographicApi>, listing: Resource<Vec<InfographicRecord>>) -> Self {
        Self {
            uploads: UploadPipeline::new(Arc::clone(&api)),
            api,
            listing,
            draft: Mutex::new(DraftForm::default()),
        }
    }

    pub fn draft(&self) -> DraftForm {
        lock(&self.draft).clone()
    }

    /// Applies user input to the draft. The submitting flag cannot be changed here.
    pub fn edit_draft(&self, edit: impl FnOnce(&mut DraftForm)) {
        let mut draft = lock(&self.draft);
        let submitting = draft.submitting;
        edit(&mut draft);
        draft.submitting = submitting;
    }

    pub fn is_submitting(&self) -> bool {
        lock(&self.draft).submitting
    }

    pub async fn submit(&self) -> SubmissionOutcome {
        let (draft, _guard) = match self.begin() {
            Ok(started) => started,
            Err(err) => {
                debug!(error = %err, "submission rejected");
                return SubmissionOutcome::Rejected(err);
            }
        };

        match self.upload_and_create(&draft).await {
            Ok(()) => {
                lock(&self.draft).clear();
                info!(title = %draft.title, "infographic registered");
                self.listing.invalidate();
                SubmissionOutcome::Created
            }
            Err(err) => {
                warn!(error = %err, "submission failed");
                SubmissionOutcome::Failed(err)
            }
        }
    }

    fn begin(&self) -> Result<(DraftForm, SubmittingGuard<'_>)> {
        let mut draft = lock(&self.draft);
        draft.check_ready()?;
        if draft.submitting {
            return Err(ClientError::validation(
                "a submission is already in progress",
            ));
        }
        draft.submitting = true;
        let snapshot = draft.clone();
        drop(draft);

        Ok((snapshot, SubmittingGuard { draft: &self.draft }))
    }

    async fn upload_and_create(&self, draft: &DraftForm) -> Result<()> {
        let (Some(thumbnail), Some(page)) = (&draft.thumbnail, &draft.page) else {
            return Err(ClientError::validation(
                "select both a thumbnail and a page file",
            ));
        };

        let uploaded = self.uploads.run(&[thumbnail, page]).await?;
        let [thumbnail, page]: [UploadResult; 2] = uploaded.try_into().map_err(|_| {
            ClientError::MalformedResponse("expected exactly two upload references".into())
        })?;

        let payload = draft.to_payload(thumbnail.url, page.url);
        self.api.create(&payload).await
    }
}

#[cfg(test)]
#[path = "tests/submission_tests.rs"]
mod tests;
