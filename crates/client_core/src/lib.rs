//! Client core for the infographic archive: resource synchronization and
//! submission orchestration shared by the gallery and admin pages.

pub mod api;
pub mod config;
pub mod error;
pub mod mutation;
pub mod notify;
pub mod resource;
pub mod session;
pub mod submission;
pub mod upload;

pub use api::{HttpInfographicApi, InfographicApi};
pub use config::{load_config, ClientConfig};
pub use error::ClientError;
pub use mutation::{AutoConfirm, ConfirmationPrompt, MutationExecutor, MutationOutcome};
pub use notify::{Notification, NotificationLevel};
pub use resource::{Resource, ResourceState};
pub use session::{observe_listing, AdminSession, GallerySession, Listing};
pub use submission::{DraftForm, SubmissionOrchestrator, SubmissionOutcome};
pub use upload::{UploadFile, UploadPipeline, UploadResult};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
