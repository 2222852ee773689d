//! Scholarship form automation: the filler seam, the HTTP bridge client,
//! status reporting, and the bounded orchestrator that drives a fill for
//! one session.
//!
//! The actual browser automation lives outside this process; this crate
//! talks to it over HTTP and never lets more than a small number of fills
//! run at once.

pub mod bridge;
pub mod orchestrator;
pub mod status;

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sahayak_core::ApplicantFields;

pub use bridge::BridgeFormFiller;
pub use orchestrator::{FillReport, FormError, FormFillingOrchestrator, FormPreview, PreviewField};
pub use status::{outcome_status, report_status, FormStatus};

/// Result of one browser-automation run.
///
/// `success` with a non-empty `errors` list means the form was submitted
/// but some fields could not be set; callers still treat that as a
/// successful fill pending human verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillOutcome {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub screenshot_path: Option<PathBuf>,
}

impl FillOutcome {
    /// Outcome for a fill that never reached the browser.
    pub fn failed(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            success: false,
            errors: vec![message.clone()],
            message,
            screenshot_path: None,
        }
    }
}

/// Browser-automation collaborator.
///
/// Infallible by contract: a fill that cannot even be attempted is
/// reported as an unsuccessful `FillOutcome`, not an error.
#[async_trait]
pub trait FormFiller: Send + Sync {
    async fn fill(&self, fields: &ApplicantFields, session_id: Uuid) -> FillOutcome;
}
