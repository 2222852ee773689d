//! Drives a form fill for one session end to end.
//!
//! The orchestrator resolves the session, snapshots its fields, and hands
//! them to the filler under a semaphore so no more than a configured number
//! of browser runs are in flight at once. The session's record lock is NOT
//! held across the fill; the record is re-locked afterwards to store the
//! result.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{info, warn};
use uuid::Uuid;

use sahayak_core::{ApplicantFields, FillingState, SessionStatus, FIELD_COUNT, FIELD_KEYS};
use sahayak_session::{SessionError, SessionRegistry};

use crate::status::{outcome_status, report_status, FormStatus};
use crate::FormFiller;

/// Minimum number of filled fields before a fill attempt is worthwhile.
const MIN_FIELDS_TO_FILL: usize = 3;

/// Fields set through text inputs on the portal, with display labels.
const TEXT_FIELDS: [(&str, &str); 8] = [
    ("name", "Name"),
    ("annual_family_income", "Annual Family Income"),
    ("dob", "Date of Birth"),
    ("xii_roll_no", "Class XII Roll Number"),
    ("twelfthPercentage", "Class XII Percentage"),
    ("x_roll_no", "Class X Roll Number"),
    ("tenthPercentage", "Class X Percentage"),
    ("competitiveRollno", "Competitive Exam Roll Number"),
];

/// Fields set through dropdowns on the portal, with display labels.
const DROPDOWN_FIELDS: [(&str, &str); 9] = [
    ("gender", "Gender"),
    ("d_state_id", "State of Domicile"),
    ("religion", "Religion"),
    ("community", "Community / Category"),
    ("c_course_id", "Course"),
    ("maritalStatus", "Marital Status"),
    ("hosteler", "Hosteler"),
    ("parent_profession", "Parent Profession"),
    ("competitiveExam", "Competitive Exam"),
];

#[derive(Debug, Error)]
pub enum FormError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("No applicant data collected yet; nothing to fill")]
    NoData,
}

/// Result of one orchestrated fill, ready for API serialization.
#[derive(Debug, Clone, Serialize)]
pub struct FillReport {
    pub session_id: Uuid,
    pub status: FormStatus,
    pub message: String,
    pub screenshot_path: Option<PathBuf>,
    pub errors: Vec<String>,
}

/// One field in the pre-fill preview.
#[derive(Debug, Clone, Serialize)]
pub struct PreviewField {
    pub key: &'static str,
    pub label: &'static str,
    pub value: Option<String>,
}

/// What the automation would type and select, shown before committing to
/// a browser run.
#[derive(Debug, Clone, Serialize)]
pub struct FormPreview {
    pub session_id: Uuid,
    pub text_fields: Vec<PreviewField>,
    pub dropdown_fields: Vec<PreviewField>,
    pub filled_count: usize,
    pub total_fields: usize,
    pub ready_to_fill: bool,
}

pub struct FormFillingOrchestrator {
    registry: Arc<SessionRegistry>,
    filler: Arc<dyn FormFiller>,
    permits: Arc<Semaphore>,
    screenshots_dir: PathBuf,
}

impl FormFillingOrchestrator {
    pub fn new(
        registry: Arc<SessionRegistry>,
        filler: Arc<dyn FormFiller>,
        max_concurrent_fills: usize,
        screenshots_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            registry,
            filler,
            permits: Arc::new(Semaphore::new(max_concurrent_fills.max(1))),
            screenshots_dir: screenshots_dir.into(),
        }
    }

    /// Run the automation for a session's collected fields.
    ///
    /// Rejects sessions with no data at all. Marks the session as filling,
    /// releases its lock for the duration of the browser run, then stores
    /// the outcome back on the record.
    pub async fn fill(&self, session_id: Uuid) -> Result<FillReport, FormError> {
        let handle = self.registry.get(session_id)?;

        let fields: ApplicantFields = {
            let mut record = handle.lock().await;
            if record.fields.filled_count() == 0 {
                return Err(FormError::NoData);
            }
            record.filling = FillingState::InProgress;
            record.status = SessionStatus::Filling;
            record.fields.clone()
        };

        info!(session_id = %session_id, fields = fields.filled_count(), "Form fill requested");

        let outcome = match self.permits.acquire().await {
            Ok(_permit) => self.filler.fill(&fields, session_id).await,
            // The semaphore is never closed; treat it as a hard failure anyway.
            Err(_) => crate::FillOutcome::failed("Fill queue is shut down"),
        };

        let status = outcome_status(&outcome);
        {
            let mut record = handle.lock().await;
            record.form_errors = outcome.errors.clone();
            record.screenshot_path = outcome.screenshot_path.clone();
            if outcome.success {
                record.filling = FillingState::Completed;
                record.status = SessionStatus::Completed;
            } else {
                record.filling = FillingState::Failed;
                record.status = SessionStatus::Active;
                warn!(session_id = %session_id, message = %outcome.message, "Form fill failed");
            }
        }

        Ok(FillReport {
            session_id,
            status,
            message: outcome.message,
            screenshot_path: outcome.screenshot_path,
            errors: outcome.errors,
        })
    }

    /// Current reported status for a session's fill.
    pub async fn status(&self, session_id: Uuid) -> Result<FillReport, FormError> {
        let handle = self.registry.get(session_id)?;
        let record = handle.lock().await;
        Ok(FillReport {
            session_id,
            status: report_status(record.filling),
            message: match record.filling {
                FillingState::Pending => "Form filling has not started".to_string(),
                FillingState::InProgress => "Form filling is in progress".to_string(),
                FillingState::Completed => {
                    "Form filled; please verify and submit manually".to_string()
                }
                FillingState::Failed => "Form filling failed".to_string(),
            },
            screenshot_path: record.screenshot_path.clone(),
            errors: record.form_errors.clone(),
        })
    }

    /// What would be typed and selected, without touching a browser.
    pub async fn preview(&self, session_id: Uuid) -> Result<FormPreview, FormError> {
        let handle = self.registry.get(session_id)?;
        let record = handle.lock().await;

        let project = |spec: &[(&'static str, &'static str)]| {
            spec.iter()
                .map(|&(key, label)| PreviewField {
                    key,
                    label,
                    value: record.fields.get(key).map(str::to_string),
                })
                .collect::<Vec<_>>()
        };

        let filled_count = record.fields.filled_count();
        Ok(FormPreview {
            session_id,
            text_fields: project(&TEXT_FIELDS),
            dropdown_fields: project(&DROPDOWN_FIELDS),
            filled_count,
            total_fields: FIELD_COUNT,
            ready_to_fill: filled_count >= MIN_FIELDS_TO_FILL,
        })
    }

    /// Newest screenshot for a session, by filename.
    ///
    /// The bridge names screenshots `form_{session_id}_{timestamp}.png`
    /// with a sortable timestamp, so reverse-lexicographic order is newest
    /// first. Prefers the path stored on the record, falling back to a
    /// directory scan.
    pub async fn latest_screenshot(&self, session_id: Uuid) -> Result<PathBuf, FormError> {
        let handle = self.registry.get(session_id)?;
        {
            let record = handle.lock().await;
            if let Some(path) = &record.screenshot_path {
                if path.exists() {
                    return Ok(path.clone());
                }
            }
        }
        newest_screenshot_in(&self.screenshots_dir, session_id)
            .ok_or(FormError::Session(SessionError::NotFound(session_id)))
    }
}

fn newest_screenshot_in(dir: &Path, session_id: Uuid) -> Option<PathBuf> {
    let prefix = format!("form_{session_id}_");
    let entries = std::fs::read_dir(dir).ok()?;
    entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name().into_string().ok()?;
            (name.starts_with(&prefix) && name.ends_with(".png")).then(|| (name, entry.path()))
        })
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, path)| path)
}

// Label maps must stay in sync with the canonical schema.
const _: () = assert!(TEXT_FIELDS.len() + DROPDOWN_FIELDS.len() == FIELD_KEYS.len());
