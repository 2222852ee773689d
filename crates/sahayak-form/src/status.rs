//! Externally-reported form status and its mapping from internal state.
//!
//! The internal `FillingState` tracks what the automation pipeline did;
//! callers instead see a reporting status where a completed fill is
//! surfaced as "verification required", because a human must review the
//! submitted form before anything counts as done.

use serde::{Deserialize, Serialize};

use sahayak_core::FillingState;

use crate::FillOutcome;

/// Form status as reported to API consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStatus {
    Pending,
    InProgress,
    VerificationRequired,
    Failed,
}

impl FormStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormStatus::Pending => "pending",
            FormStatus::InProgress => "in_progress",
            FormStatus::VerificationRequired => "verification_required",
            FormStatus::Failed => "failed",
        }
    }
}

/// Map the internal pipeline state to the reported status.
pub fn report_status(state: FillingState) -> FormStatus {
    match state {
        FillingState::Pending => FormStatus::Pending,
        FillingState::InProgress => FormStatus::InProgress,
        FillingState::Completed => FormStatus::VerificationRequired,
        FillingState::Failed => FormStatus::Failed,
    }
}

/// Status implied by a finished fill attempt. Per-field errors on an
/// otherwise successful run do not demote it.
pub fn outcome_status(outcome: &FillOutcome) -> FormStatus {
    if outcome.success {
        FormStatus::VerificationRequired
    } else {
        FormStatus::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_status_table() {
        assert_eq!(report_status(FillingState::Pending), FormStatus::Pending);
        assert_eq!(
            report_status(FillingState::InProgress),
            FormStatus::InProgress
        );
        assert_eq!(
            report_status(FillingState::Completed),
            FormStatus::VerificationRequired
        );
        assert_eq!(report_status(FillingState::Failed), FormStatus::Failed);
    }

    #[test]
    fn test_outcome_status_success_requires_verification() {
        let outcome = FillOutcome {
            success: true,
            message: "Form filled".into(),
            errors: vec![],
            screenshot_path: None,
        };
        assert_eq!(outcome_status(&outcome), FormStatus::VerificationRequired);
    }

    #[test]
    fn test_outcome_status_partial_success_still_requires_verification() {
        let outcome = FillOutcome {
            success: true,
            message: "Form filled with 2 field errors".into(),
            errors: vec!["gender: option not found".into(), "dob: bad format".into()],
            screenshot_path: None,
        };
        assert_eq!(outcome_status(&outcome), FormStatus::VerificationRequired);
    }

    #[test]
    fn test_outcome_status_failure() {
        let outcome = FillOutcome::failed("bridge unreachable");
        assert_eq!(outcome_status(&outcome), FormStatus::Failed);
        assert_eq!(outcome.errors, vec!["bridge unreachable".to_string()]);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&FormStatus::VerificationRequired).unwrap();
        assert_eq!(json, "\"verification_required\"");
        assert_eq!(FormStatus::InProgress.as_str(), "in_progress");
    }
}
