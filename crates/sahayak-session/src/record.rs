//! Per-conversation session state.
//!
//! A `SessionRecord` is created and owned by the registry; all mutation
//! happens under the registry's per-record lock. The record itself is a
//! plain data container with a small mutation contract.

use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use sahayak_core::{ApplicantFields, ChatMessage, FillingState, Role, SessionStatus};

/// Mutable state for one data-collection conversation.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub id: Uuid,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    /// Current question group. Monotonically non-decreasing; may run past
    /// the catalog length, which callers treat as "all groups exhausted".
    pub group_index: usize,
    /// Append-only conversation transcript. Unbounded: consumers window it.
    pub chat_history: Vec<ChatMessage>,
    pub fields: ApplicantFields,
    pub filling: FillingState,
    pub screenshot_path: Option<PathBuf>,
    pub form_errors: Vec<String>,
}

/// Read-only copy of a record, handed to response builders.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub group_index: usize,
    pub fields: ApplicantFields,
    pub filling: FillingState,
    pub screenshot_path: Option<PathBuf>,
    pub form_errors: Vec<String>,
}

impl SessionRecord {
    pub(crate) fn new(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            status: SessionStatus::Active,
            created_at: now,
            last_activity: now,
            group_index: 0,
            chat_history: Vec::new(),
            fields: ApplicantFields::default(),
            filling: FillingState::Pending,
            screenshot_path: None,
            form_errors: Vec::new(),
        }
    }

    fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    /// Append a message to the chat history.
    pub fn add_message(&mut self, role: Role, content: impl Into<String>) {
        self.chat_history.push(ChatMessage::new(role, content));
        self.touch();
    }

    /// Fold a candidate field map into the canonical fields; returns the
    /// names of the fields that changed.
    pub fn update_fields(&mut self, candidate: &Map<String, Value>) -> Vec<String> {
        let changed = self.fields.merge(candidate);
        self.touch();
        changed
    }

    /// Move to the next question group. Never decrements and never clamps;
    /// completion is detected by comparing against the catalog length.
    pub fn advance_group(&mut self) {
        self.group_index += 1;
        self.touch();
    }

    /// Whether the idle timeout has elapsed since the last activity.
    pub fn is_expired(&self, timeout: Duration) -> bool {
        Utc::now() > self.last_activity + timeout
    }

    /// The most recent `n` chat history entries, oldest first.
    pub fn recent_history(&self, n: usize) -> &[ChatMessage] {
        let start = self.chat_history.len().saturating_sub(n);
        &self.chat_history[start..]
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            status: self.status,
            created_at: self.created_at,
            group_index: self.group_index,
            fields: self.fields.clone(),
            filling: self.filling,
            screenshot_path: self.screenshot_path.clone(),
            form_errors: self.form_errors.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> SessionRecord {
        SessionRecord::new(Uuid::new_v4())
    }

    fn candidate(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_new_record_defaults() {
        let rec = record();
        assert_eq!(rec.status, SessionStatus::Active);
        assert_eq!(rec.group_index, 0);
        assert!(rec.chat_history.is_empty());
        assert_eq!(rec.filling, FillingState::Pending);
        assert_eq!(rec.fields.filled_count(), 0);
        assert!(rec.form_errors.is_empty());
    }

    #[test]
    fn test_add_message_appends_and_touches() {
        let mut rec = record();
        let before = rec.last_activity;
        rec.add_message(Role::User, "hello");
        rec.add_message(Role::Assistant, "hi");
        assert_eq!(rec.chat_history.len(), 2);
        assert_eq!(rec.chat_history[0].role, Role::User);
        assert_eq!(rec.chat_history[1].content, "hi");
        assert!(rec.last_activity >= before);
    }

    #[test]
    fn test_update_fields_reports_changes() {
        let mut rec = record();
        let changed = rec.update_fields(&candidate(&[("name", json!("Asha Kumar"))]));
        assert_eq!(changed, vec!["name"]);
        assert_eq!(rec.fields.name.as_deref(), Some("Asha Kumar"));
    }

    #[test]
    fn test_advance_group_is_monotone_and_unclamped() {
        let mut rec = record();
        for expected in 1..=10 {
            rec.advance_group();
            assert_eq!(rec.group_index, expected);
        }
    }

    #[test]
    fn test_is_expired() {
        let mut rec = record();
        assert!(!rec.is_expired(Duration::minutes(30)));
        rec.last_activity = Utc::now() - Duration::minutes(31);
        assert!(rec.is_expired(Duration::minutes(30)));
        assert!(!rec.is_expired(Duration::minutes(60)));
    }

    #[test]
    fn test_recent_history_windows_the_tail() {
        let mut rec = record();
        for i in 0..20 {
            rec.add_message(Role::User, format!("msg {i}"));
        }
        let window = rec.recent_history(12);
        assert_eq!(window.len(), 12);
        assert_eq!(window[0].content, "msg 8");
        assert_eq!(window[11].content, "msg 19");

        // Shorter histories are returned whole.
        assert_eq!(rec.recent_history(100).len(), 20);
    }

    #[test]
    fn test_snapshot_copies_state() {
        let mut rec = record();
        rec.update_fields(&candidate(&[("gender", json!("Female"))]));
        rec.advance_group();
        let snap = rec.snapshot();
        assert_eq!(snap.id, rec.id);
        assert_eq!(snap.group_index, 1);
        assert_eq!(snap.fields.gender.as_deref(), Some("Female"));
    }
}
