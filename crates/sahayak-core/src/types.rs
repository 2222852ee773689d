//! Shared status enums and the chat message record.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a data-collection session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Filling,
    Completed,
    Expired,
}

/// Internal progress of the form automation for a session.
///
/// This is the state stored on the record. Callers see the mapped reporting
/// status instead: automation "completed" is surfaced as verification
/// required because the target portal ends with a manual step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillingState {
    Pending,
    InProgress,
    Completed,
    Failed,
}

/// Author of a chat history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One entry in a session's append-only chat history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Reachability of an external collaborator, as reported by /health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpstreamStatus {
    Healthy,
    Unhealthy,
    Unreachable,
    Unknown,
}

impl UpstreamStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamStatus::Healthy => "healthy",
            UpstreamStatus::Unhealthy => "unhealthy",
            UpstreamStatus::Unreachable => "unreachable",
            UpstreamStatus::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&SessionStatus::Active).unwrap(),
            "\"active\""
        );
        assert_eq!(
            serde_json::to_string(&SessionStatus::Expired).unwrap(),
            "\"expired\""
        );
    }

    #[test]
    fn test_filling_state_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&FillingState::InProgress).unwrap(),
            "\"in_progress\""
        );
    }

    #[test]
    fn test_role_as_str() {
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(Role::Assistant.as_str(), "assistant");
    }

    #[test]
    fn test_chat_message_round_trip() {
        let msg = ChatMessage::new(Role::User, "My name is Asha");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"role\":\"user\""));
        let back: ChatMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_upstream_status_as_str() {
        assert_eq!(UpstreamStatus::Healthy.as_str(), "healthy");
        assert_eq!(UpstreamStatus::Unreachable.as_str(), "unreachable");
    }
}
