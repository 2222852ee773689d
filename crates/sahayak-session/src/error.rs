use thiserror::Error;
use uuid::Uuid;

/// Errors from the session lifecycle engine.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Unknown or expired session id. Always surfaced, never retried.
    #[error("Session not found or expired: {0}")]
    NotFound(Uuid),

    /// Empty input text; rejected before any session mutation.
    #[error("Input text must not be empty")]
    EmptyInput,

    /// Registry map lock poisoned by a panicked holder.
    #[error("Registry error: {0}")]
    Registry(String),
}

impl From<SessionError> for sahayak_core::SahayakError {
    fn from(err: SessionError) -> Self {
        sahayak_core::SahayakError::Session(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display_includes_id() {
        let id = Uuid::new_v4();
        let err = SessionError::NotFound(id);
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn test_conversion_to_core_error() {
        let err: sahayak_core::SahayakError = SessionError::EmptyInput.into();
        assert!(matches!(err, sahayak_core::SahayakError::Session(_)));
    }
}
