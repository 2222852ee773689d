use thiserror::Error;

/// Top-level error type for the Sahayak system.
///
/// Subsystem crates define their own error types and convert into this one
/// at the boundary so that `?` works across crates.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SahayakError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Form automation error: {0}")]
    Automation(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for SahayakError {
    fn from(err: toml::de::Error) -> Self {
        SahayakError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for SahayakError {
    fn from(err: toml::ser::Error) -> Self {
        SahayakError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for SahayakError {
    fn from(err: serde_json::Error) -> Self {
        SahayakError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Sahayak operations.
pub type Result<T> = std::result::Result<T, SahayakError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SahayakError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");
    }

    #[test]
    fn test_error_display_variants() {
        let cases: Vec<(SahayakError, &str)> = vec![
            (
                SahayakError::Session("expired".to_string()),
                "Session error: expired",
            ),
            (
                SahayakError::Extraction("model offline".to_string()),
                "Extraction error: model offline",
            ),
            (
                SahayakError::Transcription("bad audio".to_string()),
                "Transcription error: bad audio",
            ),
            (
                SahayakError::Automation("browser crashed".to_string()),
                "Form automation error: browser crashed",
            ),
            (
                SahayakError::Api("bind failed".to_string()),
                "API error: bind failed",
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SahayakError = io_err.into();
        assert!(matches!(err, SahayakError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_toml_error_maps_to_config() {
        let bad: std::result::Result<toml::Value, _> = toml::from_str("invalid = [[[");
        let err: SahayakError = bad.unwrap_err().into();
        assert!(matches!(err, SahayakError::Config(_)));
    }

    #[test]
    fn test_json_error_maps_to_serialization() {
        let bad: std::result::Result<serde_json::Value, _> = serde_json::from_str("{ nope }");
        let err: SahayakError = bad.unwrap_err().into();
        assert!(matches!(err, SahayakError::Serialization(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io: std::result::Result<i32, std::io::Error> = Ok(7);
            let _ = io?;
            Ok("ok".to_string())
        }
        assert_eq!(inner().unwrap(), "ok");
    }
}
