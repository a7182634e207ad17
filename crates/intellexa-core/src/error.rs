use thiserror::Error;

/// Top-level error type for the Intellexa system.
///
/// Subsystem crates define their own error types and implement
/// `From<SubsystemError> for AssistantError` where they cross crate
/// boundaries, so the `?` operator works throughout.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssistantError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for AssistantError {
    fn from(err: toml::de::Error) -> Self {
        AssistantError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for AssistantError {
    fn from(err: toml::ser::Error) -> Self {
        AssistantError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for AssistantError {
    fn from(err: serde_json::Error) -> Self {
        AssistantError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Intellexa operations.
pub type Result<T> = std::result::Result<T, AssistantError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AssistantError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");

        let err = AssistantError::Engine("turn stuck".to_string());
        assert_eq!(err.to_string(), "Engine error: turn stuck");

        let err = AssistantError::Api("bind failed".to_string());
        assert_eq!(err.to_string(), "API error: bind failed");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: AssistantError = io_err.into();
        assert!(matches!(err, AssistantError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let bad_toml = "invalid = [[[";
        let parsed: std::result::Result<toml::Value, _> = toml::from_str(bad_toml);
        let err: AssistantError = parsed.unwrap_err().into();
        assert!(matches!(err, AssistantError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let bad_json = "{ invalid json }";
        let parsed: std::result::Result<serde_json::Value, _> = serde_json::from_str(bad_json);
        let err: AssistantError = parsed.unwrap_err().into();
        assert!(matches!(err, AssistantError::Serialization(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let _value = io_result?;
            Ok("success".to_string())
        }

        assert_eq!(inner().unwrap(), "success");
    }

    #[test]
    fn test_error_debug_impl() {
        let err = AssistantError::Config("test debug".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("Config"));
        assert!(debug_str.contains("test debug"));
    }
}
